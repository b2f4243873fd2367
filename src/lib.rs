//! Matrimony Match - compatibility matching engine for a matrimonial profile service
//!
//! Given a seeker profile with partner preferences, the engine filters the
//! candidate pool on hard constraints, scores each eligible candidate on a
//! weighted set of compatibility dimensions, and returns a ranked, paginated
//! page of matches.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Clock, EngineConfig, Eligibility, FixedClock, MatchEngine, Ranker, Scorer, SystemClock};
pub use error::{MatchError, WeightsError};
pub use models::{
    CompatibilityScore, MatchResultPage, PageRequest, PartnerPreference, Profile, ProfileDocument,
    ProfileId, RankedMatch, ScoringWeights,
};
pub use services::{InMemoryProfileStore, ProfileStore, StoreError};
