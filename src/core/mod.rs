// Core algorithm exports
pub mod clock;
pub mod engine;
pub mod filters;
pub mod ranker;
pub mod scoring;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{EngineConfig, MatchEngine};
pub use filters::{is_eligible, is_mutually_eligible, matches_hint, satisfies_preference, Eligibility};
pub use ranker::{compare_matches, Ranker, TopK, DEFAULT_MAX_LIMIT};
pub use scoring::{categorical_fit, linear_decay, location_fit, range_fit, Scorer, NEUTRAL_FIT};
