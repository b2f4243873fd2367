// Model exports
pub mod document;
pub mod domain;
pub mod requests;
pub mod responses;

pub use document::{
    BasicInfoDocument, HeightDocument, LocationDocument, PartnerPreferenceDocument, PhotoDocument,
    ProfessionalInfoDocument, ProfileDocument, RangeDocument,
};
pub use domain::{
    CandidateHint, CompatibilityScore, Dimension, DimensionContribution, DimensionWeights, Gender,
    Location, MaritalStatus, MatchResultPage, PageRequest, PartnerPreference, Photo, Preference,
    PreferenceRange, Profile, ProfileId, RankedMatch, ScoringWeights, text_eq,
};
pub use requests::{FindMatchesRequest, MatchesQuery};
pub use responses::{ErrorResponse, FindMatchesResponse, HealthResponse, MatchCard, ScoredMatch};
