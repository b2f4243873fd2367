use thiserror::Error;

use crate::models::ProfileId;
use crate::services::StoreError;

/// Errors surfaced by the matching engine
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid profile {id}: {reason}")]
    InvalidProfile { id: String, reason: String },

    #[error("Profile not found: {0}")]
    ProfileNotFound(ProfileId),

    #[error("Partner preferences incomplete for profile {0}")]
    PreferencesIncomplete(ProfileId),

    #[error("Precondition violated: {0}")]
    PreconditionViolated(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Scoring task failed: {0}")]
    ScoringFailed(#[from] tokio::task::JoinError),
}

impl MatchError {
    pub fn invalid_profile(id: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchError::InvalidProfile {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Rejected scoring weight configuration
#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("Weight for {0} must be a finite non-negative number")]
    Negative(&'static str),

    #[error("Scoring weights must sum to 1.0, got {0}")]
    BadSum(f64),
}
