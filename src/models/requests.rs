use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find matches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "userId", alias = "seeker_id", rename = "seekerId")]
    pub seeker_id: String,
    #[serde(default)]
    pub offset: usize,
    /// Falls back to `matching.default_limit` when absent
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query string for `GET /profiles/{id}/matches`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MatchesQuery {
    #[serde(default)]
    pub offset: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<usize>,
}
