use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::domain::{DimensionContribution, MatchResultPage, Profile, ProfileId, RankedMatch};

/// Presentation summary of a matched profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCard {
    pub id: ProfileId,
    pub name: Option<String>,
    pub age: u16,
    pub height_cm: Option<u16>,
    pub religion: Option<String>,
    pub caste: Option<String>,
    pub education: Option<String>,
    pub occupation: Option<String>,
    pub city: Option<String>,
    pub about: Option<String>,
    pub photo_url: Option<String>,
    pub is_verified: bool,
    pub is_premium: bool,
}

impl MatchCard {
    pub fn from_profile(profile: &Profile, as_of: NaiveDate) -> Self {
        Self {
            id: profile.id().clone(),
            name: profile.name().map(str::to_string),
            age: profile.age(as_of),
            height_cm: profile.height_cm(),
            religion: profile.religion().map(str::to_string),
            caste: profile.caste().map(str::to_string),
            education: profile.education().map(str::to_string),
            occupation: profile.occupation().map(str::to_string),
            city: profile.location().city.clone(),
            about: profile.about().map(str::to_string),
            photo_url: profile.primary_photo().map(|p| p.url.clone()),
            is_verified: profile.is_verified(),
            is_premium: profile.is_premium(),
        }
    }
}

/// Scored match result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMatch {
    #[serde(flatten)]
    pub card: MatchCard,
    pub match_score: f64,
    pub contributions: Vec<DimensionContribution>,
}

impl ScoredMatch {
    pub fn from_ranked(ranked: &RankedMatch, as_of: NaiveDate) -> Self {
        Self {
            card: MatchCard::from_profile(&ranked.profile, as_of),
            match_score: ranked.score.score,
            contributions: ranked.score.contributions.clone(),
        }
    }
}

/// Response for find matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesResponse {
    pub matches: Vec<ScoredMatch>,
    pub offset: usize,
    pub next_offset: Option<usize>,
    pub has_more: bool,
    pub total_eligible: usize,
}

impl From<&MatchResultPage> for FindMatchesResponse {
    fn from(page: &MatchResultPage) -> Self {
        Self {
            matches: page
                .matches
                .iter()
                .map(|m| ScoredMatch::from_ranked(m, page.as_of))
                .collect(),
            offset: page.offset,
            next_offset: page.next_offset,
            has_more: page.has_more,
            total_eligible: page.total_eligible,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cache_entries: Option<u64>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
