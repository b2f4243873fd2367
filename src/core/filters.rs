use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{CandidateHint, PartnerPreference, Profile, ProfileDocument};

/// Check the hard eligibility rules of a candidate for a seeker
///
/// All must hold: opposite gender, candidate verified, not the seeker, and
/// the candidate satisfies the seeker's age range, height range and marital
/// status set. Unset preference fields are vacuously satisfied.
#[inline]
pub fn is_eligible(seeker: &Profile, candidate: &Profile, as_of: NaiveDate) -> bool {
    if candidate.id() == seeker.id() {
        return false;
    }

    if candidate.gender() == seeker.gender() {
        return false;
    }

    if !candidate.is_verified() {
        return false;
    }

    match seeker.partner_preference() {
        Some(preference) => satisfies_preference(candidate, preference, as_of),
        None => true,
    }
}

/// Check `profile` against the range and marital-status rules of `preference`
#[inline]
pub fn satisfies_preference(profile: &Profile, preference: &PartnerPreference, as_of: NaiveDate) -> bool {
    if let Some(range) = preference.age_range {
        if !range.contains(profile.age(as_of)) {
            return false;
        }
    }

    // An unknown height cannot satisfy a stated height range
    if let Some(range) = preference.height_range {
        if !profile.height_cm().is_some_and(|h| range.contains(h)) {
            return false;
        }
    }

    if !preference.marital_statuses.is_empty() {
        match profile.marital_status() {
            Some(status) if preference.marital_statuses.contains(&status) => {}
            _ => return false,
        }
    }

    true
}

/// Which side's preferences gate a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eligibility {
    /// Only the seeker's preferences are applied
    #[default]
    OneWay,
    /// The candidate's own preferences must also accept the seeker
    Mutual,
}

impl Eligibility {
    #[inline]
    pub fn check(self, seeker: &Profile, candidate: &Profile, as_of: NaiveDate) -> bool {
        match self {
            Eligibility::OneWay => is_eligible(seeker, candidate, as_of),
            Eligibility::Mutual => is_mutually_eligible(seeker, candidate, as_of),
        }
    }
}

/// Bidirectional variant of `is_eligible`
pub fn is_mutually_eligible(seeker: &Profile, candidate: &Profile, as_of: NaiveDate) -> bool {
    is_eligible(seeker, candidate, as_of)
        && candidate
            .partner_preference()
            .map_or(true, |preference| satisfies_preference(seeker, preference, as_of))
}

/// Apply a store hint to a raw document
///
/// Documents whose gender is missing pass through so the engine can report
/// them as invalid.
#[inline]
pub fn matches_hint(document: &ProfileDocument, hint: &CandidateHint) -> bool {
    if document.id == hint.exclude_id.as_str() {
        return false;
    }

    if hint.verified_only && !document.is_verified {
        return false;
    }

    if let (Some(wanted), Some(gender)) = (hint.gender, document.basic_info.gender.as_deref()) {
        if !gender.trim().eq_ignore_ascii_case(wanted.as_str()) {
            return false;
        }
    }

    true
}
