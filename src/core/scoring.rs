use chrono::NaiveDate;

use crate::core::filters::Eligibility;
use crate::error::MatchError;
use crate::models::{
    text_eq, CompatibilityScore, Dimension, DimensionContribution, Location, PartnerPreference,
    Preference, PreferenceRange, Profile, ScoringWeights,
};

/// Fit reported for a range dimension the seeker left open
pub const NEUTRAL_FIT: f64 = 0.5;

static UNCONSTRAINED: PartnerPreference = PartnerPreference::unconstrained();

/// Weighted compatibility scorer
///
/// Scoring formula:
/// score = Σ weight(d) × fit(d) over the seven dimensions, clamped to [0, 1]
///
/// | dimension  | fit                                                   |
/// |------------|-------------------------------------------------------|
/// | age        | 1 at range midpoint, linear to 0 at the edges         |
/// | height     | same shape over the height range                      |
/// | religion   | 1 on case-insensitive match or no constraint, else 0  |
/// | caste      | as religion                                           |
/// | education  | as religion                                           |
/// | occupation | as religion                                           |
/// | location   | 1 same city, 0.5 same state, else 0                   |
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    weights: ScoringWeights,
    eligibility: Eligibility,
}

impl Scorer {
    pub fn new(weights: ScoringWeights, eligibility: Eligibility) -> Self {
        Self { weights, eligibility }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    pub fn eligibility(&self) -> Eligibility {
        self.eligibility
    }

    /// Score an eligible candidate
    ///
    /// Returns `PreconditionViolated` when the candidate does not pass the
    /// filter; callers are expected to filter first.
    pub fn score(
        &self,
        seeker: &Profile,
        candidate: &Profile,
        as_of: NaiveDate,
    ) -> Result<CompatibilityScore, MatchError> {
        if !self.eligibility.check(seeker, candidate, as_of) {
            tracing::error!(
                "Scorer called for ineligible candidate {} of seeker {}",
                candidate.id(),
                seeker.id()
            );
            return Err(MatchError::PreconditionViolated(format!(
                "candidate {} is not eligible for seeker {}",
                candidate.id(),
                seeker.id()
            )));
        }

        Ok(self.score_unchecked(seeker, candidate, as_of))
    }

    /// Score without re-running the filter
    pub(crate) fn score_unchecked(
        &self,
        seeker: &Profile,
        candidate: &Profile,
        as_of: NaiveDate,
    ) -> CompatibilityScore {
        let preference = seeker.partner_preference().unwrap_or(&UNCONSTRAINED);
        let weights = self.weights.resolve(seeker, preference);

        let contributions: Vec<DimensionContribution> = Dimension::ALL
            .into_iter()
            .map(|dimension| DimensionContribution {
                dimension,
                fit: dimension_fit(dimension, seeker, candidate, preference, as_of),
                weight: weights.get(dimension),
            })
            .collect();

        let total: f64 = contributions.iter().map(DimensionContribution::value).sum();

        CompatibilityScore {
            seeker_id: seeker.id().clone(),
            candidate_id: candidate.id().clone(),
            score: total.clamp(0.0, 1.0),
            contributions,
        }
    }
}

fn dimension_fit(
    dimension: Dimension,
    seeker: &Profile,
    candidate: &Profile,
    preference: &PartnerPreference,
    as_of: NaiveDate,
) -> f64 {
    match dimension {
        Dimension::Age => range_fit(Some(candidate.age(as_of)), preference.age_range),
        Dimension::Height => range_fit(candidate.height_cm(), preference.height_range),
        Dimension::Religion => categorical_fit(&preference.religion, candidate.religion()),
        Dimension::Caste => categorical_fit(&preference.caste, candidate.caste()),
        Dimension::Education => categorical_fit(&preference.education, candidate.education()),
        Dimension::Occupation => categorical_fit(&preference.occupation, candidate.occupation()),
        Dimension::Location => location_fit(seeker.location(), candidate.location()),
    }
}

/// Range fit (0-1)
/// Neutral when no range is given, zero when the value is unknown
#[inline]
pub fn range_fit(value: Option<u16>, range: Option<PreferenceRange>) -> f64 {
    match (range, value) {
        (None, _) => NEUTRAL_FIT,
        (Some(_), None) => 0.0,
        (Some(range), Some(value)) => linear_decay(value, range.min, range.max),
    }
}

/// 1.0 at the midpoint of [min, max], falling linearly to 0 at either edge and beyond
#[inline]
pub fn linear_decay(value: u16, min: u16, max: u16) -> f64 {
    let half_range = (max as f64 - min as f64) / 2.0;

    if half_range <= 0.0 {
        return if value == min { 1.0 } else { 0.0 };
    }

    let mid = (min as f64 + max as f64) / 2.0;
    let normalized_deviation = (value as f64 - mid).abs() / half_range;

    1.0 - normalized_deviation.min(1.0)
}

/// Categorical fit, exactly 0 or 1
#[inline]
pub fn categorical_fit(preference: &Preference, value: Option<&str>) -> f64 {
    if preference.accepts(value) {
        1.0
    } else {
        0.0
    }
}

/// Location fit: 1 same city, 0.5 same state, 0 otherwise
#[inline]
pub fn location_fit(seeker: &Location, candidate: &Location) -> f64 {
    let same = |a: &Option<String>, b: &Option<String>| match (a, b) {
        (Some(a), Some(b)) => text_eq(a, b),
        _ => false,
    };

    if same(&seeker.city, &candidate.city) {
        1.0
    } else if same(&seeker.state, &candidate.state) {
        0.5
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DimensionWeights, ProfileDocument};
    use serde_json::json;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    fn profile(value: serde_json::Value) -> Profile {
        let doc: ProfileDocument = serde_json::from_value(value).unwrap();
        Profile::try_from(doc).unwrap()
    }

    fn create_seeker() -> Profile {
        profile(json!({
            "id": "seeker",
            "basicInfo": { "gender": "female", "dateOfBirth": "1998-01-10" },
            "partnerPreferences": { "ageRange": { "min": 25, "max": 32 }, "religion": "Hindu" },
            "location": { "city": "Pune", "state": "Maharashtra" },
            "isVerified": true
        }))
    }

    fn create_candidate(id: &str, dob: &str, religion: &str, city: &str, state: &str) -> Profile {
        profile(json!({
            "id": id,
            "basicInfo": { "gender": "male", "dateOfBirth": dob, "religion": religion },
            "location": { "city": city, "state": state },
            "isVerified": true
        }))
    }

    #[test]
    fn test_age_fit_near_midpoint() {
        let seeker = create_seeker();
        let candidate = create_candidate("c1", "1997-03-01", "Hindu", "Mumbai", "Maharashtra");

        let score = Scorer::default().score(&seeker, &candidate, as_of()).unwrap();

        let age = score.contribution(Dimension::Age).unwrap();
        assert!((age.fit - 0.857).abs() < 0.01, "age fit was {}", age.fit);
        assert_eq!(score.contribution(Dimension::Religion).unwrap().fit, 1.0);
    }

    #[test]
    fn test_age_fit_zero_at_both_edges() {
        assert_eq!(linear_decay(25, 25, 32), 0.0);
        assert_eq!(linear_decay(32, 25, 32), 0.0);
        assert_eq!(linear_decay(40, 25, 32), 0.0);
        assert!(linear_decay(26, 25, 32) > 0.0);
    }

    #[test]
    fn test_degenerate_range() {
        assert_eq!(linear_decay(30, 30, 30), 1.0);
        assert_eq!(linear_decay(31, 30, 30), 0.0);
    }

    #[test]
    fn test_range_fit_neutral_without_range() {
        assert_eq!(range_fit(Some(170), None), NEUTRAL_FIT);
        assert_eq!(range_fit(None, Some(PreferenceRange { min: 160, max: 180 })), 0.0);
        assert_eq!(range_fit(Some(170), Some(PreferenceRange { min: 160, max: 180 })), 1.0);
    }

    #[test]
    fn test_categorical_is_all_or_nothing() {
        let seeker = create_seeker();
        let hindu = create_candidate("c1", "1997-03-01", "hindu", "Mumbai", "Maharashtra");
        let jain = create_candidate("c2", "1997-03-01", "Jain", "Mumbai", "Maharashtra");
        let scorer = Scorer::default();

        let hit = scorer.score(&seeker, &hindu, as_of()).unwrap();
        let miss = scorer.score(&seeker, &jain, as_of()).unwrap();

        let hit = hit.contribution(Dimension::Religion).unwrap();
        let miss = miss.contribution(Dimension::Religion).unwrap();
        assert_eq!(hit.value(), hit.weight);
        assert_eq!(miss.value(), 0.0);
    }

    #[test]
    fn test_location_fit() {
        let pune = Location {
            city: Some("Pune".into()),
            state: Some("Maharashtra".into()),
            country: None,
        };
        let mumbai = Location {
            city: Some("Mumbai".into()),
            state: Some("maharashtra".into()),
            country: None,
        };
        let delhi = Location {
            city: Some("Delhi".into()),
            state: Some("Delhi".into()),
            country: None,
        };

        assert_eq!(location_fit(&pune, &pune), 1.0);
        assert_eq!(location_fit(&pune, &mumbai), 0.5);
        assert_eq!(location_fit(&pune, &delhi), 0.0);
        assert_eq!(location_fit(&Location::default(), &Location::default()), 0.0);
    }

    #[test]
    fn test_score_in_unit_interval_and_deterministic() {
        let seeker = create_seeker();
        let candidate = create_candidate("c1", "1996-07-01", "Hindu", "Pune", "Maharashtra");
        let scorer = Scorer::default();

        let first = scorer.score(&seeker, &candidate, as_of()).unwrap();
        let second = scorer.score(&seeker, &candidate, as_of()).unwrap();

        assert!(first.score >= 0.0 && first.score <= 1.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixed_weights() {
        let seeker = create_seeker();
        let candidate = create_candidate("c1", "1997-03-01", "Jain", "Pune", "Maharashtra");
        let weights = ScoringWeights::Fixed(DimensionWeights {
            location: 1.0,
            ..DimensionWeights::default()
        });

        let score = Scorer::new(weights, Eligibility::OneWay)
            .score(&seeker, &candidate, as_of())
            .unwrap();

        assert_eq!(score.score, 1.0);
    }

    #[test]
    fn test_scoring_ineligible_candidate_is_precondition_violation() {
        let seeker = create_seeker();
        let unverified = profile(json!({
            "id": "c1",
            "basicInfo": { "gender": "male", "dateOfBirth": "1997-03-01" },
            "isVerified": false
        }));

        let err = Scorer::default().score(&seeker, &unverified, as_of()).unwrap_err();

        assert!(matches!(err, MatchError::PreconditionViolated(_)));
    }
}
