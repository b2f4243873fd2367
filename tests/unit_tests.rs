// Unit tests for the matching pipeline stages

use chrono::NaiveDate;
use matrimony_match::core::{
    filters::{is_eligible, is_mutually_eligible, satisfies_preference},
    ranker::{compare_matches, Ranker},
    scoring::{linear_decay, range_fit, Scorer, NEUTRAL_FIT},
    Eligibility,
};
use matrimony_match::models::{
    Dimension, DimensionWeights, PageRequest, PreferenceRange, Profile, ProfileDocument,
    ScoringWeights,
};
use matrimony_match::MatchError;
use serde_json::{json, Value};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
}

fn profile(value: Value) -> Profile {
    let doc: ProfileDocument = serde_json::from_value(value).unwrap();
    Profile::try_from(doc).unwrap()
}

fn create_seeker(preferences: Value) -> Profile {
    profile(json!({
        "id": "seeker",
        "basicInfo": { "gender": "female", "dateOfBirth": "1998-01-10", "religion": "Hindu" },
        "partnerPreferences": preferences,
        "location": { "city": "Pune", "state": "Maharashtra" },
        "isVerified": true
    }))
}

fn create_candidate(id: &str, dob: &str, extra: Value) -> Profile {
    let mut value = json!({
        "id": id,
        "basicInfo": { "gender": "male", "dateOfBirth": dob },
        "isVerified": true
    });
    if let (Some(target), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        for (key, v) in extra {
            target.insert(key.clone(), v.clone());
        }
    }
    profile(value)
}

#[test]
fn test_scenario_a_age_and_religion_fit() {
    let seeker = create_seeker(json!({ "ageRange": { "min": 25, "max": 32 }, "religion": "Hindu" }));
    let candidate = create_candidate(
        "c1",
        "1997-03-01",
        json!({ "basicInfo": { "gender": "male", "dateOfBirth": "1997-03-01", "religion": "Hindu" } }),
    );

    assert_eq!(seeker.age(as_of()), 28);
    assert_eq!(candidate.age(as_of()), 29);
    assert!(is_eligible(&seeker, &candidate, as_of()));

    let score = Scorer::default().score(&seeker, &candidate, as_of()).unwrap();

    let age = score.contribution(Dimension::Age).unwrap();
    assert!((age.fit - 0.86).abs() < 0.01, "age fit was {}", age.fit);
    assert_eq!(score.contribution(Dimension::Religion).unwrap().fit, 1.0);
}

#[test]
fn test_scenario_b_unverified_excluded() {
    let seeker = create_seeker(json!({ "ageRange": { "min": 25, "max": 32 } }));
    let candidate = create_candidate("c1", "1996-06-01", json!({ "isVerified": false }));

    assert!(!is_eligible(&seeker, &candidate, as_of()));
}

#[test]
fn test_same_gender_and_self_excluded() {
    let seeker = create_seeker(json!({ "ageRange": { "min": 25, "max": 32 } }));
    let woman = profile(json!({
        "id": "f1",
        "basicInfo": { "gender": "female", "dateOfBirth": "1996-06-01" },
        "isVerified": true
    }));

    assert!(!is_eligible(&seeker, &woman, as_of()));
    assert!(!is_eligible(&seeker, &seeker, as_of()));
}

#[test]
fn test_age_range_inclusive() {
    let seeker = create_seeker(json!({ "ageRange": { "min": 25, "max": 32 } }));
    // Turns 25 on the evaluation date
    let at_min = create_candidate("c1", "2001-06-15", json!({}));
    // Turns 33 on the evaluation date
    let past_max = create_candidate("c2", "1993-06-15", json!({}));

    assert!(is_eligible(&seeker, &at_min, as_of()));
    assert!(!is_eligible(&seeker, &past_max, as_of()));
}

#[test]
fn test_height_range_and_unknown_height() {
    let seeker = create_seeker(json!({ "heightRange": { "min": 165, "max": 185 } }));
    let tall = create_candidate(
        "c1",
        "1996-06-01",
        json!({ "basicInfo": { "gender": "male", "dateOfBirth": "1996-06-01", "height": { "feet": 5, "inches": 10 } } }),
    );
    let short = create_candidate(
        "c2",
        "1996-06-01",
        json!({ "basicInfo": { "gender": "male", "dateOfBirth": "1996-06-01", "height": { "feet": 5, "inches": 2 } } }),
    );
    let unknown = create_candidate("c3", "1996-06-01", json!({}));

    assert_eq!(tall.height_cm(), Some(178));
    assert!(is_eligible(&seeker, &tall, as_of()));
    assert!(!is_eligible(&seeker, &short, as_of()));
    assert!(!is_eligible(&seeker, &unknown, as_of()));
}

#[test]
fn test_marital_status_set() {
    let seeker = create_seeker(json!({ "maritalStatus": ["Unmarried", "Divorced"] }));
    let divorced = create_candidate(
        "c1",
        "1996-06-01",
        json!({ "basicInfo": { "gender": "male", "dateOfBirth": "1996-06-01", "maritalStatus": "divorced" } }),
    );
    let widowed = create_candidate(
        "c2",
        "1996-06-01",
        json!({ "basicInfo": { "gender": "male", "dateOfBirth": "1996-06-01", "maritalStatus": "Widowed" } }),
    );
    let unstated = create_candidate("c3", "1996-06-01", json!({}));

    assert!(is_eligible(&seeker, &divorced, as_of()));
    assert!(!is_eligible(&seeker, &widowed, as_of()));
    assert!(!is_eligible(&seeker, &unstated, as_of()));
}

#[test]
fn test_mutual_requires_candidate_acceptance() {
    let seeker = create_seeker(json!({ "ageRange": { "min": 25, "max": 35 } }));
    let picky = create_candidate(
        "c1",
        "1994-06-01",
        json!({ "partnerPreferences": { "ageRange": { "min": 30, "max": 40 } } }),
    );
    let open = create_candidate("c2", "1994-06-01", json!({}));

    assert!(is_eligible(&seeker, &picky, as_of()));
    assert!(!is_mutually_eligible(&seeker, &picky, as_of()));
    assert!(is_mutually_eligible(&seeker, &open, as_of()));
    assert!(!Eligibility::Mutual.check(&seeker, &picky, as_of()));
}

#[test]
fn test_satisfies_preference_without_constraints() {
    let candidate = create_candidate("c1", "1996-06-01", json!({}));
    let preference = matrimony_match::models::PartnerPreference::unconstrained();

    assert!(satisfies_preference(&candidate, &preference, as_of()));
}

#[test]
fn test_linear_decay_shape() {
    assert_eq!(linear_decay(30, 25, 35), 1.0);
    assert_eq!(linear_decay(25, 25, 35), 0.0);
    assert_eq!(linear_decay(35, 25, 35), 0.0);
    assert!((linear_decay(27, 25, 35) - 0.4).abs() < 1e-9);
    assert_eq!(range_fit(Some(30), None), NEUTRAL_FIT);
    assert_eq!(range_fit(None, Some(PreferenceRange { min: 25, max: 35 })), 0.0);
}

#[test]
fn test_even_split_over_active_dimensions() {
    let seeker = create_seeker(json!({ "ageRange": { "min": 25, "max": 32 }, "religion": "Hindu" }));
    let candidate = create_candidate("c1", "1997-03-01", json!({}));

    let score = Scorer::default().score(&seeker, &candidate, as_of()).unwrap();

    // age, religion and location (seeker has a city) are active
    let active: Vec<Dimension> = score
        .contributions
        .iter()
        .filter(|c| c.weight > 0.0)
        .map(|c| c.dimension)
        .collect();
    assert_eq!(active, vec![Dimension::Age, Dimension::Religion, Dimension::Location]);
    let total: f64 = score.contributions.iter().map(|c| c.weight).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_score_deterministic_and_bounded() {
    let seeker = create_seeker(json!({
        "ageRange": { "min": 25, "max": 35 },
        "heightRange": { "min": 160, "max": 190 },
        "religion": "Hindu",
        "education": "Any"
    }));
    let scorer = Scorer::new(ScoringWeights::EvenSplit, Eligibility::OneWay);

    for (i, year) in (1991..=2001).enumerate() {
        let candidate = create_candidate(
            &format!("c{}", i),
            &format!("{}-02-01", year),
            json!({
                "basicInfo": {
                    "gender": "male",
                    "dateOfBirth": format!("{}-02-01", year),
                    // 5'3" (160 cm) to 5'11" (180 cm), all inside the height range
                    "height": { "feet": 5, "inches": 3 + (i % 9) as u16 },
                    "religion": if i % 2 == 0 { "Hindu" } else { "Sikh" }
                },
                "location": { "city": if i % 3 == 0 { "Pune" } else { "Nagpur" }, "state": "Maharashtra" }
            }),
        );
        assert!(is_eligible(&seeker, &candidate, as_of()), "{} should be eligible", candidate.id());
        let first = scorer.score(&seeker, &candidate, as_of()).unwrap();
        let second = scorer.score(&seeker, &candidate, as_of()).unwrap();

        assert!((0.0..=1.0).contains(&first.score));
        assert_eq!(first, second);
    }
}

#[test]
fn test_scoring_ineligible_is_precondition_violation() {
    let seeker = create_seeker(json!({ "ageRange": { "min": 25, "max": 32 } }));
    let too_old = create_candidate("c1", "1980-01-01", json!({}));

    let result = Scorer::default().score(&seeker, &too_old, as_of());

    assert!(matches!(result, Err(MatchError::PreconditionViolated(_))));
}

#[test]
fn test_fixed_weights_change_ranking() {
    let seeker = create_seeker(json!({ "ageRange": { "min": 25, "max": 35 } }));
    let local = create_candidate(
        "local",
        "2000-01-01",
        json!({ "location": { "city": "Pune", "state": "Maharashtra" } }),
    );
    let ideal_age = create_candidate("ideal", "1996-01-01", json!({}));

    let age_only = Ranker::new(
        Scorer::new(
            ScoringWeights::Fixed(DimensionWeights { age: 1.0, ..DimensionWeights::default() }),
            Eligibility::OneWay,
        ),
        20,
    );
    let location_only = Ranker::new(
        Scorer::new(
            ScoringWeights::Fixed(DimensionWeights { location: 1.0, ..DimensionWeights::default() }),
            Eligibility::OneWay,
        ),
        20,
    );

    let by_age = age_only.rank(&seeker, vec![local.clone(), ideal_age.clone()], PageRequest::first(10), as_of());
    let by_location = location_only.rank(&seeker, vec![local, ideal_age], PageRequest::first(10), as_of());

    assert_eq!(by_age.matches[0].profile.id().as_str(), "ideal");
    assert_eq!(by_location.matches[0].profile.id().as_str(), "local");
}

#[test]
fn test_compare_matches_is_total_order() {
    let seeker = create_seeker(json!({ "ageRange": { "min": 25, "max": 35 } }));
    let ranker = Ranker::default();
    let a = ranker.evaluate(&seeker, create_candidate("a", "1996-01-01", json!({})), as_of()).unwrap();
    let b = ranker.evaluate(&seeker, create_candidate("b", "1996-01-01", json!({})), as_of()).unwrap();

    assert_eq!(compare_matches(&a, &b), std::cmp::Ordering::Greater);
    assert_eq!(compare_matches(&b, &a), std::cmp::Ordering::Less);
    assert_eq!(compare_matches(&a, &a), std::cmp::Ordering::Equal);
}
