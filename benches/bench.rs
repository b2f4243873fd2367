// Criterion benchmarks for the matching pipeline

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use matrimony_match::core::{filters::is_eligible, EngineConfig, FixedClock, MatchEngine, Ranker, Scorer};
use matrimony_match::models::{PageRequest, Profile, ProfileDocument, ProfileId, ScoringWeights};
use matrimony_match::services::{InMemoryProfileStore, ProfileStore};
use serde_json::json;
use std::sync::Arc;

const RELIGIONS: [&str; 4] = ["Hindu", "Jain", "Sikh", "Christian"];
const CITIES: [&str; 5] = ["Pune", "Mumbai", "Nagpur", "Delhi", "Indore"];

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
}

fn seeker_document() -> ProfileDocument {
    serde_json::from_value(json!({
        "id": "seeker",
        "basicInfo": { "gender": "female", "dateOfBirth": "1998-01-10", "religion": "Hindu" },
        "partnerPreferences": {
            "ageRange": { "min": 25, "max": 34 },
            "heightRange": { "min": 160, "max": 185 },
            "religion": "Hindu",
            "education": "Any"
        },
        "location": { "city": "Pune", "state": "Maharashtra" },
        "isVerified": true
    }))
    .unwrap()
}

fn candidate_document(id: usize) -> ProfileDocument {
    serde_json::from_value(json!({
        "id": format!("c{:05}", id),
        "basicInfo": {
            "gender": if id % 9 == 0 { "female" } else { "male" },
            "dateOfBirth": format!("{}-0{}-11", 1988 + id % 14, 1 + id % 9),
            "height": { "feet": 5, "inches": id % 12 },
            "religion": RELIGIONS[id % RELIGIONS.len()]
        },
        "location": { "city": CITIES[id % CITIES.len()], "state": "Maharashtra" },
        "isVerified": id % 4 != 0,
        "isPremium": id % 11 == 0
    }))
    .unwrap()
}

fn candidates(count: usize) -> Vec<Profile> {
    (0..count)
        .filter_map(|i| Profile::try_from(candidate_document(i)).ok())
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let seeker = Profile::try_from(seeker_document()).unwrap();
    let pool = candidates(1000);

    c.bench_function("filter_1000_candidates", |b| {
        b.iter(|| {
            let eligible = pool
                .iter()
                .filter(|candidate| is_eligible(black_box(&seeker), candidate, as_of()))
                .count();
            black_box(eligible)
        });
    });
}

fn bench_scorer(c: &mut Criterion) {
    let seeker = Profile::try_from(seeker_document()).unwrap();
    let scorer = Scorer::default();
    let candidate = candidates(200)
        .into_iter()
        .find(|candidate| is_eligible(&seeker, candidate, as_of()))
        .unwrap();

    c.bench_function("score_single_candidate", |b| {
        b.iter(|| scorer.score(black_box(&seeker), black_box(&candidate), as_of()));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let seeker = Profile::try_from(seeker_document()).unwrap();
    let ranker = Ranker::default();

    let mut group = c.benchmark_group("ranking");

    for candidate_count in [10, 100, 1000, 10_000].iter() {
        let pool = candidates(*candidate_count);

        group.bench_with_input(
            BenchmarkId::new("rank", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    ranker.rank(
                        black_box(&seeker),
                        black_box(pool.clone()),
                        PageRequest::first(20),
                        as_of(),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("engine");

    for candidate_count in [100, 1000, 10_000].iter() {
        let mut documents = vec![seeker_document()];
        documents.extend((0..*candidate_count).map(candidate_document));

        let store: Arc<dyn ProfileStore> = Arc::new(InMemoryProfileStore::new(documents));
        let engine = MatchEngine::new(
            store,
            ScoringWeights::EvenSplit,
            EngineConfig {
                max_candidates: *candidate_count,
                ..EngineConfig::default()
            },
        )
        .with_clock(Arc::new(FixedClock(as_of())));
        let seeker = ProfileId::new("seeker");

        group.bench_with_input(
            BenchmarkId::new("find_matches", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    runtime
                        .block_on(engine.find_matches(black_box(&seeker), PageRequest::first(20)))
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_filter, bench_scorer, bench_ranking, bench_engine);

criterion_main!(benches);
