use chrono::NaiveDate;
use futures::StreamExt;
use rayon::prelude::*;
use std::sync::Arc;

use crate::core::{
    clock::{Clock, SystemClock},
    filters::Eligibility,
    ranker::{Ranker, TopK, DEFAULT_MAX_LIMIT},
    scoring::Scorer,
};
use crate::error::MatchError;
use crate::models::{
    CandidateHint, MatchResultPage, PageRequest, Profile, ProfileDocument, ProfileId, RankedMatch,
    ScoringWeights,
};
use crate::services::ProfileStore;

/// Engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub eligibility: Eligibility,
    /// Largest page a caller may request
    pub max_limit: usize,
    /// Upper bound on candidates pulled from the store per query
    pub max_candidates: usize,
    /// Candidates validated and scored together on the rayon pool
    pub score_batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            eligibility: Eligibility::OneWay,
            max_limit: DEFAULT_MAX_LIMIT,
            max_candidates: 1000,
            score_batch_size: 256,
        }
    }
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Seeker lookup and validation
/// 2. Candidate stream from the profile store (hint applied server-side)
/// 3. Per batch, in parallel on a blocking thread: validation, eligibility
///    filter, scoring
/// 4. Bounded top-K selection and pagination
///
/// Holds no state between calls. Dropping the future returned by
/// `find_matches` abandons the store fetch and any unscored batch; a partial
/// page is never produced.
pub struct MatchEngine {
    store: Arc<dyn ProfileStore>,
    ranker: Ranker,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn ProfileStore>, weights: ScoringWeights, config: EngineConfig) -> Self {
        let scorer = Scorer::new(weights, config.eligibility);
        Self {
            store,
            ranker: Ranker::new(scorer, config.max_limit),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Fetch and validate the seeker, requiring partner preferences
    pub async fn load_seeker(&self, seeker_id: &ProfileId) -> Result<Profile, MatchError> {
        let document = self
            .store
            .get_profile(seeker_id)
            .await?
            .ok_or_else(|| MatchError::ProfileNotFound(seeker_id.clone()))?;

        let seeker = Profile::try_from(document)?;

        if seeker.partner_preference().is_none() {
            return Err(MatchError::PreferencesIncomplete(seeker_id.clone()));
        }

        Ok(seeker)
    }

    /// Find ranked matches for a stored seeker
    ///
    /// # Errors
    /// - `ProfileNotFound` - no stored profile for `seeker_id`
    /// - `InvalidProfile` - the seeker's own profile is malformed
    /// - `PreferencesIncomplete` - the seeker has no partner preference
    /// - `Store` - any profile store failure, unchanged
    ///
    /// Malformed candidates are logged and skipped.
    pub async fn find_matches(
        &self,
        seeker_id: &ProfileId,
        page: PageRequest,
    ) -> Result<MatchResultPage, MatchError> {
        let as_of = self.clock.today();
        let page = self.ranker.clamp(page);

        tracing::info!(
            "Finding matches for {} (offset: {}, limit: {})",
            seeker_id,
            page.offset,
            page.limit
        );

        let seeker = Arc::new(self.load_seeker(seeker_id).await?);

        let hint = CandidateHint::for_seeker(&seeker, self.config.max_candidates);
        let mut candidates = self
            .store
            .stream_candidates(hint)
            .await?
            .take(self.config.max_candidates);

        let batch_size = self.config.score_batch_size.max(1);
        let mut top = TopK::new(page.end());
        let mut batch: Vec<ProfileDocument> = Vec::with_capacity(batch_size);
        let mut fetched = 0usize;

        while let Some(document) = candidates.next().await {
            batch.push(document?);
            fetched += 1;

            if batch.len() >= batch_size {
                let scored = self
                    .score_batch(seeker.clone(), std::mem::take(&mut batch), as_of)
                    .await?;
                for ranked in scored {
                    top.push(ranked);
                }
            }
        }
        if !batch.is_empty() {
            for ranked in self.score_batch(seeker.clone(), batch, as_of).await? {
                top.push(ranked);
            }
        }

        let result = top.into_page(page, as_of);

        tracing::info!(
            "Returning {} matches for {} ({} eligible of {} candidates)",
            result.matches.len(),
            seeker_id,
            result.total_eligible,
            fetched
        );

        Ok(result)
    }

    /// Rank an already materialized candidate sequence for `seeker`
    pub fn rank<I>(&self, seeker: &Profile, candidates: I, page: PageRequest) -> MatchResultPage
    where
        I: IntoIterator<Item = Profile>,
    {
        self.ranker.rank(seeker, candidates, page, self.clock.today())
    }

    /// Validate, filter and score one batch on the rayon pool
    ///
    /// Runs under `spawn_blocking` so the async worker stays free while
    /// rayon works. Output keeps the input order.
    async fn score_batch(
        &self,
        seeker: Arc<Profile>,
        batch: Vec<ProfileDocument>,
        as_of: NaiveDate,
    ) -> Result<Vec<RankedMatch>, MatchError> {
        let ranker = self.ranker;

        let scored = tokio::task::spawn_blocking(move || {
            batch
                .into_par_iter()
                .filter_map(|document| match Profile::try_from(document) {
                    Ok(candidate) => ranker.evaluate(&seeker, candidate, as_of),
                    Err(e) => {
                        tracing::warn!("Skipping malformed candidate: {}", e);
                        None
                    }
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| {
            tracing::error!("Scoring batch did not complete: {}", e);
            e
        })?;

        Ok(scored)
    }
}
