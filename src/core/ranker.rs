use chrono::NaiveDate;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use crate::core::scoring::Scorer;
use crate::models::{MatchResultPage, PageRequest, Profile, ProfileId, RankedMatch};

/// Page size cap, matching the legacy hard limit of 20
pub const DEFAULT_MAX_LIMIT: usize = 20;

/// Total order over ranked matches; `Greater` ranks first
///
/// Higher score wins, then premium (the trust signal among verified
/// candidates), then the lexicographically smaller id.
pub fn compare_matches(a: &RankedMatch, b: &RankedMatch) -> Ordering {
    a.score
        .score
        .total_cmp(&b.score.score)
        .then_with(|| a.profile.is_premium().cmp(&b.profile.is_premium()))
        .then_with(|| b.profile.id().cmp(a.profile.id()))
}

struct HeapEntry(RankedMatch);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_matches(&self.0, &other.0)
    }
}

/// Bounded top-K selection over a stream of scored candidates
///
/// Keeps at most `capacity` entries in a min-heap keyed on rank, so the pool
/// never has to be materialized and fully sorted. Also counts every distinct
/// eligible candidate for `has_more`.
pub struct TopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<HeapEntry>>,
    seen: HashSet<ProfileId>,
    eligible: usize,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(1024) + 1),
            seen: HashSet::new(),
            eligible: 0,
        }
    }

    /// Offer a match; returns false for a candidate already offered
    pub fn push(&mut self, candidate: RankedMatch) -> bool {
        if !self.seen.insert(candidate.profile.id().clone()) {
            tracing::debug!("Skipping duplicate candidate {}", candidate.profile.id());
            return false;
        }
        self.eligible += 1;

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(HeapEntry(candidate)));
        } else if let Some(Reverse(worst)) = self.heap.peek() {
            if compare_matches(&candidate, &worst.0) == Ordering::Greater {
                self.heap.pop();
                self.heap.push(Reverse(HeapEntry(candidate)));
            }
        }
        true
    }

    pub fn eligible(&self) -> usize {
        self.eligible
    }

    /// Retained matches, best first
    pub fn into_sorted(self) -> Vec<RankedMatch> {
        let mut matches: Vec<RankedMatch> = self
            .heap
            .into_iter()
            .map(|Reverse(HeapEntry(m))| m)
            .collect();
        matches.sort_by(|a, b| compare_matches(b, a));
        matches
    }

    /// Slice `[offset, offset + limit)` out of the retained matches
    pub fn into_page(self, page: PageRequest, as_of: NaiveDate) -> MatchResultPage {
        let total_eligible = self.eligible;
        let matches: Vec<RankedMatch> = self
            .into_sorted()
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect();
        let has_more = total_eligible > page.end();

        MatchResultPage {
            matches,
            offset: page.offset,
            limit: page.limit,
            next_offset: has_more.then(|| page.end()),
            has_more,
            total_eligible,
            as_of,
        }
    }
}

/// Filters, scores and orders candidates, then applies pagination
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    scorer: Scorer,
    max_limit: usize,
}

impl Ranker {
    pub fn new(scorer: Scorer, max_limit: usize) -> Self {
        Self {
            scorer,
            max_limit: max_limit.max(1),
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn max_limit(&self) -> usize {
        self.max_limit
    }

    /// Cap the page size at the configured maximum
    pub fn clamp(&self, page: PageRequest) -> PageRequest {
        PageRequest {
            offset: page.offset,
            limit: page.limit.min(self.max_limit),
        }
    }

    /// Filter then score a single candidate
    #[inline]
    pub fn evaluate(&self, seeker: &Profile, candidate: Profile, as_of: NaiveDate) -> Option<RankedMatch> {
        if !self.scorer.eligibility().check(seeker, &candidate, as_of) {
            return None;
        }
        let score = self.scorer.score_unchecked(seeker, &candidate, as_of);
        Some(RankedMatch {
            profile: candidate,
            score,
        })
    }

    /// Rank an in-memory candidate sequence
    pub fn rank<I>(&self, seeker: &Profile, candidates: I, page: PageRequest, as_of: NaiveDate) -> MatchResultPage
    where
        I: IntoIterator<Item = Profile>,
    {
        let page = self.clamp(page);
        let mut top = TopK::new(page.end());

        for candidate in candidates {
            if let Some(ranked) = self.evaluate(seeker, candidate, as_of) {
                top.push(ranked);
            }
        }

        top.into_page(page, as_of)
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(Scorer::default(), DEFAULT_MAX_LIMIT)
    }
}
