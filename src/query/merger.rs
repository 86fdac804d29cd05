//! Result merging and selection.
//!
//! The [`ResultMerger`] turns one query's candidate records into the final
//! result list: deduplicate, pick the scoring regime, filter, sort once and
//! truncate.

use ahash::AHashSet;
use log::debug;

use crate::query::request::QueryRequest;
use crate::query::result::RankedResult;
use crate::query::score::FinalScore;
use crate::retrieval::CandidateRecord;

/// Selects the final ranked results from a candidate set.
///
/// # Examples
///
/// ```
/// use arxiv_atlas::query::ResultMerger;
/// use arxiv_atlas::retrieval::CandidateRecord;
///
/// let merger = ResultMerger::new(2, 0.1);
/// let results = merger.merge(vec![
///     CandidateRecord::new("far", 2.0),
///     CandidateRecord::new("near", 0.1),
///     CandidateRecord::new("mid", 0.5),
/// ]);
///
/// let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
/// assert_eq!(ids, vec!["near", "mid"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultMerger {
    /// Maximum number of results.
    top_n: usize,
    /// Reranked candidates at or below this score are dropped.
    rerank_score_threshold: f32,
}

impl ResultMerger {
    /// Create a merger returning at most `top_n` results.
    pub fn new(top_n: usize, rerank_score_threshold: f32) -> Self {
        Self {
            top_n,
            rerank_score_threshold,
        }
    }

    /// Create a merger with the limits of a request.
    pub fn from_request(request: &QueryRequest) -> Self {
        Self::new(request.top_n, request.rerank_score_threshold)
    }

    /// Merge candidates into at most `top_n` results, best first.
    ///
    /// If any candidate carries a rerank score the rerank regime applies:
    /// candidates scoring at or below the threshold are dropped (an absent
    /// score counts as 0.0) and the rest are ranked by descending rerank
    /// score. Otherwise candidates are ranked by ascending distance and scored
    /// `1 / (1 + distance)`. Ties keep retrieval order.
    pub fn merge(&self, candidates: Vec<CandidateRecord>) -> Vec<RankedResult> {
        let total = candidates.len();
        let candidates = dedup_by_id(candidates);
        let reranked = candidates.iter().any(|c| c.rerank_score.is_some());

        let mut scored: Vec<(CandidateRecord, FinalScore)> = candidates
            .into_iter()
            .filter_map(|candidate| self.score(candidate, reranked))
            .collect();
        let surviving = scored.len();

        scored.sort_by(|(_, a), (_, b)| a.cmp_best_first(b));
        scored.truncate(self.top_n);

        debug!(
            "Merged {} candidates ({} after dedup/threshold) into {} results, rerank={}",
            total,
            surviving,
            scored.len(),
            reranked
        );

        scored
            .into_iter()
            .map(|(candidate, score)| RankedResult::from_candidate(candidate, score))
            .collect()
    }

    fn score(
        &self,
        candidate: CandidateRecord,
        reranked: bool,
    ) -> Option<(CandidateRecord, FinalScore)> {
        if reranked {
            let score = candidate.rerank_score.unwrap_or(0.0);
            if score.is_nan() || score <= self.rerank_score_threshold {
                return None;
            }
            Some((candidate, FinalScore::Rerank(score)))
        } else {
            let distance = candidate.distance;
            Some((candidate, FinalScore::Distance(distance)))
        }
    }
}

/// Keep the first occurrence of every id, preserving order.
fn dedup_by_id(candidates: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
    let mut seen = AHashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .collect()
}
