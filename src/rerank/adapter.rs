//! Reranker adapter: index-aligned scores from a [`RelevanceScorer`].

use std::sync::Arc;

use log::{debug, warn};

use crate::error::Result;
use crate::rerank::scorer::RelevanceScorer;
use crate::retrieval::CandidateRecord;

/// Wraps a [`RelevanceScorer`] and produces exactly one score per candidate.
#[derive(Clone)]
pub struct RerankerAdapter {
    scorer: Arc<dyn RelevanceScorer>,
}

impl RerankerAdapter {
    /// Create an adapter over `scorer`.
    pub fn new(scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { scorer }
    }

    /// Score `documents` against `query`.
    ///
    /// The result is aligned with the input. With fewer than two documents
    /// there is nothing to rank, so the scorer is not called and every
    /// document gets 1.0. Documents the scorer leaves out get 0.0; scores are
    /// clamped into [0, 1].
    pub async fn rerank(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>> {
        if documents.len() < 2 {
            return Ok(vec![1.0; documents.len()]);
        }

        let hits = self.scorer.score(query, documents).await?;
        debug!(
            "{} scored {} of {} documents",
            self.scorer.name(),
            hits.len(),
            documents.len()
        );

        let mut scores = vec![0.0f32; documents.len()];
        for hit in hits {
            match scores.get_mut(hit.index) {
                Some(slot) if hit.score.is_finite() => *slot = hit.score.clamp(0.0, 1.0),
                Some(_) => warn!("Ignoring non-finite rerank score for index {}", hit.index),
                None => warn!("Ignoring rerank score for out-of-range index {}", hit.index),
            }
        }
        Ok(scores)
    }

    /// Annotate candidates in place with rerank scores of their content.
    pub async fn rerank_candidates(
        &self,
        query: &str,
        candidates: &mut [CandidateRecord],
    ) -> Result<()> {
        let documents: Vec<&str> = candidates.iter().map(|c| c.content.as_str()).collect();
        let scores = self.rerank(query, &documents).await?;
        for (candidate, score) in candidates.iter_mut().zip(scores) {
            candidate.rerank_score = Some(score);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::AtlasError;
    use crate::rerank::scorer::RelevanceHit;

    /// Scorer returning canned hits and counting its calls.
    struct CannedScorer {
        hits: Vec<RelevanceHit>,
        calls: AtomicUsize,
    }

    impl CannedScorer {
        fn new(hits: Vec<RelevanceHit>) -> Arc<Self> {
            Arc::new(Self {
                hits,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RelevanceScorer for CannedScorer {
        async fn score(&self, _query: &str, _documents: &[&str]) -> Result<Vec<RelevanceHit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.hits.clone())
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl RelevanceScorer for FailingScorer {
        async fn score(&self, _query: &str, _documents: &[&str]) -> Result<Vec<RelevanceHit>> {
            Err(AtlasError::collaborator("rerank service unavailable"))
        }
    }

    fn hit(index: usize, score: f32) -> RelevanceHit {
        RelevanceHit { index, score }
    }

    #[tokio::test]
    async fn test_single_candidate_skips_scorer() {
        let scorer = CannedScorer::new(vec![hit(0, 0.2)]);
        let adapter = RerankerAdapter::new(scorer.clone());

        let scores = adapter.rerank("q", &["only"]).await.unwrap();
        assert_eq!(scores, vec![1.0]);
        assert!(adapter.rerank("q", &[]).await.unwrap().is_empty());
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scores_realigned_and_missing_default_to_zero() {
        let scorer = CannedScorer::new(vec![hit(2, 0.7), hit(0, 0.9)]);
        let adapter = RerankerAdapter::new(scorer.clone());

        let scores = adapter.rerank("q", &["a", "b", "c"]).await.unwrap();
        assert_eq!(scores, vec![0.9, 0.0, 0.7]);
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_and_bad_scores_ignored() {
        let scorer = CannedScorer::new(vec![hit(7, 0.5), hit(0, 1.4), hit(1, f32::NAN)]);
        let adapter = RerankerAdapter::new(scorer);

        let scores = adapter.rerank("q", &["a", "b"]).await.unwrap();
        assert_eq!(scores, vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_rerank_candidates_annotates() {
        let scorer = CannedScorer::new(vec![hit(0, 0.3), hit(1, 0.8)]);
        let adapter = RerankerAdapter::new(scorer);

        let mut candidates = vec![
            CandidateRecord::new("a", 0.1).with_content("first"),
            CandidateRecord::new("b", 0.2).with_content("second"),
        ];
        adapter.rerank_candidates("q", &mut candidates).await.unwrap();
        assert_eq!(candidates[0].rerank_score, Some(0.3));
        assert_eq!(candidates[1].rerank_score, Some(0.8));
    }

    #[tokio::test]
    async fn test_scorer_errors_propagate() {
        let adapter = RerankerAdapter::new(Arc::new(FailingScorer));
        let err = adapter.rerank("q", &["a", "b"]).await.unwrap_err();
        assert!(matches!(err, AtlasError::Collaborator(_)));
    }
}
