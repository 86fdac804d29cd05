//! Relevance scorer collaborator contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A relevance score for one input document, identified by its position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceHit {
    /// Position of the document in the request.
    pub index: usize,
    /// Relevance in [0, 1], higher is more relevant.
    pub score: f32,
}

/// Scores (query, document) pairs more precisely than vector distance.
///
/// Providers may return hits in any order and may omit documents; the
/// [`RerankerAdapter`](crate::rerank::RerankerAdapter) realigns them.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Score every document against the query.
    async fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<RelevanceHit>>;

    /// Get the name/identifier of this scorer, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
