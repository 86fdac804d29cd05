//! Per-query candidate records.

use serde::{Deserialize, Serialize};

use crate::document::DocumentMetadata;
use crate::retrieval::index::IndexHit;

/// A document retrieved for a single query.
///
/// Created by the retriever with the raw distance filled in, optionally
/// annotated with a rerank score, then consumed by the result merger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Document id.
    pub id: String,
    /// Metadata snapshot taken from the index.
    pub metadata: DocumentMetadata,
    /// Abstract text, used as reranker input.
    pub content: String,
    /// Raw distance reported by the index (lower is closer).
    pub distance: f32,
    /// Relevance score in [0, 1] from the reranker, if one ran.
    pub rerank_score: Option<f32>,
}

impl CandidateRecord {
    /// Create a candidate without a rerank score.
    pub fn new<S: Into<String>>(id: S, distance: f32) -> Self {
        Self {
            id: id.into(),
            metadata: DocumentMetadata::default(),
            content: String::new(),
            distance,
            rerank_score: None,
        }
    }

    /// Attach a rerank score.
    pub fn with_rerank_score(mut self, score: f32) -> Self {
        self.rerank_score = Some(score);
        self
    }

    /// Set the abstract text.
    pub fn with_content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = content.into();
        self
    }
}

impl From<IndexHit> for CandidateRecord {
    fn from(hit: IndexHit) -> Self {
        Self {
            id: hit.id,
            metadata: hit.metadata,
            content: hit.content,
            distance: hit.distance,
            rerank_score: None,
        }
    }
}
