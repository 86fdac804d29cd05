//! Final ranked results returned to callers.

use serde::{Deserialize, Serialize};

use crate::document::DocumentMetadata;
use crate::query::score::FinalScore;
use crate::retrieval::CandidateRecord;

/// One entry of the final result list.
///
/// Serializes as a flat object:
/// `id, title, content, authors, categories, main_category, distance, score,
/// day, month, year, doi, journal_ref`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// Document id.
    pub id: String,
    /// Display metadata.
    #[serde(flatten)]
    pub metadata: DocumentMetadata,
    /// Abstract text.
    pub content: String,
    /// Raw distance from the vector index.
    pub distance: f32,
    /// Final relevance score in [0, 1], higher is better.
    pub score: f32,
}

impl RankedResult {
    /// Build a result from a candidate and the score it was ranked by.
    pub fn from_candidate(candidate: CandidateRecord, score: FinalScore) -> Self {
        Self {
            id: candidate.id,
            metadata: candidate.metadata,
            content: candidate.content,
            distance: candidate.distance,
            score: score.value(),
        }
    }
}
