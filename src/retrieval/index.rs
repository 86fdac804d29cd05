//! Vector index collaborator contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::DocumentMetadata;
use crate::error::Result;
use crate::vector::Vector;

/// One hit returned by a vector index query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
    /// Document id.
    pub id: String,
    /// Distance to the query (lower is closer).
    pub distance: f32,
    /// Stored document text.
    pub content: String,
    /// Stored metadata.
    pub metadata: DocumentMetadata,
}

/// A store of named vector collections that supports similarity search.
///
/// Implementations must be safe for concurrent use by many requests, and
/// must distinguish an unknown collection
/// ([`AtlasError::CollectionNotFound`](crate::error::AtlasError::CollectionNotFound))
/// from a collection with no matching documents (an empty result).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `limit` hits ordered by ascending distance.
    async fn query(&self, collection: &str, embedding: &Vector, limit: usize)
    -> Result<Vec<IndexHit>>;

    /// Return the stored text of a document, or `None` if the id is unknown.
    async fn get_document_text(&self, collection: &str, id: &str) -> Result<Option<String>>;

    /// Whether the named collection exists.
    async fn has_collection(&self, collection: &str) -> Result<bool>;

    /// Get the name/identifier of this index, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
