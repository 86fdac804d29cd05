//! Error types for the atlas library.
//!
//! All errors are represented by the [`AtlasError`] enum. Validation and
//! lookup failures are reported to the caller as-is, while collaborator
//! failures (embedding, vector search, reranking) are passed through without
//! any retry decision being made here.
//!
//! # Examples
//!
//! ```
//! use arxiv_atlas::error::{AtlasError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(AtlasError::validation("top_n must be less than or equal to 10"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for atlas operations.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A query request violated one of its constraints.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The target collection does not exist in the vector store.
    #[error("Collection not found, please rebuild the database: {0}")]
    CollectionNotFound(String),

    /// A document id is unknown to its collection.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Failure reported by an external collaborator (embedding provider,
    /// vector search, reranker).
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Invalid argument passed to a library function.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Operation timed out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Operation cancelled
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with AtlasError.
pub type Result<T> = std::result::Result<T, AtlasError>;

impl AtlasError {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        AtlasError::Validation(msg.into())
    }

    /// Create a new collection-not-found error.
    pub fn collection_not_found<S: Into<String>>(name: S) -> Self {
        AtlasError::CollectionNotFound(name.into())
    }

    /// Create a new document-not-found error.
    pub fn document_not_found<S: Into<String>>(id: S) -> Self {
        AtlasError::DocumentNotFound(id.into())
    }

    /// Create a new collaborator error.
    pub fn collaborator<S: Into<String>>(msg: S) -> Self {
        AtlasError::Collaborator(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        AtlasError::InvalidArgument(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        AtlasError::Storage(msg.into())
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        AtlasError::Timeout(msg.into())
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        AtlasError::OperationCancelled(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        AtlasError::Serialization(msg.into())
    }

    /// Whether a caller-side retry could plausibly succeed.
    ///
    /// Only transient collaborator faults and timeouts qualify. A missing
    /// collection means the index was never built, so retrying is pointless.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AtlasError::Collaborator(_) | AtlasError::Timeout(_))
    }

    /// Whether this error means something requested does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AtlasError::CollectionNotFound(_) | AtlasError::DocumentNotFound(_)
        )
    }
}

impl From<bincode::Error> for AtlasError {
    fn from(err: bincode::Error) -> Self {
        AtlasError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = AtlasError::validation("top_k must be less than or equal to 400");
        assert_eq!(
            error.to_string(),
            "Validation error: top_k must be less than or equal to 400"
        );

        let error = AtlasError::collection_not_found("arxiv_cs");
        assert_eq!(
            error.to_string(),
            "Collection not found, please rebuild the database: arxiv_cs"
        );

        let error = AtlasError::document_not_found("2401.00001");
        assert_eq!(error.to_string(), "Document not found: 2401.00001");
    }

    #[test]
    fn test_retry_classification() {
        assert!(AtlasError::collaborator("connection reset").is_retryable());
        assert!(AtlasError::timeout("rerank").is_retryable());
        assert!(!AtlasError::collection_not_found("arxiv_hep").is_retryable());
        assert!(!AtlasError::validation("bad").is_retryable());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(AtlasError::collection_not_found("arxiv_hep").is_not_found());
        assert!(AtlasError::document_not_found("x").is_not_found());
        assert!(!AtlasError::storage("disk").is_not_found());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let atlas_error = AtlasError::from(io_error);

        match atlas_error {
            AtlasError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
