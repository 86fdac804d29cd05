//! Embedder backed by a table of pre-computed vectors.
//!
//! Useful when query embeddings were produced offline, and as a
//! deterministic stand-in for a remote provider in tests.

use ahash::AHashMap;
use async_trait::async_trait;

use crate::embedding::text_embedder::TextEmbedder;
use crate::error::{AtlasError, Result};
use crate::vector::Vector;

/// Returns stored vectors for known texts and fails for anything else.
///
/// # Example
///
/// ```
/// use arxiv_atlas::embedding::{PrecomputedEmbedder, TextEmbedder};
/// use arxiv_atlas::vector::Vector;
///
/// let mut embedder = PrecomputedEmbedder::new(2);
/// embedder.insert("quantum error correction", Vector::new(vec![0.6, 0.8])).unwrap();
///
/// assert_eq!(embedder.dimension(), 2);
/// assert!(embedder.contains("quantum error correction"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrecomputedEmbedder {
    dimension: usize,
    vectors: AHashMap<String, Vector>,
}

impl PrecomputedEmbedder {
    /// Create an empty table for vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: AHashMap::new(),
        }
    }

    /// Register the vector for a text.
    pub fn insert<S: Into<String>>(&mut self, text: S, vector: Vector) -> Result<()> {
        vector.validate_dimension(self.dimension)?;
        self.vectors.insert(text.into(), vector);
        Ok(())
    }

    /// Whether a vector is registered for `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.vectors.contains_key(text)
    }
}

#[async_trait]
impl TextEmbedder for PrecomputedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        self.vectors.get(text).cloned().ok_or_else(|| {
            AtlasError::invalid_argument(format!("No pre-computed embedding for {text:?}"))
        })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "precomputed"
    }
}
