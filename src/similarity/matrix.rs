//! Row-major embedding matrix shared read-only by the neighbor workers.

use ahash::AHashSet;
use rayon::prelude::*;

use crate::document::Document;
use crate::error::{AtlasError, Result};
use crate::util::simd;
use crate::vector::Vector;

/// A contiguous `N x D` matrix of unit-norm embeddings with their ids.
///
/// Rows are re-normalized on construction, so callers that already hold
/// unit vectors pay only a cheap pass. Zero rows stay zero and end up with
/// similarity 0 against everything.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    ids: Vec<String>,
    dimension: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Build a matrix from parallel id and vector lists.
    pub fn from_vectors(ids: Vec<String>, vectors: &[Vector]) -> Result<Self> {
        if ids.len() != vectors.len() {
            return Err(AtlasError::invalid_argument(format!(
                "Got {} ids for {} vectors",
                ids.len(),
                vectors.len()
            )));
        }

        let dimension = vectors.first().map(|v| v.dimension()).unwrap_or(0);
        if !vectors.is_empty() && dimension == 0 {
            return Err(AtlasError::invalid_argument(
                "Embeddings must have at least one component",
            ));
        }

        let mut seen = AHashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(AtlasError::invalid_argument(format!(
                    "Duplicate document id in embedding matrix: {id}"
                )));
            }
        }

        let mut data = Vec::with_capacity(vectors.len() * dimension);
        for (id, vector) in ids.iter().zip(vectors) {
            vector.validate_dimension(dimension)?;
            if !vector.is_valid() {
                return Err(AtlasError::invalid_argument(format!(
                    "Embedding for {id} contains NaN or infinite values"
                )));
            }
            data.extend_from_slice(&vector.data);
        }

        let mut matrix = Self {
            ids,
            dimension,
            data,
        };
        matrix.normalize_rows();
        Ok(matrix)
    }

    /// Build a matrix from documents, in document order.
    pub fn from_documents(documents: &[Document]) -> Result<Self> {
        let ids = documents.iter().map(|d| d.id.clone()).collect();
        let vectors: Vec<Vector> = documents.iter().map(|d| d.embedding.clone()).collect();
        Self::from_vectors(ids, &vectors)
    }

    fn normalize_rows(&mut self) {
        if self.dimension == 0 {
            return;
        }
        self.data.par_chunks_mut(self.dimension).for_each(|row| {
            let norm = simd::squared_norm(row).sqrt();
            if norm > 0.0 {
                for value in row.iter_mut() {
                    *value /= norm;
                }
            }
        });
    }

    /// Number of rows (documents).
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Embedding dimension (0 for an empty matrix).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Document ids in row order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// A single row.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// The whole matrix as a flat row-major slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
