//! Distance metrics for vector similarity calculation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};
use crate::util::simd;

/// Distance metrics for vector similarity calculation.
///
/// All metrics report "lower is closer", which is what the result merger
/// expects from raw candidate distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistanceMetric {
    /// Squared Euclidean distance
    #[default]
    SquaredEuclidean,
    /// Cosine distance (1 - cosine similarity)
    Cosine,
    /// Inner product distance (1 - dot product)
    InnerProduct,
}

impl DistanceMetric {
    /// Calculate the distance between two vectors using this metric.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(AtlasError::invalid_argument(format!(
                "Vector dimensions must match for distance calculation: {} != {}",
                a.len(),
                b.len()
            )));
        }

        let result = match self {
            DistanceMetric::SquaredEuclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>(),
            DistanceMetric::Cosine => {
                let dot_product = simd::dot_product(a, b);
                let norm_a = simd::squared_norm(a).sqrt();
                let norm_b = simd::squared_norm(b).sqrt();

                if norm_a == 0.0 || norm_b == 0.0 {
                    1.0
                } else {
                    // Rounding can push an identical pair a hair below zero.
                    (1.0 - (dot_product / (norm_a * norm_b))).max(0.0)
                }
            }
            // Unbounded below for non-unit vectors; larger dot products stay closer.
            DistanceMetric::InnerProduct => 1.0 - simd::dot_product(a, b),
        };

        Ok(result)
    }

    /// Get the name of this distance metric.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::SquaredEuclidean => "l2",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::InnerProduct => "ip",
        }
    }

    /// Parse a distance metric from a string.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "l2" | "squared_euclidean" => Ok(DistanceMetric::SquaredEuclidean),
            "cosine" => Ok(DistanceMetric::Cosine),
            "ip" | "inner_product" => Ok(DistanceMetric::InnerProduct),
            _ => Err(AtlasError::invalid_argument(format!(
                "Unknown distance metric: {s}"
            ))),
        }
    }

    /// Calculate distance between a query vector and multiple vectors in parallel.
    pub fn batch_distance_parallel(&self, query: &[f32], vectors: &[&[f32]]) -> Result<Vec<f32>> {
        if vectors.is_empty() {
            return Ok(Vec::new());
        }

        if vectors.len() < 100 {
            return vectors
                .iter()
                .map(|v| self.distance(query, v))
                .collect::<Result<Vec<_>>>();
        }

        vectors
            .par_iter()
            .map(|v| self.distance(query, v))
            .collect::<Result<Vec<_>>>()
    }
}
