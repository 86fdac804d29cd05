//! Configuration for the atlas services.
//!
//! Settings are read from a JSON file; every field has a default so a
//! partial file is enough. API keys are never stored here, they come from
//! the environment or the command line.
//!
//! # Examples
//!
//! ```
//! use arxiv_atlas::config::AtlasConfig;
//!
//! let config: AtlasConfig =
//!     serde_json::from_str(r#"{"collection_prefix": "papers", "embedding": {"dimension": 512}}"#)
//!         .unwrap();
//! assert_eq!(config.collection_prefix, "papers");
//! assert_eq!(config.embedding.dimension, 512);
//! assert_eq!(config.embedding.model, "text-embedding-3-large");
//! assert!(config.validate().is_ok());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};
use crate::rerank::cohere::{DEFAULT_RERANK_MODEL, SUPPORTED_RERANK_MODELS};
use crate::similarity::SimilarityConfig;
use crate::vector::DistanceMetric;

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model name.
    pub model: String,
    /// Output dimension; must match the stored collections.
    pub dimension: usize,
    /// Inputs per request, at most 2048.
    pub max_inputs_per_call: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-large".to_string(),
            dimension: 256,
            max_inputs_per_call: 2048,
        }
    }
}

/// Reranker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Model name.
    pub model: String,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_RERANK_MODEL.to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Collections are named `<collection_prefix>_<category>`.
    pub collection_prefix: String,
    /// Directory holding `<collection>.jsonl` document files.
    pub data_dir: PathBuf,
    /// Distance metric of the in-memory index.
    pub distance_metric: DistanceMetric,
    /// Embedding provider settings.
    pub embedding: EmbeddingConfig,
    /// Reranker settings.
    pub rerank: RerankConfig,
    /// Offline neighbor computation settings.
    pub similarity: SimilarityConfig,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            collection_prefix: "arxiv".to_string(),
            data_dir: PathBuf::from("data"),
            distance_metric: DistanceMetric::default(),
            embedding: EmbeddingConfig::default(),
            rerank: RerankConfig::default(),
            similarity: SimilarityConfig::default(),
            request_timeout_secs: 30,
        }
    }
}

impl AtlasConfig {
    /// Load and validate a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: AtlasConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.collection_prefix.is_empty() {
            return Err(AtlasError::invalid_argument(
                "collection_prefix must not be empty",
            ));
        }
        if self.embedding.dimension == 0 {
            return Err(AtlasError::invalid_argument(
                "embedding.dimension must be greater than 0",
            ));
        }
        if self.embedding.max_inputs_per_call == 0 || self.embedding.max_inputs_per_call > 2048 {
            return Err(AtlasError::invalid_argument(format!(
                "embedding.max_inputs_per_call must be between 1 and 2048, got {}",
                self.embedding.max_inputs_per_call
            )));
        }
        if !SUPPORTED_RERANK_MODELS.contains(&self.rerank.model.as_str()) {
            return Err(AtlasError::invalid_argument(format!(
                "Unknown rerank model: {}",
                self.rerank.model
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AtlasError::invalid_argument(
                "request_timeout_secs must be greater than 0",
            ));
        }
        self.similarity.validate()
    }

    /// Collection name for a category.
    pub fn collection_name(&self, category: &str) -> String {
        format!("{}_{}", self.collection_prefix, category)
    }

    /// Path of the JSONL document file backing a category's collection.
    pub fn collection_path(&self, category: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.jsonl", self.collection_name(category)))
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AtlasConfig::default();
        assert_eq!(config.collection_prefix, "arxiv");
        assert_eq!(config.embedding.dimension, 256);
        assert_eq!(config.rerank.model, "rerank-multilingual-v3.0");
        assert_eq!(config.similarity.neighbors, 100);
        assert_eq!(config.distance_metric, DistanceMetric::SquaredEuclidean);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_collection_paths() {
        let config = AtlasConfig::default();
        assert_eq!(config.collection_name("hep"), "arxiv_hep");
        assert_eq!(
            config.collection_path("cond-mat"),
            PathBuf::from("data").join("arxiv_cond-mat.jsonl")
        );
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AtlasConfig::default();
        config.embedding.max_inputs_per_call = 4096;
        assert!(config.validate().is_err());

        let mut config = AtlasConfig::default();
        config.rerank.model = "rerank-english-v9".into();
        assert!(config.validate().is_err());

        let mut config = AtlasConfig::default();
        config.similarity.neighbors = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.json");
        fs::write(
            &path,
            r#"{"data_dir": "/srv/atlas", "similarity": {"neighbors": 50}, "distance_metric": "Cosine"}"#,
        )
        .unwrap();

        let config = AtlasConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/atlas"));
        assert_eq!(config.similarity.neighbors, 50);
        assert_eq!(config.similarity.export_neighbors, 10);
        assert_eq!(config.distance_metric, DistanceMetric::Cosine);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.json");
        fs::write(&path, r#"{"request_timeout_secs": 0}"#).unwrap();
        assert!(AtlasConfig::from_file(&path).is_err());
    }
}
