//! Configuration for the neighbor computation.

use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};

/// Configuration for the offline neighbor computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Number of neighbors kept per document (K).
    pub neighbors: usize,
    /// Number of neighbors written to the percentage export.
    pub export_neighbors: usize,
    /// Rows scored per block. Peak score memory is `block_size * N` floats.
    pub block_size: usize,
    /// Worker threads; 0 means one per CPU.
    pub num_threads: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            neighbors: 100,
            export_neighbors: 10,
            block_size: 256,
            num_threads: 0,
        }
    }
}

impl SimilarityConfig {
    /// Check the configuration for values the computer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.neighbors == 0 {
            return Err(AtlasError::invalid_argument(
                "neighbors must be greater than 0",
            ));
        }
        if self.block_size == 0 {
            return Err(AtlasError::invalid_argument(
                "block_size must be greater than 0",
            ));
        }
        if self.export_neighbors > self.neighbors {
            return Err(AtlasError::invalid_argument(format!(
                "export_neighbors ({}) must not exceed neighbors ({})",
                self.export_neighbors, self.neighbors
            )));
        }
        if self.neighbors > u32::MAX as usize {
            return Err(AtlasError::invalid_argument("neighbors is too large"));
        }
        Ok(())
    }

    /// Effective number of worker threads.
    pub fn effective_threads(&self) -> usize {
        if self.num_threads == 0 {
            num_cpus::get()
        } else {
            self.num_threads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimilarityConfig::default();
        assert_eq!(config.neighbors, 100);
        assert_eq!(config.export_neighbors, 10);
        assert_eq!(config.block_size, 256);
        assert!(config.validate().is_ok());
        assert!(config.effective_threads() >= 1);
    }

    #[test]
    fn test_invalid_configs() {
        let zero_k = SimilarityConfig {
            neighbors: 0,
            export_neighbors: 0,
            ..Default::default()
        };
        assert!(zero_k.validate().is_err());

        let zero_block = SimilarityConfig {
            block_size: 0,
            ..Default::default()
        };
        assert!(zero_block.validate().is_err());

        let export_too_wide = SimilarityConfig {
            neighbors: 5,
            export_neighbors: 10,
            ..Default::default()
        };
        assert!(export_too_wide.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimilarityConfig = serde_json::from_str(r#"{"neighbors": 20}"#).unwrap();
        assert_eq!(config.neighbors, 20);
        assert_eq!(config.block_size, 256);
    }
}
