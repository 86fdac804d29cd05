//! Query requests and their validation.

use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};

/// Upper bound on candidates retrieved from the vector index.
pub const MAX_TOP_K: usize = 400;
/// Upper bound on results returned to the caller.
pub const MAX_TOP_N: usize = 10;

fn default_top_k() -> usize {
    200
}

fn default_top_n() -> usize {
    5
}

fn default_rerank_score_threshold() -> f32 {
    0.1
}

/// A free-text query against one category collection.
///
/// # Examples
///
/// ```
/// use arxiv_atlas::query::QueryRequest;
///
/// let request: QueryRequest =
///     serde_json::from_str(r#"{"query": "dark matter halos", "category": "astro-ph"}"#).unwrap();
/// assert_eq!(request.top_k, 200);
/// assert_eq!(request.top_n, 5);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Query text.
    pub query: String,
    /// Target category; the collection name is derived from it.
    pub category: String,
    /// Candidates to retrieve from the vector index.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Results to return.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Reranked candidates scoring at or below this are dropped.
    #[serde(default = "default_rerank_score_threshold")]
    pub rerank_score_threshold: f32,
    /// Whether to rerank candidates before selection.
    #[serde(default)]
    pub use_rerank: bool,
}

impl QueryRequest {
    /// Create a request with default limits.
    pub fn new<Q: Into<String>, C: Into<String>>(query: Q, category: C) -> Self {
        Self {
            query: query.into(),
            category: category.into(),
            top_k: default_top_k(),
            top_n: default_top_n(),
            rerank_score_threshold: default_rerank_score_threshold(),
            use_rerank: false,
        }
    }

    /// Set the candidate count.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the result count.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Enable reranking with the given threshold.
    pub fn with_rerank(mut self, threshold: f32) -> Self {
        self.use_rerank = true;
        self.rerank_score_threshold = threshold;
        self
    }

    /// Check the request invariants.
    ///
    /// Runs before any external call is made; the error names the violated
    /// constraint.
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(AtlasError::validation("top_n must be greater than 0"));
        }
        if self.top_k < self.top_n {
            return Err(AtlasError::validation(
                "top_k must be greater than or equal to top_n",
            ));
        }
        if !(0.0..=1.0).contains(&self.rerank_score_threshold) {
            return Err(AtlasError::validation(
                "rerank_score_threshold must be between 0 and 1",
            ));
        }
        if self.top_k > MAX_TOP_K {
            return Err(AtlasError::validation(format!(
                "top_k must be less than or equal to {MAX_TOP_K}"
            )));
        }
        if self.top_n > MAX_TOP_N {
            return Err(AtlasError::validation(format!(
                "top_n must be less than or equal to {MAX_TOP_N}"
            )));
        }
        if self.query.trim().is_empty() {
            return Err(AtlasError::validation("query must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> QueryRequest {
        QueryRequest::new("graph neural networks", "cs")
    }

    #[test]
    fn test_defaults_are_accepted() {
        let req = request();
        assert_eq!(req.top_k, 200);
        assert_eq!(req.top_n, 5);
        assert_eq!(req.rerank_score_threshold, 0.1);
        assert!(!req.use_rerank);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_top_n_above_top_k_rejected() {
        let err = request().with_top_k(5).with_top_n(10).validate().unwrap_err();
        assert!(err.to_string().contains("top_k must be greater than or equal to top_n"));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let mut req = request();
        req.rerank_score_threshold = 1.5;
        assert!(matches!(req.validate(), Err(AtlasError::Validation(_))));

        req.rerank_score_threshold = -0.1;
        assert!(req.validate().is_err());

        req.rerank_score_threshold = f32::NAN;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_limits_rejected() {
        assert!(request().with_top_k(401).validate().is_err());
        assert!(request().with_top_n(11).validate().is_err());
        assert!(request().with_top_n(0).validate().is_err());
        assert!(request().with_top_k(400).with_top_n(10).validate().is_ok());
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(QueryRequest::new("   ", "cs").validate().is_err());
    }

    #[test]
    fn test_deserialize_with_overrides() {
        let req: QueryRequest = serde_json::from_str(
            r#"{"query":"q","category":"hep","top_k":50,"top_n":3,"use_rerank":true}"#,
        )
        .unwrap();
        assert_eq!(req.top_k, 50);
        assert_eq!(req.top_n, 3);
        assert!(req.use_rerank);
        assert_eq!(req.rerank_score_threshold, 0.1);
    }
}
