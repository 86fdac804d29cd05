//! Cohere rerank API implementation of [`RelevanceScorer`].
//!
//! Requires the `rerank-cohere` feature to be enabled.

#[cfg(feature = "rerank-cohere")]
use std::time::Duration;

#[cfg(feature = "rerank-cohere")]
use async_trait::async_trait;
#[cfg(feature = "rerank-cohere")]
use reqwest::Client;
#[cfg(feature = "rerank-cohere")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "rerank-cohere")]
use crate::error::{AtlasError, Result};
#[cfg(feature = "rerank-cohere")]
use crate::rerank::scorer::{RelevanceHit, RelevanceScorer};

/// Default API endpoint.
#[cfg(feature = "rerank-cohere")]
pub const COHERE_RERANK_URL: &str = "https://api.cohere.ai/v1/rerank";

/// Models accepted by [`CohereRelevanceScorer::new`].
pub const SUPPORTED_RERANK_MODELS: &[&str] = &[
    "rerank-english-v2.0",
    "rerank-english-v3.0",
    "rerank-multilingual-v2.0",
    "rerank-multilingual-v3.0",
];

/// Default model; the multilingual model ranks English queries at least as
/// well as the English-only v2 model.
pub const DEFAULT_RERANK_MODEL: &str = "rerank-multilingual-v3.0";

#[cfg(feature = "rerank-cohere")]
#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [&'a str],
    return_documents: bool,
}

#[cfg(feature = "rerank-cohere")]
#[derive(Debug, Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[cfg(feature = "rerank-cohere")]
#[derive(Debug, Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

/// Relevance scorer backed by Cohere's rerank endpoint.
#[cfg(feature = "rerank-cohere")]
pub struct CohereRelevanceScorer {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[cfg(feature = "rerank-cohere")]
impl CohereRelevanceScorer {
    /// Create a scorer for one of [`SUPPORTED_RERANK_MODELS`].
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AtlasError::invalid_argument(
                "api_key must be provided as an argument or in the environment variable COHERE_API_KEY",
            ));
        }
        if !SUPPORTED_RERANK_MODELS.contains(&model.as_str()) {
            return Err(AtlasError::invalid_argument(format!(
                "Unknown Cohere rerank model: {model}. Supported models: {}",
                SUPPORTED_RERANK_MODELS.join(", ")
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AtlasError::collaborator(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            endpoint: COHERE_RERANK_URL.to_string(),
        })
    }

    /// Send requests to a different endpoint (e.g. a proxy).
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[cfg(feature = "rerank-cohere")]
fn parse_response(text: &str) -> Result<Vec<RelevanceHit>> {
    let response: RerankResponse = serde_json::from_str(text)
        .map_err(|e| AtlasError::collaborator(format!("Failed to parse Cohere response: {e}")))?;
    Ok(response
        .results
        .into_iter()
        .map(|r| RelevanceHit {
            index: r.index,
            score: r.relevance_score,
        })
        .collect())
}

#[cfg(feature = "rerank-cohere")]
#[async_trait]
impl RelevanceScorer for CohereRelevanceScorer {
    async fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<RelevanceHit>> {
        let request = RerankRequest {
            model: &self.model,
            query,
            documents,
            return_documents: false,
        };

        let http_response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AtlasError::collaborator(format!("Cohere API request failed: {e}")))?;

        let status = http_response.status();
        let response_text = http_response.text().await.map_err(|e| {
            AtlasError::collaborator(format!("Failed to read response text: {e}"))
        })?;

        if !status.is_success() {
            return Err(AtlasError::collaborator(format!(
                "Cohere API error (status {status}): {response_text}"
            )));
        }

        parse_response(&response_text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(all(test, feature = "rerank-cohere"))]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_inputs() {
        assert!(CohereRelevanceScorer::new("".into(), DEFAULT_RERANK_MODEL.into()).is_err());
        assert!(CohereRelevanceScorer::new("key".into(), "rerank-v9".into()).is_err());

        let scorer = CohereRelevanceScorer::new("key".into(), DEFAULT_RERANK_MODEL.into()).unwrap();
        assert_eq!(scorer.name(), "rerank-multilingual-v3.0");
    }

    #[test]
    fn test_request_serialization() {
        let documents = ["a", "b"];
        let request = RerankRequest {
            model: DEFAULT_RERANK_MODEL,
            query: "q",
            documents: &documents,
            return_documents: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["return_documents"], false);
        assert_eq!(json["documents"][0], "a");
    }

    #[test]
    fn test_parse_response() {
        let text = r#"{"id":"x","results":[{"index":1,"relevance_score":0.92},{"index":0,"relevance_score":0.05}]}"#;
        let hits = parse_response(text).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].index, 1);
        assert!((hits[0].score - 0.92).abs() < 1e-6);
        assert!(parse_response("not json").is_err());
    }
}
