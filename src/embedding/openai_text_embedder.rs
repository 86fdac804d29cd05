//! OpenAI API-based text embedder implementation.
//!
//! Requires the `embeddings-openai` feature to be enabled.

#[cfg(feature = "embeddings-openai")]
use std::time::Duration;

#[cfg(feature = "embeddings-openai")]
use async_trait::async_trait;
#[cfg(feature = "embeddings-openai")]
use log::debug;
#[cfg(feature = "embeddings-openai")]
use reqwest::Client;
#[cfg(feature = "embeddings-openai")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "embeddings-openai")]
use crate::embedding::text_embedder::TextEmbedder;
#[cfg(feature = "embeddings-openai")]
use crate::error::{AtlasError, Result};
#[cfg(feature = "embeddings-openai")]
use crate::vector::Vector;

/// Default API endpoint.
#[cfg(feature = "embeddings-openai")]
pub const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// OpenAI accepts at most this many inputs per request.
#[cfg(feature = "embeddings-openai")]
pub const MAX_INPUTS_PER_CALL: usize = 2048;

/// Request structure for OpenAI Embeddings API.
#[cfg(feature = "embeddings-openai")]
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    /// Model identifier to use for embeddings.
    model: &'a str,
    /// Input texts to embed (batch).
    input: &'a [&'a str],
    /// Requested output dimension.
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

/// Response structure from OpenAI Embeddings API.
#[cfg(feature = "embeddings-openai")]
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    /// List of embedding data objects.
    data: Vec<EmbeddingData>,
}

/// Individual embedding data from API response.
#[cfg(feature = "embeddings-openai")]
#[derive(Debug, Deserialize)]
struct EmbeddingData {
    /// Position of the input this embedding belongs to.
    index: usize,
    /// The embedding vector.
    embedding: Vec<f32>,
}

/// OpenAI API-based text embedder.
///
/// Inputs are sent in chunks of at most `max_inputs_per_call`. The requested
/// dimension is passed to the API; any longer vector that comes back is
/// truncated and re-normalized locally.
///
/// # Examples
///
/// ```no_run
/// use arxiv_atlas::embedding::{OpenAITextEmbedder, TextEmbedder};
///
/// # async fn example() -> arxiv_atlas::error::Result<()> {
/// let embedder = OpenAITextEmbedder::new(
///     std::env::var("OPENAI_API_KEY").unwrap_or_default(),
///     "text-embedding-3-large".to_string(),
///     256,
/// )?;
///
/// let vector = embedder.embed("Sparse autoencoders for interpretability").await?;
/// assert_eq!(vector.dimension(), 256);
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "embeddings-openai")]
pub struct OpenAITextEmbedder {
    /// HTTP client for making API requests.
    client: Client,
    /// OpenAI API key for authentication.
    api_key: String,
    /// OpenAI model name (e.g., "text-embedding-3-large").
    model: String,
    /// Dimension of the output embeddings.
    dimension: usize,
    /// Maximum number of inputs sent in one request.
    max_inputs_per_call: usize,
    /// Endpoint URL.
    endpoint: String,
}

#[cfg(feature = "embeddings-openai")]
impl OpenAITextEmbedder {
    /// Create a new OpenAI embedder producing `dimension`-component vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty, the model is unknown or the
    /// dimension exceeds the model's native size.
    pub fn new(api_key: String, model: String, dimension: usize) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AtlasError::invalid_argument(
                "api_key must be provided as an argument or in the environment variable OPENAI_API_KEY",
            ));
        }

        let native = Self::native_dimension(&model).ok_or_else(|| {
            AtlasError::invalid_argument(format!(
                "Unknown OpenAI embedding model: {model}. Supported models: \
                 text-embedding-3-small, text-embedding-3-large"
            ))
        })?;

        if dimension == 0 || dimension > native {
            return Err(AtlasError::invalid_argument(format!(
                "dimension must be between 1 and {native} for {model}, got {dimension}"
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
            dimension,
            max_inputs_per_call: MAX_INPUTS_PER_CALL,
            endpoint: OPENAI_EMBEDDINGS_URL.to_string(),
        })
    }

    /// Limit the number of inputs per request.
    pub fn with_max_inputs_per_call(mut self, max_inputs_per_call: usize) -> Result<Self> {
        if max_inputs_per_call == 0 || max_inputs_per_call > MAX_INPUTS_PER_CALL {
            return Err(AtlasError::invalid_argument(format!(
                "max_inputs_per_call must be between 1 and {MAX_INPUTS_PER_CALL}, got {max_inputs_per_call}"
            )));
        }
        self.max_inputs_per_call = max_inputs_per_call;
        Ok(self)
    }

    /// Send requests to a different endpoint (e.g. a proxy).
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Native output dimension of a supported model.
    fn native_dimension(model: &str) -> Option<usize> {
        match model {
            "text-embedding-3-small" => Some(1536),
            "text-embedding-3-large" => Some(3072),
            _ => None,
        }
    }

    async fn embed_chunk(&self, chunk: &[&str]) -> Result<Vec<Vector>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: chunk,
            dimensions: Some(self.dimension),
        };

        let http_response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AtlasError::collaborator(format!("OpenAI API request failed: {e}")))?;

        let status = http_response.status();
        let response_text = http_response.text().await.map_err(|e| {
            AtlasError::collaborator(format!("Failed to read response text: {e}"))
        })?;

        if !status.is_success() {
            return Err(AtlasError::collaborator(format!(
                "OpenAI API error (status {status}): {response_text}"
            )));
        }

        parse_response(&response_text, chunk.len(), self.dimension)
    }
}

/// Decode an embeddings response into vectors ordered by input position.
#[cfg(feature = "embeddings-openai")]
fn parse_response(text: &str, expected: usize, dimension: usize) -> Result<Vec<Vector>> {
    let response: EmbeddingResponse = serde_json::from_str(text).map_err(|e| {
        AtlasError::collaborator(format!("Failed to parse OpenAI response: {e}"))
    })?;

    if response.data.len() != expected {
        return Err(AtlasError::collaborator(format!(
            "OpenAI returned {} embeddings for {} inputs",
            response.data.len(),
            expected
        )));
    }

    let mut slots: Vec<Option<Vector>> = vec![None; expected];
    for item in response.data {
        let slot = slots.get_mut(item.index).ok_or_else(|| {
            AtlasError::collaborator(format!("OpenAI returned out-of-range index {}", item.index))
        })?;
        let mut vector = Vector::new(item.embedding);
        vector.truncate(dimension);
        *slot = Some(vector);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.ok_or_else(|| AtlasError::collaborator(format!("OpenAI omitted input {i}")))
        })
        .collect()
}

#[cfg(feature = "embeddings-openai")]
#[async_trait]
impl TextEmbedder for OpenAITextEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AtlasError::collaborator("No embedding in response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for (i, chunk) in texts.chunks(self.max_inputs_per_call).enumerate() {
            debug!(
                "Embedding chunk {} ({} inputs) with {}",
                i,
                chunk.len(),
                self.model
            );
            embeddings.extend(self.embed_chunk(chunk).await?);
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(all(test, feature = "embeddings-openai"))]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_inputs() {
        assert!(OpenAITextEmbedder::new("".into(), "text-embedding-3-large".into(), 256).is_err());
        assert!(OpenAITextEmbedder::new("sk".into(), "ada".into(), 256).is_err());
        assert!(OpenAITextEmbedder::new("sk".into(), "text-embedding-3-small".into(), 4096).is_err());

        let embedder =
            OpenAITextEmbedder::new("sk".into(), "text-embedding-3-large".into(), 256).unwrap();
        assert_eq!(embedder.dimension(), 256);
        assert_eq!(embedder.name(), "text-embedding-3-large");
        assert!(embedder.with_max_inputs_per_call(4096).is_err());
    }

    #[test]
    fn test_request_serialization() {
        let input = ["a", "b"];
        let request = EmbeddingRequest {
            model: "text-embedding-3-large",
            input: &input,
            dimensions: Some(256),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["dimensions"], 256);
        assert_eq!(json["input"][1], "b");
    }

    #[test]
    fn test_parse_response_orders_by_index() {
        let text = r#"{"data":[{"index":1,"embedding":[0.0,2.0]},{"index":0,"embedding":[3.0,4.0]}]}"#;
        let vectors = parse_response(text, 2, 2).unwrap();
        assert_eq!(vectors[0].data, vec![3.0, 4.0]);
        assert_eq!(vectors[1].data, vec![0.0, 2.0]);
    }

    #[test]
    fn test_parse_response_truncates() {
        let text = r#"{"data":[{"index":0,"embedding":[1.0,1.0,5.0]}]}"#;
        let vectors = parse_response(text, 1, 2).unwrap();
        assert_eq!(vectors[0].dimension(), 2);
        assert!(vectors[0].is_unit(1e-6));
    }

    #[test]
    fn test_parse_response_errors() {
        assert!(parse_response("{}", 1, 2).is_err());
        let short = r#"{"data":[]}"#;
        assert!(parse_response(short, 1, 2).is_err());
        let bad_index = r#"{"data":[{"index":5,"embedding":[1.0]}]}"#;
        let err = parse_response(bad_index, 1, 1).unwrap_err();
        assert!(err.is_retryable());
    }
}
