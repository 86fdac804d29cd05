//! The online query pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::embedding::TextEmbedder;
use crate::error::{AtlasError, Result};
use crate::query::merger::ResultMerger;
use crate::query::request::QueryRequest;
use crate::query::result::RankedResult;
use crate::rerank::{RelevanceScorer, RerankerAdapter};
use crate::retrieval::{CandidateRetriever, VectorIndex};

/// Runs a query end to end: validate, embed, retrieve, optionally rerank,
/// then merge and select.
///
/// The pipeline holds no per-request state, so one instance can serve many
/// concurrent requests. A failure in any stage aborts the request.
#[derive(Clone)]
pub struct QueryPipeline {
    embedder: Arc<dyn TextEmbedder>,
    retriever: CandidateRetriever,
    reranker: Option<RerankerAdapter>,
}

impl QueryPipeline {
    /// Create a pipeline without reranking support.
    pub fn new<S: Into<String>>(
        embedder: Arc<dyn TextEmbedder>,
        index: Arc<dyn VectorIndex>,
        collection_prefix: S,
    ) -> Self {
        Self {
            embedder,
            retriever: CandidateRetriever::new(index, collection_prefix),
            reranker: None,
        }
    }

    /// Enable reranking through `scorer`.
    pub fn with_reranker(mut self, scorer: Arc<dyn RelevanceScorer>) -> Self {
        self.reranker = Some(RerankerAdapter::new(scorer));
        self
    }

    /// Whether requests with `use_rerank` can be served.
    pub fn supports_rerank(&self) -> bool {
        self.reranker.is_some()
    }

    /// Execute a query.
    pub async fn run(&self, request: &QueryRequest) -> Result<Vec<RankedResult>> {
        let start = Instant::now();

        request.validate()?;
        let collection = self.retriever.collection_name(&request.category)?;
        let reranker = match (request.use_rerank, &self.reranker) {
            (true, Some(reranker)) => Some(reranker),
            (true, None) => {
                return Err(AtlasError::validation(
                    "use_rerank was requested but no reranker is configured",
                ));
            }
            (false, _) => None,
        };

        let embedding = self.embedder.embed(&request.query).await?;
        debug!(
            "Embedded query with {} ({} dims)",
            self.embedder.name(),
            embedding.dimension()
        );

        let mut candidates = self
            .retriever
            .retrieve(&request.category, &embedding, request.top_k)
            .await?;

        if let Some(reranker) = reranker {
            reranker
                .rerank_candidates(&request.query, &mut candidates)
                .await?;
        }

        let results = ResultMerger::from_request(request).merge(candidates);
        info!(
            "Query on {} returned {} results in {:.1} ms (rerank={})",
            collection,
            results.len(),
            start.elapsed().as_secs_f64() * 1000.0,
            request.use_rerank
        );
        Ok(results)
    }

    /// Execute a query, giving up after `timeout`.
    ///
    /// On timeout the in-flight collaborator call is dropped, which cancels the
    /// underlying HTTP request.
    pub async fn run_with_timeout(
        &self,
        request: &QueryRequest,
        timeout: Duration,
    ) -> Result<Vec<RankedResult>> {
        tokio::time::timeout(timeout, self.run(request))
            .await
            .map_err(|_| {
                AtlasError::timeout(format!(
                    "query on {:?} exceeded {} ms",
                    request.category,
                    timeout.as_millis()
                ))
            })?
    }

    /// Return the stored abstract of a document.
    pub async fn lookup_abstract(&self, category: &str, id: &str) -> Result<String> {
        self.retriever.lookup_abstract(category, id).await
    }
}
