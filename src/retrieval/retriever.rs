//! Candidate retriever: the per-query adapter over a [`VectorIndex`].

use std::sync::{Arc, LazyLock};

use ahash::AHashSet;
use log::debug;
use regex::Regex;

use crate::error::{AtlasError, Result};
use crate::retrieval::candidate::CandidateRecord;
use crate::retrieval::index::VectorIndex;
use crate::vector::Vector;

static CATEGORY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("category pattern is valid")
});

/// Resolves categories to collections and turns index hits into
/// [`CandidateRecord`]s.
#[derive(Clone)]
pub struct CandidateRetriever {
    index: Arc<dyn VectorIndex>,
    collection_prefix: String,
}

impl CandidateRetriever {
    /// Create a retriever whose collections are named `<prefix>_<category>`.
    pub fn new<S: Into<String>>(index: Arc<dyn VectorIndex>, collection_prefix: S) -> Self {
        Self {
            index,
            collection_prefix: collection_prefix.into(),
        }
    }

    /// The collection name for a category.
    pub fn collection_name(&self, category: &str) -> Result<String> {
        if !CATEGORY_PATTERN.is_match(category) {
            return Err(AtlasError::validation(format!(
                "category {category:?} is not a valid collection suffix"
            )));
        }
        Ok(format!("{}_{}", self.collection_prefix, category))
    }

    /// Retrieve up to `top_k` candidates for a query embedding.
    ///
    /// Candidates keep the index's distance order. If the index returns the
    /// same id twice, the first occurrence is kept.
    pub async fn retrieve(
        &self,
        category: &str,
        embedding: &Vector,
        top_k: usize,
    ) -> Result<Vec<CandidateRecord>> {
        let collection = self.collection_name(category)?;
        let hits = self.index.query(&collection, embedding, top_k).await?;
        let returned = hits.len();

        let mut seen = AHashSet::with_capacity(hits.len());
        let candidates: Vec<CandidateRecord> = hits
            .into_iter()
            .filter(|hit| seen.insert(hit.id.clone()))
            .take(top_k)
            .map(CandidateRecord::from)
            .collect();

        debug!(
            "{} returned {} hits from {}, {} unique candidates kept",
            self.index.name(),
            returned,
            collection,
            candidates.len()
        );
        Ok(candidates)
    }

    /// Look up the stored abstract of a document.
    pub async fn lookup_abstract(&self, category: &str, id: &str) -> Result<String> {
        let collection = self.collection_name(category)?;
        self.index
            .get_document_text(&collection, id)
            .await?
            .ok_or_else(|| AtlasError::document_not_found(id))
    }
}
