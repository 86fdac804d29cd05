//! Brute-force in-memory vector index.

use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::RwLock;

use crate::document::Document;
use crate::document::jsonl::read_jsonl;
use crate::error::{AtlasError, Result};
use crate::retrieval::index::{IndexHit, VectorIndex};
use crate::vector::{DistanceMetric, Vector};

/// A single named collection held in memory.
#[derive(Debug)]
struct MemoryCollection {
    dimension: usize,
    documents: Vec<Document>,
    positions: AHashMap<String, usize>,
}

impl MemoryCollection {
    fn build(documents: Vec<Document>) -> Result<Self> {
        let dimension = documents
            .first()
            .map(|d| d.embedding.dimension())
            .unwrap_or(0);

        let mut kept = Vec::with_capacity(documents.len());
        let mut positions = AHashMap::with_capacity(documents.len());
        let mut duplicates = 0usize;

        for mut doc in documents {
            doc.embedding.validate_dimension(dimension)?;
            if positions.contains_key(&doc.id) {
                duplicates += 1;
                continue;
            }
            // Stored rows are unit length so every metric ranks by cosine.
            doc.embedding.normalize();
            positions.insert(doc.id.clone(), kept.len());
            kept.push(doc);
        }

        if duplicates > 0 {
            warn!("Dropped {duplicates} documents with duplicate ids");
        }

        Ok(Self {
            dimension,
            documents: kept,
            positions,
        })
    }
}

/// A vector index that keeps every collection in memory and scans it fully
/// on each query.
///
/// Collection lookups take a short read lock and clone an `Arc`, so no lock
/// is held while distances are computed.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    metric: DistanceMetric,
    collections: RwLock<AHashMap<String, Arc<MemoryCollection>>>,
}

impl InMemoryVectorIndex {
    /// Create an empty index using the default distance metric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index using `metric` for all collections.
    pub fn with_metric(metric: DistanceMetric) -> Self {
        Self {
            metric,
            collections: RwLock::new(AHashMap::new()),
        }
    }

    /// The distance metric used for queries.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Create or replace a collection.
    ///
    /// Documents with an id already seen in the same batch are dropped (first
    /// occurrence wins). All embeddings must share one dimension and are
    /// normalized to unit length on insert.
    pub fn create_collection<S: Into<String>>(
        &self,
        name: S,
        documents: Vec<Document>,
    ) -> Result<usize> {
        let name = name.into();
        let collection = MemoryCollection::build(documents)?;
        let count = collection.documents.len();
        info!(
            "Created collection {name} with {count} documents ({} dims)",
            collection.dimension
        );
        self.collections.write().insert(name, Arc::new(collection));
        Ok(count)
    }

    /// Load a collection from a JSONL file.
    pub fn load_collection<S: Into<String>, P: AsRef<Path>>(&self, name: S, path: P) -> Result<usize> {
        let documents = read_jsonl(path)?;
        self.create_collection(name, documents)
    }

    /// Remove a collection, returning whether it existed.
    pub fn drop_collection(&self, name: &str) -> bool {
        self.collections.write().remove(name).is_some()
    }

    /// Names of all collections, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of documents in a collection.
    pub fn collection_len(&self, name: &str) -> Option<usize> {
        self.collections.read().get(name).map(|c| c.documents.len())
    }

    fn collection(&self, name: &str) -> Result<Arc<MemoryCollection>> {
        self.collections
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| AtlasError::collection_not_found(name))
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn query(
        &self,
        collection: &str,
        embedding: &Vector,
        limit: usize,
    ) -> Result<Vec<IndexHit>> {
        let collection = self.collection(collection)?;
        if collection.documents.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        embedding.validate_dimension(collection.dimension)?;
        let embedding = embedding.normalized();

        let rows: Vec<&[f32]> = collection
            .documents
            .iter()
            .map(|d| d.embedding.data.as_slice())
            .collect();
        let distances = self.metric.batch_distance_parallel(&embedding.data, &rows)?;

        let mut order: Vec<usize> = (0..distances.len()).collect();
        order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));
        order.truncate(limit);

        debug!(
            "Scanned {} documents, returning {} hits",
            distances.len(),
            order.len()
        );

        Ok(order
            .into_iter()
            .map(|i| {
                let doc = &collection.documents[i];
                IndexHit {
                    id: doc.id.clone(),
                    distance: distances[i],
                    content: doc.content.clone(),
                    metadata: doc.metadata.clone(),
                }
            })
            .collect())
    }

    async fn get_document_text(&self, collection: &str, id: &str) -> Result<Option<String>> {
        let collection = self.collection(collection)?;
        Ok(collection
            .positions
            .get(id)
            .map(|&i| collection.documents[i].content.clone()))
    }

    async fn has_collection(&self, collection: &str) -> Result<bool> {
        Ok(self.collections.read().contains_key(collection))
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
