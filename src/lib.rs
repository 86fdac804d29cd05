//! # Atlas
//!
//! Semantic retrieval over arXiv abstract embeddings.
//!
//! ## Features
//!
//! - Offline related-paper graphs: parallel top-K cosine neighbors for every
//!   document, stored compactly and exported as percentages
//! - Online query pipeline: embed, retrieve from a per-category collection,
//!   optionally rerank, then merge and select
//! - Pluggable embedding providers, vector indexes and relevance scorers

pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod query;
pub mod rerank;
pub mod retrieval;
pub mod similarity;
pub mod util;
pub mod vector;

pub mod prelude {
    pub use crate::config::AtlasConfig;
    pub use crate::document::{Document, DocumentMetadata};
    pub use crate::embedding::TextEmbedder;
    pub use crate::error::{AtlasError, Result};
    pub use crate::query::{QueryPipeline, QueryRequest, RankedResult};
    pub use crate::rerank::RelevanceScorer;
    pub use crate::retrieval::{InMemoryVectorIndex, VectorIndex};
    pub use crate::similarity::{EmbeddingMatrix, NeighborComputer, NeighborGraph, SimilarityConfig};
    pub use crate::vector::Vector;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
