//! Relevance reranking of retrieved candidates.
//!
//! # Feature Flags
//!
//! - `rerank-cohere` - Cohere rerank API implementation (enabled by default)

pub mod adapter;
pub mod cohere;
pub mod scorer;

pub use self::adapter::RerankerAdapter;
#[cfg(feature = "rerank-cohere")]
pub use self::cohere::CohereRelevanceScorer;
pub use self::scorer::{RelevanceHit, RelevanceScorer};
