//! Text embedding support for the query pipeline.
//!
//! Queries are embedded through the [`TextEmbedder`] trait so the pipeline
//! depends only on the contract, never on a concrete provider.
//!
//! # Feature Flags
//!
//! - `embeddings-openai` - OpenAI API implementation (enabled by default)
//!
//! # Implementations
//!
//! - [`OpenAITextEmbedder`] - remote embeddings with dimension truncation
//! - [`PrecomputedEmbedder`] - lookup table of already-computed vectors

pub mod openai_text_embedder;
pub mod precomputed;
pub mod text_embedder;

#[cfg(feature = "embeddings-openai")]
pub use self::openai_text_embedder::OpenAITextEmbedder;
pub use self::precomputed::PrecomputedEmbedder;
pub use self::text_embedder::TextEmbedder;
