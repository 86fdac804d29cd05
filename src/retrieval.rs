//! Candidate retrieval over a vector index collaborator.
//!
//! The [`VectorIndex`] trait is the contract the query pipeline needs from a
//! vector store: similarity search by embedding within a named collection,
//! and abstract lookup by document id. [`InMemoryVectorIndex`] is a
//! brute-force implementation suitable for tests and small collections;
//! [`CandidateRetriever`] adapts any index into the per-query
//! [`CandidateRecord`] sequence consumed by the result merger.

pub mod candidate;
pub mod index;
pub mod memory;
pub mod retriever;

pub use self::candidate::CandidateRecord;
pub use self::index::{IndexHit, VectorIndex};
pub use self::memory::InMemoryVectorIndex;
pub use self::retriever::CandidateRetriever;
