//! Core data structures for vector math.
//!
//! This module contains the vector representation used for document and
//! query embeddings, and the distance metrics used by in-memory search.

pub mod distance;
pub mod vector;
