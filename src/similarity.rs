//! Offline related-document computation.
//!
//! For every document in a collection this module finds its top-K most
//! similar peers by cosine similarity, producing a [`NeighborGraph`] that is
//! persisted once per rebuild and never updated incrementally.
//!
//! # Module Structure
//!
//! - `config`: Tunables for the batch job (K, block size, threads)
//! - `matrix`: Contiguous, row-normalized embedding matrix
//! - `computer`: Row-blocked parallel top-K search
//! - `graph`: Result graph, binary persistence and percentage export
//!
//! # Examples
//!
//! ```
//! use arxiv_atlas::similarity::{EmbeddingMatrix, NeighborComputer, SimilarityConfig};
//! use arxiv_atlas::vector::Vector;
//!
//! let matrix = EmbeddingMatrix::from_vectors(
//!     vec!["a".into(), "b".into(), "c".into()],
//!     &[
//!         Vector::new(vec![1.0, 0.0]),
//!         Vector::new(vec![0.8, 0.6]),
//!         Vector::new(vec![0.0, 1.0]),
//!     ],
//! )
//! .unwrap();
//!
//! let config = SimilarityConfig {
//!     neighbors: 1,
//!     export_neighbors: 1,
//!     ..Default::default()
//! };
//! let computer = NeighborComputer::new(config).unwrap();
//! let graph = computer.compute(&matrix).unwrap();
//!
//! assert_eq!(graph.neighbors(0), &[1]);
//! ```

pub mod computer;
pub mod config;
pub mod graph;
pub mod matrix;

pub use self::computer::{NeighborComputation, NeighborComputer};
pub use self::config::SimilarityConfig;
pub use self::graph::{NeighborEdge, NeighborGraph};
pub use self::matrix::EmbeddingMatrix;
