//! Dense embedding vectors and the distance metrics defined over them.
//!
//! # Module Structure
//!
//! - `core`: Core data structures (vector, distance)

pub mod core;

pub use self::core::distance::DistanceMetric;
pub use self::core::vector::Vector;
