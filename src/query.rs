//! Online query pipeline.
//!
//! # Module Structure
//!
//! - `request`: Query requests and validation
//! - `score`: Distance/relevance score normalization
//! - `merger`: Deduplication, thresholding, sorting and truncation
//! - `result`: Final ranked results
//! - `pipeline`: End-to-end orchestration

pub mod merger;
pub mod pipeline;
pub mod request;
pub mod result;
pub mod score;

pub use self::merger::ResultMerger;
pub use self::pipeline::QueryPipeline;
pub use self::request::QueryRequest;
pub use self::result::RankedResult;
pub use self::score::{FinalScore, distance_to_score, score_to_distance};
