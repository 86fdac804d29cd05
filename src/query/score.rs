//! Score normalization between the two scoring regimes of the pipeline.
//!
//! Vector search reports a raw distance (lower is closer, unbounded above),
//! while the reranker reports a relevance score in [0, 1] (higher is better).
//! [`FinalScore`] reconciles both behind a single "higher is better, in
//! [0, 1]" value so the selector can sort without caring which path produced
//! it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Convert a raw distance into a relevance score in (0, 1].
///
/// `score = 1 / (1 + distance)`. Zero distance maps to 1.0 and the score
/// tends to 0.0 as the distance grows. Negative distances are treated as 0
/// and NaN maps to 0.0.
///
/// # Examples
///
/// ```
/// use arxiv_atlas::query::score::distance_to_score;
///
/// assert_eq!(distance_to_score(0.0), 1.0);
/// assert!((distance_to_score(0.1) - 0.909).abs() < 1e-3);
/// ```
pub fn distance_to_score(distance: f32) -> f32 {
    if distance.is_nan() {
        return 0.0;
    }
    1.0 / (1.0 + distance.max(0.0))
}

/// Inverse of [`distance_to_score`].
///
/// Used to turn a score threshold into a distance cutoff. Scores at or below
/// zero map to an infinite distance; scores above one are clamped to one.
pub fn score_to_distance(score: f32) -> f32 {
    if score.is_nan() || score <= 0.0 {
        return f32::INFINITY;
    }
    1.0 / score.min(1.0) - 1.0
}

/// The final score of a result, tagged with the regime that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FinalScore {
    /// Derived from a raw vector distance.
    Distance(f32),
    /// Passed through from the reranker.
    Rerank(f32),
}

impl FinalScore {
    /// The normalized score: in [0, 1], higher is more relevant.
    pub fn value(&self) -> f32 {
        match self {
            FinalScore::Distance(distance) => distance_to_score(*distance),
            FinalScore::Rerank(score) => *score,
        }
    }

    /// Whether this score came from the reranker.
    pub fn is_rerank(&self) -> bool {
        matches!(self, FinalScore::Rerank(_))
    }

    /// Order two scores best first.
    ///
    /// For distance scores this compares the raw distances directly so that
    /// huge distances, which collapse to the same derived score, keep their
    /// relative order.
    pub fn cmp_best_first(&self, other: &FinalScore) -> Ordering {
        match (self, other) {
            (FinalScore::Distance(a), FinalScore::Distance(b)) => a.total_cmp(b),
            _ => other.value().total_cmp(&self.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_score_endpoints() {
        assert_eq!(distance_to_score(0.0), 1.0);
        assert!(distance_to_score(f32::INFINITY) == 0.0);
        assert_eq!(distance_to_score(1.0), 0.5);
    }

    #[test]
    fn test_distance_to_score_strictly_decreasing() {
        let distances = [0.0f32, 0.01, 0.1, 0.5, 1.0, 2.0, 10.0, 1000.0];
        for pair in distances.windows(2) {
            let (a, b) = (distance_to_score(pair[0]), distance_to_score(pair[1]));
            assert!(a > b, "{} -> {a} should exceed {} -> {b}", pair[0], pair[1]);
            assert!(b > 0.0 && b <= 1.0);
        }
    }

    #[test]
    fn test_distance_to_score_degenerate_inputs() {
        assert_eq!(distance_to_score(-0.5), 1.0);
        assert_eq!(distance_to_score(f32::NAN), 0.0);
    }

    #[test]
    fn test_score_to_distance_inverts() {
        for d in [0.0f32, 0.1, 0.5, 2.0, 7.5] {
            let back = score_to_distance(distance_to_score(d));
            assert!((back - d).abs() < 1e-4, "{d} -> {back}");
        }
        assert_eq!(score_to_distance(0.0), f32::INFINITY);
        assert_eq!(score_to_distance(1.5), 0.0);
    }

    #[test]
    fn test_final_score_values() {
        assert!((FinalScore::Distance(0.5).value() - 0.6667).abs() < 1e-3);
        assert_eq!(FinalScore::Rerank(0.42).value(), 0.42);
        assert!(FinalScore::Rerank(0.1).is_rerank());
        assert!(!FinalScore::Distance(0.1).is_rerank());
    }

    #[test]
    fn test_cmp_best_first() {
        let close = FinalScore::Distance(0.1);
        let far = FinalScore::Distance(2.0);
        assert_eq!(close.cmp_best_first(&far), Ordering::Less);

        let high = FinalScore::Rerank(0.9);
        let low = FinalScore::Rerank(0.6);
        assert_eq!(high.cmp_best_first(&low), Ordering::Less);
        assert_eq!(low.cmp_best_first(&low), Ordering::Equal);
    }
}
