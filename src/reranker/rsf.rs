//! Relative Score Fusion (RSF) reranker.
//!
//! Normalizes each list's distances against the range observed in that list,
//! then sums the normalized similarities.
//!
//! # Algorithm
//!
//! ```ascii
//! per list i:
//!   min, max = observed distances
//!   score(d) = w_i * (1 - (d - min) / (max - min))
//!   score(d) = w_i                  if len < 2 or max == min
//! ```
//!
//! Distances must be finite. A span too wide for `f64` is normalized on
//! halved values.

use super::aggregate::{check_weights, require_distance, weight_at, ScoreBoard};
use super::result::FusedCandidate;
use super::traits::Reranker;
use crate::candidate::CandidateList;
use crate::error::Result;

/// Relative Score Fusion reranker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RsfReranker {
    weights: Option<Vec<f64>>,
    limit: Option<usize>,
}

impl RsfReranker {
    /// Create an RSF reranker with equal weights and no limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set per-list weights.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Cap the number of fused results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn from_parts(weights: Option<Vec<f64>>, limit: Option<usize>) -> Self {
        Self { weights, limit }
    }
}

/// Single-pass min/max over a list of distances.
fn min_max(distances: &[f64]) -> Option<(f64, f64)> {
    let mut iter = distances.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
}

/// `1 - (d - min) / (max - min)`, halving first when the span overflows.
fn relative_similarity(distance: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span.is_finite() {
        1.0 - (distance - min) / span
    } else {
        1.0 - (distance / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0)
    }
}

impl Reranker for RsfReranker {
    fn name(&self) -> &str {
        "rsf"
    }

    fn fuse(&self, lists: &[CandidateList]) -> Result<Vec<FusedCandidate>> {
        let weights = self.weights.as_deref();
        check_weights(weights, lists.len())?;

        let mut board = ScoreBoard::new();
        for (i, list) in lists.iter().enumerate() {
            let weight = weight_at(weights, i);
            let distances = list
                .iter()
                .map(require_distance)
                .collect::<Result<Vec<f64>>>()?;

            let range = match min_max(&distances) {
                Some((min, max)) if list.len() >= 2 && max > min => Some((min, max)),
                _ => None,
            };

            for (candidate, distance) in list.iter().zip(distances) {
                let normalized = match range {
                    Some((min, max)) => relative_similarity(distance, min, max),
                    None => 1.0,
                };
                board.add(candidate, weight * normalized);
            }
        }

        Ok(board.into_ranked(self.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_helper() {
        assert_eq!(min_max(&[]), None);
        assert_eq!(min_max(&[3.0, 1.0, 5.0]), Some((1.0, 5.0)));
        assert_eq!(min_max(&[2.0]), Some((2.0, 2.0)));
    }

    #[test]
    fn test_relative_similarity_overflowing_span() {
        assert_eq!(relative_similarity(0.5, 0.0, 1.0), 0.5);
        assert_eq!(relative_similarity(-f64::MAX, -f64::MAX, f64::MAX), 1.0);
        assert_eq!(relative_similarity(0.0, -f64::MAX, f64::MAX), 0.5);
        assert_eq!(relative_similarity(f64::MAX, -f64::MAX, f64::MAX), 0.0);
    }
}
