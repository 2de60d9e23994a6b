//! Distribution-Based Score Fusion (DBSF) reranker.
//!
//! Like RSF, but each list is normalized against a caller-supplied
//! `[min, max]` range describing the expected distance distribution, not the
//! range observed in the sample.
//!
//! # Algorithm
//!
//! ```ascii
//! per list i with range [lo, hi]:
//!   score(d) = w_i * (1 - clamp(max(d - lo, 0) / (hi - lo), 0, 1))
//!
//!   d <= lo  ─► w_i
//!   d >= hi  ─► 0
//! ```

use serde::{Deserialize, Serialize};

use super::aggregate::{check_weights, require_distance, weight_at, ScoreBoard};
use super::result::FusedCandidate;
use super::traits::Reranker;
use crate::candidate::CandidateList;
use crate::error::{Result, SearchError};

/// Expected distance range for one retriever.
///
/// Serialized as a two-element array: `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ScaleRange {
    /// Distance mapped to score 1.
    pub min: f64,
    /// Distance mapped to score 0.
    pub max: f64,
}

impl ScaleRange {
    /// Create a range.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check the range and its width are finite and non-empty.
    pub fn validate(&self) -> Result<()> {
        if !(self.max - self.min).is_finite() {
            return Err(SearchError::config(format!(
                "scale range [{}, {}] must be finite",
                self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(SearchError::config(format!(
                "scale range [{}, {}] must have min < max",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Map a distance to a similarity in `[0, 1]`.
    pub fn normalize(&self, distance: f64) -> f64 {
        let shifted = (distance - self.min).max(0.0);
        1.0 - (shifted / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl From<[f64; 2]> for ScaleRange {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<ScaleRange> for [f64; 2] {
    fn from(range: ScaleRange) -> Self {
        [range.min, range.max]
    }
}

/// Distribution-Based Score Fusion reranker.
#[derive(Debug, Clone, PartialEq)]
pub struct DbsfReranker {
    scale_ranges: Vec<ScaleRange>,
    weights: Option<Vec<f64>>,
    limit: Option<usize>,
}

impl DbsfReranker {
    /// Create a DBSF reranker with one scale range per list.
    pub fn new(scale_ranges: Vec<ScaleRange>) -> Self {
        Self {
            scale_ranges,
            weights: None,
            limit: None,
        }
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

    /// Configured scale ranges.
    pub fn scale_ranges(&self) -> &[ScaleRange] {
        &self.scale_ranges
    }

    pub(crate) fn from_parts(
        scale_ranges: Vec<ScaleRange>,
        weights: Option<Vec<f64>>,
        limit: Option<usize>,
    ) -> Self {
        Self {
            scale_ranges,
            weights,
            limit,
        }
    }
}

impl Reranker for DbsfReranker {
    fn name(&self) -> &str {
        "dbsf"
    }

    fn fuse(&self, lists: &[CandidateList]) -> Result<Vec<FusedCandidate>> {
        if self.scale_ranges.len() != lists.len() {
            return Err(SearchError::config(format!(
                "{} scale ranges configured but {} candidate lists supplied",
                self.scale_ranges.len(),
                lists.len()
            )));
        }
        for range in &self.scale_ranges {
            range.validate()?;
        }
        let weights = self.weights.as_deref();
        check_weights(weights, lists.len())?;

        let mut board = ScoreBoard::new();
        for (i, (list, range)) in lists.iter().zip(&self.scale_ranges).enumerate() {
            let weight = weight_at(weights, i);
            for candidate in list {
                let distance = require_distance(candidate)?;
                board.add(candidate, weight * range.normalize(distance));
            }
        }

        Ok(board.into_ranked(self.limit))
    }
}
