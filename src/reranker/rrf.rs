//! Reciprocal Rank Fusion (RRF) reranker.
//!
//! Combines multiple ranking signals without needing score normalization.
//!
//! # Algorithm
//!
//! ```ascii
//! RRF Score = Σ w_i/(k + rank) for each ranking list i
//!
//! Where:
//! - k = damping constant (default 50)
//! - rank = 1-indexed position in each list
//! - w_i = per-list weight (default 1)
//! ```
//!
//! Larger `k` flattens the gap between top-ranked and lower-ranked candidates.

use super::aggregate::{check_weights, weight_at, ScoreBoard};
use super::result::FusedCandidate;
use super::traits::Reranker;
use crate::candidate::CandidateList;
use crate::error::Result;

/// Default RRF damping constant.
pub const DEFAULT_RRF_K: u32 = 50;

/// Reciprocal Rank Fusion reranker.
///
/// # Example
///
/// ```
/// use edgequake_search::reranker::{Reranker, RrfReranker};
/// use edgequake_search::{Candidate, CandidateId};
///
/// let rrf = RrfReranker::new().with_limit(2);
/// let lists = vec![
///     vec![Candidate::new(1i64, None), Candidate::new(2i64, None)],
///     vec![Candidate::new(2i64, None), Candidate::new(3i64, None)],
/// ];
/// let fused = rrf.rerank(&lists).unwrap();
/// assert_eq!(fused[0].id, CandidateId::Int(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RrfReranker {
    /// Ranking constant (higher = lower-ranked docs have more influence).
    k: u32,
    weights: Option<Vec<f64>>,
    limit: Option<usize>,
}

impl RrfReranker {
    /// Create a new RRF reranker with default k=50, equal weights, no limit.
    pub fn new() -> Self {
        Self {
            k: DEFAULT_RRF_K,
            weights: None,
            limit: None,
        }
    }

    /// Set the damping constant.
    pub fn with_k(mut self, k: u32) -> Self {
        self.k = k;
        self
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

    /// Damping constant in use.
    pub fn k(&self) -> u32 {
        self.k
    }

    pub(crate) fn from_parts(k: u32, weights: Option<Vec<f64>>, limit: Option<usize>) -> Self {
        Self { k, weights, limit }
    }
}

impl Default for RrfReranker {
    fn default() -> Self {
        Self::new()
    }
}

impl Reranker for RrfReranker {
    fn name(&self) -> &str {
        "rrf"
    }

    fn fuse(&self, lists: &[CandidateList]) -> Result<Vec<FusedCandidate>> {
        let weights = self.weights.as_deref();
        check_weights(weights, lists.len())?;

        let mut board = ScoreBoard::new();
        for (i, list) in lists.iter().enumerate() {
            let weight = weight_at(weights, i);
            for (rank, candidate) in list.iter().enumerate() {
                board.add(candidate, weight / (self.k as f64 + rank as f64 + 1.0));
            }
        }

        Ok(board.into_ranked(self.limit))
    }
}
