//! Reranker trait definition.
//!
//! This module defines the core `Reranker` trait that all fusion strategies must satisfy.
//!
//! # Architecture
//!
//! ```ascii
//!                      ┌─────────────────┐
//!                      │  Reranker Trait │
//!                      └────────┬────────┘
//!                               │
//!        ┌──────────────────────┼──────────────────────┐
//!        │                      │                      │
//!        ▼                      ▼                      ▼
//! ┌──────────────┐     ┌──────────────┐      ┌──────────────┐
//! │ RrfReranker  │     │ RsfReranker  │      │ DbsfReranker │
//! │ (rank-based) │     │ (min-max)    │      │ (fixed range)│
//! └──────────────┘     └──────────────┘      └──────────────┘
//! ```
//!
//! # Implementations
//!
//! - [`super::RrfReranker`] - Reciprocal Rank Fusion
//! - [`super::RsfReranker`] - Relative Score Fusion
//! - [`super::DbsfReranker`] - Distribution-Based Score Fusion
//! - [`super::FusionReranker`] - Enum dispatch over the three

use super::result::FusedCandidate;
use crate::candidate::CandidateList;
use crate::error::Result;

/// Trait for score-fusion strategies.
///
/// Fusion is pure and synchronous: identical inputs and configuration always
/// produce identical output, and no I/O happens here.
///
/// # Required Methods
///
/// - [`name`](Reranker::name) - Identifier for the strategy
/// - [`fuse`](Reranker::fuse) - Merge lists, keeping aggregated scores
///
/// # Provided Methods
///
/// - [`rerank`](Reranker::rerank) - Merge lists, discarding scores
pub trait Reranker: Send + Sync {
    /// Get the name of this reranker.
    fn name(&self) -> &str;

    /// Merge ranked lists into one list sorted by aggregated score.
    ///
    /// # Arguments
    ///
    /// - `lists`: One candidate list per retriever, in retriever order
    ///
    /// # Returns
    ///
    /// Deduplicated candidates, highest score first, ties in first-seen order,
    /// truncated to the configured limit.
    fn fuse(&self, lists: &[CandidateList]) -> Result<Vec<FusedCandidate>>;

    /// Merge ranked lists and return only the candidates.
    fn rerank(&self, lists: &[CandidateList]) -> Result<CandidateList> {
        Ok(self
            .fuse(lists)?
            .into_iter()
            .map(|fused| fused.candidate)
            .collect())
    }
}
