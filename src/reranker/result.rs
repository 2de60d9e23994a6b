//! Fusion result types.

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

/// A candidate with its aggregated fusion score.
///
/// # Example
///
/// ```ignore
/// let fused = reranker.fuse(&lists)?;
/// for item in fused {
///     println!("{} scored {:.4}", item.candidate.id, item.score);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedCandidate {
    /// Payload from the first list the id appeared in.
    pub candidate: Candidate,
    /// Sum of per-list contributions (higher is more relevant).
    pub score: f64,
}
