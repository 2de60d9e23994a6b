//! Per-id score aggregation shared by all fusion strategies.
//!
//! ```ascii
//! list 0: [a, b]      list 1: [b, c]
//!          │                    │
//!          ▼                    ▼
//! slots: [a, b, c]   (first-seen order, payload from first sighting)
//! score: [sa, sb0+sb1, sc]
//!          │
//!          ▼  stable sort by score desc, then truncate(limit)
//! ```

use std::collections::HashMap;

use super::result::FusedCandidate;
use crate::candidate::{Candidate, CandidateId};
use crate::error::{Result, SearchError};

/// Accumulates scores by candidate id.
#[derive(Debug, Default)]
pub(crate) struct ScoreBoard {
    slots: Vec<FusedCandidate>,
    index: HashMap<CandidateId, usize>,
}

impl ScoreBoard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add `score` to `candidate`'s id. The first sighting keeps the payload.
    pub(crate) fn add(&mut self, candidate: &Candidate, score: f64) {
        match self.index.get(&candidate.id) {
            Some(&slot) => self.slots[slot].score += score,
            None => {
                self.index.insert(candidate.id.clone(), self.slots.len());
                self.slots.push(FusedCandidate {
                    candidate: candidate.clone(),
                    score,
                });
            }
        }
    }

    /// Sort by score descending and apply `limit`.
    ///
    /// `sort_by` is stable, so equal scores keep first-seen order.
    /// `total_cmp` keeps the order total even for non-finite scores.
    pub(crate) fn into_ranked(self, limit: Option<usize>) -> Vec<FusedCandidate> {
        let mut results = self.slots;
        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        if let Some(n) = limit {
            results.truncate(n);
        }

        results
    }
}

/// Weight for list `i`, defaulting to 1.
pub(crate) fn weight_at(weights: Option<&[f64]>, i: usize) -> f64 {
    weights.and_then(|w| w.get(i).copied()).unwrap_or(1.0)
}

/// Check configured weights against the number of lists being fused.
pub(crate) fn check_weights(weights: Option<&[f64]>, lists: usize) -> Result<()> {
    let Some(w) = weights else {
        return Ok(());
    };
    if w.len() != lists {
        return Err(SearchError::config(format!(
            "{} weights configured but {} candidate lists supplied",
            w.len(),
            lists
        )));
    }
    match w.iter().find(|weight| !weight.is_finite()) {
        Some(bad) => Err(SearchError::config(format!(
            "weights must be finite, got {}",
            bad
        ))),
        None => Ok(()),
    }
}

/// Finite distance of `candidate`, required by distance-based strategies.
pub(crate) fn require_distance(candidate: &Candidate) -> Result<f64> {
    match candidate.distance {
        Some(distance) if distance.is_finite() => Ok(distance),
        Some(distance) => Err(SearchError::InvalidDistance {
            id: candidate.id.clone(),
            distance,
        }),
        None => Err(SearchError::MissingDistance {
            id: candidate.id.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64) -> Candidate {
        Candidate::new(CandidateId::Int(id), None)
    }

    #[test]
    fn test_scoreboard_sums_duplicates_and_keeps_first_payload() {
        let mut board = ScoreBoard::new();
        let first = candidate(1).with_field("from", "list-0");
        let second = candidate(1).with_field("from", "list-1");

        board.add(&first, 0.25);
        board.add(&second, 0.5);

        let ranked = board.into_ranked(None);
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].score - 0.75).abs() < 1e-12);
        assert_eq!(ranked[0].candidate.field("from"), Some(&serde_json::Value::from("list-0")));
    }

    #[test]
    fn test_scoreboard_ties_keep_first_seen_order() {
        let mut board = ScoreBoard::new();
        for id in [5, 3, 9] {
            board.add(&candidate(id), 1.0);
        }

        let ids: Vec<CandidateId> = board
            .into_ranked(None)
            .into_iter()
            .map(|f| f.candidate.id)
            .collect();
        assert_eq!(
            ids,
            vec![CandidateId::Int(5), CandidateId::Int(3), CandidateId::Int(9)]
        );
    }

    #[test]
    fn test_scoreboard_limit_zero_is_empty() {
        let mut board = ScoreBoard::new();
        board.add(&candidate(1), 1.0);
        assert!(board.into_ranked(Some(0)).is_empty());
    }

    #[test]
    fn test_check_weights() {
        assert!(check_weights(None, 3).is_ok());
        assert!(check_weights(Some(&[1.0, 2.0]), 2).is_ok());
        assert!(check_weights(Some(&[1.0]), 2).is_err());
        assert!(check_weights(Some(&[1.0, f64::NAN]), 2).is_err());
    }

    #[test]
    fn test_require_distance_rejects_non_finite() {
        let near = Candidate::new(CandidateId::Int(1), Some(0.5));
        assert_eq!(require_distance(&near).unwrap(), 0.5);

        let err = require_distance(&Candidate::new(CandidateId::Int(2), Some(f64::INFINITY)))
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidDistance { .. }));

        let err = require_distance(&candidate(3)).unwrap_err();
        assert!(matches!(err, SearchError::MissingDistance { .. }));
    }

    #[test]
    fn test_scoreboard_orders_infinite_scores_first() {
        let mut board = ScoreBoard::new();
        board.add(&candidate(1), 1.0);
        board.add(&candidate(2), f64::INFINITY);
        board.add(&candidate(3), -1.0);

        let ids: Vec<CandidateId> = board
            .into_ranked(None)
            .into_iter()
            .map(|f| f.candidate.id)
            .collect();
        assert_eq!(
            ids,
            vec![CandidateId::Int(2), CandidateId::Int(1), CandidateId::Int(3)]
        );
    }

    #[test]
    fn test_weight_at_defaults_to_one() {
        assert_eq!(weight_at(None, 4), 1.0);
        assert_eq!(weight_at(Some(&[0.5, 2.0]), 1), 2.0);
    }
}
