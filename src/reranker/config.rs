//! Reranker configuration types.
//!
//! This module contains the configuration used to select and validate a fusion
//! strategy for a given set of retrievers.
//!
//! # Architecture
//!
//! ```ascii
//! ┌─────────────────────────────────────────────────────────┐
//! │                    RerankerConfig                        │
//! ├─────────────────────────────────────────────────────────┤
//! │ kind: RerankerKind     ─────► rrf | rsf | dbsf          │
//! │ weights: Option<Vec>   ─────► One weight per retriever  │
//! │ k: u32                 ─────► RRF damping (default 50)  │
//! │ scale_ranges: Option   ─────► DBSF [min, max] per list  │
//! │ limit: Option<usize>   ─────► Max fused results         │
//! └─────────────────────────────────────────────────────────┘
//!                            │ build(retriever_count)
//!                            ▼
//!                     FusionReranker
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use super::dbsf::{DbsfReranker, ScaleRange};
use super::fusion::FusionReranker;
use super::rrf::{RrfReranker, DEFAULT_RRF_K};
use super::rsf::RsfReranker;
use crate::error::{Result, SearchError};

/// Fusion algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RerankerKind {
    /// Reciprocal Rank Fusion.
    #[default]
    Rrf,
    /// Relative Score Fusion.
    Rsf,
    /// Distribution-Based Score Fusion.
    Dbsf,
}

impl RerankerKind {
    /// Whether this algorithm scores from distances rather than ranks.
    pub fn requires_distance(&self) -> bool {
        matches!(self, Self::Rsf | Self::Dbsf)
    }
}

impl fmt::Display for RerankerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RerankerKind::Rrf => write!(f, "rrf"),
            RerankerKind::Rsf => write!(f, "rsf"),
            RerankerKind::Dbsf => write!(f, "dbsf"),
        }
    }
}

impl FromStr for RerankerKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rrf" => Ok(Self::Rrf),
            "rsf" => Ok(Self::Rsf),
            "dbsf" => Ok(Self::Dbsf),
            other => Err(SearchError::config(format!(
                "Unknown reranker type '{}' (expected rrf, rsf or dbsf)",
                other
            ))),
        }
    }
}

fn default_k() -> u32 {
    DEFAULT_RRF_K
}

/// Configuration for a fusion reranker.
///
/// # Example
///
/// ```
/// use edgequake_search::reranker::{RerankerConfig, ScaleRange};
///
/// // Weighted RRF over two retrievers, top 10 results
/// let config = RerankerConfig::rrf()
///     .with_weights(vec![0.7, 0.3])
///     .with_limit(10);
/// assert!(config.build(2).is_ok());
/// assert!(config.build(3).is_err());
///
/// // DBSF needs one expected distance range per retriever
/// let dbsf = RerankerConfig::dbsf(vec![ScaleRange::new(0.0, 1.0)]);
/// assert!(dbsf.build(1).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankerConfig {
    /// Algorithm to use.
    #[serde(rename = "type", default)]
    pub kind: RerankerKind,
    /// Per-retriever weights. Defaults to 1 for every retriever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
    /// RRF damping constant.
    #[serde(default = "default_k")]
    pub k: u32,
    /// DBSF per-retriever distance ranges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_ranges: Option<Vec<ScaleRange>>,
    /// Maximum number of fused results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self::new(RerankerKind::default())
    }
}

impl RerankerConfig {
    /// Create a config for `kind` with default parameters.
    pub fn new(kind: RerankerKind) -> Self {
        Self {
            kind,
            weights: None,
            k: DEFAULT_RRF_K,
            scale_ranges: None,
            limit: None,
        }
    }

    /// Parse the algorithm name and create a default config for it.
    pub fn for_kind(kind: &str) -> Result<Self> {
        Ok(Self::new(kind.parse()?))
    }

    /// Reciprocal Rank Fusion with k=50.
    pub fn rrf() -> Self {
        Self::new(RerankerKind::Rrf)
    }

    /// Relative Score Fusion.
    pub fn rsf() -> Self {
        Self::new(RerankerKind::Rsf)
    }

    /// Distribution-Based Score Fusion with one range per retriever.
    pub fn dbsf(scale_ranges: Vec<ScaleRange>) -> Self {
        Self {
            scale_ranges: Some(scale_ranges),
            ..Self::new(RerankerKind::Dbsf)
        }
    }

    /// Set per-retriever weights.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Set the RRF damping constant.
    pub fn with_k(mut self, k: u32) -> Self {
        self.k = k;
        self
    }

    /// Set DBSF scale ranges.
    pub fn with_scale_ranges(mut self, scale_ranges: Vec<ScaleRange>) -> Self {
        self.scale_ranges = Some(scale_ranges);
        self
    }

    /// Cap the number of fused results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Validate against `retriever_count` and build the reranker.
    ///
    /// # Errors
    ///
    /// [`SearchError::ConfigError`] when weights or scale ranges do not match
    /// the retriever count, a weight is not finite, or a range is invalid.
    pub fn build(&self, retriever_count: usize) -> Result<FusionReranker> {
        if let Some(weights) = &self.weights {
            if weights.len() != retriever_count {
                return Err(SearchError::config(format!(
                    "The length of weights ({}) should be equal to the number of retrievers ({})",
                    weights.len(),
                    retriever_count
                )));
            }
            if let Some(bad) = weights.iter().find(|w| !w.is_finite()) {
                return Err(SearchError::config(format!(
                    "weights must be finite, got {}",
                    bad
                )));
            }
        }

        match self.kind {
            RerankerKind::Rrf => {
                self.warn_unused("scale_ranges", self.scale_ranges.is_some());
                Ok(FusionReranker::Rrf(RrfReranker::from_parts(
                    self.k,
                    self.weights.clone(),
                    self.limit,
                )))
            }
            RerankerKind::Rsf => {
                self.warn_unused("scale_ranges", self.scale_ranges.is_some());
                self.warn_unused("k", self.k != DEFAULT_RRF_K);
                Ok(FusionReranker::Rsf(RsfReranker::from_parts(
                    self.weights.clone(),
                    self.limit,
                )))
            }
            RerankerKind::Dbsf => {
                self.warn_unused("k", self.k != DEFAULT_RRF_K);
                let ranges = self.scale_ranges.as_ref().ok_or_else(|| {
                    SearchError::config("dbsf reranker requires scale_ranges")
                })?;
                if ranges.len() != retriever_count {
                    return Err(SearchError::config(format!(
                        "The length of scale_ranges ({}) should be equal to the number of retrievers ({})",
                        ranges.len(),
                        retriever_count
                    )));
                }
                for range in ranges {
                    range.validate()?;
                }
                Ok(FusionReranker::Dbsf(DbsfReranker::from_parts(
                    ranges.clone(),
                    self.weights.clone(),
                    self.limit,
                )))
            }
        }
    }

    fn warn_unused(&self, param: &str, set: bool) {
        if set {
            warn!("Parameter '{}' is ignored by the {} reranker", param, self.kind);
        }
    }
}
