//! Enum dispatch over the fusion strategies.

use super::config::RerankerKind;
use super::dbsf::DbsfReranker;
use super::result::FusedCandidate;
use super::rrf::RrfReranker;
use super::rsf::RsfReranker;
use super::traits::Reranker;
use crate::candidate::CandidateList;
use crate::error::Result;

/// One of the three fusion strategies, as built by
/// [`RerankerConfig::build`](super::RerankerConfig::build).
#[derive(Debug, Clone, PartialEq)]
pub enum FusionReranker {
    /// Reciprocal Rank Fusion.
    Rrf(RrfReranker),
    /// Relative Score Fusion.
    Rsf(RsfReranker),
    /// Distribution-Based Score Fusion.
    Dbsf(DbsfReranker),
}

impl FusionReranker {
    /// Algorithm of the wrapped reranker.
    pub fn kind(&self) -> RerankerKind {
        match self {
            Self::Rrf(_) => RerankerKind::Rrf,
            Self::Rsf(_) => RerankerKind::Rsf,
            Self::Dbsf(_) => RerankerKind::Dbsf,
        }
    }

    fn inner(&self) -> &dyn Reranker {
        match self {
            Self::Rrf(r) => r,
            Self::Rsf(r) => r,
            Self::Dbsf(r) => r,
        }
    }
}

impl Reranker for FusionReranker {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn fuse(&self, lists: &[CandidateList]) -> Result<Vec<FusedCandidate>> {
        self.inner().fuse(lists)
    }
}

impl From<RrfReranker> for FusionReranker {
    fn from(reranker: RrfReranker) -> Self {
        Self::Rrf(reranker)
    }
}

impl From<RsfReranker> for FusionReranker {
    fn from(reranker: RsfReranker) -> Self {
        Self::Rsf(reranker)
    }
}

impl From<DbsfReranker> for FusionReranker {
    fn from(reranker: DbsfReranker) -> Self {
        Self::Dbsf(reranker)
    }
}
