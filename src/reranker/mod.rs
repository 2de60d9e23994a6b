//! Score fusion for multi-retriever search.
//!
//! This module merges the ranked candidate lists produced by several
//! retrievers into one ordered list.
//!
//! # Architecture
//!
//! ```ascii
//!        list 0            list 1            list n
//!          │                 │                 │
//!          └────────────┬────┴─────────────────┘
//!                       ▼
//!     ┌─────────────────────────────────────────────────────┐
//!     │                  Reranker Trait                      │
//!     │   fuse(lists) → Vec<FusedCandidate>                  │
//!     └──────────────────────────┬──────────────────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        ▼                       ▼                       ▼
//! ┌──────────────┐      ┌──────────────┐        ┌──────────────┐
//! │ RrfReranker  │      │ RsfReranker  │        │ DbsfReranker │
//! │ w/(k + rank) │      │ observed     │        │ caller       │
//! │              │      │ min-max      │        │ [min, max]   │
//! └──────────────┘      └──────────────┘        └──────────────┘
//! ```
//!
//! # Module Structure
//!
//! ```ascii
//! reranker/
//! ├── mod.rs         ─► This file (re-exports)
//! ├── config.rs      ─► RerankerConfig, RerankerKind
//! ├── result.rs      ─► FusedCandidate
//! ├── traits.rs      ─► Reranker trait
//! ├── aggregate.rs   ─► Per-id score accumulation, stable ranking
//! ├── rrf.rs         ─► RrfReranker
//! ├── rsf.rs         ─► RsfReranker
//! ├── dbsf.rs        ─► DbsfReranker, ScaleRange
//! └── fusion.rs      ─► FusionReranker (enum dispatch)
//! ```
//!
//! # Guarantees
//!
//! - Same id in several lists ─► one output entry, scores summed
//! - Equal scores ─► first-seen order preserved
//! - `limit` applied after sorting
//!
//! # Example
//!
//! ```ignore
//! use edgequake_search::reranker::{RerankerConfig, Reranker};
//!
//! let reranker = RerankerConfig::rrf().with_k(60).build(2)?;
//! let merged = reranker.rerank(&[vector_hits, keyword_hits])?;
//! ```

mod aggregate;
mod config;
mod dbsf;
mod fusion;
mod result;
mod rrf;
mod rsf;
mod traits;

pub use config::{RerankerConfig, RerankerKind};
pub use dbsf::{DbsfReranker, ScaleRange};
pub use fusion::FusionReranker;
pub use result::FusedCandidate;
pub use rrf::{RrfReranker, DEFAULT_RRF_K};
pub use rsf::RsfReranker;
pub use traits::Reranker;
