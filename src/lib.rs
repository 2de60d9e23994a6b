//! EdgeQuake Search - Multi-Retriever Search Fusion
//!
//! Queries several vector database retrievers for the same input and merges
//! their ranked results into one list.
//!
//! This crate provides:
//! - Retrievers bound to one table/index with a fixed query configuration
//! - Score fusion strategies (RRF, RSF, DBSF) behind one `Reranker` trait
//! - A `SearchEngine` that fans out concurrently and fuses the results
//! - TOML configuration for the whole setup
//!
//! # Fusion Strategies
//!
//! | Strategy | Signal | Normalization | Parameters |
//! |----------|--------|---------------|------------|
//! | RRF | Rank | None | `k`, weights, limit |
//! | RSF | Distance | Observed min/max per list | weights, limit |
//! | DBSF | Distance | Caller `[min, max]` per list | scale ranges, weights, limit |
//!
//! # Architecture
//!
//! The database is reached through the [`QueryClient`] trait; this crate ships
//! no transport, only [`client::MockQueryClient`] for tests and demos.
//!
//! # Example
//!
//! ```ignore
//! use edgequake_search::{RerankerConfig, RetrieverConfig, SearchEngine};
//!
//! let mut engine = SearchEngine::new(client);
//! engine
//!     .add_retriever(RetrieverConfig::new("Articles").with_query_index("dense"))
//!     .add_retriever(RetrieverConfig::new("Articles").with_query_index("sparse"));
//! engine.set_reranker(RerankerConfig::rrf().with_limit(10))?;
//!
//! let results = engine.search("rust ownership").await?;
//! ```
//!
//! # See Also
//!
//! - [`crate::reranker`] for the fusion strategies
//! - [`crate::engine`] for orchestration and its state machine
//! - [`crate::config`] for TOML configuration

pub mod candidate;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod reranker;
pub mod retriever;

pub use candidate::{Candidate, CandidateId, CandidateList, Record, DISTANCE_KEY};
pub use client::{QueryClient, QueryFailure, QueryRequest, QueryVector};
pub use config::SearchConfig;
pub use engine::{EngineState, SearchEngine, DEFAULT_TIMEOUT};
pub use error::{ErrorKind, Result, SearchError};
pub use reranker::{
    DbsfReranker, FusedCandidate, FusionReranker, Reranker, RerankerConfig, RerankerKind,
    RrfReranker, RsfReranker, ScaleRange,
};
pub use retriever::{RetrieverConfig, VectorRetriever};
