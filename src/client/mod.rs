//! Retrieval collaborator contract.
//!
//! The fusion engine never talks to the vector database directly. Each
//! retriever forwards a [`QueryRequest`] to a [`QueryClient`], which owns the
//! transport (REST, gRPC, in-process, ...).
//!
//! ```ascii
//! ┌────────────────┐  QueryRequest   ┌──────────────────────┐
//! │ VectorRetriever│ ──────────────► │  QueryClient (trait) │
//! └────────────────┘                 └──────────┬───────────┘
//!         ▲                                     │
//!         │   Ok(Vec<Record>) / Err(QueryFailure)
//!         └─────────────────────────────────────┘
//! ```
//!
//! # Implementations
//!
//! - [`MockQueryClient`] - In-memory tables for tests and demos

mod mock;

pub use mock::MockQueryClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::candidate::Record;

/// Query vector supplied instead of (or alongside) query text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryVector {
    /// Dense embedding.
    Dense(Vec<f32>),
    /// Sparse embedding as parallel index/value arrays.
    Sparse { indices: Vec<u32>, values: Vec<f32> },
}

/// A single similarity query against one table.
///
/// Serializes to the service's camelCase query body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Table to query.
    pub table: String,
    /// Free-text query, embedded by the service.
    #[serde(rename = "query", default, skip_serializing_if = "Option::is_none")]
    pub query_text: Option<String>,
    /// Named index to search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_index: Option<String>,
    /// Vector field to search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_field: Option<String>,
    /// Explicit query vector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_vector: Option<QueryVector>,
    /// Fields to project (empty = all).
    #[serde(rename = "response", default)]
    pub response_fields: Vec<String>,
    /// Maximum number of records.
    pub limit: usize,
    /// Source-specific boolean filter expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Ask the service to report `@distance` per record.
    #[serde(default)]
    pub with_distance: bool,
}

/// Failure reported by the collaborator for one query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryFailure {
    /// HTTP-like status code, when the transport has one.
    pub status_code: Option<u16>,
    /// Error message from the service.
    pub message: Option<String>,
}

impl QueryFailure {
    /// Failure with a message and no status.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: Some(message.into()),
        }
    }

    /// Failure with a status code and optional message.
    pub fn with_status(status_code: u16, message: Option<String>) -> Self {
        Self {
            status_code: Some(status_code),
            message,
        }
    }

    /// Message to surface to callers.
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("Unknown error")
    }
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (status {})", self.message_or_default(), code),
            None => write!(f, "{}", self.message_or_default()),
        }
    }
}

/// Vector database query operation used by retrievers.
///
/// Records returned on success must contain the retriever's primary-key
/// field; distances, when requested, appear under
/// [`DISTANCE_KEY`](crate::candidate::DISTANCE_KEY).
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Run one similarity query.
    async fn query(&self, request: &QueryRequest) -> Result<Vec<Record>, QueryFailure>;
}
