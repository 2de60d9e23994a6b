//! Search error types.
//!
//! # Error Handling Philosophy
//!
//! Every error aborts the enclosing `search` call. The core performs no local
//! recovery and no retries: retry policy belongs to whatever transport sits
//! behind the [`QueryClient`](crate::client::QueryClient).
//!
//! # Error Kinds
//!
//! | Kind | Variants | Raised at |
//! |------|----------|-----------|
//! | `Configuration` | `ConfigError`, `IoError`, `ParseError` | `set_reranker`, `search` preconditions, config loading |
//! | `Retrieval` | `RetrievalError`, `Timeout` | collaborator failure or timeout |
//! | `Schema` | `MissingPrimaryKey`, `InvalidRecord`, `MissingDistance`, `InvalidDistance` | record conversion, distance fusion |

use std::time::Duration;
use thiserror::Error;

use crate::candidate::CandidateId;

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

// ============================================================================
// Error Kind
// ============================================================================

/// Coarse classification of a [`SearchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Static, caller-fixable misconfiguration. Never retried.
    Configuration,
    /// The retrieval collaborator failed or did not answer in time.
    Retrieval,
    /// A returned record cannot be turned into a usable candidate.
    Schema,
}

// ============================================================================
// Search Error Types
// ============================================================================

/// Errors that can occur while configuring or running a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid engine or reranker configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The collaborator reported a non-success status for a table.
    #[error("Failed to retrieve data from table {table}: {message}")]
    RetrievalError { table: String, message: String },

    /// A retriever did not answer within the engine timeout.
    #[error("Retrieval from table {table} timed out after {timeout:?}")]
    Timeout { table: String, timeout: Duration },

    /// A record lacks the configured primary-key field.
    #[error("Primary key field {field} not found in the response from table {table}")]
    MissingPrimaryKey { table: String, field: String },

    /// A record carries a field with an unusable value.
    #[error("Invalid record from table {table}: {message}")]
    InvalidRecord { table: String, message: String },

    /// A distance-based fusion met a candidate without a distance.
    #[error("Candidate {id} has no distance; distance-based fusion needs with_distance")]
    MissingDistance { id: CandidateId },

    /// A distance-based fusion met a NaN or infinite distance.
    #[error("Candidate {id} has non-finite distance {distance}")]
    InvalidDistance { id: CandidateId, distance: f64 },

    /// Failed to read a configuration file.
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse a configuration file.
    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

impl SearchError {
    /// Classify this error.
    ///
    /// # Example
    ///
    /// ```
    /// use edgequake_search::{ErrorKind, SearchError};
    ///
    /// let error = SearchError::ConfigError("no retriever".to_string());
    /// assert_eq!(error.kind(), ErrorKind::Configuration);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigError(_) | Self::IoError(_) | Self::ParseError(_) => {
                ErrorKind::Configuration
            }
            Self::RetrievalError { .. } | Self::Timeout { .. } => ErrorKind::Retrieval,
            Self::MissingPrimaryKey { .. }
            | Self::InvalidRecord { .. }
            | Self::MissingDistance { .. }
            | Self::InvalidDistance { .. } => ErrorKind::Schema,
        }
    }

    /// Table the error originated from, when known.
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::RetrievalError { table, .. }
            | Self::Timeout { table, .. }
            | Self::MissingPrimaryKey { table, .. }
            | Self::InvalidRecord { table, .. } => Some(table),
            _ => None,
        }
    }

    /// Shorthand for a [`SearchError::ConfigError`].
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}
