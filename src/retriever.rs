//! Vector retrievers.
//!
//! A [`VectorRetriever`] binds one table and a fixed query configuration to a
//! [`QueryClient`]. Given query text it returns the table's ranked candidates,
//! in exactly the order the service produced them.
//!
//! # Configuration
//!
//! ```ascii
//! ┌─────────────────────────────────────────────────────────┐
//! │                    RetrieverConfig                       │
//! ├─────────────────────────────────────────────────────────┤
//! │ table: String           ─────► Source table             │
//! │ primary_key_field       ─────► Candidate identity       │
//! │ query_index / field     ─────► What to search           │
//! │ query_vector            ─────► Explicit vector          │
//! │ response_fields         ─────► Projection               │
//! │ limit: usize            ─────► Result count             │
//! │ filter: Option<String>  ─────► Boolean expression       │
//! │ with_distance: bool     ─────► Report @distance         │
//! └─────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::candidate::{Candidate, CandidateList};
use crate::client::{QueryClient, QueryRequest, QueryVector};
use crate::error::{Result, SearchError};

fn default_primary_key_field() -> String {
    "ID".to_string()
}

fn default_limit() -> usize {
    2
}

fn default_with_distance() -> bool {
    true
}

/// Immutable query configuration for one retrieval source.
///
/// # Example
///
/// ```
/// use edgequake_search::RetrieverConfig;
///
/// let config = RetrieverConfig::new("Articles")
///     .with_primary_key_field("doc_id")
///     .with_query_index("dense")
///     .with_limit(10)
///     .with_filter("year > 2020");
/// assert_eq!(config.limit, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Table to query.
    pub table: String,
    /// Field whose value identifies a record.
    #[serde(default = "default_primary_key_field")]
    pub primary_key_field: String,
    /// Named index to search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_index: Option<String>,
    /// Vector field to search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_field: Option<String>,
    /// Explicit query vector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_vector: Option<QueryVector>,
    /// Fields to return (empty = all).
    #[serde(default)]
    pub response_fields: Vec<String>,
    /// Maximum candidates per query.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Source-specific filter expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Request per-record distances. Required by RSF and DBSF fusion.
    #[serde(default = "default_with_distance")]
    pub with_distance: bool,
}

impl RetrieverConfig {
    /// Create a config for `table` with defaults (`ID` key, limit 2, distances on).
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key_field: default_primary_key_field(),
            query_index: None,
            query_field: None,
            query_vector: None,
            response_fields: Vec::new(),
            limit: default_limit(),
            filter: None,
            with_distance: default_with_distance(),
        }
    }

    /// Set the primary-key field.
    pub fn with_primary_key_field(mut self, field: impl Into<String>) -> Self {
        self.primary_key_field = field.into();
        self
    }

    /// Set the named index.
    pub fn with_query_index(mut self, index: impl Into<String>) -> Self {
        self.query_index = Some(index.into());
        self
    }

    /// Set the vector field.
    pub fn with_query_field(mut self, field: impl Into<String>) -> Self {
        self.query_field = Some(field.into());
        self
    }

    /// Set an explicit query vector.
    pub fn with_query_vector(mut self, vector: QueryVector) -> Self {
        self.query_vector = Some(vector);
        self
    }

    /// Set the response projection.
    pub fn with_response_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.response_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the result-count limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the filter expression. An empty expression clears it.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = if filter.is_empty() { None } else { Some(filter) };
        self
    }

    /// Enable or disable distance reporting.
    pub fn with_distance(mut self, enable: bool) -> Self {
        self.with_distance = enable;
        self
    }

    /// Build the collaborator request for `query`.
    pub fn to_request(&self, query: &str) -> QueryRequest {
        QueryRequest {
            table: self.table.clone(),
            query_text: (!query.is_empty()).then(|| query.to_string()),
            query_index: self.query_index.clone(),
            query_field: self.query_field.clone(),
            query_vector: self.query_vector.clone(),
            response_fields: self.response_fields.clone(),
            limit: self.limit,
            filter: self.filter.clone().filter(|f| !f.is_empty()),
            with_distance: self.with_distance,
        }
    }
}

/// Retriever bound to one table.
#[derive(Clone)]
pub struct VectorRetriever {
    client: Arc<dyn QueryClient>,
    config: RetrieverConfig,
}

impl VectorRetriever {
    /// Bind `config` to `client`.
    pub fn new(client: Arc<dyn QueryClient>, config: RetrieverConfig) -> Self {
        Self { client, config }
    }

    /// Configuration this retriever was built from.
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Table this retriever queries.
    pub fn table(&self) -> &str {
        &self.config.table
    }

    /// Query the table and convert the records into candidates.
    ///
    /// # Errors
    ///
    /// - [`SearchError::RetrievalError`] if the collaborator fails
    /// - [`SearchError::MissingPrimaryKey`] if any record lacks the key field
    #[instrument(skip(self, query), fields(table = %self.config.table))]
    pub async fn retrieve(&self, query: &str) -> Result<CandidateList> {
        let request = self.config.to_request(query);

        let records = self.client.query(&request).await.map_err(|failure| {
            warn!("Query against {} failed: {}", self.config.table, failure);
            SearchError::RetrievalError {
                table: self.config.table.clone(),
                message: failure.message_or_default().to_string(),
            }
        })?;

        let candidates = records
            .into_iter()
            .map(|record| {
                Candidate::from_record(record, &self.config.primary_key_field, &self.config.table)
            })
            .collect::<Result<CandidateList>>()?;

        debug!(
            "Retrieved {} candidates from {}",
            candidates.len(),
            self.config.table
        );
        Ok(candidates)
    }
}

impl std::fmt::Debug for VectorRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorRetriever")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
