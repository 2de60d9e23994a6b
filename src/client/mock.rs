//! Mock query client for testing.
//!
//! Serves records from in-memory tables with no network access. Tables can be
//! scripted to fail or to answer slowly, and every request is recorded so
//! tests can assert what a retriever forwarded.
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                 MockQueryClient                    │
//! ├────────────────────────────────────────────────────┤
//! │  with_table()    ─► records served in given order  │
//! │  with_failure()  ─► query returns QueryFailure     │
//! │  with_delay()    ─► sleep before answering         │
//! │  requests()      ─► log of received QueryRequests  │
//! └────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{QueryClient, QueryFailure, QueryRequest};
use crate::candidate::{Record, DISTANCE_KEY};

#[derive(Debug, Clone)]
enum MockTable {
    Records(Vec<Record>),
    Failure(QueryFailure),
}

/// In-memory [`QueryClient`] with deterministic answers.
///
/// # Example
///
/// ```
/// use edgequake_search::client::MockQueryClient;
/// use serde_json::json;
///
/// let client = MockQueryClient::new()
///     .with_json_table("Docs", json!([{"ID": 1, "@distance": 0.1}]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockQueryClient {
    tables: HashMap<String, MockTable>,
    delays: HashMap<String, Duration>,
    requests: Arc<Mutex<Vec<QueryRequest>>>,
}

impl MockQueryClient {
    /// Create an empty mock client. Unknown tables fail with "Table not found".
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `records` for `table`, in order.
    pub fn with_table(mut self, table: impl Into<String>, records: Vec<Record>) -> Self {
        self.tables.insert(table.into(), MockTable::Records(records));
        self
    }

    /// Serve a JSON array of objects for `table`. Non-object entries are skipped.
    pub fn with_json_table(self, table: impl Into<String>, records: serde_json::Value) -> Self {
        let records = match records {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        self.with_table(table, records)
    }

    /// Make every query against `table` fail with `failure`.
    pub fn with_failure(mut self, table: impl Into<String>, failure: QueryFailure) -> Self {
        self.tables.insert(table.into(), MockTable::Failure(failure));
        self
    }

    /// Delay answers for `table`.
    pub fn with_delay(mut self, table: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(table.into(), delay);
        self
    }

    /// Requests received so far, in arrival order.
    pub async fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of requests received so far.
    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl QueryClient for MockQueryClient {
    async fn query(&self, request: &QueryRequest) -> Result<Vec<Record>, QueryFailure> {
        self.requests.lock().await.push(request.clone());

        if let Some(delay) = self.delays.get(&request.table) {
            tokio::time::sleep(*delay).await;
        }

        match self.tables.get(&request.table) {
            Some(MockTable::Records(records)) => Ok(records
                .iter()
                .take(request.limit)
                .cloned()
                .map(|mut record| {
                    if !request.with_distance {
                        record.remove(DISTANCE_KEY);
                    }
                    record
                })
                .collect()),
            Some(MockTable::Failure(failure)) => Err(failure.clone()),
            None => Err(QueryFailure::with_status(
                404,
                Some(format!("Table not found: {}", request.table)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(table: &str, limit: usize, with_distance: bool) -> QueryRequest {
        QueryRequest {
            table: table.to_string(),
            query_text: Some("q".to_string()),
            query_index: None,
            query_field: None,
            query_vector: None,
            response_fields: vec![],
            limit,
            filter: None,
            with_distance,
        }
    }

    #[tokio::test]
    async fn test_mock_honours_limit_and_order() {
        let client = MockQueryClient::new().with_json_table(
            "Docs",
            json!([{"ID": 3}, {"ID": 1}, {"ID": 2}]),
        );

        let records = client.query(&request("Docs", 2, true)).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["ID"], json!(3));
        assert_eq!(records[1]["ID"], json!(1));
    }

    #[tokio::test]
    async fn test_mock_strips_distance_when_not_requested() {
        let client =
            MockQueryClient::new().with_json_table("Docs", json!([{"ID": 1, "@distance": 0.3}]));

        let records = client.query(&request("Docs", 10, false)).await.unwrap();
        assert!(records[0].get(DISTANCE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_mock_unknown_table_fails() {
        let client = MockQueryClient::new();
        let failure = client.query(&request("Nope", 1, true)).await.unwrap_err();
        assert_eq!(failure.status_code, Some(404));
        assert!(failure.message_or_default().contains("Nope"));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let client = MockQueryClient::new()
            .with_failure("Broken", QueryFailure::new("boom"));

        let _ = client.query(&request("Broken", 1, true)).await;
        let requests = client.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].table, "Broken");
    }
}
