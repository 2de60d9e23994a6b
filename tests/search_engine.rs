//! End-to-end tests for SearchEngine fan-out and fusion.
//!
//! All retrieval goes through MockQueryClient; time-dependent tests run on a
//! paused tokio clock so they are deterministic.

use std::sync::Arc;
use std::time::Duration;

use edgequake_search::client::MockQueryClient;
use edgequake_search::{
    CandidateId, EngineState, ErrorKind, QueryFailure, RerankerConfig, RetrieverConfig,
    ScaleRange, SearchConfig, SearchEngine, SearchError,
};
use serde_json::json;

fn ids(results: &[edgequake_search::Candidate]) -> Vec<CandidateId> {
    results.iter().map(|c| c.id.clone()).collect()
}

fn int_ids(values: &[i64]) -> Vec<CandidateId> {
    values.iter().map(|&v| CandidateId::Int(v)).collect()
}

fn two_table_client() -> MockQueryClient {
    MockQueryClient::new()
        .with_json_table(
            "A",
            json!([
                {"ID": 1, "title": "one", "@distance": 0.1},
                {"ID": 2, "title": "two", "@distance": 0.2}
            ]),
        )
        .with_json_table(
            "B",
            json!([
                {"ID": 2, "title": "two (b)", "@distance": 0.3},
                {"ID": 3, "title": "three", "@distance": 0.9}
            ]),
        )
}

#[tokio::test]
async fn test_rrf_shared_id_ranks_first() {
    let mut engine = SearchEngine::new(Arc::new(two_table_client()));
    engine
        .add_retriever(RetrieverConfig::new("A"))
        .add_retriever(RetrieverConfig::new("B"));
    engine.set_reranker(RerankerConfig::rrf()).unwrap();

    let results = engine.search("anything").await.unwrap();

    assert_eq!(ids(&results), int_ids(&[2, 1, 3]));
    // payload of id 2 comes from the first retriever
    assert_eq!(results[0].field("title"), Some(&json!("two")));
}

#[tokio::test]
async fn test_single_retriever_returns_list_unchanged() {
    let client = MockQueryClient::new().with_json_table(
        "Docs",
        json!([
            {"ID": "c", "@distance": 0.9},
            {"ID": "a", "@distance": 0.1},
            {"ID": "b", "@distance": 0.5}
        ]),
    );
    let mut engine = SearchEngine::new(Arc::new(client));
    engine.add_retriever(RetrieverConfig::new("Docs").with_limit(3));
    assert_eq!(engine.state(), EngineState::Configured);

    let results = engine.search("q").await.unwrap();

    let order: Vec<CandidateId> = ["c", "a", "b"].into_iter().map(CandidateId::from).collect();
    assert_eq!(ids(&results), order);
    assert_eq!(results[0].distance, Some(0.9));
}

#[tokio::test]
async fn test_two_retrievers_without_reranker_fail() {
    let client = Arc::new(two_table_client());
    let mut engine = SearchEngine::new(client.clone());
    engine
        .add_retriever(RetrieverConfig::new("A"))
        .add_retriever(RetrieverConfig::new("B"));

    let err = engine.search("q").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("fusion strategy required"));
    assert_eq!(client.request_count().await, 0);
}

#[tokio::test]
async fn test_adding_retriever_invalidates_reranker() {
    let mut engine = SearchEngine::new(Arc::new(two_table_client()));
    engine.add_retriever(RetrieverConfig::new("A"));
    engine.set_reranker(RerankerConfig::rrf()).unwrap();
    engine.add_retriever(RetrieverConfig::new("B"));

    let err = engine.search("q").await.unwrap_err();
    assert!(matches!(err, SearchError::ConfigError(_)));
}

#[tokio::test]
async fn test_rsf_end_to_end() {
    let mut engine = SearchEngine::new(Arc::new(two_table_client()));
    engine
        .add_retriever(RetrieverConfig::new("A"))
        .add_retriever(RetrieverConfig::new("B"));
    engine.set_reranker(RerankerConfig::rsf()).unwrap();

    let results = engine.search("q").await.unwrap();

    // A: 1 -> 1.0, 2 -> 0.0; B: 2 -> 1.0, 3 -> 0.0
    assert_eq!(ids(&results), int_ids(&[1, 2, 3]));
}

#[tokio::test]
async fn test_dbsf_end_to_end_with_limit() {
    let mut engine = SearchEngine::new(Arc::new(two_table_client()));
    engine
        .add_retriever(RetrieverConfig::new("A"))
        .add_retriever(RetrieverConfig::new("B"));
    engine
        .set_reranker(
            RerankerConfig::dbsf(vec![ScaleRange::new(0.0, 1.0), ScaleRange::new(0.0, 1.0)])
                .with_limit(2),
        )
        .unwrap();

    let results = engine.search("q").await.unwrap();

    // 2: 0.8 + 0.7, 1: 0.9, 3: 0.1
    assert_eq!(ids(&results), int_ids(&[2, 1]));
}

#[tokio::test]
async fn test_forwards_retriever_configuration() {
    let client = Arc::new(two_table_client());
    let mut engine = SearchEngine::new(client.clone());
    engine.add_retriever(
        RetrieverConfig::new("A")
            .with_query_index("dense")
            .with_response_fields(["title"])
            .with_limit(1)
            .with_filter("ID > 0"),
    );

    let results = engine.search("rust").await.unwrap();
    assert_eq!(results.len(), 1);

    let requests = client.requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.table, "A");
    assert_eq!(request.query_text.as_deref(), Some("rust"));
    assert_eq!(request.query_index.as_deref(), Some("dense"));
    assert_eq!(request.response_fields, vec!["title"]);
    assert_eq!(request.limit, 1);
    assert_eq!(request.filter.as_deref(), Some("ID > 0"));
    assert!(request.with_distance);
}

#[tokio::test]
async fn test_retrieval_failure_aborts_search() {
    let client = two_table_client().with_failure("B", QueryFailure::new("shard offline"));
    let mut engine = SearchEngine::new(Arc::new(client));
    engine
        .add_retriever(RetrieverConfig::new("A"))
        .add_retriever(RetrieverConfig::new("B"));
    engine.set_reranker(RerankerConfig::rrf()).unwrap();

    let err = engine.search("q").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Retrieval);
    assert_eq!(err.table(), Some("B"));
    assert!(err.to_string().contains("shard offline"));
}

#[tokio::test]
async fn test_missing_primary_key_aborts_search() {
    let client = two_table_client().with_json_table("C", json!([{"title": "keyless"}]));
    let mut engine = SearchEngine::new(Arc::new(client));
    engine
        .add_retriever(RetrieverConfig::new("A"))
        .add_retriever(RetrieverConfig::new("C"));
    engine.set_reranker(RerankerConfig::rrf()).unwrap();

    let err = engine.search("q").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(matches!(err, SearchError::MissingPrimaryKey { ref table, .. } if table == "C"));
}

#[tokio::test(start_paused = true)]
async fn test_retrievers_run_concurrently() {
    let client = two_table_client()
        .with_delay("A", Duration::from_millis(200))
        .with_delay("B", Duration::from_millis(200));
    let mut engine = SearchEngine::new(Arc::new(client));
    engine
        .add_retriever(RetrieverConfig::new("A"))
        .add_retriever(RetrieverConfig::new("B"));
    engine.set_reranker(RerankerConfig::rrf()).unwrap();

    let start = tokio::time::Instant::now();
    let results = engine.search("q").await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(start.elapsed() < Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn test_slow_retriever_times_out() {
    let client = two_table_client().with_delay("B", Duration::from_secs(5));
    let mut engine =
        SearchEngine::new(Arc::new(client)).with_timeout(Duration::from_millis(100));
    engine
        .add_retriever(RetrieverConfig::new("A"))
        .add_retriever(RetrieverConfig::new("B"));
    engine.set_reranker(RerankerConfig::rrf()).unwrap();

    let err = engine.search("q").await.unwrap_err();

    match err {
        SearchError::Timeout { table, timeout } => {
            assert_eq!(table, "B");
            assert_eq!(timeout, Duration::from_millis(100));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_failure_cancels_outstanding_retrievers() {
    let client = two_table_client()
        .with_delay("A", Duration::from_secs(10))
        .with_failure("B", QueryFailure::new("boom"));
    let mut engine = SearchEngine::new(Arc::new(client));
    engine
        .add_retriever(RetrieverConfig::new("A"))
        .add_retriever(RetrieverConfig::new("B"));
    engine.set_reranker(RerankerConfig::rrf()).unwrap();

    let start = tokio::time::Instant::now();
    let err = engine.search("q").await.unwrap_err();

    assert_eq!(err.table(), Some("B"));
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_engine_from_toml_config() {
    let config = SearchConfig::from_toml(
        r#"
timeout_secs = 5

[[retrievers]]
table = "A"

[[retrievers]]
table = "B"

[reranker]
type = "rrf"
k = 50
weights = [1.0, 1.0]
limit = 2
"#,
    )
    .unwrap();

    let engine = SearchEngine::from_config(Arc::new(two_table_client()), &config).unwrap();
    assert_eq!(engine.state(), EngineState::Ready);
    assert_eq!(engine.timeout(), Duration::from_secs(5));

    let results = engine.search("q").await.unwrap();
    assert_eq!(ids(&results), int_ids(&[2, 1]));
}

#[tokio::test]
async fn test_engine_from_invalid_config() {
    let config = SearchConfig::from_toml(
        r#"
[[retrievers]]
table = "A"

[reranker]
type = "rrf"
weights = [1.0, 1.0]
"#,
    )
    .unwrap();

    let err = SearchEngine::from_config(Arc::new(two_table_client()), &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
