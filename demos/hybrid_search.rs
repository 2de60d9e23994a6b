//! Hybrid search example
//!
//! Fuses a dense and a sparse retriever over the same table with each of the
//! three fusion strategies.
//!
//! Run with: cargo run --example hybrid_search
//! No database required - uses the in-memory MockQueryClient
//!
//! This example shows:
//! - Configuring retrievers against named indexes
//! - Switching fusion strategies on one engine
//! - Inspecting fused scores with `Reranker::fuse`

use std::sync::Arc;

use edgequake_search::client::MockQueryClient;
use edgequake_search::{
    Candidate, FusedCandidate, Reranker, RerankerConfig, RetrieverConfig, ScaleRange,
    SearchEngine, VectorRetriever,
};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🔀 EdgeQuake Search - Hybrid Search Example\n");

    // Dense distances are cosine in [0, 1]; sparse ones are unbounded BM25-like.
    let client = Arc::new(
        MockQueryClient::new()
            .with_json_table(
                "ArticlesDense",
                json!([
                    {"ID": 11, "title": "Ownership and borrowing", "@distance": 0.12},
                    {"ID": 42, "title": "Memory safety without GC", "@distance": 0.18},
                    {"ID": 7, "title": "Async Rust in practice", "@distance": 0.35},
                    {"ID": 3, "title": "Zero-cost abstractions", "@distance": 0.41}
                ]),
            )
            .with_json_table(
                "ArticlesSparse",
                json!([
                    {"ID": 42, "title": "Memory safety without GC", "@distance": 4.0},
                    {"ID": 19, "title": "Garbage collection in Java", "@distance": 9.5},
                    {"ID": 11, "title": "Ownership and borrowing", "@distance": 12.0},
                    {"ID": 5, "title": "Python memory model", "@distance": 30.0}
                ]),
            ),
    );

    let dense = RetrieverConfig::new("ArticlesDense")
        .with_query_index("dense")
        .with_response_fields(["title"])
        .with_limit(4);
    let sparse = RetrieverConfig::new("ArticlesSparse")
        .with_query_index("sparse")
        .with_response_fields(["title"])
        .with_limit(4);

    let query = "rust memory safety without garbage collection";
    println!("📝 Query: \"{}\"", query);
    println!("{}", "─".repeat(60));

    let mut engine = SearchEngine::new(client.clone());
    engine.add_retriever(dense.clone()).add_retriever(sparse.clone());

    let strategies = [
        ("Reciprocal Rank Fusion", RerankerConfig::rrf().with_limit(5)),
        ("Relative Score Fusion", RerankerConfig::rsf().with_limit(5)),
        (
            "Distribution-Based Score Fusion",
            RerankerConfig::dbsf(vec![ScaleRange::new(0.0, 1.0), ScaleRange::new(0.0, 40.0)])
                .with_weights(vec![0.6, 0.4])
                .with_limit(5),
        ),
    ];

    for (label, config) in &strategies {
        println!("\n📊 {} ({})\n", label, config.kind);
        engine.set_reranker(config.clone())?;
        let results = engine.search(query).await?;
        print_results(&results);
    }

    // Scores are only exposed by the reranker itself.
    println!("\n🔍 RRF scores (k=50)\n");
    let lists = vec![
        VectorRetriever::new(client.clone(), dense).retrieve(query).await?,
        VectorRetriever::new(client, sparse).retrieve(query).await?,
    ];
    let rrf = RerankerConfig::rrf().build(lists.len())?;
    print_scores(&rrf.fuse(&lists)?);

    println!("\n{}", "─".repeat(60));
    println!("✅ Hybrid search complete!");

    Ok(())
}

fn print_results(results: &[Candidate]) {
    for (rank, candidate) in results.iter().enumerate() {
        println!(
            "  {}. [id={}] {}",
            rank + 1,
            candidate.id,
            title(candidate)
        );
    }
}

fn print_scores(fused: &[FusedCandidate]) {
    for (rank, entry) in fused.iter().enumerate() {
        println!(
            "  {}. [score={:.4}] {}",
            rank + 1,
            entry.score,
            title(&entry.candidate)
        );
    }
}

fn title(candidate: &Candidate) -> &str {
    candidate
        .field("title")
        .and_then(|value| value.as_str())
        .unwrap_or("<untitled>")
}
