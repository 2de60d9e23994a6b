//! Multi-retriever search engine.
//!
//! Fans a query out to every configured retriever, waits for all candidate
//! lists, then fuses them with the configured reranker.
//!
//! # State Machine
//!
//! ```ascii
//!            add_retriever              set_reranker (valid)
//!   ┌───────┐ ─────────────► ┌────────────┐ ─────────────► ┌───────┐
//!   │ Empty │                │ Configured │                │ Ready │
//!   └───────┘                └────────────┘ ◄───────────── └───────┘
//!                                  ▲  │     add_retriever /
//!                                  └──┘     clear_reranker
//!                           set_reranker (invalid)
//! ```
//!
//! # Search Flow
//!
//! ```ascii
//! query ──┬──► retriever 0 ──► list 0 ──┐
//!         ├──► retriever 1 ──► list 1 ──┼──► (join) ──► reranker ──► results
//!         └──► retriever n ──► list n ──┘
//!              (each bounded by timeout; first error aborts the rest)
//! ```

use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::candidate::CandidateList;
use crate::client::QueryClient;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::reranker::{FusionReranker, Reranker, RerankerConfig};
use crate::retriever::{RetrieverConfig, VectorRetriever};

/// Default per-retriever timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration state of a [`SearchEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No retrievers.
    Empty,
    /// At least one retriever, no reranker.
    Configured,
    /// Reranker set and consistent with the current retrievers.
    Ready,
}

/// Orchestrates retrievers and fusion.
///
/// Configure from a single task with [`add_retriever`](Self::add_retriever) and
/// [`set_reranker`](Self::set_reranker); once configured, `search` only needs
/// `&self` and may run concurrently.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use edgequake_search::client::MockQueryClient;
/// use edgequake_search::{RerankerConfig, RetrieverConfig, SearchEngine};
/// use serde_json::json;
///
/// let client = Arc::new(
///     MockQueryClient::new()
///         .with_json_table("Dense", json!([{"ID": 1, "@distance": 0.1}]))
///         .with_json_table("Sparse", json!([{"ID": 2, "@distance": 0.4}])),
/// );
///
/// let mut engine = SearchEngine::new(client);
/// engine
///     .add_retriever(RetrieverConfig::new("Dense"))
///     .add_retriever(RetrieverConfig::new("Sparse"));
/// engine.set_reranker(RerankerConfig::rrf().with_limit(10)).unwrap();
/// ```
pub struct SearchEngine {
    client: Arc<dyn QueryClient>,
    retrievers: Vec<VectorRetriever>,
    reranker: Option<FusionReranker>,
    timeout: Duration,
}

impl SearchEngine {
    /// Create an engine with no retrievers.
    pub fn new(client: Arc<dyn QueryClient>) -> Self {
        Self {
            client,
            retrievers: Vec::new(),
            reranker: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build an engine from a [`SearchConfig`].
    ///
    /// Retrievers are added in order, then the reranker (if any) is set.
    pub fn from_config(client: Arc<dyn QueryClient>, config: &SearchConfig) -> Result<Self> {
        let mut engine = Self::new(client).with_timeout(config.timeout());
        for retriever in &config.retrievers {
            engine.add_retriever(retriever.clone());
        }
        if let Some(reranker) = &config.reranker {
            engine.set_reranker(reranker.clone())?;
        }
        Ok(engine)
    }

    /// Set the per-retriever timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-retriever timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current configuration state.
    pub fn state(&self) -> EngineState {
        match (self.retrievers.is_empty(), self.reranker.is_some()) {
            (true, _) => EngineState::Empty,
            (false, false) => EngineState::Configured,
            (false, true) => EngineState::Ready,
        }
    }

    /// Configured retrievers, in fan-out order.
    pub fn retrievers(&self) -> &[VectorRetriever] {
        &self.retrievers
    }

    /// Active reranker, if any.
    pub fn reranker(&self) -> Option<&FusionReranker> {
        self.reranker.as_ref()
    }

    /// Append a retriever.
    ///
    /// Always clears the reranker: a fusion strategy validated for the old
    /// retriever set must be confirmed again for the new one.
    pub fn add_retriever(&mut self, config: RetrieverConfig) -> &mut Self {
        if self.reranker.take().is_some() {
            info!(
                "Reranker cleared after adding retriever for table {}",
                config.table
            );
        }
        self.retrievers
            .push(VectorRetriever::new(Arc::clone(&self.client), config));
        self
    }

    /// Validate `config` against the current retrievers and make it active.
    ///
    /// On error the engine is left unchanged.
    ///
    /// # Errors
    ///
    /// [`SearchError::ConfigError`] if no retrievers exist, if weights or
    /// scale ranges do not match the retriever count, or if a distance-based
    /// strategy is requested while a retriever has distances disabled.
    pub fn set_reranker(&mut self, config: RerankerConfig) -> Result<&mut Self> {
        if self.retrievers.is_empty() {
            return Err(SearchError::config(
                "Cannot set a reranker before adding a retriever",
            ));
        }

        if config.kind.requires_distance() {
            if let Some(retriever) = self.retrievers.iter().find(|r| !r.config().with_distance) {
                return Err(SearchError::config(format!(
                    "{} reranker needs distances but retriever for table {} has with_distance disabled",
                    config.kind,
                    retriever.table()
                )));
            }
        }

        let reranker = config.build(self.retrievers.len())?;
        debug!(
            "Reranker {} set for {} retrievers",
            reranker.name(),
            self.retrievers.len()
        );
        self.reranker = Some(reranker);
        Ok(self)
    }

    /// Remove the active reranker.
    pub fn clear_reranker(&mut self) -> &mut Self {
        self.reranker = None;
        self
    }

    /// Run `query` against every retriever and fuse the results.
    ///
    /// With one retriever and no reranker the retriever's list is returned
    /// unchanged. Any retriever failure or timeout fails the whole search.
    ///
    /// # Errors
    ///
    /// - [`SearchError::ConfigError`] if no retriever is configured, or more
    ///   than one is configured without a reranker
    /// - [`SearchError::RetrievalError`] / [`SearchError::Timeout`] from a retriever
    /// - Schema errors from record conversion or distance-based fusion
    #[instrument(skip(self, query), fields(retrievers = self.retrievers.len()))]
    pub async fn search(&self, query: &str) -> Result<CandidateList> {
        if self.retrievers.is_empty() {
            return Err(SearchError::config("No retriever added to the search engine"));
        }
        if self.retrievers.len() > 1 && self.reranker.is_none() {
            return Err(SearchError::config(
                "More than one retriever added to the search engine, but no reranker is set: fusion strategy required",
            ));
        }

        let lists = try_join_all(
            self.retrievers
                .iter()
                .map(|retriever| self.retrieve_bounded(retriever, query)),
        )
        .await?;

        match &self.reranker {
            Some(reranker) => {
                let results = reranker.rerank(&lists)?;
                debug!(
                    "Fused {} lists into {} results with {}",
                    lists.len(),
                    results.len(),
                    reranker.name()
                );
                Ok(results)
            }
            None => Ok(lists.into_iter().next().unwrap_or_default()),
        }
    }

    async fn retrieve_bounded(
        &self,
        retriever: &VectorRetriever,
        query: &str,
    ) -> Result<CandidateList> {
        match tokio::time::timeout(self.timeout, retriever.retrieve(query)).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout {
                table: retriever.table().to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("retrievers", &self.retrievers)
            .field("reranker", &self.reranker)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockQueryClient;
    use crate::reranker::{RerankerKind, ScaleRange};

    fn engine() -> SearchEngine {
        SearchEngine::new(Arc::new(MockQueryClient::new()))
    }

    #[test]
    fn test_state_transitions() {
        let mut engine = engine();
        assert_eq!(engine.state(), EngineState::Empty);

        engine.add_retriever(RetrieverConfig::new("A"));
        assert_eq!(engine.state(), EngineState::Configured);

        engine.set_reranker(RerankerConfig::rrf()).unwrap();
        assert_eq!(engine.state(), EngineState::Ready);

        engine.add_retriever(RetrieverConfig::new("B"));
        assert_eq!(engine.state(), EngineState::Configured);
        assert!(engine.reranker().is_none());

        engine.set_reranker(RerankerConfig::rsf()).unwrap();
        engine.clear_reranker();
        assert_eq!(engine.state(), EngineState::Configured);
    }

    #[test]
    fn test_set_reranker_requires_retriever() {
        let mut engine = engine();
        assert!(engine.set_reranker(RerankerConfig::rrf()).is_err());
        assert_eq!(engine.state(), EngineState::Empty);
    }

    #[test]
    fn test_failed_set_reranker_keeps_previous() {
        let mut engine = engine();
        engine
            .add_retriever(RetrieverConfig::new("A"))
            .add_retriever(RetrieverConfig::new("B"));
        engine.set_reranker(RerankerConfig::rsf()).unwrap();

        let err = engine
            .set_reranker(RerankerConfig::rrf().with_weights(vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, SearchError::ConfigError(_)));
        assert_eq!(engine.reranker().map(|r| r.kind()), Some(RerankerKind::Rsf));
    }

    #[test]
    fn test_distance_fusion_needs_with_distance() {
        let mut engine = engine();
        engine
            .add_retriever(RetrieverConfig::new("A"))
            .add_retriever(RetrieverConfig::new("B").with_distance(false));

        assert!(engine.set_reranker(RerankerConfig::rsf()).is_err());
        assert!(engine
            .set_reranker(RerankerConfig::dbsf(vec![ScaleRange::new(0.0, 1.0); 2]))
            .is_err());
        assert!(engine.set_reranker(RerankerConfig::rrf()).is_ok());
    }

    #[test]
    fn test_with_timeout() {
        let engine = engine().with_timeout(Duration::from_millis(250));
        assert_eq!(engine.timeout(), Duration::from_millis(250));
        assert_eq!(self::engine().timeout(), DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_search_without_retrievers() {
        let err = engine().search("q").await.unwrap_err();
        assert!(err.to_string().contains("No retriever"));
    }
}
