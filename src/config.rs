//! Search Configuration Module
//!
//! TOML-based configuration describing the retrievers, the fusion strategy and
//! the per-retriever timeout of a [`SearchEngine`](crate::SearchEngine).
//!
//! # Configuration File Location
//!
//! [`SearchConfig::load`] looks in order at:
//! 1. `EDGEQUAKE_SEARCH_CONFIG` environment variable
//! 2. `./search.toml` (current working directory)
//! 3. `~/.edgequake/search.toml` (user config)
//! 4. Empty default configuration
//!
//! # Example Configuration
//!
//! ```toml
//! timeout_secs = 10
//!
//! [[retrievers]]
//! table = "Articles"
//! primary_key_field = "ID"
//! query_index = "dense"
//! limit = 5
//!
//! [[retrievers]]
//! table = "Articles"
//! query_index = "sparse"
//! limit = 5
//! filter = "lang = 'en'"
//!
//! [reranker]
//! type = "dbsf"
//! scale_ranges = [[0.0, 1.0], [0.0, 40.0]]
//! weights = [0.6, 0.4]
//! limit = 5
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::engine::DEFAULT_TIMEOUT;
use crate::error::{Result, SearchError};
use crate::reranker::RerankerConfig;
use crate::retriever::RetrieverConfig;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "EDGEQUAKE_SEARCH_CONFIG";

/// File name searched in the working directory and `~/.edgequake/`.
pub const CONFIG_FILE_NAME: &str = "search.toml";

/// Declarative search engine setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Per-retriever timeout in seconds. Defaults to 30.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Retrievers, in fan-out order.
    #[serde(default)]
    pub retrievers: Vec<RetrieverConfig>,

    /// Fusion strategy. Required when more than one retriever is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reranker: Option<RerankerConfig>,
}

impl SearchConfig {
    /// Load configuration from the first existing file in
    /// [`search_paths`](Self::search_paths), or the empty default.
    pub fn load() -> Result<Self> {
        for path in Self::search_paths() {
            if path.is_file() {
                return Self::from_file(&path);
            }
            debug!("No search config at {}", path.display());
        }
        debug!("Using default search config");
        Ok(Self::default())
    }

    /// Config file locations in lookup order.
    ///
    /// The `EDGEQUAKE_SEARCH_CONFIG` path comes first when set, then
    /// `./search.toml`, then `~/.edgequake/search.toml`.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(3);
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from(CONFIG_FILE_NAME));
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".edgequake").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Load configuration from a specific file path.
    ///
    /// Parse errors name the offending file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)
            .map_err(|e| SearchError::ParseError(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded search config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| SearchError::ParseError(e.to_string()))
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SearchError::ParseError(e.to_string()))
    }

    /// Write configuration to `path`, creating missing parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        debug!("Saved search config to {}", path.display());
        Ok(())
    }

    /// Per-retriever timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}
