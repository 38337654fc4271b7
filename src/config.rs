use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Which vector index backend the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexBackend {
    /// Cloudflare Vectorize over HTTP (production).
    Vectorize,
    /// In-process brute-force index (local runs and tests).
    Memory,
}

/// Credentials and addressing for the Cloudflare-hosted collaborators.
///
/// The account id and API token are secrets and only ever read from the
/// environment, never from the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudflareConfig {
    pub api_base: String,
    pub account_id: String,
    #[serde(skip_serializing)]
    pub api_token: String,
    pub vectorize_index: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Contract-fixed embedding dimension. Every stored vector has this length.
    pub dimension: usize,
    /// Minimum trimmed length for a chunk to survive the chunker.
    pub min_chunk_len: usize,
    /// Looser floor applied at ingestion, for texts that bypass the chunker.
    pub min_ingest_len: usize,
    /// Neighbors requested from the index per query.
    pub top_k: usize,
    /// Relevance gate: matches scoring at or below this are dropped.
    pub score_threshold: f64,
    /// How many trailing conversation turns are forwarded to generation.
    pub history_window: usize,
    /// Maximum citations returned alongside an answer.
    pub max_sources: usize,
    /// Result cap for the document listing snapshot.
    pub list_limit: usize,
    pub max_tokens: u32,
    pub temperature: f64,
    pub embedding_model: String,
    pub chat_model: String,
    pub index_backend: IndexBackend,
    pub cloudflare: CloudflareConfig,
    pub log_dir: PathBuf,
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dimension: 768,
            min_chunk_len: 20,
            min_ingest_len: 10,
            top_k: 5,
            score_threshold: 0.3,
            history_window: 4,
            max_sources: 3,
            list_limit: 100,
            max_tokens: 512,
            temperature: 0.7,
            embedding_model: "@cf/baai/bge-base-en-v1.5".to_string(),
            chat_model: "@cf/meta/llama-3.1-8b-instruct".to_string(),
            index_backend: IndexBackend::Vectorize,
            cloudflare: CloudflareConfig {
                api_base: "https://api.cloudflare.com/client/v4".to_string(),
                ..CloudflareConfig::default()
            },
            log_dir: PathBuf::from("logs"),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from `config.toml` (or `$RAGCHAT_CONFIG`) if the
    /// file exists, then apply environment overrides and validate.
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var("RAGCHAT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(account_id) = env::var("RAGCHAT_CF_ACCOUNT_ID") {
            self.cloudflare.account_id = account_id;
        }
        if let Ok(token) = env::var("RAGCHAT_CF_API_TOKEN") {
            self.cloudflare.api_token = token;
        }
        if let Ok(index) = env::var("RAGCHAT_VECTORIZE_INDEX") {
            self.cloudflare.vectorize_index = index;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.dimension > 0, "dimension must be positive");
        anyhow::ensure!(self.top_k > 0, "top_k must be positive");
        anyhow::ensure!(
            (-1.0..=1.0).contains(&self.score_threshold),
            "score_threshold must be within [-1, 1]"
        );
        anyhow::ensure!(self.max_sources > 0, "max_sources must be positive");
        anyhow::ensure!(self.list_limit > 0, "list_limit must be positive");
        anyhow::ensure!(
            self.min_ingest_len <= self.min_chunk_len,
            "min_ingest_len must not exceed min_chunk_len"
        );
        if self.index_backend == IndexBackend::Vectorize {
            anyhow::ensure!(
                !self.cloudflare.account_id.is_empty() && !self.cloudflare.api_token.is_empty(),
                "Cloudflare credentials are required for the vectorize backend \
                 (set RAGCHAT_CF_ACCOUNT_ID and RAGCHAT_CF_API_TOKEN)"
            );
            anyhow::ensure!(
                !self.cloudflare.vectorize_index.is_empty(),
                "vectorize_index is required for the vectorize backend"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_deployed_behavior() {
        let config = AppConfig::default();
        assert_eq!(config.dimension, 768);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.score_threshold, 0.3);
        assert_eq!(config.history_window, 4);
        assert_eq!(config.max_sources, 3);
        assert_eq!(config.list_limit, 100);
    }

    #[test]
    fn loads_partial_toml_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "top_k = 8\nscore_threshold = 0.5\nindex_backend = \"memory\""
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.top_k, 8);
        assert_eq!(config.score_threshold, 0.5);
        assert_eq!(config.index_backend, IndexBackend::Memory);
        // Untouched fields keep their defaults.
        assert_eq!(config.dimension, 768);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let config = AppConfig {
            score_threshold: 1.5,
            index_backend: IndexBackend::Memory,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn vectorize_backend_requires_credentials() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }
}
