use std::path::PathBuf;

use anyhow::{Context, Result};

/// Keys that must be present before any workflow component is constructed.
pub const REQUIRED_KEYS: [&str; 2] = ["OPENAI_API_KEY", "ANTHROPIC_API_KEY"];

/// Location of the persisted example store, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "./content_memory/scriptsmith.db";

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Which embedder backs the similarity queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    OpenAi,
    /// Deterministic hashing embedder; no network access.
    Local,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub anthropic_api_key: String,
    pub store_path: PathBuf,
    pub embedding_provider: EmbeddingProvider,
    pub embedding_model: String,
    pub redis_url: Option<String>,
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

/// Outcome of the startup configuration check.
#[derive(Debug)]
pub enum Readiness {
    Ready(Config),
    MissingConfig(Vec<&'static str>),
}

impl Config {
    /// Reads configuration from the process environment (and `.env` if present).
    pub fn check() -> Result<Readiness> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::check_with(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    /// Empty values count as missing.
    pub fn check_with<F>(lookup: F) -> Result<Readiness>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Ok(Readiness::MissingConfig(missing));
        }

        let embedding_provider = match get("EMBEDDING_PROVIDER").as_deref() {
            None | Some("openai") => EmbeddingProvider::OpenAi,
            Some("local") => EmbeddingProvider::Local,
            Some(other) => anyhow::bail!(
                "EMBEDDING_PROVIDER must be 'openai' or 'local', got '{other}'"
            ),
        };

        Ok(Readiness::Ready(Config {
            openai_api_key: get("OPENAI_API_KEY").unwrap_or_default(),
            anthropic_api_key: get("ANTHROPIC_API_KEY").unwrap_or_default(),
            store_path: get("CONTENT_MEMORY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            embedding_provider,
            embedding_model: get("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            redis_url: get("REDIS_URL"),
            session_ttl_secs: match get("SESSION_TTL_SECS") {
                Some(v) => {
                    let secs = v
                        .parse::<u64>()
                        .context("SESSION_TTL_SECS must be a whole number of seconds")?;
                    if secs == 0 {
                        anyhow::bail!("SESSION_TTL_SECS must be at least 1");
                    }
                    secs
                }
                None => DEFAULT_SESSION_TTL_SECS,
            },
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }))
    }
}

#[cfg(test)]
impl Config {
    /// Ready-made configuration that never touches the network for embeddings.
    pub(crate) fn for_tests() -> Self {
        Config {
            openai_api_key: "sk-test".to_string(),
            anthropic_api_key: "ak-test".to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            embedding_provider: EmbeddingProvider::Local,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            redis_url: None,
            session_ttl_secs: 60,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}
