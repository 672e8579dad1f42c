//! TOML configuration parsing.
//!
//! Every section is optional; omitted values fall back to the defaults
//! below. A missing config file is not an error for the CLI, which uses
//! [`Config::minimal`] instead. `PORT` and `FRONTEND_URL` from the
//! environment override the file (see [`Config::apply_env`]).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Allowed CORS origin. `None` allows any origin.
    #[serde(default)]
    pub frontend_url: Option<String>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            frontend_url: None,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON snapshot of the whole document collection.
    #[serde(default = "default_documents_file")]
    pub documents_file: PathBuf,
    /// Directory holding one raw file per uploaded document.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            documents_file: default_documents_file(),
            uploads_dir: default_uploads_dir(),
        }
    }
}

fn default_documents_file() -> PathBuf {
    PathBuf::from("./data/documents.json")
}
fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./data/uploads")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    crate::chunk::DEFAULT_CHUNK_SIZE
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Maximum number of source citations returned per question.
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_sources: default_max_sources(),
        }
    }
}

fn default_max_sources() -> usize {
    crate::retrieve::DEFAULT_MAX_SOURCES
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout for completion calls. `0` disables the timeout.
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: 0,
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.0-flash-lite".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl LlmConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl Config {
    /// All-defaults configuration, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Applies `PORT` and `FRONTEND_URL` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("PORT").ok().as_deref(),
            std::env::var("FRONTEND_URL").ok().as_deref(),
        );
    }

    fn apply_overrides(&mut self, port: Option<&str>, frontend_url: Option<&str>) {
        if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
            self.server.bind = format!("0.0.0.0:{}", port);
        }
        if let Some(url) = frontend_url.map(str::trim).filter(|u| !u.is_empty()) {
            self.server.frontend_url = Some(url.to_string());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            anyhow::bail!("chunking.chunk_size must be > 0");
        }

        if self.retrieval.max_sources == 0 {
            anyhow::bail!("retrieval.max_sources must be >= 1");
        }

        if self.server.max_upload_bytes == 0 {
            anyhow::bail!("server.max_upload_bytes must be > 0");
        }

        match self.llm.provider.as_str() {
            "disabled" | "gemini" => {}
            other => anyhow::bail!(
                "Unknown llm provider: '{}'. Must be gemini or disabled.",
                other
            ),
        }

        if self.llm.is_enabled() && self.llm.api_key_env.trim().is_empty() {
            anyhow::bail!(
                "llm.api_key_env must name an environment variable when provider is '{}'",
                self.llm.provider
            );
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

/// Loads `path` if it exists, otherwise falls back to [`Config::minimal`].
/// Environment overrides are applied in both cases.
pub fn load_or_default(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        load_config(path)?
    } else {
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        Config::minimal()
    };
    config.apply_env();
    config.validate()?;
    Ok(config)
}
