//! Text-completion provider abstraction and implementations.
//!
//! Defines the [`CompletionProvider`] trait and concrete implementations:
//! - **[`DisabledProvider`]**: returns errors, used when `llm.provider = "disabled"`.
//! - **[`GeminiProvider`]**: calls the Google Generative Language REST API.
//!
//! Use [`create_provider`] to instantiate the provider named in the
//! configuration. The API key is read from the environment variable named
//! by `llm.api_key_env`; it is never stored in the config file.
//!
//! There is no retry and, unless `llm.timeout_secs` is set, no timeout: a
//! slow provider stalls the calling request.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;

/// A black-box text-completion service.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"gemini-2.0-flash-lite"`).
    fn model_name(&self) -> &str;

    /// Sends `prompt` and returns the generated text unmodified.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Lightweight reachability check used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}

// ============ Disabled Provider ============

/// A provider that always fails. Lets the server run without an API key;
/// `/ask` then answers 500 and health reports the LLM as unhealthy.
pub struct DisabledProvider;

#[async_trait]
impl CompletionProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _prompt: &str) -> Result<String> {
        bail!("LLM provider is disabled")
    }

    async fn ping(&self) -> Result<()> {
        bail!("LLM provider is disabled")
    }
}

// ============ Gemini Provider ============

/// Completion provider backed by the Gemini `generateContent` endpoint.
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiProvider {
    /// Create a provider, reading the API key from `config.api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is unset or empty.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("{} environment variable not set", config.api_key_env)
            })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }

        Ok(Self {
            client: builder.build().context("Failed to build HTTP client")?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Gemini API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_generate_response(&json)
    }

    async fn ping(&self) -> Result<()> {
        let url = format!("{}/v1beta/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .context("Gemini request failed")?;

        if !response.status().is_success() {
            bail!("Gemini API returned {}", response.status());
        }
        Ok(())
    }
}

/// Extract the generated text from a `generateContent` response.
///
/// Concatenates the `text` of every part of the first candidate.
fn parse_generate_response(json: &serde_json::Value) -> Result<String> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid Gemini response: missing candidate parts"))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    Ok(text)
}

/// Create the [`CompletionProvider`] named by `config.provider`.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledProvider`] |
/// | `"gemini"` | [`GeminiProvider`] |
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn CompletionProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledProvider)),
        "gemini" => Ok(Arc::new(GeminiProvider::new(config)?)),
        other => bail!("Unknown llm provider: {}", other),
    }
}

/// Like [`create_provider`], but falls back to [`DisabledProvider`] when the
/// configured provider cannot be built, e.g. because the API key is unset.
/// The server still starts; health then reports the LLM as unhealthy.
pub fn create_provider_or_disabled(config: &LlmConfig) -> Arc<dyn CompletionProvider> {
    create_provider(config).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "LLM provider unavailable, questions will fail");
        Arc::new(DisabledProvider)
    })
}
