//! Health reporting for the backend, storage, and LLM provider.
//!
//! Each check catches its own failure and only downgrades its own field.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use crate::config::Config;
use crate::llm::{create_provider_or_disabled, CompletionProvider};

pub const HEALTHY: &str = "healthy";
pub const UNHEALTHY: &str = "unhealthy";

/// JSON body of `GET /api/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub backend: String,
    /// Status of the snapshot file.
    pub database: String,
    pub llm: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        [&self.backend, &self.database, &self.llm]
            .iter()
            .all(|s| s.as_str() == HEALTHY)
    }
}

fn status(ok: bool) -> String {
    let s = if ok { HEALTHY } else { UNHEALTHY };
    s.to_string()
}

pub async fn check_health(documents_file: &Path, provider: &dyn CompletionProvider) -> HealthReport {
    let database = match check_storage(documents_file).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %documents_file.display(), error = %e, "storage health check failed");
            false
        }
    };

    let llm = match provider.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(model = provider.model_name(), error = %e, "llm health check failed");
            false
        }
    };

    HealthReport {
        backend: HEALTHY.to_string(),
        database: status(database),
        llm: status(llm),
        timestamp: Utc::now(),
    }
}

/// Healthy when the snapshot is absent or can be opened for read and write.
async fn check_storage(path: &Path) -> std::io::Result<()> {
    match tokio::fs::metadata(path).await {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
        Ok(_) => {}
    }

    tokio::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .await?;
    Ok(())
}

/// CLI entry point. Fails when any check is unhealthy.
pub async fn run_health(config: &Config) -> anyhow::Result<()> {
    let provider = create_provider_or_disabled(&config.llm);
    let report = check_health(&config.storage.documents_file, provider.as_ref()).await;

    println!("{:<10} {}", "backend", report.backend);
    println!("{:<10} {}", "database", report.database);
    println!("{:<10} {}", "llm", report.llm);
    println!("{:<10} {}", "checked", report.timestamp.to_rfc3339());

    if !report.is_healthy() {
        anyhow::bail!("one or more health checks failed");
    }
    Ok(())
}
