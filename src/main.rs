//! # askdocs CLI
//!
//! ## Usage
//!
//! ```bash
//! askdocs --config ./config/askdocs.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `askdocs serve` | Start the HTTP API and web page |
//! | `askdocs list` | List stored documents |
//! | `askdocs add <file>` | Store one `.txt` file |
//! | `askdocs import <dir>` | Store every `.txt` file under a directory |
//! | `askdocs remove <id>` | Delete a document |
//! | `askdocs ask "<question>"` | Answer a question from the stored documents |
//! | `askdocs health` | Check storage and LLM reachability |
//!
//! A missing config file is fine: every setting has a default. Logs go to
//! stderr and honour `RUST_LOG`.

use askdocs::{ask, config, docs_cmd, health, ingest, server};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// askdocs: ask questions about your plain-text documents.
#[derive(Parser)]
#[command(
    name = "askdocs",
    about = "askdocs: ask an LLM questions about your plain-text documents",
    version,
    long_about = "askdocs stores uploaded .txt documents, answers natural-language questions \
    about them with an LLM, and shows keyword-matched excerpts as sources. It runs as an HTTP \
    service with a small web page, or directly from the command line."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/askdocs.toml`. When the file does not exist,
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/askdocs.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Serves the JSON API under `/api` and the web page at `/`, bound to
    /// `[server].bind` (or `0.0.0.0:$PORT`).
    Serve,

    /// List stored documents.
    List,

    /// Store a single `.txt` file.
    Add {
        /// Path to the file.
        path: PathBuf,
    },

    /// Store every `.txt` file under a directory, recursively.
    ///
    /// Files that cannot be read or are not UTF-8 are skipped.
    Import {
        /// Directory to scan.
        dir: PathBuf,
    },

    /// Delete a document and its stored upload.
    Remove {
        /// Document id.
        id: String,
    },

    /// Ask a question about the stored documents.
    Ask {
        /// The question.
        question: String,

        /// Restrict to these document ids (repeatable). Defaults to all.
        #[arg(long = "doc")]
        docs: Vec<String>,
    },

    /// Check storage and LLM health. Exits non-zero if anything is unhealthy.
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("askdocs=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::List => {
            docs_cmd::run_list(&cfg).await?;
        }
        Commands::Add { path } => {
            ingest::run_add(&cfg, &path).await?;
        }
        Commands::Import { dir } => {
            ingest::run_import(&cfg, &dir).await?;
        }
        Commands::Remove { id } => {
            docs_cmd::run_remove(&cfg, &id).await?;
        }
        Commands::Ask { question, docs } => {
            ask::run_ask(&cfg, &question, docs).await?;
        }
        Commands::Health => {
            health::run_health(&cfg).await?;
        }
    }

    Ok(())
}
