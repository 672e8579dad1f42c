//! # askdocs
//!
//! Upload plain-text documents, then ask natural-language questions
//! answered by an LLM, with keyword-matched excerpts from the documents
//! shown as sources.
//!
//! ## Architecture
//!
//! ```text
//!  upload ──▶ chunk ──▶ DocumentStore ──▶ documents.json
//!                           │              uploads/
//!                           ▼
//!  ask ──▶ build_prompt(full text) ──▶ CompletionProvider ──▶ answer
//!      └─▶ find_sources(chunks, keywords) ───────────────────▶ sources
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! askdocs add notes.txt
//! askdocs ask "What does the contract say about renewal?"
//! askdocs serve                 # HTTP API + web page on 127.0.0.1:5000
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and env overrides |
//! | [`models`] | Core data types |
//! | [`chunk`] | Fixed-size text chunking |
//! | [`store`] | In-memory document store with JSON snapshot |
//! | [`retrieve`] | Keyword-overlap source ranking |
//! | [`llm`] | Completion provider abstraction |
//! | [`ask`] | Question answering orchestration |
//! | [`health`] | Health checks |
//! | [`ingest`] | Local `.txt` ingestion |
//! | [`server`] | HTTP API |
//! | [`error`] | HTTP error mapping |

pub mod ask;
pub mod chunk;
pub mod config;
pub mod docs_cmd;
pub mod error;
pub mod health;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod retrieve;
pub mod server;
pub mod store;
