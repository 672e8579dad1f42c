//! Question answering over stored documents.
//!
//! [`answer_question`] resolves the target documents, sends their full
//! text plus the question to the [`CompletionProvider`], and pairs the
//! answer with keyword-matched citations from [`crate::retrieve`]. The
//! citations are not derived from the answer, so "sources shown" can
//! differ from what the model actually used.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::llm::{create_provider, CompletionProvider};
use crate::models::{Document, SourceCitation};
use crate::retrieve::find_sources;
use crate::store::DocumentStore;

#[derive(Debug, Error)]
pub enum AskError {
    #[error("Question is required")]
    EmptyQuestion,

    #[error("No documents uploaded yet")]
    NoDocuments,

    #[error("None of the selected documents were found")]
    NoneSelected,

    #[error("LLM request failed: {0}")]
    Upstream(anyhow::Error),
}

/// Body of `POST /api/ask`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    /// Restrict the question to these documents. Empty or absent means all.
    #[serde(default)]
    pub document_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceCitation>,
}

/// Answer `request.question` from the stored documents.
///
/// The question is validated before the store or the provider is
/// touched. Provider failures surface as [`AskError::Upstream`] with no
/// retry.
pub async fn answer_question(
    store: &DocumentStore,
    provider: &dyn CompletionProvider,
    request: &AskRequest,
    max_sources: usize,
) -> Result<AskResponse, AskError> {
    if request.question.trim().is_empty() {
        return Err(AskError::EmptyQuestion);
    }

    let targets = resolve_targets(store, request.document_ids.as_deref()).await?;

    let prompt = build_prompt(&targets, &request.question);
    tracing::debug!(
        documents = targets.len(),
        prompt_chars = prompt.len(),
        model = provider.model_name(),
        "sending question to LLM"
    );

    let answer = provider
        .complete(&prompt)
        .await
        .map_err(AskError::Upstream)?;

    let sources = find_sources(&request.question, &targets, max_sources);
    tracing::info!(
        documents = targets.len(),
        sources = sources.len(),
        "question answered"
    );

    Ok(AskResponse {
        question: request.question.clone(),
        answer,
        sources,
    })
}

/// Selected documents, or every document when `ids` is absent or empty.
pub async fn resolve_targets(
    store: &DocumentStore,
    ids: Option<&[String]>,
) -> Result<Vec<Document>, AskError> {
    let ids = ids.filter(|ids| !ids.is_empty());
    let (total, targets) = store.select(ids).await;

    if total == 0 {
        return Err(AskError::NoDocuments);
    }
    if targets.is_empty() {
        return Err(AskError::NoneSelected);
    }
    Ok(targets)
}

/// Prompt containing every document's full text followed by the question.
pub fn build_prompt(documents: &[Document], question: &str) -> String {
    let all_content = documents
        .iter()
        .map(|doc| format!("[Document: {}]\n{}\n", doc.name, doc.content))
        .collect::<Vec<_>>()
        .join("\n---\n\n");

    format!(
        "You are a helpful assistant that answers questions based on the provided documents. \
Always cite which document you're referring to. If the answer isn't in the documents, say so.

Documents:
{all_content}

Question: {question}

Please answer the question based on the documents above. Cite the document name and quote the relevant part."
    )
}

/// CLI entry point: answer one question and print the answer and sources.
pub async fn run_ask(config: &Config, question: &str, document_ids: Vec<String>) -> anyhow::Result<()> {
    let store = DocumentStore::open(config).await?;
    let provider = create_provider(&config.llm)?;
    let request = AskRequest {
        question: question.to_string(),
        document_ids: Some(document_ids),
    };

    let response = answer_question(
        &store,
        provider.as_ref(),
        &request,
        config.retrieval.max_sources,
    )
    .await?;

    println!("{}", response.answer);
    if !response.sources.is_empty() {
        println!();
        println!("--- Sources ({}) ---", response.sources.len());
        for (i, source) in response.sources.iter().enumerate() {
            println!(
                "{}. {} (relevance {})",
                i + 1,
                source.document_name,
                source.relevance
            );
            println!("{}", source.text);
            println!();
        }
    }

    Ok(())
}
