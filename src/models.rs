//! Core data models.
//!
//! [`Document`] is the persisted shape (one entry of the JSON snapshot);
//! [`DocumentSummary`] and [`SourceCitation`] are the shapes the API
//! returns. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded document with its pre-computed chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    /// Original filename as uploaded.
    pub name: String,
    /// Backing file name inside the uploads directory.
    pub filename: String,
    pub content: String,
    pub chunks: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            uploaded_at: self.uploaded_at,
        }
    }
}

/// Listing view of a document. Never carries content or chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A chunk surfaced as probable evidence for an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceCitation {
    pub document_name: String,
    pub document_id: String,
    pub text: String,
    pub relevance: usize,
}
