//! In-memory document store persisted as a JSON snapshot.
//!
//! The whole collection lives in a `Vec<Document>` behind a
//! `tokio::sync::RwLock`. Every mutation rewrites the snapshot file while
//! still holding the write lock, so concurrent uploads and deletes are
//! applied one at a time and the snapshot always reflects the last
//! completed mutation.
//!
//! Raw uploads are kept next to the snapshot in the uploads directory,
//! one file per document, named `{uuid}-{original name}`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::models::{Document, DocumentSummary};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize documents: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct DocumentStore {
    documents_file: PathBuf,
    uploads_dir: PathBuf,
    chunk_size: usize,
    docs: RwLock<Vec<Document>>,
}

impl DocumentStore {
    /// Opens the store described by `[storage]` and `[chunking]`.
    ///
    /// Creates the uploads directory if needed and loads the snapshot when
    /// one exists. A snapshot that cannot be read or parsed is logged and
    /// ignored; the store then starts empty.
    pub async fn open(config: &Config) -> Result<Self, StoreError> {
        let documents_file = config.storage.documents_file.clone();
        let uploads_dir = config.storage.uploads_dir.clone();

        tokio::fs::create_dir_all(&uploads_dir).await?;
        if let Some(parent) = documents_file.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let docs = load_snapshot(&documents_file).await;
        tracing::info!(
            documents = docs.len(),
            path = %documents_file.display(),
            "document store opened"
        );

        Ok(Self {
            documents_file,
            uploads_dir,
            chunk_size: config.chunking.chunk_size,
            docs: RwLock::new(docs),
        })
    }

    pub fn documents_file(&self) -> &Path {
        &self.documents_file
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Writes raw upload bytes into the uploads directory and returns the
    /// generated backing filename.
    pub async fn save_upload(&self, name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let filename = format!("{}-{}", Uuid::new_v4(), sanitize_name(name));
        tokio::fs::write(self.uploads_dir.join(&filename), bytes).await?;
        Ok(filename)
    }

    /// Adds a document and persists the collection.
    ///
    /// If the snapshot write fails the document stays in memory and the
    /// error is returned; there is no rollback.
    pub async fn add(
        &self,
        name: &str,
        filename: &str,
        content: String,
    ) -> Result<DocumentSummary, StoreError> {
        let doc = Document {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            filename: filename.to_string(),
            chunks: chunk_text(&content, self.chunk_size),
            content,
            uploaded_at: Utc::now(),
        };
        let summary = doc.summary();

        let mut docs = self.docs.write().await;
        docs.push(doc);
        self.persist(&docs).await?;

        tracing::info!(id = %summary.id, name = %summary.name, "document added");
        Ok(summary)
    }

    pub async fn list(&self) -> Vec<DocumentSummary> {
        self.docs.read().await.iter().map(Document::summary).collect()
    }

    /// Removes a document, its backing upload, and persists the collection.
    pub async fn remove(&self, id: &str) -> Result<Document, StoreError> {
        let mut docs = self.docs.write().await;
        let index = docs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let upload = self.uploads_dir.join(&docs[index].filename);
        match tokio::fs::remove_file(&upload).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %upload.display(), "upload already gone");
            }
            Err(e) => return Err(e.into()),
        }

        let removed = docs.remove(index);
        self.persist(&docs).await?;

        tracing::info!(id = %removed.id, name = %removed.name, "document removed");
        Ok(removed)
    }

    pub async fn get(&self, id: &str) -> Option<Document> {
        self.docs.read().await.iter().find(|d| d.id == id).cloned()
    }

    /// Total document count and the documents whose id appears in `ids`
    /// (every document when `ids` is `None`), in store order. Both come
    /// from one read of the collection.
    pub async fn select(&self, ids: Option<&[String]>) -> (usize, Vec<Document>) {
        let docs = self.docs.read().await;
        let picked = match ids {
            Some(ids) => docs.iter().filter(|d| ids.contains(&d.id)).cloned().collect(),
            None => docs.clone(),
        };
        (docs.len(), picked)
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    async fn persist(&self, docs: &[Document]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(docs)?;
        let mut tmp = self.documents_file.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.documents_file).await?;
        Ok(())
    }
}

async fn load_snapshot(path: &Path) -> Vec<Document> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read document snapshot");
            return Vec::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(docs) => docs,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable document snapshot");
            Vec::new()
        }
    }
}

/// Reduces an uploaded name to its final path component.
pub fn sanitize_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match base {
        "" | "." | ".." => "upload.txt".to_string(),
        other => other.to_string(),
    }
}
