//! Local ingestion of `.txt` files from the command line.
//!
//! `askdocs add <file>` and `askdocs import <dir>` feed files through the
//! same path as an HTTP upload: the raw bytes are copied into the uploads
//! directory and the text is chunked and stored.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::models::DocumentSummary;
use crate::store::{sanitize_name, DocumentStore};

/// Only names ending in `.txt` (any case) are accepted.
pub fn is_text_file(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".txt")
}

/// Copy one `.txt` file into the store.
pub async fn ingest_file(store: &DocumentStore, path: &Path) -> Result<DocumentSummary> {
    let name = path
        .file_name()
        .map(|n| sanitize_name(&n.to_string_lossy()))
        .ok_or_else(|| anyhow::anyhow!("not a file: {}", path.display()))?;
    if !is_text_file(&name) {
        bail!("only .txt files are allowed: {}", path.display());
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let content = String::from_utf8(bytes.clone())
        .map_err(|_| anyhow::anyhow!("file is not UTF-8 text: {}", path.display()))?;

    let filename = store.save_upload(&name, &bytes).await?;
    Ok(store.add(&name, &filename, content).await?)
}

/// `.txt` files under `root`, sorted by path. Symlinks are not followed.
pub fn scan_text_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("not a directory: {}", root.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() && is_text_file(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

pub async fn run_add(config: &Config, path: &Path) -> Result<()> {
    let store = DocumentStore::open(config).await?;
    let doc = ingest_file(&store, path).await?;
    println!("added {}  {}", doc.id, doc.name);
    Ok(())
}

/// Ingest every `.txt` file under `root`. Files that fail are reported
/// and skipped.
pub async fn run_import(config: &Config, root: &Path) -> Result<()> {
    let store = DocumentStore::open(config).await?;
    let files = scan_text_files(root)?;

    let mut imported = 0;
    let mut skipped = 0;
    for path in &files {
        match ingest_file(&store, path).await {
            Ok(doc) => {
                println!("added {}  {}", doc.id, path.display());
                imported += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %format!("{:#}", e), "skipping file");
                skipped += 1;
            }
        }
    }

    println!("imported: {}", imported);
    println!("skipped: {}", skipped);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_store(tmp: &TempDir) -> DocumentStore {
        let mut config = Config::minimal();
        config.storage.documents_file = tmp.path().join("store").join("documents.json");
        config.storage.uploads_dir = tmp.path().join("store").join("uploads");
        DocumentStore::open(&config).await.unwrap()
    }

    #[test]
    fn test_is_text_file() {
        assert!(is_text_file("notes.txt"));
        assert!(is_text_file("NOTES.TXT"));
        assert!(!is_text_file("notes.md"));
        assert!(!is_text_file("txt"));
    }

    #[tokio::test]
    async fn test_ingest_file_copies_upload() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let src = tmp.path().join("pets.txt");
        std::fs::write(&src, "The cat sat on the mat.").unwrap();

        let doc = ingest_file(&store, &src).await.unwrap();
        assert_eq!(doc.name, "pets.txt");

        let stored = store.get(&doc.id).await.unwrap();
        assert_eq!(stored.content, "The cat sat on the mat.");
        assert!(store.uploads_dir().join(&stored.filename).exists());
    }

    #[tokio::test]
    async fn test_ingest_rejects_non_text() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let md = tmp.path().join("readme.md");
        std::fs::write(&md, "# hi").unwrap();
        assert!(ingest_file(&store, &md).await.is_err());

        let bin = tmp.path().join("blob.txt");
        std::fs::write(&bin, [0xff, 0xfe, 0x00]).unwrap();
        assert!(ingest_file(&store, &bin).await.is_err());
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_scan_text_files_recursive_and_sorted() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::write(root.join("b.txt"), "b").unwrap();
        std::fs::write(root.join("a.txt"), "a").unwrap();
        std::fs::write(root.join("sub").join("c.TXT"), "c").unwrap();
        std::fs::write(root.join("skip.md"), "md").unwrap();

        let files = scan_text_files(root).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub/c.TXT"]);
    }
}
