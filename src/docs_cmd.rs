//! `askdocs list` and `askdocs remove`.

use anyhow::Result;

use crate::config::Config;
use crate::store::{DocumentStore, StoreError};

pub async fn run_list(config: &Config) -> Result<()> {
    let store = DocumentStore::open(config).await?;
    let docs = store.list().await;

    if docs.is_empty() {
        println!("No documents.");
        return Ok(());
    }

    println!("{:<36}  {:<25}  NAME", "ID", "UPLOADED");
    for doc in docs {
        println!(
            "{:<36}  {:<25}  {}",
            doc.id,
            doc.uploaded_at.format("%Y-%m-%dT%H:%M:%SZ"),
            doc.name
        );
    }
    Ok(())
}

pub async fn run_remove(config: &Config, id: &str) -> Result<()> {
    let store = DocumentStore::open(config).await?;
    match store.remove(id).await {
        Ok(doc) => {
            println!("removed {}  {}", doc.id, doc.name);
            Ok(())
        }
        Err(StoreError::NotFound(id)) => anyhow::bail!("document not found: {}", id),
        Err(e) => Err(e.into()),
    }
}
