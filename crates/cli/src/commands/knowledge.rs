//! Loading a documents directory into the knowledge index.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use groundrag_config::AppConfig;
use groundrag_core::VectorStore;
use groundrag_memory::{InMemoryVectorStore, NoopVectorStore, chunk_text};
use groundrag_providers::ProviderRouter;
use tracing::{info, warn};

const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Every document file under `dir`, recursively, in path order.
pub fn document_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| DOCUMENT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Read and chunk every document file under `dir`.
pub fn load_chunks(dir: &Path, chunk_chars: usize) -> std::io::Result<Vec<String>> {
    let mut chunks = Vec::new();
    for file in document_files(dir)? {
        let text = std::fs::read_to_string(&file)?;
        let before = chunks.len();
        chunks.extend(chunk_text(&text, chunk_chars));
        info!(file = %file.display(), chunks = chunks.len() - before, "Document loaded");
    }
    Ok(chunks)
}

/// Build the knowledge store for a session.
///
/// No documents directory means retrieval is disabled.
pub async fn build_store(
    config: &AppConfig,
    router: &ProviderRouter,
    docs: Option<PathBuf>,
) -> Result<(Arc<dyn VectorStore>, usize), Box<dyn std::error::Error>> {
    let Some(dir) = docs.or_else(|| config.knowledge.documents_dir.as_ref().map(PathBuf::from)) else {
        warn!("No documents directory configured, answering without retrieval");
        return Ok((Arc::new(NoopVectorStore), 0));
    };
    if !dir.is_dir() {
        return Err(format!("Documents directory not found: {}", dir.display()).into());
    }

    let store = match &config.knowledge.embedding_model {
        Some(model) => {
            let provider = router.require(config.core_provider())?;
            InMemoryVectorStore::with_embeddings(provider, model.as_str())
        }
        None => InMemoryVectorStore::new(),
    };

    let chunks = load_chunks(&dir, config.knowledge.chunk_chars)?;
    let count = chunks.len();
    store.add_documents(chunks).await?;
    info!(dir = %dir.display(), chunks = count, "Knowledge index ready");

    Ok((Arc::new(store), count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_documents_recursively_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "bee").unwrap();
        std::fs::write(dir.path().join("a.txt"), "ay").unwrap();
        std::fs::write(dir.path().join("image.png"), [0u8, 1, 2]).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.MD"), "sea").unwrap();

        let files = document_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names.len(), 3);
        assert_eq!(names[0], "a.txt");
        assert_eq!(names[1], "b.md");
        assert!(names[2].ends_with("c.MD"));
    }

    #[test]
    fn chunks_every_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.md"), "first para\n\nsecond para").unwrap();
        std::fs::write(dir.path().join("two.txt"), "other file").unwrap();

        let chunks = load_chunks(dir.path(), 12).unwrap();
        assert_eq!(chunks, vec!["first para", "second para", "other file"]);
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let config = AppConfig::default();
        let router = ProviderRouter::new("openrouter");
        let result = build_store(&config, &router, Some(PathBuf::from("/definitely/not/here"))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn no_directory_disables_retrieval() {
        let config = AppConfig::default();
        let router = ProviderRouter::new("openrouter");
        let (store, count) = build_store(&config, &router, None).await.unwrap();
        assert_eq!(count, 0);
        assert_eq!(store.name(), "none");
    }

    #[tokio::test]
    async fn keyword_index_built_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vat.md"), "The standard VAT rate is 20%.").unwrap();

        let config = AppConfig::default();
        let router = ProviderRouter::new("openrouter");
        let (store, count) = build_store(&config, &router, Some(dir.path().to_path_buf()))
            .await
            .unwrap();
        assert_eq!(count, 1);

        let response = store.query("vat rate", 5).await.unwrap();
        assert_eq!(response.result.documents, vec!["The standard VAT rate is 20%."]);
    }
}
