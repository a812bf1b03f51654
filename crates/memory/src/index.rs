//! In-process knowledge index.
//!
//! Holds documents in a Vec and ranks them per query. With an embedding
//! provider attached, documents are embedded on insert and ranked by cosine
//! similarity; without one, ranking falls back to keyword overlap.

use std::sync::Arc;

use async_trait::async_trait;
use groundrag_core::error::MemoryError;
use groundrag_core::memory::{VectorQueryResponse, VectorQueryResult, VectorStore};
use groundrag_core::provider::{EmbeddingRequest, Provider};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::vector::{rank_by_embedding, rank_by_keywords, StoredDocument};

/// Embedding provider + model pair.
struct Embedder {
    provider: Arc<dyn Provider>,
    model: String,
}

impl Embedder {
    async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, MemoryError> {
        let expected = inputs.len();
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs,
            })
            .await
            .map_err(|e| MemoryError::EmbeddingFailed(e.to_string()))?;

        if response.embeddings.len() != expected {
            return Err(MemoryError::EmbeddingFailed(format!(
                "expected {expected} embeddings, got {}",
                response.embeddings.len()
            )));
        }
        Ok(response.embeddings)
    }
}

pub struct InMemoryVectorStore {
    documents: RwLock<Vec<StoredDocument>>,
    embedder: Option<Embedder>,
}

impl InMemoryVectorStore {
    /// Keyword-ranked index.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            embedder: None,
        }
    }

    /// Embedding-ranked index.
    pub fn with_embeddings(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            embedder: Some(Embedder {
                provider,
                model: model.into(),
            }),
        }
    }

    /// Add documents, returning their generated IDs in order.
    pub async fn add_documents(&self, texts: Vec<String>) -> Result<Vec<String>, MemoryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings: Vec<Option<Vec<f32>>> = match &self.embedder {
            Some(embedder) => embedder
                .embed(texts.clone())
                .await?
                .into_iter()
                .map(Some)
                .collect(),
            None => vec![None; texts.len()],
        };

        let new_docs: Vec<StoredDocument> = texts
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| StoredDocument {
                id: Uuid::new_v4().to_string(),
                text,
                embedding,
            })
            .collect();
        let ids = new_docs.iter().map(|d| d.id.clone()).collect();

        let mut docs = self.documents.write().await;
        docs.extend(new_docs);
        debug!(total = docs.len(), "Knowledge index updated");
        Ok(ids)
    }

    pub async fn count(&self) -> usize {
        self.documents.read().await.len()
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn name(&self) -> &str { "in_memory" }

    async fn query(
        &self,
        query_string: &str,
        return_n: usize,
    ) -> Result<VectorQueryResponse, MemoryError> {
        let query_embedding = match &self.embedder {
            Some(embedder) => embedder
                .embed(vec![query_string.to_string()])
                .await?
                .pop(),
            None => None,
        };

        let docs = self.documents.read().await;
        let ranked = match &query_embedding {
            Some(embedding) => rank_by_embedding(&docs, embedding, return_n),
            None => rank_by_keywords(&docs, query_string, return_n),
        };

        let mut result = VectorQueryResult::default();
        for (score, doc) in ranked {
            result.documents.push(doc.text.clone());
            result.scores.push(score);
        }
        Ok(VectorQueryResponse { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundrag_core::error::ProviderError;
    use groundrag_core::provider::{EmbeddingResponse, ProviderRequest, ProviderResponse};

    /// Embeds text as [mentions "rust", mentions "python"].
    struct TopicEmbedder;

    #[async_trait]
    impl Provider for TopicEmbedder {
        fn name(&self) -> &str {
            "topic"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("embeddings only".into()))
        }

        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
            let embeddings = request
                .inputs
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    vec![
                        if t.contains("rust") { 1.0 } else { 0.0 },
                        if t.contains("python") { 1.0 } else { 0.0 },
                    ]
                })
                .collect();
            Ok(EmbeddingResponse {
                embeddings,
                model: request.model,
                usage: None,
            })
        }
    }

    #[tokio::test]
    async fn keyword_index_returns_matches_best_first() {
        let store = InMemoryVectorStore::new();
        store
            .add_documents(vec![
                "Python packaging".into(),
                "Rust ownership and borrowing".into(),
                "Rust".into(),
            ])
            .await
            .unwrap();

        let resp = store.query("rust ownership", 20).await.unwrap();
        assert_eq!(
            resp.result.documents,
            vec!["Rust ownership and borrowing".to_string(), "Rust".to_string()]
        );
        assert_eq!(resp.result.scores.len(), 2);
        assert!(resp.result.scores[0] >= resp.result.scores[1]);
    }

    #[tokio::test]
    async fn query_respects_return_n() {
        let store = InMemoryVectorStore::new();
        let texts = (0..30).map(|i| format!("invoice number {i}")).collect();
        store.add_documents(texts).await.unwrap();
        assert_eq!(store.count().await, 30);

        let resp = store.query("invoice", 20).await.unwrap();
        assert_eq!(resp.result.documents.len(), 20);
    }

    #[tokio::test]
    async fn embedding_index_ranks_by_cosine() {
        let store = InMemoryVectorStore::with_embeddings(Arc::new(TopicEmbedder), "topic-1");
        store
            .add_documents(vec!["python tips".into(), "rust tips".into()])
            .await
            .unwrap();

        let resp = store.query("tell me about Rust", 1).await.unwrap();
        assert_eq!(resp.result.documents, vec!["rust tips".to_string()]);
    }

    #[tokio::test]
    async fn empty_index_returns_nothing() {
        let store = InMemoryVectorStore::new();
        let resp = store.query("anything", 20).await.unwrap();
        assert!(resp.result.documents.is_empty());
    }
}
