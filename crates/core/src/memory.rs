//! Memory traits: the two stores the agent reads context from.
//!
//! - [`ShortTermMemory`]: an ordered append log of recent conversational
//!   turns. The agent reads a suffix of it and appends to it.
//! - [`VectorStore`]: a long-term knowledge index queried by semantic
//!   similarity. Read-only from the agent's perspective.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::MemoryError;
use crate::message::Message;

/// The rolling log of recent conversational turns.
///
/// Implementations: in-process log (for sessions and tests).
#[async_trait]
pub trait ShortTermMemory: Send + Sync {
    /// The backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Every entry, oldest first.
    async fn to_list(&self) -> std::result::Result<Vec<Message>, MemoryError>;

    /// The last `n` entries in original order (fewer if fewer are stored).
    async fn last_n(&self, n: usize) -> std::result::Result<Vec<Message>, MemoryError>;

    /// Append one entry.
    async fn push(&self, message: Message) -> std::result::Result<(), MemoryError>;

    /// Number of stored entries.
    async fn len(&self) -> std::result::Result<usize, MemoryError> {
        Ok(self.to_list().await?.len())
    }

    /// Whether the log holds no entries.
    async fn is_empty(&self) -> std::result::Result<bool, MemoryError> {
        Ok(self.len().await? == 0)
    }

    /// Snapshot the last `n` entries, then append `message`.
    ///
    /// The snapshot never contains `message`. Backends that can do both under
    /// one lock should override this so concurrent callers cannot interleave.
    async fn recall_then_push(
        &self,
        n: usize,
        message: Message,
    ) -> std::result::Result<Vec<Message>, MemoryError> {
        let recent = if n == 0 { Vec::new() } else { self.last_n(n).await? };
        self.push(message).await?;
        Ok(recent)
    }

    /// Append several entries in order.
    async fn extend(&self, messages: Vec<Message>) -> std::result::Result<(), MemoryError> {
        for message in messages {
            self.push(message).await?;
        }
        Ok(())
    }
}

/// Documents returned by a similarity query, relevance-descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorQueryResult {
    /// Document texts.
    #[serde(rename = "document", default)]
    pub documents: Vec<String>,

    /// Similarity scores, parallel to `documents` when the store has them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scores: Vec<f32>,
}

/// Envelope returned by [`VectorStore::query`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorQueryResponse {
    pub result: VectorQueryResult,
}

impl VectorQueryResponse {
    /// Wrap a plain list of documents.
    pub fn from_documents(documents: Vec<String>) -> Self {
        Self {
            result: VectorQueryResult {
                documents,
                scores: Vec::new(),
            },
        }
    }
}

/// A similarity-searchable knowledge store.
///
/// Implementations: in-process index, none (no-op).
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The backend name (e.g., "in_memory", "none").
    fn name(&self) -> &str;

    /// Up to `return_n` documents nearest to `query_string`, best first.
    async fn query(
        &self,
        query_string: &str,
        return_n: usize,
    ) -> std::result::Result<VectorQueryResponse, MemoryError>;
}
