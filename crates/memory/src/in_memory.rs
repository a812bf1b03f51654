//! In-memory short-term log: the rolling record of recent turns.

use async_trait::async_trait;
use groundrag_core::error::MemoryError;
use groundrag_core::memory::ShortTermMemory;
use groundrag_core::message::Message;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An append-only conversational log stored in a Vec.
///
/// `recall_then_push` and `extend` hold the write lock for their whole
/// duration, so concurrent asks sharing one log never see an append land
/// between another ask's snapshot and its own append.
#[derive(Clone)]
pub struct InMemoryShortTerm {
    entries: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryShortTerm {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Start from existing turns (oldest first).
    pub fn with_entries(entries: Vec<Message>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl Default for InMemoryShortTerm {
    fn default() -> Self {
        Self::new()
    }
}

fn suffix(entries: &[Message], n: usize) -> Vec<Message> {
    let start = entries.len().saturating_sub(n);
    entries[start..].to_vec()
}

#[async_trait]
impl ShortTermMemory for InMemoryShortTerm {
    fn name(&self) -> &str { "in_memory" }

    async fn to_list(&self) -> Result<Vec<Message>, MemoryError> {
        Ok(self.entries.read().await.clone())
    }

    async fn last_n(&self, n: usize) -> Result<Vec<Message>, MemoryError> {
        Ok(suffix(&self.entries.read().await, n))
    }

    async fn push(&self, message: Message) -> Result<(), MemoryError> {
        self.entries.write().await.push(message);
        Ok(())
    }

    async fn len(&self) -> Result<usize, MemoryError> {
        Ok(self.entries.read().await.len())
    }

    async fn recall_then_push(
        &self,
        n: usize,
        message: Message,
    ) -> Result<Vec<Message>, MemoryError> {
        let mut entries = self.entries.write().await;
        let recent = suffix(&entries, n);
        entries.push(message);
        Ok(recent)
    }

    async fn extend(&self, messages: Vec<Message>) -> Result<(), MemoryError> {
        self.entries.write().await.extend(messages);
        Ok(())
    }
}
