//! Context assembly: recent conversation plus retrieved knowledge.
//!
//! The assembled context is, in order:
//!
//! 1. up to `history_window` most recent short-term entries, oldest first
//! 2. up to `top_k` documents from the knowledge store, as `user` messages
//!
//! Assembly also appends the new query to short-term memory. The snapshot in
//! step 1 is taken before that append, so a query never sees itself.

use std::sync::Arc;
use std::time::Duration;

use groundrag_core::memory::{ShortTermMemory, VectorStore};
use groundrag_core::message::Message;
use groundrag_core::Result;
use tracing::debug;

use crate::deadline;

pub const DEFAULT_HISTORY_WINDOW: usize = 5;
pub const DEFAULT_TOP_K: usize = 20;

pub struct ContextAssembler {
    short_term: Arc<dyn ShortTermMemory>,
    vector: Arc<dyn VectorStore>,
    history_window: usize,
    top_k: usize,
    call_timeout: Option<Duration>,
}

impl ContextAssembler {
    pub fn new(short_term: Arc<dyn ShortTermMemory>, vector: Arc<dyn VectorStore>) -> Self {
        Self {
            short_term,
            vector,
            history_window: DEFAULT_HISTORY_WINDOW,
            top_k: DEFAULT_TOP_K,
            call_timeout: None,
        }
    }

    pub fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Deadline for the knowledge store query.
    pub fn with_call_timeout(mut self, limit: Option<Duration>) -> Self {
        self.call_timeout = limit;
        self
    }

    pub fn short_term(&self) -> &Arc<dyn ShortTermMemory> {
        &self.short_term
    }

    /// Build the context for `query`. Appends `query` to short-term memory.
    pub async fn prepare(&self, query: &str) -> Result<Vec<Message>> {
        let mut context = self
            .short_term
            .recall_then_push(self.history_window, Message::user(query))
            .await?;
        let history = context.len();

        let response =
            deadline::query_store(self.vector.as_ref(), query, self.top_k, self.call_timeout).await?;
        let best_score = response.result.scores.first().copied();
        context.extend(response.result.documents.into_iter().map(Message::user));

        debug!(
            history,
            documents = context.len() - history,
            best_score,
            store = self.vector.name(),
            "Context assembled"
        );
        Ok(context)
    }
}
