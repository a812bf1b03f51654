//! TextGenerator: the black-box "answer this" capability.
//!
//! The agent, the relevancy filter, and the grounding validator all talk to
//! a language model exclusively through this trait. A generator is stateless
//! per call; whatever system prompt, model, or tools it uses are fixed at
//! construction.

use async_trait::async_trait;
use crate::error::ProviderError;
use crate::message::Message;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate one or more response messages for `query`.
    ///
    /// `context` is `None` when the caller has no context to offer at all,
    /// which is distinct from `Some(&[])`. Generators may skip
    /// retrieval-augmented prompting entirely on `None`.
    async fn run(
        &self,
        query: &str,
        context: Option<&[Message]>,
    ) -> std::result::Result<Vec<Message>, ProviderError>;
}
