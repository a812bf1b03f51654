//! `ChatGenerator`: a [`TextGenerator`] backed by a chat [`Provider`].
//!
//! Request layout: `[system prompt?] + context + [user(query)]`. With no
//! context the request is just the optional system prompt and the query.

use std::sync::Arc;

use async_trait::async_trait;
use groundrag_core::error::ProviderError;
use groundrag_core::generator::TextGenerator;
use groundrag_core::message::Message;
use groundrag_core::provider::{Provider, ProviderRequest};
use tracing::debug;

pub struct ChatGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system_prompt: Option<String>,
}

impl ChatGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            system_prompt: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    fn build_messages(&self, query: &str, context: Option<&[Message]>) -> Vec<Message> {
        let context = context.unwrap_or_default();
        let mut messages = Vec::with_capacity(context.len() + 2);
        if let Some(prompt) = &self.system_prompt {
            messages.push(Message::system(prompt));
        }
        messages.extend(context.iter().cloned());
        messages.push(Message::user(query));
        messages
    }
}

#[async_trait]
impl TextGenerator for ChatGenerator {
    async fn run(
        &self,
        query: &str,
        context: Option<&[Message]>,
    ) -> Result<Vec<Message>, ProviderError> {
        let messages = self.build_messages(query, context);

        debug!(
            provider = %self.provider.name(),
            model = %self.model,
            context = context.map_or(0, <[Message]>::len),
            "Generating"
        );

        let request = ProviderRequest::new(self.model.clone(), messages)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let response = self.provider.complete(request).await?;
        Ok(vec![response.message])
    }
}
