//! LLM backend seam.
//!
//! A [`Provider`] turns a message list into one reply message, and can
//! optionally embed text for the knowledge index. Every judge and the answer
//! generator talk to a provider through a `ChatGenerator`, which pins the
//! model, temperature and system prompt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// One chat completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Backend model identifier, e.g. `openai/gpt-4o-mini`.
    pub model: String,
    pub messages: Vec<Message>,
    /// Sampling temperature. Judges run at 0.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl ProviderRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: None,
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
}

/// The backend's reply to a [`ProviderRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub message: Message,
    pub usage: Option<Usage>,
    /// Model that served the call. Routers may substitute the requested one.
    pub model: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Texts to embed with one embedding model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub inputs: Vec<String>,
}

/// One vector per input, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub embeddings: Vec<Vec<f32>>,
    pub model: String,
    pub usage: Option<Usage>,
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Short identifier used in logs and config, e.g. `openrouter`.
    fn name(&self) -> &str;

    async fn complete(&self, request: ProviderRequest) -> ProviderResult<ProviderResponse>;

    /// Backends without an embeddings endpoint keep this default, which
    /// fails with [`ProviderError::NotConfigured`].
    async fn embed(&self, _request: EmbeddingRequest) -> ProviderResult<EmbeddingResponse> {
        Err(ProviderError::NotConfigured(format!(
            "{} has no embeddings endpoint",
            self.name()
        )))
    }

    async fn list_models(&self) -> ProviderResult<Vec<String>> {
        Ok(Vec::new())
    }

    /// Whether the backend answered a cheap request. Used by `groundrag doctor`.
    async fn health_check(&self) -> ProviderResult<bool> {
        Ok(true)
    }
}
