//! Provider router: selects the correct LLM provider based on config.
//!
//! Each model role (core, pre-filter, post-filter) names a provider; the
//! router holds one shared instance per name.

use std::collections::HashMap;
use std::sync::Arc;
use groundrag_core::error::ProviderError;
use groundrag_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Get a provider by name, or a `NotConfigured` error.
    pub fn require(&self, name: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        self.get(name)
            .ok_or_else(|| ProviderError::NotConfigured(format!("unknown provider '{name}'")))
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build providers from configuration.
///
/// Registers every provider in `[providers]` plus every name referenced by a
/// model role. A referenced name with neither an `api_url` nor a well-known
/// default endpoint is a configuration error.
pub fn build_from_config(
    config: &groundrag_config::AppConfig,
) -> Result<ProviderRouter, ProviderError> {
    let mut router = ProviderRouter::new(&config.default_provider);

    let mut names: Vec<String> = config.providers.keys().cloned().collect();
    for referenced in [
        config.default_provider.as_str(),
        config.core_provider(),
        config.judge_provider(&config.pre_filter),
        config.judge_provider(&config.post_filter),
    ] {
        if !names.iter().any(|n| n == referenced) {
            names.push(referenced.to_string());
        }
    }

    for name in names {
        let provider_config = config.providers.get(&name).cloned().unwrap_or_default();

        let api_key = provider_config
            .api_key
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let base_url = match provider_config.api_url.or_else(|| default_base_url(&name)) {
            Some(url) => url,
            None => {
                return Err(ProviderError::NotConfigured(format!(
                    "provider '{name}' has no api_url and no known default endpoint"
                )));
            }
        };

        let provider = OpenAiCompatProvider::new(name.as_str(), base_url, api_key)?;
        router.register(name, Arc::new(provider));
    }

    Ok(router)
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1",
        "openai" => "https://api.openai.com/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url.into())
}
