//! Shared setup for `ask` and `chat`: config, providers, knowledge, agent.

use std::path::PathBuf;
use std::sync::Arc;

use groundrag_agent::GroundedAgent;
use groundrag_config::AppConfig;
use groundrag_memory::InMemoryShortTerm;

use super::knowledge;

/// A ready-to-use agent plus what it was built from.
pub struct Session {
    pub agent: GroundedAgent,
    pub config: AppConfig,
    pub chunks: usize,
}

pub async fn start(docs: Option<PathBuf>) -> Result<Session, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Fail early with setup instructions when no key is available
    if !config.has_api_key() && !runs_locally(&config) {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENROUTER_API_KEY=sk-or-v1-...   (recommended)");
        eprintln!("    OPENAI_API_KEY=sk-...             (for OpenAI direct)");
        eprintln!("    GROUNDRAG_API_KEY=sk-...          (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = groundrag_providers::build_from_config(&config)?;
    let (store, chunks) = knowledge::build_store(&config, &router, docs).await?;
    let memory = Arc::new(InMemoryShortTerm::new());
    let agent = GroundedAgent::from_config(&config, &router, memory, store)?;

    Ok(Session { agent, config, chunks })
}

/// Local endpoints take no key.
fn runs_locally(config: &AppConfig) -> bool {
    const LOCAL: &[&str] = &["ollama", "vllm", "llamacpp", "llama.cpp"];
    [
        config.core_provider(),
        config.judge_provider(&config.pre_filter),
        config.judge_provider(&config.post_filter),
    ]
    .iter()
    .all(|name| LOCAL.contains(name))
}
