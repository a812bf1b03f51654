//! Configuration loading, validation, and management for groundrag.
//!
//! Loads configuration from `~/.groundrag/config.toml` with environment
//! variable overrides. Validates all settings at startup.
//!
//! The three model roles (answer generation, relevancy pre-filter, grounding
//! post-filter) are configured independently, each with its own threshold
//! and optional system prompt override.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.groundrag/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider used by any role that doesn't name one
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Answer generation
    #[serde(default)]
    pub core: GeneratorConfig,

    /// Relevancy filter applied to context before generation
    #[serde(default, alias = "pre-filter")]
    pub pre_filter: JudgeConfig,

    /// Grounding validator applied to the generated answer
    #[serde(default, alias = "post-filter")]
    pub post_filter: JudgeConfig,

    /// Context assembly settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Knowledge store settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openrouter".into()
}
fn default_model() -> String {
    "anthropic/claude-sonnet-4".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_judge_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> Option<u32> {
    Some(4096)
}
fn default_threshold() -> f64 {
    0.5
}

fn redact(secret: &Option<String>) -> &'static str {
    if secret.is_some() { "<set>" } else { "<unset>" }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("core", &self.core)
            .field("pre_filter", &self.pre_filter)
            .field("post_filter", &self.post_filter)
            .field("retrieval", &self.retrieval)
            .field("knowledge", &self.knowledge)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// The answering model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Provider name; falls back to `default_provider`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: None,
        }
    }
}

/// A scoring judge (relevancy or grounding).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Provider name; falls back to `default_provider`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Model name; falls back to `core.model`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default = "default_judge_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Rubric override; the built-in rubric is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Scores strictly above this are a positive decision
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            temperature: default_judge_temperature(),
            max_tokens: None,
            system_prompt: None,
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Recent short-term memory entries placed ahead of retrieved documents
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Documents requested from the knowledge store per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Per external call (generation, judge, knowledge query)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_timeout_secs: Option<u64>,
}

fn default_history_window() -> usize {
    5
}
fn default_top_k() -> usize {
    20
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            top_k: default_top_k(),
            call_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory of text files loaded into the knowledge store at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_dir: Option<String>,

    /// Soft upper bound on characters per stored chunk
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,

    /// Embedding model; keyword ranking is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
}

fn default_chunk_chars() -> usize {
    1200
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            documents_dir: None,
            chunk_chars: default_chunk_chars(),
            embedding_model: None,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// Key variables, most specific first.
const API_KEY_VARS: &[&str] = &["GROUNDRAG_API_KEY", "OPENROUTER_API_KEY", "OPENAI_API_KEY"];

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
}

impl AppConfig {
    /// `~/.groundrag/config.toml` with environment overrides applied.
    ///
    /// A key in the file wins over `GROUNDRAG_API_KEY`, `OPENROUTER_API_KEY`
    /// and `OPENAI_API_KEY` (checked in that order). `GROUNDRAG_PROVIDER`
    /// and `GROUNDRAG_MODEL` always win over the file.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if self.api_key.is_none() {
            self.api_key = first_env(API_KEY_VARS);
        }
        if let Some(provider) = first_env(&["GROUNDRAG_PROVIDER"]) {
            self.default_provider = provider;
        }
        if let Some(model) = first_env(&["GROUNDRAG_MODEL"]) {
            self.core.model = model;
        }
    }

    /// Read `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Config file absent, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        Self::from_toml_str(&content).map_err(|e| e.at(path))
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn config_dir() -> PathBuf {
        home_dir().join(".groundrag")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let temps = [
            ("core.temperature", self.core.temperature),
            ("pre_filter.temperature", self.pre_filter.temperature),
            ("post_filter.temperature", self.post_filter.temperature),
        ];
        for (name, t) in temps {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be between 0.0 and 2.0"
                )));
            }
        }

        let thresholds = [
            ("pre_filter.threshold", self.pre_filter.threshold),
            ("post_filter.threshold", self.post_filter.threshold),
        ];
        for (name, t) in thresholds {
            if !(0.0..=1.0).contains(&t) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be between 0.0 and 1.0"
                )));
            }
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::Invalid(
                "retrieval.top_k must be > 0".into(),
            ));
        }

        if self.knowledge.chunk_chars == 0 {
            return Err(ConfigError::Invalid(
                "knowledge.chunk_chars must be > 0".into(),
            ));
        }

        if self.retrieval.call_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "retrieval.call_timeout_secs must be > 0 when set".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some() || self.providers.values().any(|p| p.api_key.is_some())
    }

    /// Provider name for the answering model.
    pub fn core_provider(&self) -> &str {
        self.core.provider.as_deref().unwrap_or(&self.default_provider)
    }

    /// Provider name for a judge.
    pub fn judge_provider<'a>(&'a self, judge: &'a JudgeConfig) -> &'a str {
        judge.provider.as_deref().unwrap_or(&self.default_provider)
    }

    /// Model name for a judge, falling back to the answering model.
    pub fn judge_model<'a>(&'a self, judge: &'a JudgeConfig) -> &'a str {
        judge.model.as_deref().unwrap_or(&self.core.model)
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            core: GeneratorConfig::default(),
            pre_filter: JudgeConfig::default(),
            post_filter: JudgeConfig::default(),
            retrieval: RetrievalConfig::default(),
            knowledge: KnowledgeConfig::default(),
            providers: HashMap::new(),
        }
    }
}

fn home_dir() -> PathBuf {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("cannot parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Attach the file a parse error came from.
    fn at(self, path: &Path) -> Self {
        match self {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        }
    }
}
