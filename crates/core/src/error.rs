//! Errors. One enum per backend seam, folded into [`Error`] at the pipeline.

use thiserror::Error;

/// Failure of a whole `ask` call.
///
/// Callers can tell a backend failure (`Generation`, `Retrieval`) apart from
/// a refused answer, which is a successful result rather than an error.
#[derive(Debug, Error)]
pub enum Error {
    /// A generator (answer model or judge) could not be reached.
    #[error("Generation failed: {0}")]
    Generation(#[from] ProviderError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] MemoryError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The call succeeded but carried no text to use as an answer.
    #[error("Empty reply from {0}")]
    EmptyReply(String),
}

#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Memory operation timed out: {0}")]
    Timeout(String),
}

/// A judge's reply could not be decoded into a verdict.
///
/// Never surfaced to callers: the relevancy filter drops the item and the
/// grounding validator reports "not grounded".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JudgeParseError {
    #[error("judge reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("judge reply has no numeric \"score\" field")]
    MissingScore,

    #[error("judge score {0} is outside [0, 1]")]
    ScoreOutOfRange(f64),

    #[error("judge returned no messages")]
    EmptyResponse,
}
