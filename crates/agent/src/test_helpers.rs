//! Shared scripted stand-ins for agent tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use groundrag_core::error::{MemoryError, ProviderError};
use groundrag_core::memory::{VectorQueryResponse, VectorStore};
use groundrag_core::message::Message;
use groundrag_core::TextGenerator;

/// One recorded `TextGenerator::run` invocation.
#[derive(Debug, Clone)]
pub struct GeneratorCall {
    pub query: String,
    pub context: Option<Vec<Message>>,
}

/// A generator that replies with scripted assistant texts in order.
///
/// Panics if called more times than it has replies, unless built with
/// [`ScriptedGenerator::repeating`].
pub struct ScriptedGenerator {
    replies: Vec<String>,
    repeat: bool,
    silent: bool,
    calls: Mutex<Vec<GeneratorCall>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies,
            repeat: false,
            silent: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Cycles through `replies` forever.
    pub fn repeating(replies: Vec<String>) -> Self {
        Self {
            repeat: true,
            ..Self::new(replies)
        }
    }

    /// Always answers with zero messages.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<GeneratorCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn run(
        &self,
        query: &str,
        context: Option<&[Message]>,
    ) -> Result<Vec<Message>, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(GeneratorCall {
            query: query.to_string(),
            context: context.map(<[Message]>::to_vec),
        });

        if self.silent {
            return Ok(Vec::new());
        }
        let reply = if self.repeat {
            &self.replies[index % self.replies.len()]
        } else {
            self.replies.get(index).unwrap_or_else(|| {
                panic!(
                    "ScriptedGenerator: no more replies (call #{index}, have {})",
                    self.replies.len()
                )
            })
        };
        Ok(vec![Message::assistant(reply.as_str())])
    }
}

/// A generator whose backend is always down.
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn run(
        &self,
        _query: &str,
        _context: Option<&[Message]>,
    ) -> Result<Vec<Message>, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

/// A generator that never answers within any sensible deadline.
pub struct StalledGenerator;

#[async_trait]
impl TextGenerator for StalledGenerator {
    async fn run(
        &self,
        _query: &str,
        _context: Option<&[Message]>,
    ) -> Result<Vec<Message>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![Message::assistant("too late")])
    }
}

/// A knowledge store with a fixed document list, recording requested counts.
pub struct StaticStore {
    documents: Vec<String>,
    requests: Mutex<Vec<(String, usize)>>,
}

impl StaticStore {
    pub fn new(documents: &[&str]) -> Self {
        Self {
            documents: documents.iter().map(|d| d.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for StaticStore {
    fn name(&self) -> &str {
        "static"
    }

    async fn query(
        &self,
        query_string: &str,
        return_n: usize,
    ) -> Result<VectorQueryResponse, MemoryError> {
        self.requests
            .lock()
            .unwrap()
            .push((query_string.to_string(), return_n));
        Ok(VectorQueryResponse::from_documents(
            self.documents.iter().take(return_n).cloned().collect(),
        ))
    }
}

/// A knowledge store that is unreachable.
pub struct FailingStore;

#[async_trait]
impl VectorStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn query(&self, _query_string: &str, _return_n: usize) -> Result<VectorQueryResponse, MemoryError> {
        Err(MemoryError::QueryFailed("index offline".into()))
    }
}

/// A well-formed judge reply with the given score.
pub fn verdict(score: f64) -> String {
    format!(r#"{{"reason": "scripted", "score": {score}}}"#)
}
