//! Message domain type.
//!
//! Messages are the value objects that flow through the whole pipeline:
//! short-term memory stores them, the context assembler orders them, and the
//! generation capability consumes and produces them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user (also used for retrieved knowledge segments)
    User,
    /// The AI assistant
    Assistant,
    /// System instructions; only generator adapters emit these
    System,
}

/// A single message. Immutable once created by convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    /// Optional metadata (provider info, retrieval source, etc.)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    /// Create a message with the given role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Attach a metadata key/value.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Anything a judge can read text from.
pub trait HasContent {
    fn content(&self) -> &str;
}

impl HasContent for Message {
    fn content(&self) -> &str {
        &self.content
    }
}

impl HasContent for String {
    fn content(&self) -> &str {
        self
    }
}

impl HasContent for &str {
    fn content(&self) -> &str {
        self
    }
}

/// Join the `content` of every item, each terminated by a newline.
pub fn join_contents<T: HasContent>(items: &[T]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(item.content());
        out.push('\n');
    }
    out
}
