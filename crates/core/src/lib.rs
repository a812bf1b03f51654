//! # groundrag Core
//!
//! Domain types, capability traits, and error definitions for the groundrag
//! answering agent. This crate performs **no I/O**: it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external capability the agent consumes is a trait here:
//! - [`TextGenerator`]: "generate messages for a query and optional context"
//! - [`Provider`]: a raw chat/embedding backend that generators wrap
//! - [`ShortTermMemory`]: the rolling log of recent turns
//! - [`VectorStore`]: the similarity-searchable knowledge store
//!
//! Implementations live in their respective crates, so the pipeline can be
//! tested end-to-end against scripted stand-ins.

pub mod error;
pub mod generator;
pub mod memory;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, JudgeParseError, MemoryError, ProviderError, Result};
pub use generator::TextGenerator;
pub use memory::{ShortTermMemory, VectorQueryResponse, VectorQueryResult, VectorStore};
pub use message::{HasContent, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
