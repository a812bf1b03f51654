//! Memory implementations for groundrag: the short-term conversational log
//! and the knowledge index the agent retrieves documents from.

pub mod chunk;
pub mod in_memory;
pub mod index;
pub mod noop;
pub mod vector;

pub use chunk::chunk_text;
pub use in_memory::InMemoryShortTerm;
pub use index::InMemoryVectorStore;
pub use noop::NoopVectorStore;
pub use vector::{cosine_similarity, keyword_score};
