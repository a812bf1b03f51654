//! LLM Provider implementations for groundrag.
//!
//! All providers implement the `groundrag_core::Provider` trait.
//! The router selects the correct provider based on configuration, and
//! [`ChatGenerator`] turns a provider into the `TextGenerator` capability
//! the agent consumes.

pub mod generator;
pub mod openai_compat;
pub mod router;

pub use generator::ChatGenerator;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_from_config, ProviderRouter};
