//! The grounded answering agent.
//!
//! Each question goes through four stages:
//!
//! 1. **Assemble** recent conversation and retrieved knowledge into context
//! 2. **Filter** the context, keeping entries a judge scores as relevant
//! 3. **Generate** an answer from the filtered context
//! 4. **Validate** the answer against the full context; refuse if ungrounded
//!
//! Only grounded answers are committed to short-term memory.

pub mod agent;
pub mod context;
mod deadline;
pub mod judge;

#[cfg(test)]
mod test_helpers;

pub use agent::{AskReport, GroundedAgent, Outcome, REFUSAL_MESSAGE, Stage};
pub use context::ContextAssembler;
pub use judge::{
    GROUNDING_VALIDATOR_PROMPT, GroundingValidator, RELEVANCY_FILTER_PROMPT, RelevancyFilter, Threshold,
    Verdict,
};
