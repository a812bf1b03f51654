//! Post-generation check: is the generated answer supported by the context
//! it was produced from?

use std::sync::Arc;
use std::time::Duration;

use groundrag_core::message::{HasContent, join_contents};
use groundrag_core::{Result, TextGenerator};
use tracing::info;

use super::{ScoredJudge, Threshold};

/// Default rubric for the grounding judge.
pub const GROUNDING_VALIDATOR_PROMPT: &str = r#"You are a grounding validator. Decide whether an LLM response is supported by the context it was given.

Check the claims in the response against the context, then give a score between 0.0 and 1.0:
    0.0: invented or unsupported by the context.
    1.0: fully supported by the context and factually consistent with it.
Back the score with a short explanation that points at the parts of the response and context you compared.

Input format:
LLM Response: "<LLM response>" Context: "<context>"

Output format (JSON):
{
  "reason": "<string>",
  "score": <float>
}

Reply with that JSON object only, using exactly the keys "reason" and "score"."#;

pub struct GroundingValidator {
    judge: ScoredJudge,
}

impl GroundingValidator {
    pub fn new(generator: Arc<dyn TextGenerator>, threshold: Threshold) -> Self {
        Self {
            judge: ScoredJudge::new("grounding", generator, threshold),
        }
    }

    pub fn with_call_timeout(mut self, limit: Option<Duration>) -> Self {
        self.judge.set_call_timeout(limit);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.judge.threshold().value()
    }

    /// One judge call over all responses and all context entries.
    ///
    /// Returns `false` when the verdict cannot be read.
    pub async fn catch<R, C>(&self, responses: &[R], context: &[C]) -> Result<bool>
    where
        R: HasContent + Sync,
        C: HasContent + Sync,
    {
        let prompt = format!(
            "LLM Response: \"{}\" Context: \"{}\"",
            join_contents(responses),
            join_contents(context)
        );
        let grounded = match self.judge.score(&prompt).await? {
            Some(score) => self.judge.threshold().admits(score),
            None => false,
        };

        info!(grounded, context_items = context.len(), "Grounding checked");
        Ok(grounded)
    }
}
