//! Scored judges: a language model compares two texts and answers with a
//! JSON verdict `{"reason": ..., "score": ...}`, which is then thresholded.
//!
//! - [`RelevancyFilter`] scores each knowledge segment against the query.
//! - [`GroundingValidator`] scores a generated answer against its context.
//!
//! A reply that cannot be decoded is a [`JudgeParseError`]. It never reaches
//! the caller: relevancy drops the item, grounding reports "not grounded".

pub mod grounding;
pub mod relevancy;

use std::sync::Arc;
use std::time::Duration;

use groundrag_core::error::{Error, JudgeParseError};
use groundrag_core::{Result, TextGenerator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::deadline;

pub use grounding::{GROUNDING_VALIDATOR_PROMPT, GroundingValidator};
pub use relevancy::{RELEVANCY_FILTER_PROMPT, RelevancyFilter};

/// A decoded judge reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(default)]
    pub reason: String,
    pub score: f64,
}

impl Verdict {
    /// Decode a raw judge reply.
    ///
    /// Only surrounding whitespace is tolerated; fenced or chatty replies are
    /// rejected.
    pub fn parse(raw: &str) -> std::result::Result<Self, JudgeParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(JudgeParseError::EmptyResponse);
        }

        let value: Value =
            serde_json::from_str(raw).map_err(|e| JudgeParseError::InvalidJson(e.to_string()))?;
        let score = value
            .get("score")
            .and_then(Value::as_f64)
            .ok_or(JudgeParseError::MissingScore)?;
        if !(0.0..=1.0).contains(&score) {
            return Err(JudgeParseError::ScoreOutOfRange(score));
        }

        serde_json::from_value(value).map_err(|e| JudgeParseError::InvalidJson(e.to_string()))
    }
}

/// Decision boundary of a judge. A score is accepted only when strictly
/// greater than the threshold.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::Config {
                message: format!("threshold must be within [0, 1], got {value}"),
            });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn admits(self, score: f64) -> bool {
        score > self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(0.5)
    }
}

/// The generator-plus-threshold pair both judges are built on.
pub(crate) struct ScoredJudge {
    kind: &'static str,
    generator: Arc<dyn TextGenerator>,
    threshold: Threshold,
    call_timeout: Option<Duration>,
}

impl ScoredJudge {
    pub(crate) fn new(kind: &'static str, generator: Arc<dyn TextGenerator>, threshold: Threshold) -> Self {
        Self {
            kind,
            generator,
            threshold,
            call_timeout: None,
        }
    }

    pub(crate) fn set_call_timeout(&mut self, limit: Option<Duration>) {
        self.call_timeout = limit;
    }

    pub(crate) fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Ask the judge for a score. The outer `Result` carries generation
    /// failures; `None` means the reply could not be decoded.
    pub(crate) async fn score(&self, prompt: &str) -> Result<Option<f64>> {
        let replies = deadline::generate(self.generator.as_ref(), prompt, None, self.call_timeout).await?;
        let verdict = match replies.first() {
            Some(reply) => Verdict::parse(&reply.content),
            None => Err(JudgeParseError::EmptyResponse),
        };

        match verdict {
            Ok(verdict) => {
                debug!(judge = self.kind, score = verdict.score, reason = %verdict.reason, "Verdict");
                Ok(Some(verdict.score))
            }
            Err(e) => {
                warn!(judge = self.kind, error = %e, "Unreadable verdict");
                Ok(None)
            }
        }
    }
}
