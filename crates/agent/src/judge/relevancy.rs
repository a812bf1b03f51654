//! Pre-generation filter: keeps only the context entries a judge rates as
//! relevant to the query.

use std::sync::Arc;
use std::time::Duration;

use groundrag_core::message::HasContent;
use groundrag_core::{Result, TextGenerator};
use tracing::debug;

use super::{ScoredJudge, Threshold};

/// Default rubric for the relevancy judge.
pub const RELEVANCY_FILTER_PROMPT: &str = r#"You are a grading assistant. Rate how closely a knowledge segment, found by semantic search, relates to a user query.

Consider both the meaning and the context of the two texts, then give a score between 0.0 and 1.0:
    0.0: unrelated.
    1.0: directly relevant to the query.
Back the score with a short reason.

Input format:
User Query: "<user query>" Knowledge Segment: "<knowledge segment>"

Output format (JSON):
{
  "reason": "<string>",
  "score": <float>
}

Reply with that JSON object only, using exactly the keys "reason" and "score"."#;

pub struct RelevancyFilter {
    judge: ScoredJudge,
}

impl RelevancyFilter {
    pub fn new(generator: Arc<dyn TextGenerator>, threshold: Threshold) -> Self {
        Self {
            judge: ScoredJudge::new("relevancy", generator, threshold),
        }
    }

    pub fn with_call_timeout(mut self, limit: Option<Duration>) -> Self {
        self.judge.set_call_timeout(limit);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.judge.threshold().value()
    }

    /// Score every item, one judge call each. The result is aligned with
    /// `items`; an unreadable verdict leaves `None` at that position.
    pub async fn score_items<T: HasContent + Sync>(
        &self,
        query: &str,
        items: &[T],
    ) -> Result<Vec<Option<f64>>> {
        let mut scores = Vec::with_capacity(items.len());
        for item in items {
            let prompt = format!(
                "User Query: \"{query}\" Knowledge Segment: \"{}\"",
                item.content()
            );
            scores.push(self.judge.score(&prompt).await?);
        }
        Ok(scores)
    }

    /// Scores of the items whose verdicts could be read, in input order.
    pub async fn evaluate<T: HasContent + Sync>(&self, query: &str, items: &[T]) -> Result<Vec<f64>> {
        Ok(self.score_items(query, items).await?.into_iter().flatten().collect())
    }

    /// Items scored strictly above the threshold, in input order.
    pub async fn select_relevant<T: HasContent + Clone + Sync>(
        &self,
        query: &str,
        items: &[T],
    ) -> Result<Vec<T>> {
        let scores = self.score_items(query, items).await?;
        let threshold = self.judge.threshold();
        let selected: Vec<T> = items
            .iter()
            .zip(scores)
            .filter(|(_, score)| score.is_some_and(|s| threshold.admits(s)))
            .map(|(item, _)| item.clone())
            .collect();

        debug!(
            candidates = items.len(),
            selected = selected.len(),
            threshold = threshold.value(),
            "Relevancy filter applied"
        );
        Ok(selected)
    }
}
