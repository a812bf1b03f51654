//! The grounded answering agent.
//!
//! Every question runs the same pipeline, with no retries:
//!
//! ```text
//! Start → ContextBuilt → Filtered → Generated ─┬→ Grounded → Committed ─┬→ Returned
//!                                              └→ Ungrounded → Refused ─┘
//! ```
//!
//! A grounded answer is written to short-term memory and returned. An
//! ungrounded one is discarded and replaced by [`REFUSAL_MESSAGE`].

use std::sync::Arc;
use std::time::Duration;

use groundrag_config::{AppConfig, JudgeConfig};
use groundrag_core::memory::{ShortTermMemory, VectorStore};
use groundrag_core::error::ProviderError;
use groundrag_core::message::Message;
use groundrag_core::provider::Provider;
use groundrag_core::{Error, Result, TextGenerator};
use groundrag_providers::{ChatGenerator, ProviderRouter};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::ContextAssembler;
use crate::deadline;
use crate::judge::{
    GROUNDING_VALIDATOR_PROMPT, GroundingValidator, RELEVANCY_FILTER_PROMPT, RelevancyFilter, Threshold,
};

/// The reply given in place of an answer that failed the grounding check.
pub const REFUSAL_MESSAGE: &str = "I don't want to lie, I don't know the answer to your question.";

/// Pipeline stages, in the order a question passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    ContextBuilt,
    Filtered,
    Generated,
    Grounded,
    Committed,
    Ungrounded,
    Refused,
    Returned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Grounded,
    Refused,
}

/// Everything [`GroundedAgent::run`] learned while answering.
#[derive(Debug, Clone, Serialize)]
pub struct AskReport {
    /// What the caller should show: the generated answer or the refusal.
    pub messages: Vec<Message>,
    pub outcome: Outcome,
    /// Stages actually traversed.
    pub stages: Vec<Stage>,
    /// Context size before relevancy filtering.
    pub context_items: usize,
    /// Context size after relevancy filtering.
    pub relevant_items: usize,
}

pub struct GroundedAgent {
    generator: Arc<dyn TextGenerator>,
    relevancy: RelevancyFilter,
    grounding: GroundingValidator,
    assembler: ContextAssembler,
    call_timeout: Option<Duration>,
}

impl GroundedAgent {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        relevancy: RelevancyFilter,
        grounding: GroundingValidator,
        assembler: ContextAssembler,
    ) -> Self {
        Self {
            generator,
            relevancy,
            grounding,
            assembler,
            call_timeout: None,
        }
    }

    /// Build the full pipeline from configuration.
    ///
    /// The answering model and both judges each get their own provider,
    /// model, prompt, and threshold.
    pub fn from_config(
        config: &AppConfig,
        router: &ProviderRouter,
        short_term: Arc<dyn ShortTermMemory>,
        vector: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        let core = &config.core;
        let mut generator = ChatGenerator::new(provider(router, config.core_provider())?, &core.model)
            .with_temperature(core.temperature)
            .with_max_tokens(core.max_tokens);
        if let Some(prompt) = &core.system_prompt {
            generator = generator.with_system_prompt(prompt.as_str());
        }

        let relevancy = RelevancyFilter::new(
            judge_generator(config, router, &config.pre_filter, RELEVANCY_FILTER_PROMPT)?,
            Threshold::new(config.pre_filter.threshold)?,
        );
        let grounding = GroundingValidator::new(
            judge_generator(config, router, &config.post_filter, GROUNDING_VALIDATOR_PROMPT)?,
            Threshold::new(config.post_filter.threshold)?,
        );
        let assembler = ContextAssembler::new(short_term, vector)
            .with_history_window(config.retrieval.history_window)
            .with_top_k(config.retrieval.top_k);

        info!(
            core_model = %core.model,
            relevancy_model = config.judge_model(&config.pre_filter),
            grounding_model = config.judge_model(&config.post_filter),
            "Agent pipeline built"
        );

        Ok(Self::new(Arc::new(generator), relevancy, grounding, assembler)
            .with_call_timeout(config.retrieval.call_timeout_secs.map(Duration::from_secs)))
    }

    /// Deadline for every external call: generation, each judge call, and the
    /// knowledge store query.
    pub fn with_call_timeout(mut self, limit: Option<Duration>) -> Self {
        self.call_timeout = limit;
        self.relevancy = self.relevancy.with_call_timeout(limit);
        self.grounding = self.grounding.with_call_timeout(limit);
        self.assembler = self.assembler.with_call_timeout(limit);
        self
    }

    pub fn relevancy_filter(&self) -> &RelevancyFilter {
        &self.relevancy
    }

    pub fn grounding_validator(&self) -> &GroundingValidator {
        &self.grounding
    }

    /// Answer `query`, returning either the grounded answer or the refusal.
    pub async fn ask(&self, query: &str) -> Result<Vec<Message>> {
        Ok(self.run(query).await?.messages)
    }

    /// Answer `query` and report how the answer was reached.
    pub async fn run(&self, query: &str) -> Result<AskReport> {
        let mut stages = vec![Stage::Start];

        let context = self.assembler.prepare(query).await?;
        stages.push(Stage::ContextBuilt);

        let relevant = self.relevancy.select_relevant(query, &context).await?;
        stages.push(Stage::Filtered);
        debug!(context_items = context.len(), relevant_items = relevant.len(), "Context filtered");

        let generation_context = if relevant.is_empty() {
            None
        } else {
            Some(relevant.as_slice())
        };
        let responses =
            deadline::generate(self.generator.as_ref(), query, generation_context, self.call_timeout).await?;
        if responses.iter().all(|m| m.content.trim().is_empty()) {
            return Err(Error::Generation(ProviderError::EmptyReply(
                "answer generator".into(),
            )));
        }
        stages.push(Stage::Generated);

        // Grounding is judged against everything retrieved, not just what
        // survived the relevancy filter.
        let (messages, outcome) = if self.grounding.catch(&responses, &context).await? {
            stages.push(Stage::Grounded);
            self.assembler.short_term().extend(responses.clone()).await?;
            stages.push(Stage::Committed);
            (responses, Outcome::Grounded)
        } else {
            stages.push(Stage::Ungrounded);
            warn!(responses = responses.len(), "Answer failed grounding check, refusing");
            stages.push(Stage::Refused);
            (vec![Message::assistant(REFUSAL_MESSAGE)], Outcome::Refused)
        };
        stages.push(Stage::Returned);

        info!(outcome = ?outcome, context_items = context.len(), relevant_items = relevant.len(), "Question answered");

        Ok(AskReport {
            messages,
            outcome,
            stages,
            context_items: context.len(),
            relevant_items: relevant.len(),
        })
    }
}

fn provider(router: &ProviderRouter, name: &str) -> Result<Arc<dyn Provider>> {
    router.require(name).map_err(|e| Error::Config {
        message: e.to_string(),
    })
}

fn judge_generator(
    config: &AppConfig,
    router: &ProviderRouter,
    judge: &JudgeConfig,
    rubric: &str,
) -> Result<Arc<dyn TextGenerator>> {
    let provider = provider(router, config.judge_provider(judge))?;
    let prompt = judge.system_prompt.as_deref().unwrap_or(rubric);
    Ok(Arc::new(
        ChatGenerator::new(provider, config.judge_model(judge))
            .with_temperature(judge.temperature)
            .with_max_tokens(judge.max_tokens)
            .with_system_prompt(prompt),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingGenerator, FailingStore, ScriptedGenerator, StalledGenerator, StaticStore, verdict};
    use groundrag_core::error::MemoryError;
    use groundrag_core::message::Role;
    use groundrag_memory::{InMemoryShortTerm, NoopVectorStore};

    struct Pipeline {
        memory: Arc<InMemoryShortTerm>,
        generator: Arc<ScriptedGenerator>,
        relevancy: Arc<ScriptedGenerator>,
        grounding: Arc<ScriptedGenerator>,
        agent: GroundedAgent,
    }

    fn pipeline(
        memory: InMemoryShortTerm,
        store: Arc<dyn VectorStore>,
        answer: &str,
        relevancy_replies: Vec<String>,
        grounding_reply: String,
    ) -> Pipeline {
        let memory = Arc::new(memory);
        let generator = Arc::new(ScriptedGenerator::new(vec![answer.to_string()]));
        let relevancy = Arc::new(ScriptedGenerator::new(relevancy_replies));
        let grounding = Arc::new(ScriptedGenerator::new(vec![grounding_reply]));
        let agent = GroundedAgent::new(
            generator.clone(),
            RelevancyFilter::new(relevancy.clone(), Threshold::default()),
            GroundingValidator::new(grounding.clone(), Threshold::default()),
            ContextAssembler::new(memory.clone(), store),
        );
        Pipeline {
            memory,
            generator,
            relevancy,
            grounding,
            agent,
        }
    }

    #[tokio::test]
    async fn empty_memory_and_store_answers_without_context() {
        let p = pipeline(
            InMemoryShortTerm::new(),
            Arc::new(NoopVectorStore),
            "Hello!",
            vec![],
            verdict(0.9),
        );

        let report = p.agent.run("hi").await.unwrap();
        assert_eq!(report.outcome, Outcome::Grounded);
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.messages[0].content, "Hello!");
        assert_eq!(report.messages[0].role, Role::Assistant);

        assert!(p.relevancy.calls().is_empty());
        let calls = p.generator.calls();
        assert_eq!(calls[0].query, "hi");
        assert!(calls[0].context.is_none());

        let log = p.memory.to_list().await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].content, "hi");
        assert_eq!(log[1].content, "Hello!");

        assert_eq!(
            report.stages,
            vec![
                Stage::Start,
                Stage::ContextBuilt,
                Stage::Filtered,
                Stage::Generated,
                Stage::Grounded,
                Stage::Committed,
                Stage::Returned,
            ]
        );
    }

    #[tokio::test]
    async fn only_relevant_documents_reach_the_generator() {
        let p = pipeline(
            InMemoryShortTerm::new(),
            Arc::new(StaticStore::new(&["rate is 20%", "office hours", "reduced rate 5%"])),
            "The rate is 20%.",
            vec![verdict(0.9), verdict(0.3), verdict(0.6)],
            verdict(0.8),
        );

        let report = p.agent.run("what is the vat rate?").await.unwrap();
        assert_eq!(report.context_items, 3);
        assert_eq!(report.relevant_items, 2);

        let context = p.generator.calls()[0].context.clone().unwrap();
        let contents: Vec<&str> = context.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["rate is 20%", "reduced rate 5%"]);
    }

    #[tokio::test]
    async fn grounding_judged_against_unfiltered_context() {
        let p = pipeline(
            InMemoryShortTerm::new(),
            Arc::new(StaticStore::new(&["kept", "dropped"])),
            "answer",
            vec![verdict(0.9), verdict(0.1)],
            verdict(0.8),
        );

        p.agent.ask("q").await.unwrap();
        assert_eq!(
            p.grounding.calls()[0].query,
            "LLM Response: \"answer\n\" Context: \"kept\ndropped\n\""
        );
    }

    #[tokio::test]
    async fn unreadable_grounding_verdict_refuses() {
        let p = pipeline(
            InMemoryShortTerm::new(),
            Arc::new(StaticStore::new(&["doc"])),
            "made up",
            vec![verdict(0.9)],
            "not json".to_string(),
        );

        let report = p.agent.run("q").await.unwrap();
        assert_eq!(report.outcome, Outcome::Refused);
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.messages[0].role, Role::Assistant);
        assert_eq!(report.messages[0].content, REFUSAL_MESSAGE);
        assert_eq!(
            report.stages[4..],
            [Stage::Ungrounded, Stage::Refused, Stage::Returned]
        );

        let log = p.memory.to_list().await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].content, "q");
    }

    #[tokio::test]
    async fn low_grounding_score_refuses() {
        let p = pipeline(
            InMemoryShortTerm::new(),
            Arc::new(NoopVectorStore),
            "guess",
            vec![],
            verdict(0.5),
        );
        let messages = p.agent.ask("q").await.unwrap();
        assert_eq!(messages[0].content, REFUSAL_MESSAGE);
    }

    #[tokio::test]
    async fn history_feeds_the_next_question() {
        let memory = InMemoryShortTerm::with_entries(vec![
            Message::user("my invoice is INV-7"),
            Message::assistant("Noted."),
        ]);
        let p = pipeline(
            memory,
            Arc::new(NoopVectorStore),
            "INV-7",
            vec![verdict(0.9), verdict(0.2)],
            verdict(0.9),
        );

        p.agent.ask("which invoice?").await.unwrap();
        let relevancy_calls = p.relevancy.calls();
        assert_eq!(relevancy_calls.len(), 2);
        assert!(relevancy_calls[0].query.contains("my invoice is INV-7"));

        let context = p.generator.calls()[0].context.clone().unwrap();
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].content, "my invoice is INV-7");
        assert_eq!(p.memory.len().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let memory = Arc::new(InMemoryShortTerm::new());
        let agent = GroundedAgent::new(
            Arc::new(FailingGenerator),
            RelevancyFilter::new(Arc::new(ScriptedGenerator::new(vec![])), Threshold::default()),
            GroundingValidator::new(Arc::new(ScriptedGenerator::new(vec![])), Threshold::default()),
            ContextAssembler::new(memory.clone(), Arc::new(NoopVectorStore)),
        );

        let err = agent.ask("q").await.unwrap_err();
        assert!(matches!(err, Error::Generation(ProviderError::Network(_))));
        assert_eq!(memory.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn silent_generator_is_a_generation_failure() {
        let memory = Arc::new(InMemoryShortTerm::new());
        let grounding = Arc::new(ScriptedGenerator::new(vec![verdict(0.9)]));
        let agent = GroundedAgent::new(
            Arc::new(ScriptedGenerator::silent()),
            RelevancyFilter::new(Arc::new(ScriptedGenerator::new(vec![])), Threshold::default()),
            GroundingValidator::new(grounding.clone(), Threshold::default()),
            ContextAssembler::new(memory.clone(), Arc::new(NoopVectorStore)),
        );

        let err = agent.ask("q").await.unwrap_err();
        assert!(matches!(err, Error::Generation(ProviderError::EmptyReply(_))));
        assert!(grounding.calls().is_empty());
        assert_eq!(memory.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn blank_answer_is_a_generation_failure() {
        let p = pipeline(
            InMemoryShortTerm::new(),
            Arc::new(NoopVectorStore),
            "   ",
            vec![],
            verdict(0.9),
        );

        let err = p.agent.run("q").await.unwrap_err();
        assert!(matches!(err, Error::Generation(ProviderError::EmptyReply(_))));
        assert!(p.grounding.calls().is_empty());
        assert_eq!(p.memory.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn retrieval_failure_propagates() {
        let p = pipeline(
            InMemoryShortTerm::new(),
            Arc::new(FailingStore),
            "unused",
            vec![],
            verdict(0.9),
        );
        let err = p.agent.ask("q").await.unwrap_err();
        assert!(matches!(err, Error::Retrieval(MemoryError::QueryFailed(_))));
        assert!(p.generator.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_generation_times_out() {
        let agent = GroundedAgent::new(
            Arc::new(StalledGenerator),
            RelevancyFilter::new(Arc::new(ScriptedGenerator::new(vec![])), Threshold::default()),
            GroundingValidator::new(Arc::new(ScriptedGenerator::new(vec![])), Threshold::default()),
            ContextAssembler::new(Arc::new(InMemoryShortTerm::new()), Arc::new(NoopVectorStore)),
        )
        .with_call_timeout(Some(Duration::from_secs(5)));

        let err = agent.ask("q").await.unwrap_err();
        assert!(matches!(err, Error::Generation(ProviderError::Timeout(_))));
    }

    struct CannedProvider;

    #[async_trait::async_trait]
    impl Provider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(
            &self,
            request: groundrag_core::provider::ProviderRequest,
        ) -> std::result::Result<groundrag_core::provider::ProviderResponse, ProviderError> {
            Ok(groundrag_core::provider::ProviderResponse {
                message: Message::assistant(format!("{} says hi", request.model)),
                usage: None,
                model: request.model,
                metadata: serde_json::Map::new(),
            })
        }
    }

    fn router() -> ProviderRouter {
        let mut router = ProviderRouter::new("canned");
        router.register("canned", Arc::new(CannedProvider));
        router
    }

    #[test]
    fn from_config_uses_each_judge_threshold() {
        let config = AppConfig::from_toml_str(
            "default_provider = \"canned\"\n[pre_filter]\nthreshold = 0.3\n[post_filter]\nthreshold = 0.8\n",
        )
        .unwrap();
        let agent = GroundedAgent::from_config(
            &config,
            &router(),
            Arc::new(InMemoryShortTerm::new()),
            Arc::new(NoopVectorStore),
        )
        .unwrap();

        assert!((agent.relevancy_filter().threshold() - 0.3).abs() < f64::EPSILON);
        assert!((agent.grounding_validator().threshold() - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn from_config_requires_registered_provider() {
        let config = AppConfig::from_toml_str("[core]\nprovider = \"missing\"\n").unwrap();
        let result = GroundedAgent::from_config(
            &config,
            &router(),
            Arc::new(InMemoryShortTerm::new()),
            Arc::new(NoopVectorStore),
        );
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn configured_pipeline_refuses_unjudgeable_answers() {
        // The canned provider never emits JSON, so the grounding judge can
        // never read a verdict.
        let config = AppConfig::from_toml_str("default_provider = \"canned\"\n").unwrap();
        let memory = Arc::new(InMemoryShortTerm::new());
        let agent =
            GroundedAgent::from_config(&config, &router(), memory.clone(), Arc::new(NoopVectorStore)).unwrap();

        let messages = agent.ask("hello").await.unwrap();
        assert_eq!(messages[0].content, REFUSAL_MESSAGE);
        assert_eq!(memory.len().await.unwrap(), 1);
    }
}
