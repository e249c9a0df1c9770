//! Conversation loop implementation
//!
//! Drives the model until it produces a final text answer: every pending
//! history is sent to the provider, the reply is appended, requested tools
//! are executed, and their results are appended as one turn.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::AgentConfig;
use crate::error::{BriefError, Result};
use crate::providers::{ChatOptions, LLMProvider, StopReason, ToolDefinition};
use crate::session::{ContentBlock, ConversationStore, ToolRequest};
use crate::tools::{ToolContext, ToolExecutor, ToolRegistry};

/// Counters for one or more runs of a loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Model calls issued
    pub model_calls: usize,
    /// Tool requests executed
    pub tool_executions: usize,
    /// Tool results flagged as errors
    pub tool_errors: usize,
    /// Input tokens reported by the provider
    pub input_tokens: u64,
    /// Output tokens reported by the provider
    pub output_tokens: u64,
}

/// Knobs of the loop that do not change during a run.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Options sent with every model call
    pub options: ChatOptions,
    /// Maximum model calls per run
    pub max_iterations: usize,
    /// Per-tool wall clock limit; zero disables
    pub tool_timeout: Duration,
    /// Run one reply's tool batch concurrently
    pub parallel_tools: bool,
    /// Date handed to tools
    pub today: Option<NaiveDate>,
}

impl LoopSettings {
    /// Settings from the agent config section and a system instruction.
    pub fn from_config(agent: &AgentConfig, system: &str) -> Self {
        let mut options = ChatOptions::new()
            .with_model(&agent.model)
            .with_system(system)
            .with_max_tokens(agent.max_tokens);
        if let Some(temperature) = agent.temperature {
            options = options.with_temperature(temperature);
        }
        Self {
            options,
            max_iterations: agent.max_tool_iterations,
            tool_timeout: Duration::from_secs(agent.tool_timeout_secs),
            parallel_tools: agent.parallel_tools,
            today: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default(), "")
    }
}

/// The tool-calling conversation loop.
///
/// Owns the conversation store; the provider and tool registry are shared.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use good_morning::agent::{ConversationLoop, LoopSettings};
/// use good_morning::providers::{ChatOptions, LLMProvider, LLMResponse, ToolDefinition};
/// use good_morning::session::{ConversationStore, Turn};
/// use good_morning::tools::ToolRegistry;
/// use tokio_util::sync::CancellationToken;
///
/// # struct Canned;
/// # #[async_trait]
/// # impl LLMProvider for Canned {
/// #     async fn chat(
/// #         &self,
/// #         _turns: Vec<Turn>,
/// #         _tools: Vec<ToolDefinition>,
/// #         _options: ChatOptions,
/// #     ) -> good_morning::Result<LLMResponse> {
/// #         Ok(LLMResponse::text("Nothing scheduled."))
/// #     }
/// #     fn default_model(&self) -> &str { "canned" }
/// #     fn name(&self) -> &str { "canned" }
/// # }
/// # tokio_test::block_on(async {
/// let mut store = ConversationStore::in_memory();
/// store.append_user("What's on today?").unwrap();
/// let mut conversation = ConversationLoop::new(
///     Arc::new(Canned),
///     Arc::new(ToolRegistry::new()),
///     store,
///     LoopSettings::default(),
/// );
/// let answer = conversation.run(&CancellationToken::new()).await.unwrap();
/// assert_eq!(answer, "Nothing scheduled.");
/// assert_eq!(conversation.stats().model_calls, 1);
/// # });
/// ```
pub struct ConversationLoop {
    provider: Arc<dyn LLMProvider>,
    tools: Arc<ToolRegistry>,
    store: ConversationStore,
    settings: LoopSettings,
    stats: LoopStats,
}

impl ConversationLoop {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tools: Arc<ToolRegistry>,
        store: ConversationStore,
        settings: LoopSettings,
    ) -> Self {
        Self {
            provider,
            tools,
            store,
            settings,
            stats: LoopStats::default(),
        }
    }

    /// The conversation history.
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Mutable access for seeding turns before a run.
    pub fn store_mut(&mut self) -> &mut ConversationStore {
        &mut self.store
    }

    /// Give back the store, e.g. to inspect the transcript after a run.
    pub fn into_store(self) -> ConversationStore {
        self.store
    }

    /// Counters accumulated over every run so far.
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Run until the model returns a final answer.
    ///
    /// Returns the answer text verbatim, or an empty string when the model
    /// stops without a terminal text block and nothing new is pending.
    ///
    /// # Errors
    /// - `Provider`/`ProviderTyped`/`Http` when a model call fails (not retried)
    /// - `LoopLimit` when the model keeps asking for tools past the bound
    /// - `Cancelled` when `cancel` fires; nothing is appended after that point
    /// - `Session` when a fail-fast store cannot persist an append
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<String> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("conversation", run_id = %run_id);
        self.run_inner(cancel, &run_id).instrument(span).await
    }

    async fn run_inner(&mut self, cancel: &CancellationToken, run_id: &str) -> Result<String> {
        let definitions = self.tools.definitions();
        let mut ctx = ToolContext::new().with_run_id(run_id);
        if let Some(today) = self.settings.today {
            ctx = ctx.with_today(today);
        }

        info!(
            turns = self.store.len(),
            tools = definitions.len(),
            "Starting conversation loop"
        );

        let mut iterations = 0usize;
        let mut last_tools: Vec<String> = Vec::new();

        // A run cancelled during tool execution leaves tool-use blocks
        // without results; the provider rejects that history until they
        // are answered.
        let unanswered = self.store.unanswered_tool_requests();
        if !unanswered.is_empty() {
            info!(
                tools = unanswered.len(),
                "Re-running tool requests left unanswered by an earlier run"
            );
            last_tools = unanswered.iter().map(|r| r.name.clone()).collect();
            self.run_tools(cancel, &ctx, &unanswered).await?;
        }

        while self.store.has_pending() {
            if cancel.is_cancelled() {
                info!("Conversation cancelled before model call");
                return Err(BriefError::Cancelled);
            }
            if iterations >= self.settings.max_iterations {
                warn!(iterations, "Conversation loop limit reached");
                return Err(BriefError::LoopLimit {
                    iterations,
                    tools: last_tools,
                });
            }
            iterations += 1;

            let requests = match self.call_model(cancel, &definitions).await? {
                Step::Final(text) => {
                    info!(
                        iterations,
                        answer_len = text.len(),
                        "Conversation finished"
                    );
                    return Ok(text);
                }
                Step::Tools(requests) => requests,
                Step::Continue => continue,
            };

            last_tools = requests.iter().map(|r| r.name.clone()).collect();
            debug!(iteration = iterations, tools = ?last_tools, "Executing tool batch");
            self.run_tools(cancel, &ctx, &requests).await?;
        }

        info!(iterations, "Conversation ended without a final answer");
        Ok(String::new())
    }

    /// Execute one batch and append its results as a single turn.
    async fn run_tools(
        &mut self,
        cancel: &CancellationToken,
        ctx: &ToolContext,
        requests: &[ToolRequest],
    ) -> Result<()> {
        let executor =
            ToolExecutor::new(&self.tools, ctx.clone()).with_timeout(self.settings.tool_timeout);
        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Conversation cancelled during tool execution");
                return Err(BriefError::Cancelled);
            }
            results = executor.execute_all(requests, self.settings.parallel_tools) => results,
        };

        self.stats.tool_executions += results.len();
        self.stats.tool_errors += results.iter().filter(|r| r.is_error).count();
        self.store.append_tool_results(results)
    }

    /// One model call and the processing of its reply.
    async fn call_model(
        &mut self,
        cancel: &CancellationToken,
        definitions: &[ToolDefinition],
    ) -> Result<Step> {
        let turns = self.store.snapshot();
        let chat = self
            .provider
            .chat(turns, definitions.to_vec(), self.settings.options.clone());

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Conversation cancelled during model call");
                return Err(BriefError::Cancelled);
            }
            outcome = chat => outcome,
        };
        self.store.clear_pending();
        self.stats.model_calls += 1;
        let response = outcome?;

        if let Some(usage) = &response.usage {
            self.stats.input_tokens += u64::from(usage.input_tokens);
            self.stats.output_tokens += u64::from(usage.output_tokens);
            info!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = %response.stop_reason,
                "Model call completed"
            );
        }

        self.store.append_assistant(response.content.clone())?;

        let mut requests = Vec::new();
        for block in &response.content {
            match block {
                ContentBlock::Text { text } if response.stop_reason == StopReason::ToolUse => {
                    info!(commentary = %text, "Model commentary");
                }
                ContentBlock::Text { text } => {
                    if response.stop_reason == StopReason::MaxTokens {
                        warn!("Final answer was cut off at the output token limit");
                    }
                    return Ok(Step::Final(text.clone()));
                }
                ContentBlock::ToolUse { .. } => {
                    requests.extend(block.as_tool_request());
                }
                ContentBlock::ToolResult { .. } => {}
            }
        }

        if requests.is_empty() {
            Ok(Step::Continue)
        } else {
            Ok(Step::Tools(requests))
        }
    }
}

/// What a processed reply asks the loop to do next.
enum Step {
    Final(String),
    Tools(Vec<ToolRequest>),
    Continue,
}
