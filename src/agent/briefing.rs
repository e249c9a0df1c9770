//! The caller-facing briefing operation.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::error::{BriefError, Result};
use crate::providers::LLMProvider;
use crate::session::ConversationStore;
use crate::tools::ToolRegistry;

use super::context::BriefingPrompt;
use super::r#loop::{ConversationLoop, LoopSettings, LoopStats};

/// Produces the daily markdown report for one date.
pub struct BriefingAgent {
    conversation: ConversationLoop,
    prompt: BriefingPrompt,
}

impl BriefingAgent {
    /// Wire a briefing for `date` from the config, a provider, the tool
    /// registry and a conversation store.
    pub fn new(
        config: &Config,
        date: NaiveDate,
        provider: Arc<dyn LLMProvider>,
        tools: Arc<ToolRegistry>,
        store: ConversationStore,
    ) -> Self {
        let mut prompt = BriefingPrompt::new(date)
            .with_teams(&config.linear.teams)
            .with_tools(tools.names().into_iter().map(String::from).collect());
        if let Some(name) = &config.profile.name {
            prompt = prompt.with_name(name);
        }

        let settings =
            LoopSettings::from_config(&config.agent, &prompt.system_prompt()).with_today(date);
        Self {
            conversation: ConversationLoop::new(provider, tools, store, settings),
            prompt,
        }
    }

    /// Seed the task (unless resuming a transcript that already has turns),
    /// run the conversation and return the report markdown.
    ///
    /// # Errors
    /// Everything [`ConversationLoop::run`] returns, plus `EmptyResponse`
    /// when the model finishes without any report text.
    pub async fn produce_report(&mut self, cancel: &CancellationToken) -> Result<String> {
        let store = self.conversation.store_mut();
        if store.is_empty() {
            for turn in self.prompt.seed_turns() {
                store.append_user(turn)?;
            }
        } else {
            info!(turns = store.len(), "Resuming existing conversation");
        }

        let report = self.conversation.run(cancel).await?;
        if report.trim().is_empty() {
            return Err(BriefError::EmptyResponse);
        }
        Ok(report)
    }

    pub fn stats(&self) -> LoopStats {
        self.conversation.stats()
    }

    pub fn store(&self) -> &ConversationStore {
        self.conversation.store()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ChatOptions, LLMResponse, ToolDefinition};
    use crate::session::Turn;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Fixed {
        reply: &'static str,
        seen: Mutex<usize>,
    }

    #[async_trait]
    impl LLMProvider for Fixed {
        async fn chat(
            &self,
            turns: Vec<Turn>,
            _tools: Vec<ToolDefinition>,
            _options: ChatOptions,
        ) -> Result<LLMResponse> {
            *self.seen.lock().unwrap() = turns.len();
            Ok(LLMResponse::text(self.reply))
        }
        fn default_model(&self) -> &str {
            "fixed"
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn agent(reply: &'static str, store: ConversationStore) -> (BriefingAgent, Arc<Fixed>) {
        let provider = Arc::new(Fixed {
            reply,
            seen: Mutex::new(0),
        });
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let agent = BriefingAgent::new(
            &Config::default(),
            date,
            provider.clone(),
            Arc::new(ToolRegistry::new()),
            store,
        );
        (agent, provider)
    }

    #[tokio::test]
    async fn test_produce_report_seeds_prompt() {
        let (mut agent, provider) = agent("# Good Morning", ConversationStore::in_memory());
        let report = agent.produce_report(&CancellationToken::new()).await.unwrap();
        assert_eq!(report, "# Good Morning");

        let seeded = BriefingPrompt::new(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap())
            .seed_turns()
            .len();
        assert_eq!(*provider.seen.lock().unwrap(), seeded);
        assert_eq!(agent.store().len(), seeded + 1);
    }

    #[tokio::test]
    async fn test_produce_report_skips_seed_when_resuming() {
        let mut store = ConversationStore::in_memory();
        store.append_user("left over").unwrap();
        let (mut agent, provider) = agent("# Resumed", store);
        agent.produce_report(&CancellationToken::new()).await.unwrap();
        assert_eq!(*provider.seen.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_report_is_an_error() {
        let (mut agent, _) = agent("   ", ConversationStore::in_memory());
        let err = agent
            .produce_report(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BriefError::EmptyResponse));
    }
}
