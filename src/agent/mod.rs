//! Agent module - the tool-calling conversation and the briefing built on it
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │ BriefingAgent │────>│ ConversationLoop │────>│ LLMProvider │
//! │ (seed prompt) │     │                  │     │  (Claude)   │
//! └───────────────┘     └──────────────────┘     └─────────────┘
//!                              │      │
//!                              ▼      ▼
//!                  ┌──────────────┐ ┌──────────────┐
//!                  │ Conversation │ │ ToolExecutor │
//!                  │    Store     │ │  + Registry  │
//!                  └──────────────┘ └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use good_morning::agent::BriefingAgent;
//! use good_morning::config::Config;
//! use good_morning::providers::ClaudeProvider;
//! use good_morning::session::ConversationStore;
//! use good_morning::tools::registry_from_config;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn brief() -> good_morning::Result<String> {
//!     let config = Config::load()?;
//!     let provider = Arc::new(ClaudeProvider::new("your-api-key"));
//!     let tools = Arc::new(registry_from_config(&config)?);
//!     let today = chrono::Local::now().date_naive();
//!     let mut agent = BriefingAgent::new(
//!         &config,
//!         today,
//!         provider,
//!         tools,
//!         ConversationStore::in_memory(),
//!     );
//!     agent.produce_report(&CancellationToken::new()).await
//! }
//! ```

mod briefing;
mod context;
mod r#loop;

pub use briefing::BriefingAgent;
pub use context::{BriefingPrompt, SYSTEM_PROMPT};
pub use r#loop::{ConversationLoop, LoopSettings, LoopStats};
