//! good-morning - daily briefing generator driven by a tool-calling LLM conversation

pub mod agent;
pub mod config;
pub mod error;
pub mod providers;
pub mod report;
pub mod session;
pub mod tools;
pub mod utils;

pub use agent::{BriefingAgent, ConversationLoop};
pub use config::Config;
pub use error::{BriefError, ProviderError, Result};
pub use providers::{ChatOptions, ClaudeProvider, LLMProvider, LLMResponse, ToolDefinition, Usage};
pub use session::{ContentBlock, ConversationStore, Role, ToolRequest, ToolResult, Turn};
