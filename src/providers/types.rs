//! Provider types for good-morning
//!
//! This module defines the `LLMProvider` trait, chat options, and the
//! response types shared by every provider implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::{ContentBlock, ToolRequest, Turn};

/// Definition of a tool that can be called by the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The name of the tool (must be unique)
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    ///
    /// # Example
    /// ```
    /// use good_morning::providers::ToolDefinition;
    /// use serde_json::json;
    ///
    /// let tool = ToolDefinition::new(
    ///     "calendar",
    ///     "List calendar events for a day",
    ///     json!({"type": "object", "properties": {}}),
    /// );
    /// assert_eq!(tool.name, "calendar");
    /// ```
    pub fn new(name: &str, description: &str, parameters: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

/// Trait for LLM providers.
///
/// The provider translates the conversation into its own wire format. It
/// must return the reply blocks in the order the model produced them.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send the full conversation and the available tools to the model.
    ///
    /// # Arguments
    /// * `turns` - The conversation history, oldest first
    /// * `tools` - Tool definitions the model may call
    /// * `options` - Model, system instruction, output limits
    async fn chat(
        &self,
        turns: Vec<Turn>,
        tools: Vec<ToolDefinition>,
        options: ChatOptions,
    ) -> Result<LLMResponse>;

    /// Model used when `ChatOptions::model` is unset.
    fn default_model(&self) -> &str;

    /// Provider name (e.g. "claude").
    fn name(&self) -> &str;
}

/// Options for chat completion requests.
///
/// Use the builder methods to construct options.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Model override
    pub model: Option<String>,
    /// Fixed system instruction
    pub system: Option<String>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature for sampling
    pub temperature: Option<f32>,
}

impl ChatOptions {
    /// Create new default chat options.
    ///
    /// # Example
    /// ```
    /// use good_morning::providers::ChatOptions;
    ///
    /// let options = ChatOptions::new().with_max_tokens(8000).with_system("Be brief.");
    /// assert_eq!(options.max_tokens, Some(8000));
    /// assert_eq!(options.system.as_deref(), Some("Be brief."));
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the system instruction.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StopReason {
    /// Natural end of the reply
    EndTurn,
    /// The reply asks for tools to be run
    ToolUse,
    /// Output token limit hit
    MaxTokens,
    /// A stop sequence matched
    StopSequence,
    /// Anything else the provider reports, kept verbatim
    Other(String),
}

impl From<String> for StopReason {
    fn from(s: String) -> Self {
        match s.as_str() {
            "end_turn" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            _ => StopReason::Other(s),
        }
    }
}

impl From<StopReason> for String {
    fn from(r: StopReason) -> Self {
        r.as_str().to_string()
    }
}

impl StopReason {
    /// Wire name of this stop reason.
    pub fn as_str(&self) -> &str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::ToolUse => "tool_use",
            StopReason::MaxTokens => "max_tokens",
            StopReason::StopSequence => "stop_sequence",
            StopReason::Other(s) => s,
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response from an LLM chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMResponse {
    /// Reply blocks in model order
    pub content: Vec<ContentBlock>,
    /// Why generation stopped
    pub stop_reason: StopReason,
    /// Token usage information (if available)
    pub usage: Option<Usage>,
}

impl LLMResponse {
    /// A final text reply.
    ///
    /// # Example
    /// ```
    /// use good_morning::providers::{LLMResponse, StopReason};
    ///
    /// let response = LLMResponse::text("# Today");
    /// assert_eq!(response.stop_reason, StopReason::EndTurn);
    /// assert!(!response.has_tool_requests());
    /// ```
    pub fn text(content: &str) -> Self {
        Self {
            content: vec![ContentBlock::text(content)],
            stop_reason: StopReason::EndTurn,
            usage: None,
        }
    }

    /// A reply requesting tools, optionally preceded by commentary.
    pub fn with_tools(commentary: &str, requests: Vec<ToolRequest>) -> Self {
        let mut content = Vec::with_capacity(requests.len() + 1);
        if !commentary.is_empty() {
            content.push(ContentBlock::text(commentary));
        }
        content.extend(
            requests
                .into_iter()
                .map(|r| ContentBlock::tool_use(r.id, r.name, r.input)),
        );
        Self {
            content,
            stop_reason: StopReason::ToolUse,
            usage: None,
        }
    }

    /// Whether any block is a tool-use request.
    pub fn has_tool_requests(&self) -> bool {
        self.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// Set usage information for this response.
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub input_tokens: u32,
    /// Number of tokens generated
    pub output_tokens: u32,
}

impl Usage {
    /// Create new usage information.
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Input plus output tokens.
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}
