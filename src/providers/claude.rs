//! Claude (Anthropic) LLM provider implementation
//!
//! Implements the `LLMProvider` trait for the Anthropic Messages API,
//! handling message conversion, tool definitions, and response parsing.
//!
//! # Example
//!
//! ```rust,ignore
//! use good_morning::providers::{ChatOptions, ClaudeProvider, LLMProvider};
//! use good_morning::session::Turn;
//!
//! async fn example() {
//!     let provider = ClaudeProvider::new("your-api-key");
//!     let options = ChatOptions::new().with_system("You are a helpful assistant.");
//!     let response = provider
//!         .chat(vec![Turn::user("Hello!")], vec![], options)
//!         .await
//!         .unwrap();
//!     println!("Claude: {:?}", response.content);
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BriefError, ProviderError, Result};
use crate::session::{ContentBlock, Role, Turn};

use super::{parse_provider_error, ChatOptions, LLMProvider, LLMResponse, StopReason, ToolDefinition, Usage};

/// Default API base URL.
const CLAUDE_API_BASE: &str = "https://api.anthropic.com";

/// The default Claude model to use.
const DEFAULT_MODEL: &str = crate::config::DEFAULT_MODEL;

/// The Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Used when `ChatOptions::max_tokens` is unset; the API requires a value.
const DEFAULT_MAX_TOKENS: u32 = 8000;

/// Claude/Anthropic LLM provider.
pub struct ClaudeProvider {
    /// API key for authentication
    api_key: String,
    /// Base URL, without the `/v1/messages` suffix
    api_base: String,
    /// HTTP client for making requests
    client: Client,
}

impl ClaudeProvider {
    /// Create a new Claude provider with the given API key.
    ///
    /// # Example
    /// ```
    /// use good_morning::providers::{ClaudeProvider, LLMProvider};
    ///
    /// let provider = ClaudeProvider::new("sk-ant-api03-xxx");
    /// assert_eq!(provider.name(), "claude");
    /// ```
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: CLAUDE_API_BASE.to_string(),
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .user_agent(concat!("good-morning/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Create a new Claude provider with a custom HTTP client.
    pub fn with_client(api_key: &str, client: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: CLAUDE_API_BASE.to_string(),
            client,
        }
    }

    /// Point the provider at a different base URL (proxy or test server).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_base)
    }
}

#[async_trait]
impl LLMProvider for ClaudeProvider {
    async fn chat(
        &self,
        turns: Vec<Turn>,
        tools: Vec<ToolDefinition>,
        options: ChatOptions,
    ) -> Result<LLMResponse> {
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let request = ClaudeRequest {
            model,
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            messages: convert_turns(turns),
            system: options.system,
            tools: if tools.is_empty() {
                None
            } else {
                Some(convert_tools(tools))
            },
            temperature: options.temperature,
        };

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending Claude request"
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BriefError::from(ProviderError::Timeout(e.to_string()))
                } else {
                    BriefError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();

            let body = if let Ok(error_response) =
                serde_json::from_str::<ClaudeErrorResponse>(&error_text)
            {
                format!(
                    "Claude API error: {} - {}",
                    error_response.error.r#type, error_response.error.message
                )
            } else {
                format!("Claude API error: {}", error_text)
            };

            return Err(BriefError::from(parse_provider_error(status, &body)));
        }

        let claude_response: ClaudeResponse = response.json().await?;
        Ok(convert_response(claude_response))
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    fn name(&self) -> &str {
        "claude"
    }
}

// ============================================================================
// Claude API Request Types
// ============================================================================

/// Claude API request body.
#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ClaudeTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A message in Claude's format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClaudeMessage {
    /// "user" or "assistant"
    role: String,
    content: Vec<ClaudeContentBlock>,
}

/// A content block within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum ClaudeContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    /// Block types this client does not model (e.g. `thinking`)
    #[serde(other)]
    Unsupported,
}

/// Claude tool definition.
#[derive(Debug, Serialize)]
struct ClaudeTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

// ============================================================================
// Claude API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContentBlock>,
    #[serde(default)]
    usage: Option<ClaudeUsage>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
    error: ClaudeError,
}

#[derive(Debug, Deserialize)]
struct ClaudeError {
    r#type: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
    input_tokens: u32,
    output_tokens: u32,
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert conversation turns to Claude messages.
///
/// The API expects alternating roles, so consecutive turns of the same role
/// (the seeded framing turns, for one) are merged into a single message.
fn convert_turns(turns: Vec<Turn>) -> Vec<ClaudeMessage> {
    let mut messages: Vec<ClaudeMessage> = Vec::new();

    for turn in turns {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        let blocks = turn.content.into_iter().map(convert_block);

        match messages.last_mut() {
            Some(last) if last.role == role => last.content.extend(blocks),
            _ => messages.push(ClaudeMessage {
                role: role.to_string(),
                content: blocks.collect(),
            }),
        }
    }

    messages
}

fn convert_block(block: ContentBlock) -> ClaudeContentBlock {
    match block {
        ContentBlock::Text { text } => ClaudeContentBlock::Text { text },
        ContentBlock::ToolUse { id, name, input } => {
            ClaudeContentBlock::ToolUse { id, name, input }
        }
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => ClaudeContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error: is_error.then_some(true),
        },
    }
}

fn convert_tools(tools: Vec<ToolDefinition>) -> Vec<ClaudeTool> {
    tools
        .into_iter()
        .map(|t| ClaudeTool {
            name: t.name,
            description: t.description,
            input_schema: t.parameters,
        })
        .collect()
}

/// Convert a Claude API response, keeping block order.
fn convert_response(response: ClaudeResponse) -> LLMResponse {
    let content = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ClaudeContentBlock::Text { text } => Some(ContentBlock::Text { text }),
            ClaudeContentBlock::ToolUse { id, name, input } => {
                Some(ContentBlock::ToolUse { id, name, input })
            }
            // Tool results never come back from the model.
            ClaudeContentBlock::ToolResult { .. } | ClaudeContentBlock::Unsupported => None,
        })
        .collect();

    LLMResponse {
        content,
        stop_reason: response
            .stop_reason
            .map(StopReason::from)
            .unwrap_or(StopReason::EndTurn),
        usage: response
            .usage
            .map(|u| Usage::new(u.input_tokens, u.output_tokens)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ToolResult;
    use serde_json::json;

    #[test]
    fn test_claude_provider_creation() {
        let provider = ClaudeProvider::new("test-key");
        assert_eq!(provider.name(), "claude");
        assert_eq!(provider.default_model(), "claude-3-5-sonnet-latest");
        assert_eq!(provider.messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_with_api_base_trims_slash() {
        let provider = ClaudeProvider::new("k").with_api_base("http://localhost:8080/");
        assert_eq!(provider.messages_url(), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn test_consecutive_user_turns_are_merged() {
        let messages = convert_turns(vec![
            Turn::user("Today is 2025-03-07."),
            Turn::user("My name is Sam."),
            Turn::assistant(vec![ContentBlock::text("ok")]),
        ]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content.len(), 2);
        assert_eq!(messages[1].role, "assistant");
    }

    #[test]
    fn test_tool_round_trip_conversion() {
        let messages = convert_turns(vec![
            Turn::user("hi"),
            Turn::assistant(vec![
                ContentBlock::text("Checking."),
                ContentBlock::tool_use("toolu_1", "calendar", json!({"year": 2025})),
            ]),
            Turn::tool_results(vec![
                ToolResult::success("toolu_1", "No events"),
                ToolResult::error("toolu_2", "boom"),
            ]),
        ]);
        assert_eq!(messages.len(), 3);

        let value = serde_json::to_value(&messages[2]).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"][0]["type"], "tool_result");
        assert!(value["content"][0].get("is_error").is_none());
        assert_eq!(value["content"][1]["is_error"], true);

        let value = serde_json::to_value(&messages[1]).unwrap();
        assert_eq!(value["content"][1]["type"], "tool_use");
        assert_eq!(value["content"][1]["input"]["year"], 2025);
    }

    #[test]
    fn test_convert_tools() {
        let tools = convert_tools(vec![ToolDefinition::new(
            "github",
            "Review queue",
            json!({"type": "object"}),
        )]);
        let value = serde_json::to_value(&tools).unwrap();
        assert_eq!(value[0]["name"], "github");
        assert_eq!(value[0]["input_schema"]["type"], "object");
    }

    #[test]
    fn test_convert_response_keeps_block_order() {
        let raw = json!({
            "content": [
                {"type": "text", "text": "Let me look."},
                {"type": "tool_use", "id": "t1", "name": "calendar", "input": {}},
                {"type": "tool_use", "id": "t2", "name": "github", "input": {"action": "list_my_prs"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        });
        let response: ClaudeResponse = serde_json::from_value(raw).unwrap();
        let converted = convert_response(response);
        assert_eq!(converted.stop_reason, StopReason::ToolUse);
        assert_eq!(converted.content.len(), 3);
        assert!(matches!(converted.content[0], ContentBlock::Text { .. }));
        assert_eq!(
            converted.content[2].as_tool_request().unwrap().name,
            "github"
        );
        assert_eq!(converted.usage, Some(Usage::new(10, 5)));
    }

    #[test]
    fn test_convert_response_skips_unknown_blocks() {
        let raw = json!({
            "content": [
                {"type": "thinking", "thinking": "hmm", "signature": "x"},
                {"type": "text", "text": "# Briefing"}
            ],
            "stop_reason": "end_turn"
        });
        let response: ClaudeResponse = serde_json::from_value(raw).unwrap();
        let converted = convert_response(response);
        assert_eq!(converted.content, vec![ContentBlock::text("# Briefing")]);
        assert!(converted.usage.is_none());
    }

    #[test]
    fn test_missing_stop_reason_defaults_to_end_turn() {
        let response: ClaudeResponse =
            serde_json::from_value(json!({"content": [], "stop_reason": null})).unwrap();
        assert_eq!(convert_response(response).stop_reason, StopReason::EndTurn);
    }

    #[test]
    fn test_request_serialization_omits_empty_fields() {
        let request = ClaudeRequest {
            model: "m".into(),
            max_tokens: 8000,
            messages: convert_turns(vec![Turn::user("hi")]),
            system: None,
            tools: None,
            temperature: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("system").is_none());
        assert!(value.get("tools").is_none());
        assert_eq!(value["messages"][0]["content"][0]["text"], "hi");
    }
}
