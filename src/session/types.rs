//! Conversation data model
//!
//! A conversation is an ordered list of [`Turn`]s. Each turn has a role and
//! one or more content blocks: plain text, a tool-use request from the
//! model, or a tool result answering such a request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Task framing and tool results
    User,
    /// Model replies
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One block of turn content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text { text: String },
    /// The model asks for a tool to be run
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    /// Result of a tool run, keyed by the request id
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl ContentBlock {
    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// Create a tool-use block.
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// The tool request carried by this block, if it is a tool-use block.
    pub fn as_tool_request(&self) -> Option<ToolRequest> {
        match self {
            ContentBlock::ToolUse { id, name, input } => Some(ToolRequest {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
            _ => None,
        }
    }
}

/// A single appended entry of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Turn {
    /// A user turn holding one text block.
    ///
    /// # Example
    /// ```
    /// use good_morning::session::{Role, Turn};
    ///
    /// let turn = Turn::user("What's on today?");
    /// assert_eq!(turn.role, Role::User);
    /// assert_eq!(turn.text(), "What's on today?");
    /// ```
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// An assistant turn holding the given blocks.
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// A user turn carrying tool results, in the given order.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            content: results.into_iter().map(ContentBlock::from).collect(),
        }
    }

    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tool requests in block order.
    pub fn tool_requests(&self) -> Vec<ToolRequest> {
        self.content
            .iter()
            .filter_map(ContentBlock::as_tool_request)
            .collect()
    }
}

/// A model request to run one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRequest {
    /// Unique call id assigned by the model
    pub id: String,
    /// Registered tool name
    pub name: String,
    /// Structured input
    pub input: Value,
}

/// Outcome of one tool request.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Id of the request this answers
    pub tool_use_id: String,
    /// Text shown to the model
    pub content: String,
    /// Whether the run failed
    pub is_error: bool,
}

impl ToolResult {
    /// Successful result.
    pub fn success(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Error result.
    pub fn error(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

impl From<ToolResult> for ContentBlock {
    fn from(r: ToolResult) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: r.tool_use_id,
            content: r.content,
            is_error: r.is_error,
        }
    }
}

/// On-disk form of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// When the file was last written
    pub updated_at: DateTime<Utc>,
    /// Full turn history in append order
    pub turns: Vec<Turn>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_block_serialization_tags() {
        let block = ContentBlock::tool_use("toolu_1", "calendar", json!({"year": 2025}));
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_use");
        assert_eq!(value["name"], "calendar");

        let result: ContentBlock = ToolResult::error("toolu_1", "boom").into();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "tool_result");
        assert_eq!(value["is_error"], true);
    }

    #[test]
    fn test_tool_result_is_error_defaults_false() {
        let block: ContentBlock =
            serde_json::from_str(r#"{"type":"tool_result","tool_use_id":"a","content":"ok"}"#)
                .unwrap();
        assert_eq!(
            block,
            ContentBlock::ToolResult {
                tool_use_id: "a".into(),
                content: "ok".into(),
                is_error: false
            }
        );
    }

    #[test]
    fn test_turn_text_and_requests() {
        let turn = Turn::assistant(vec![
            ContentBlock::text("Checking your calendar."),
            ContentBlock::tool_use("t1", "calendar", json!({})),
            ContentBlock::tool_use("t2", "github", json!({"action": "list_my_prs"})),
        ]);
        assert_eq!(turn.text(), "Checking your calendar.");
        let requests = turn.tool_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].id, "t1");
        assert_eq!(requests[1].name, "github");
    }

    #[test]
    fn test_tool_results_turn_keeps_order() {
        let turn = Turn::tool_results(vec![
            ToolResult::success("b", "2"),
            ToolResult::success("a", "1"),
        ]);
        assert_eq!(turn.role, Role::User);
        let ids: Vec<_> = turn
            .content
            .iter()
            .map(|b| match b {
                ContentBlock::ToolResult { tool_use_id, .. } => tool_use_id.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
