//! Tool types for good-morning
//!
//! Defines the `Tool` trait that every briefing data source implements and
//! the `ToolContext` handed to each execution.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::error::Result;

/// Trait that all tools must implement.
///
/// A tool is a named, schema-described callable the model can request.
/// `execute` returns the text shown to the model. Return
/// [`BriefError::InvalidArguments`](crate::error::BriefError::InvalidArguments)
/// when the input fails validation: its message reaches the model verbatim.
/// Every other error is reported to the model as a generic failure.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use good_morning::tools::{Tool, ToolContext};
/// use good_morning::error::Result;
///
/// struct Weather;
///
/// #[async_trait]
/// impl Tool for Weather {
///     fn name(&self) -> &str { "weather" }
///     fn description(&self) -> &str { "Today's forecast" }
///     fn parameters(&self) -> Value {
///         serde_json::json!({"type": "object", "properties": {}})
///     }
///     async fn execute(&self, _args: Value, _ctx: &ToolContext) -> Result<String> {
///         Ok("Sunny".to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses to request this tool.
    fn name(&self) -> &str;

    /// Description sent to the model.
    fn description(&self) -> &str;

    /// JSON schema for the tool's input.
    fn parameters(&self) -> Value;

    /// Run the tool with the model-supplied input.
    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String>;
}

/// Context provided to tools during execution.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Identifier of the briefing run, for log correlation
    pub run_id: Option<String>,
    /// The day the briefing is for
    pub today: Option<NaiveDate>,
}

impl ToolContext {
    /// Create a new empty tool context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the run identifier.
    pub fn with_run_id(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }

    /// Set the briefing date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Run id for log fields; empty when unset.
    pub fn run_id(&self) -> &str {
        self.run_id.as_deref().unwrap_or("")
    }
}
