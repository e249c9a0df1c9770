//! Tool registry for good-morning
//!
//! Holds the tools available to the model in registration order and
//! resolves tool-use requests by exact name.

use std::collections::HashMap;

use tracing::info;

use crate::error::{BriefError, Result};
use crate::providers::ToolDefinition;

use super::Tool;

/// An ordered, name-indexed collection of tools.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use good_morning::error::Result;
/// use good_morning::tools::{Tool, ToolContext, ToolRegistry};
/// use serde_json::{json, Value};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn name(&self) -> &str { "echo" }
///     fn description(&self) -> &str { "Echo input" }
///     fn parameters(&self) -> Value { json!({"type": "object"}) }
///     async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<String> {
///         Ok(args.to_string())
///     }
/// }
///
/// let mut registry = ToolRegistry::new();
/// registry.register(Box::new(Echo)).unwrap();
/// assert!(registry.has("echo"));
/// assert!(registry.register(Box::new(Echo)).is_err());
/// assert_eq!(registry.definitions()[0].name, "echo");
/// ```
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its declared name.
    ///
    /// A second tool with the same name is a configuration error.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(BriefError::Config(format!(
                "duplicate tool name '{}'",
                name
            )));
        }
        info!(tool = %name, "Registering tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Get a tool by exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    /// Whether a tool with this name is registered.
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tool definitions in registration order.
    ///
    /// The order is stable across calls so repeated model requests carry an
    /// identical tool list.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.parameters()))
            .collect()
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolContext;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "test tool"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn execute(&self, _args: Value, _ctx: &ToolContext) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.definitions().is_empty());
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(Named("calendar"))).unwrap();
        assert_eq!(registry.get("calendar").unwrap().name(), "calendar");
        assert!(registry.get("Calendar").is_none());
        assert!(registry.get("weather").is_none());
    }

    #[test]
    fn test_duplicate_registration_is_config_error() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(Named("github"))).unwrap();
        let err = registry.register(Box::new(Named("github"))).unwrap_err();
        assert!(matches!(err, BriefError::Config(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_definitions_follow_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["linear", "calendar", "github"] {
            registry.register(Box::new(Named(name))).unwrap();
        }
        let first: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        let second: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(first, vec!["linear", "calendar", "github"]);
        assert_eq!(first, second);
        assert_eq!(registry.names(), vec!["linear", "calendar", "github"]);
    }

    #[tokio::test]
    async fn test_resolved_tool_executes() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(Named("echo"))).unwrap();
        let out = registry
            .get("echo")
            .unwrap()
            .execute(json!({}), &ToolContext::new())
            .await
            .unwrap();
        assert_eq!(out, "echo");
    }
}
