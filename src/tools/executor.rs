//! Tool execution adapter
//!
//! Turns every tool request into exactly one [`ToolResult`]. A failing,
//! panicking, slow, or unknown tool never aborts the conversation: the
//! model is told what went wrong and can react on its next turn.

use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::future::join_all;
use futures::FutureExt;
use tracing::{error, info, warn};

use crate::error::BriefError;
use crate::session::{ToolRequest, ToolResult};

use super::{ToolContext, ToolRegistry};

/// Result text for a request naming an unregistered tool.
pub const UNKNOWN_TOOL_MESSAGE: &str = "This tool is not in the list of tools.";

/// Result text for any failure other than invalid input.
pub const TOOL_FAILURE_MESSAGE: &str = "An error occurred while running the tool.";

/// Runs tool requests against a registry.
///
/// # Example
/// ```rust
/// use good_morning::session::ToolRequest;
/// use good_morning::tools::{ToolContext, ToolExecutor, ToolRegistry, UNKNOWN_TOOL_MESSAGE};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let registry = ToolRegistry::new();
/// let executor = ToolExecutor::new(&registry, ToolContext::new());
/// let request = ToolRequest {
///     id: "t1".into(),
///     name: "weather".into(),
///     input: json!({}),
/// };
/// let result = executor.execute(&request).await;
/// assert!(result.is_error);
/// assert_eq!(result.content, UNKNOWN_TOOL_MESSAGE);
/// # });
/// ```
pub struct ToolExecutor<'a> {
    registry: &'a ToolRegistry,
    ctx: ToolContext,
    timeout: Option<Duration>,
}

impl<'a> ToolExecutor<'a> {
    /// Executor with no per-tool timeout.
    pub fn new(registry: &'a ToolRegistry, ctx: ToolContext) -> Self {
        Self {
            registry,
            ctx,
            timeout: None,
        }
    }

    /// Bound each tool run. A zero duration disables the bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Execute one request. Never fails.
    pub async fn execute(&self, request: &ToolRequest) -> ToolResult {
        let Some(tool) = self.registry.get(&request.name) else {
            warn!(tool = %request.name, id = %request.id, "Model requested unknown tool");
            return ToolResult::error(&request.id, UNKNOWN_TOOL_MESSAGE);
        };

        let start = Instant::now();
        let run = AssertUnwindSafe(tool.execute(request.input.clone(), &self.ctx)).catch_unwind();

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!(
                        tool = %request.name,
                        timeout_secs = limit.as_secs(),
                        "Tool timed out"
                    );
                    return ToolResult::error(&request.id, TOOL_FAILURE_MESSAGE);
                }
            },
            None => run.await,
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(output)) => {
                info!(tool = %request.name, duration_ms, "Tool executed successfully");
                ToolResult::success(&request.id, output)
            }
            Ok(Err(BriefError::InvalidArguments(detail))) => {
                warn!(tool = %request.name, duration_ms, detail = %detail, "Tool rejected its input");
                ToolResult::error(&request.id, detail)
            }
            Ok(Err(e)) => {
                error!(tool = %request.name, duration_ms, error = %e, "Tool execution failed");
                ToolResult::error(&request.id, TOOL_FAILURE_MESSAGE)
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(tool = %request.name, duration_ms, panic = %reason, "Tool panicked");
                ToolResult::error(&request.id, TOOL_FAILURE_MESSAGE)
            }
        }
    }

    /// Execute a batch. Results come back in request order whatever order
    /// the runs finish in.
    pub async fn execute_all(&self, requests: &[ToolRequest], parallel: bool) -> Vec<ToolResult> {
        if parallel {
            join_all(requests.iter().map(|r| self.execute(r))).await
        } else {
            let mut results = Vec::with_capacity(requests.len());
            for request in requests {
                results.push(self.execute(request).await);
            }
            results
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    enum Behaviour {
        Ok(&'static str),
        Invalid(&'static str),
        Fail,
        Panic,
        Sleep(u64),
    }

    struct Scripted {
        name: &'static str,
        behaviour: Behaviour,
    }

    #[async_trait]
    impl Tool for Scripted {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "scripted"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object"})
        }
        async fn execute(&self, _args: Value, _ctx: &ToolContext) -> Result<String> {
            match self.behaviour {
                Behaviour::Ok(s) => Ok(s.to_string()),
                Behaviour::Invalid(s) => Err(BriefError::InvalidArguments(s.to_string())),
                Behaviour::Fail => Err(BriefError::Tool("connection refused".into())),
                Behaviour::Panic => panic!("tool exploded"),
                Behaviour::Sleep(ms) => {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    Ok(format!("slept {}", ms))
                }
            }
        }
    }

    fn registry() -> ToolRegistry {
        let mut r = ToolRegistry::new();
        let tools = [
            ("ok", Behaviour::Ok("fine")),
            ("invalid", Behaviour::Invalid("month must be between 1 and 12")),
            ("fail", Behaviour::Fail),
            ("panic", Behaviour::Panic),
            ("slow", Behaviour::Sleep(60)),
            ("fast", Behaviour::Sleep(1)),
        ];
        for (name, behaviour) in tools {
            r.register(Box::new(Scripted { name, behaviour })).unwrap();
        }
        r
    }

    fn req(id: &str, name: &str) -> ToolRequest {
        ToolRequest {
            id: id.into(),
            name: name.into(),
            input: json!({}),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = registry();
        let exec = ToolExecutor::new(&registry, ToolContext::new());
        let result = exec.execute(&req("1", "weather")).await;
        assert_eq!(result, ToolResult::error("1", UNKNOWN_TOOL_MESSAGE));
    }

    #[tokio::test]
    async fn test_success() {
        let registry = registry();
        let exec = ToolExecutor::new(&registry, ToolContext::new());
        assert_eq!(
            exec.execute(&req("1", "ok")).await,
            ToolResult::success("1", "fine")
        );
    }

    #[tokio::test]
    async fn test_invalid_arguments_passed_verbatim() {
        let registry = registry();
        let exec = ToolExecutor::new(&registry, ToolContext::new());
        assert_eq!(
            exec.execute(&req("1", "invalid")).await,
            ToolResult::error("1", "month must be between 1 and 12")
        );
    }

    #[tokio::test]
    async fn test_other_errors_are_generic() {
        let registry = registry();
        let exec = ToolExecutor::new(&registry, ToolContext::new());
        assert_eq!(
            exec.execute(&req("1", "fail")).await,
            ToolResult::error("1", TOOL_FAILURE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let registry = registry();
        let exec = ToolExecutor::new(&registry, ToolContext::new());
        assert_eq!(
            exec.execute(&req("1", "panic")).await,
            ToolResult::error("1", TOOL_FAILURE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_timeout_is_generic_failure() {
        let registry = registry();
        let exec = ToolExecutor::new(&registry, ToolContext::new())
            .with_timeout(Duration::from_millis(10));
        assert_eq!(
            exec.execute(&req("1", "slow")).await,
            ToolResult::error("1", TOOL_FAILURE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_zero_timeout_disables_bound() {
        let registry = registry();
        let exec = ToolExecutor::new(&registry, ToolContext::new()).with_timeout(Duration::ZERO);
        assert!(!exec.execute(&req("1", "fast")).await.is_error);
    }

    #[tokio::test]
    async fn test_batch_preserves_request_order() {
        let registry = registry();
        let exec = ToolExecutor::new(&registry, ToolContext::new());
        let requests = vec![
            req("a", "slow"),
            req("b", "weather"),
            req("c", "fast"),
            req("d", "fail"),
        ];
        for parallel in [true, false] {
            let results = exec.execute_all(&requests, parallel).await;
            let ids: Vec<&str> = results.iter().map(|r| r.tool_use_id.as_str()).collect();
            assert_eq!(ids, vec!["a", "b", "c", "d"]);
            assert_eq!(results[0].content, "slept 60");
            assert_eq!(results[1].content, UNKNOWN_TOOL_MESSAGE);
            assert!(results[3].is_error);
        }
    }
}
