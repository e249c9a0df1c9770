//! GitHub tool: open pull requests authored by or awaiting review from the
//! token owner, via the issue search API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{BriefError, Result};
use crate::log_component;
use crate::tools::{Tool, ToolContext};

/// Supported actions and the search query each one runs.
const ACTIONS: &[(&str, &str)] = &[
    ("list_my_prs", "is:pr is:open author:@me"),
    ("list_review_requests", "is:pr is:open review-requested:@me"),
];

/// GitHub pull request tool.
pub struct GithubTool {
    token: String,
    api_base: String,
    client: Client,
}

impl GithubTool {
    /// Create a GitHub tool against the public API.
    pub fn new(token: &str) -> Self {
        Self::with_api_base(token, "https://api.github.com")
    }

    /// Create a GitHub tool against a custom API base (GitHub Enterprise).
    pub fn with_api_base(token: &str, api_base: &str) -> Self {
        Self {
            token: token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent(concat!("good-morning/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<PullRequestSummary>> {
        let response = self
            .client
            .get(format!("{}/search/issues", self.api_base))
            .query(&[("q", query)])
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BriefError::Tool(format!(
                "GitHub API returned status {}",
                status.as_u16()
            )));
        }

        let results: SearchResponse = response.json().await?;
        Ok(results.items.into_iter().map(PullRequestSummary::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct GithubInput {
    action: String,
}

/// Resolve the action to its search query.
fn query_for(args: Value) -> Result<&'static str> {
    let input: GithubInput = serde_json::from_value(args)
        .map_err(|_| BriefError::InvalidArguments("invalid JSON format".into()))?;

    ACTIONS
        .iter()
        .find(|(name, _)| *name == input.action)
        .map(|(_, query)| *query)
        .ok_or_else(|| {
            BriefError::InvalidArguments(
                "invalid action, supported actions are: list_my_prs, list_review_requests".into(),
            )
        })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    number: u64,
    title: String,
    html_url: String,
    #[serde(default)]
    repository_url: String,
    user: Option<SearchUser>,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchUser {
    login: String,
}

/// Trimmed pull request shown to the model.
#[derive(Debug, Serialize, PartialEq)]
struct PullRequestSummary {
    number: u64,
    title: String,
    url: String,
    repository: String,
    author: Option<String>,
    draft: bool,
    updated_at: Option<String>,
}

impl From<SearchItem> for PullRequestSummary {
    fn from(item: SearchItem) -> Self {
        // ".../repos/{owner}/{name}" -> "{owner}/{name}"
        let repository = item
            .repository_url
            .split("/repos/")
            .nth(1)
            .unwrap_or(&item.repository_url)
            .to_string();
        Self {
            number: item.number,
            title: item.title,
            url: item.html_url,
            repository,
            author: item.user.map(|u| u.login),
            draft: item.draft,
            updated_at: item.updated_at,
        }
    }
}

#[async_trait]
impl Tool for GithubTool {
    fn name(&self) -> &str {
        "github"
    }

    fn description(&self) -> &str {
        "Interact with GitHub Pull Requests: list my open pull requests or the ones waiting for my review"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["list_my_prs", "list_review_requests"],
                    "description": "The action to perform (list_my_prs, list_review_requests)"
                }
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String> {
        let query = query_for(args)?;
        let prs = self.search(query).await?;
        log_component!(
            info,
            "github",
            "Pull requests fetched",
            run_id = ctx.run_id(),
            query = query,
            count = prs.len()
        );
        Ok(serde_json::to_string_pretty(&prs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_for_actions() {
        assert_eq!(
            query_for(json!({"action": "list_my_prs"})).unwrap(),
            "is:pr is:open author:@me"
        );
        assert_eq!(
            query_for(json!({"action": "list_review_requests"})).unwrap(),
            "is:pr is:open review-requested:@me"
        );
    }

    #[test]
    fn test_query_for_invalid_action() {
        let err = query_for(json!({"action": "merge_everything"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid action, supported actions are: list_my_prs, list_review_requests"
        );
    }

    #[test]
    fn test_query_for_bad_json() {
        let err = query_for(json!({"verb": "list"})).unwrap_err();
        assert!(matches!(err, BriefError::InvalidArguments(ref m) if m == "invalid JSON format"));
    }

    #[test]
    fn test_summary_from_search_item() {
        let raw = json!({
            "total_count": 1,
            "items": [{
                "number": 42,
                "title": "Add calendar tool",
                "html_url": "https://github.com/acme/app/pull/42",
                "repository_url": "https://api.github.com/repos/acme/app",
                "user": {"login": "sam"},
                "draft": true,
                "updated_at": "2025-03-06T18:00:00Z",
                "body": "long text that is dropped"
            }]
        });
        let response: SearchResponse = serde_json::from_value(raw).unwrap();
        let summary = PullRequestSummary::from(response.items.into_iter().next().unwrap());
        assert_eq!(summary.repository, "acme/app");
        assert_eq!(summary.author.as_deref(), Some("sam"));
        assert!(summary.draft);

        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("body").is_none());
        assert_eq!(value["url"], "https://github.com/acme/app/pull/42");
    }

    #[test]
    fn test_tool_metadata() {
        let tool = GithubTool::with_api_base("t", "https://ghe.example.com/api/v3/");
        assert_eq!(tool.name(), "github");
        assert_eq!(tool.api_base, "https://ghe.example.com/api/v3");
        assert_eq!(tool.parameters()["required"][0], "action");
    }
}
