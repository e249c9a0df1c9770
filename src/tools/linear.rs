//! Linear tool: my assigned issues and my teams' review queue, via GraphQL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{BriefError, Result};
use crate::log_component;
use crate::tools::{Tool, ToolContext};

const TEAM_REVIEW_QUERY: &str = r#"
query TeamReview($teams: [String!], $name: String!) {
  issues(
    first: 40,
    orderBy: updatedAt,
    filter: {
      team: { key: { in: $teams } },
      state: { name: { eq: "In Review" } },
      assignee: { name: { neq: $name } }
    }
  ) {
    nodes { identifier title priority url team { name } state { name type } assignee { name } }
  }
}"#;

const MY_ISSUES_QUERY: &str = r#"
query MyIssues($name: String!) {
  issues(
    first: 40,
    orderBy: updatedAt,
    filter: { assignee: { name: { eq: $name } } }
  ) {
    nodes { identifier title priority url team { name } state { name type } assignee { name } }
  }
}"#;

/// Linear issue tracker tool.
pub struct LinearTool {
    token: String,
    api_url: String,
    default_teams: Vec<String>,
    default_name: Option<String>,
    client: Client,
}

impl LinearTool {
    /// Create a Linear tool.
    ///
    /// `teams` and `name` fill in when the model omits them.
    pub fn new(token: &str, api_url: &str, teams: Vec<String>, name: Option<String>) -> Self {
        Self {
            token: token.to_string(),
            api_url: api_url.to_string(),
            default_teams: teams,
            default_name: name,
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    async fn query(&self, query: &str, variables: Value) -> Result<Vec<IssueSummary>> {
        let response = self
            .client
            .post(&self.api_url)
            // Linear personal API keys go in the header without a scheme.
            .header("Authorization", &self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BriefError::Tool(format!(
                "Linear API returned status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: GraphqlResponse = response.json().await?;
        parsed.into_issues()
    }
}

/// What the model asked for, with defaults already applied.
#[derive(Debug, PartialEq)]
enum LinearRequest {
    TeamReview { teams: Vec<String>, name: String },
    MyIssues { name: String },
}

#[derive(Debug, Deserialize)]
struct LinearInput {
    action: String,
    #[serde(default)]
    teams: Option<Vec<String>>,
    #[serde(default)]
    name: Option<String>,
}

impl LinearTool {
    fn parse_request(&self, args: Value) -> Result<LinearRequest> {
        let input: LinearInput = serde_json::from_value(args)
            .map_err(|_| BriefError::InvalidArguments("invalid JSON format".into()))?;

        let name = input
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.default_name.clone())
            .ok_or_else(|| BriefError::InvalidArguments("name is required".into()))?;

        match input.action.as_str() {
            "get_my_teams_in_review_issues" => {
                let teams = input
                    .teams
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| self.default_teams.clone());
                if teams.is_empty() {
                    return Err(BriefError::InvalidArguments(
                        "teams is required for get_my_teams_in_review_issues".into(),
                    ));
                }
                Ok(LinearRequest::TeamReview { teams, name })
            }
            "get_my_issues" => Ok(LinearRequest::MyIssues { name }),
            _ => Err(BriefError::InvalidArguments(
                "invalid action, supported actions are: get_my_teams_in_review_issues, get_my_issues"
                    .into(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<IssuesData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct IssuesData {
    issues: IssueConnection,
}

#[derive(Debug, Deserialize)]
struct IssueConnection {
    nodes: Vec<IssueNode>,
}

#[derive(Debug, Deserialize)]
struct IssueNode {
    identifier: String,
    title: String,
    #[serde(default)]
    priority: Option<f64>,
    url: String,
    team: Option<Named>,
    state: Option<StateNode>,
    assignee: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct StateNode {
    name: String,
}

/// Flattened issue shown to the model.
#[derive(Debug, Serialize, PartialEq)]
struct IssueSummary {
    identifier: String,
    title: String,
    team: Option<String>,
    state: Option<String>,
    assignee: Option<String>,
    priority: Option<f64>,
    url: String,
}

impl GraphqlResponse {
    fn into_issues(self) -> Result<Vec<IssueSummary>> {
        if !self.errors.is_empty() {
            let messages: Vec<String> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(BriefError::Tool(format!(
                "Linear GraphQL error: {}",
                messages.join("; ")
            )));
        }
        let data = self
            .data
            .ok_or_else(|| BriefError::Tool("Linear response had no data".into()))?;

        Ok(data
            .issues
            .nodes
            .into_iter()
            .map(|n| IssueSummary {
                identifier: n.identifier,
                title: n.title,
                team: n.team.map(|t| t.name),
                state: n.state.map(|s| s.name),
                assignee: n.assignee.map(|a| a.name),
                priority: n.priority,
                url: n.url,
            })
            .collect())
    }
}

#[async_trait]
impl Tool for LinearTool {
    fn name(&self) -> &str {
        "linear"
    }

    fn description(&self) -> &str {
        "Get status of tasks in Linear: issues assigned to me, or my teams' issues waiting in review"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["get_my_teams_in_review_issues", "get_my_issues"],
                    "description": "The action to perform (get_my_teams_in_review_issues, get_my_issues)"
                },
                "teams": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Team keys to get issues from"
                },
                "name": { "type": "string", "description": "Your name" }
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String> {
        let request = self.parse_request(args)?;
        let issues = match &request {
            LinearRequest::TeamReview { teams, name } => {
                self.query(TEAM_REVIEW_QUERY, json!({ "teams": teams, "name": name }))
                    .await?
            }
            LinearRequest::MyIssues { name } => {
                self.query(MY_ISSUES_QUERY, json!({ "name": name })).await?
            }
        };
        log_component!(
            info,
            "linear",
            "Linear issues fetched",
            run_id = ctx.run_id(),
            count = issues.len()
        );
        Ok(serde_json::to_string_pretty(&issues)?)
    }
}
