//! Configuration type definitions for good-morning
//!
//! All types implement serde traits for JSON serialization and have sensible
//! defaults, so a partial (or missing) config file still yields a usable
//! `Config`.

use serde::{Deserialize, Serialize};

/// Default model used for briefings.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";

/// Main configuration struct for good-morning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversation loop settings (model, tokens, iteration bound)
    pub agent: AgentConfig,
    /// LLM provider credentials
    pub providers: ProvidersConfig,
    /// Calendar feed tool
    pub calendar: CalendarConfig,
    /// GitHub review queue tool
    pub github: GithubConfig,
    /// Linear issue tracker tool
    pub linear: LinearConfig,
    /// Who the briefing is for
    pub profile: ProfileConfig,
    /// Where the report is written
    pub output: OutputConfig,
    /// Conversation transcript persistence
    pub session: SessionConfig,
    /// Logging output
    pub logging: LoggingConfig,
}

// ============================================================================
// Agent Configuration
// ============================================================================

/// Conversation loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model identifier sent to the provider
    pub model: String,
    /// Maximum output tokens per model call
    pub max_tokens: u32,
    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,
    /// Maximum model calls in a single run before giving up
    pub max_tool_iterations: usize,
    /// Per-tool wall clock limit in seconds (0 disables)
    pub tool_timeout_secs: u64,
    /// Run the tool requests of one reply concurrently
    pub parallel_tools: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 8000,
            temperature: None,
            max_tool_iterations: 25,
            tool_timeout_secs: 60,
            parallel_tools: true,
        }
    }
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// LLM provider configurations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Anthropic (Claude) configuration
    pub anthropic: Option<ProviderConfig>,
}

/// Generic provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key for authentication
    pub api_key: Option<String>,
    /// Base URL override (proxies, test servers)
    pub api_base: Option<String>,
}

// ============================================================================
// Tool Configuration
// ============================================================================

/// Calendar feed configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// ICS feed location: an http(s) URL or a local file path
    pub ics_url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Personal access token
    pub token: Option<String>,
    /// REST API base URL
    pub api_base: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: "https://api.github.com".to_string(),
        }
    }
}

/// Linear configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearConfig {
    /// API token (sent raw in the Authorization header)
    pub token: Option<String>,
    /// Team keys whose review queue is included in the briefing
    pub teams: Vec<String>,
    /// GraphQL endpoint
    pub api_url: String,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            token: None,
            teams: Vec::new(),
            api_url: "https://api.linear.app/graphql".to_string(),
        }
    }
}

/// User profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Display name as it appears in Linear
    pub name: Option<String>,
}

// ============================================================================
// Output & Session Configuration
// ============================================================================

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory; `~` expands to the home directory
    pub root: String,
    /// Commit each report to a git repository rooted at `root`
    pub commit: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: "~/good-morning".to_string(),
            commit: true,
        }
    }
}

/// How transcript write failures are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceMode {
    /// A failed write aborts the run
    #[default]
    FailFast,
    /// A failed write is logged and the run continues in memory
    BestEffort,
}

/// Conversation transcript configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Failure handling for transcript writes
    pub persistence: PersistenceMode,
    /// Load today's transcript on start instead of starting fresh
    pub resume: bool,
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Multi-line human readable output
    Pretty,
    /// Compact single-line output with component tags
    #[default]
    Component,
    /// JSON lines
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Optional file to append log lines to instead of stderr
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Component,
            level: "info".to_string(),
            file: None,
        }
    }
}
