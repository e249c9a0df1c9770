//! Error types for good-morning
//!
//! This module defines the error types used throughout the crate. Uses
//! `thiserror` for `Display` and `Error` implementations.
//!
//! Tool-level failures never reach the caller as these errors: the tool
//! execution adapter folds them into error tool results. What surfaces from
//! a briefing run is a provider failure, a persistence failure (in fail-fast
//! mode), the loop bound, cancellation, or an empty final answer.

use std::fmt;
use thiserror::Error;

// ============================================================================
// Provider Error Classification
// ============================================================================

/// Structured provider error classification.
///
/// Categorizes LLM provider HTTP errors so callers can report them without
/// string matching. The conversation loop treats all of them as fatal.
#[derive(Debug)]
pub enum ProviderError {
    /// 401: invalid API key or authentication failure
    Auth(String),
    /// 429: rate limit or quota exceeded
    RateLimit(String),
    /// 402: payment required or billing issue
    Billing(String),
    /// 500/502/503/504: server-side errors
    ServerError(String),
    /// 400: bad request, invalid JSON, malformed parameters
    InvalidRequest(String),
    /// 404: model not found or endpoint not available
    ModelNotFound(String),
    /// Connection or read timeout
    Timeout(String),
    /// Anthropic `overloaded_error` (HTTP 529)
    Overloaded(String),
    /// Catch-all for unrecognized errors
    Unknown(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            ProviderError::RateLimit(msg) => write!(f, "Rate limit error: {}", msg),
            ProviderError::Billing(msg) => write!(f, "Billing error: {}", msg),
            ProviderError::ServerError(msg) => write!(f, "Server error: {}", msg),
            ProviderError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ProviderError::ModelNotFound(msg) => write!(f, "Model not found: {}", msg),
            ProviderError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ProviderError::Overloaded(msg) => write!(f, "Overloaded error: {}", msg),
            ProviderError::Unknown(msg) => write!(f, "Unknown provider error: {}", msg),
        }
    }
}

impl ProviderError {
    /// Returns the HTTP status code associated with this error, if applicable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Auth(_) => Some(401),
            ProviderError::RateLimit(_) => Some(429),
            ProviderError::Billing(_) => Some(402),
            ProviderError::ServerError(_) => Some(500),
            ProviderError::InvalidRequest(_) => Some(400),
            ProviderError::ModelNotFound(_) => Some(404),
            ProviderError::Overloaded(_) => Some(529),
            ProviderError::Timeout(_) | ProviderError::Unknown(_) => None,
        }
    }

    /// Returns `true` if a later run could plausibly succeed unchanged.
    ///
    /// Only used for the hint printed by the CLI; nothing retries automatically.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimit(_)
                | ProviderError::ServerError(_)
                | ProviderError::Timeout(_)
                | ProviderError::Overloaded(_)
        )
    }
}

impl From<ProviderError> for BriefError {
    fn from(err: ProviderError) -> Self {
        BriefError::ProviderTyped(err)
    }
}

// ============================================================================
// Primary Error Type
// ============================================================================

/// The primary error type for good-morning operations.
#[derive(Error, Debug)]
pub enum BriefError {
    /// Configuration errors (missing credentials, duplicate tool names, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Untyped provider errors (malformed responses, missing fields)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Structured provider error from an HTTP failure.
    #[error("Provider error: {0}")]
    ProviderTyped(ProviderError),

    /// Tool execution failures. The adapter hides the detail from the model.
    #[error("Tool error: {0}")]
    Tool(String),

    /// Structured tool input failed validation. The detail is shown to the
    /// model verbatim so it can correct the call.
    #[error("{0}")]
    InvalidArguments(String),

    /// Transcript persistence failures
    #[error("Session error: {0}")]
    Session(String),

    /// Report file or git commit failures
    #[error("Report error: {0}")]
    Report(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found (transcripts, tools, feeds)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The model kept requesting tools past the configured bound.
    #[error("Loop limit reached after {iterations} model calls (last requested tools: {})", .tools.join(", "))]
    LoopLimit {
        iterations: usize,
        tools: Vec<String>,
    },

    /// The caller cancelled the run.
    #[error("Run cancelled")]
    Cancelled,

    /// The conversation ended without any final text.
    #[error("Model returned no briefing text")]
    EmptyResponse,
}

/// A specialized `Result` type for good-morning operations.
pub type Result<T> = std::result::Result<T, BriefError>;
