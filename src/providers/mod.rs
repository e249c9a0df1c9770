//! Providers module - LLM providers
//!
//! This module defines the `LLMProvider` trait and common types for talking
//! to a language model. [`ClaudeProvider`] is the only implementation;
//! tests substitute their own.
//!
//! # Example
//!
//! ```rust,ignore
//! use good_morning::providers::{ChatOptions, ClaudeProvider, LLMProvider};
//! use good_morning::session::Turn;
//!
//! async fn example() {
//!     let provider = ClaudeProvider::new("your-api-key");
//!     let options = ChatOptions::new().with_max_tokens(1000);
//!     let response = provider
//!         .chat(vec![Turn::user("Hello!")], vec![], options)
//!         .await
//!         .unwrap();
//!     println!("{:?}", response.content);
//! }
//! ```

pub mod claude;
mod types;

use crate::error::ProviderError;

pub use claude::ClaudeProvider;
pub use types::{ChatOptions, LLMProvider, LLMResponse, StopReason, ToolDefinition, Usage};

/// Parse an HTTP status code and response body into a structured [`ProviderError`].
pub fn parse_provider_error(status: u16, body: &str) -> ProviderError {
    match status {
        401 => ProviderError::Auth(body.to_string()),
        402 => ProviderError::Billing(body.to_string()),
        404 => ProviderError::ModelNotFound(body.to_string()),
        429 => ProviderError::RateLimit(body.to_string()),
        400 => ProviderError::InvalidRequest(body.to_string()),
        529 => ProviderError::Overloaded(body.to_string()),
        500..=599 => ProviderError::ServerError(body.to_string()),
        _ => ProviderError::Unknown(format!("HTTP {}: {}", status, body)),
    }
}
