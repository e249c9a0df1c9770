//! Shared CLI helpers used across multiple command handlers.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use good_morning::config::Config;
use good_morning::providers::{ClaudeProvider, LLMProvider};

/// Load the configuration with environment overrides applied.
pub(crate) fn load_config() -> Result<Config> {
    Config::load().with_context(|| format!("Failed to load {}", Config::path().display()))
}

/// Build the model provider from the configured credentials.
pub(crate) fn build_provider(config: &Config) -> Result<Arc<dyn LLMProvider>> {
    let Some(api_key) = config.anthropic_api_key() else {
        bail!(
            "No Anthropic API key configured. Set GOOD_MORNING_ANTHROPIC_API_KEY or \
             providers.anthropic.api_key in {}",
            Config::path().display()
        );
    };

    let mut provider = ClaudeProvider::new(&api_key);
    if let Some(base) = config.anthropic_api_base() {
        provider = provider.with_api_base(&base);
    }
    Ok(Arc::new(provider))
}

/// The local calendar date.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` argument.
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

/// Shorten `text` to at most `max` characters on one line.
pub(crate) fn preview(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{}...", cut)
}
