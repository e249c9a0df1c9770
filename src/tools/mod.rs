//! Tools module - briefing data sources the model can call
//!
//! - `Tool` trait: the interface every data source implements
//! - `ToolRegistry`: ordered, name-indexed tool collection
//! - `ToolExecutor`: runs requests and folds every failure into a result
//!
//! # Built-in Tools
//!
//! - `CalendarTool`: events of one day from an ICS feed
//! - `GithubTool`: open pull requests and review requests
//! - `LinearTool`: assigned issues and the team review queue

pub mod calendar;
pub mod executor;
pub mod github;
pub mod linear;
mod registry;
mod types;

pub use calendar::CalendarTool;
pub use executor::{ToolExecutor, TOOL_FAILURE_MESSAGE, UNKNOWN_TOOL_MESSAGE};
pub use github::GithubTool;
pub use linear::LinearTool;
pub use registry::ToolRegistry;
pub use types::{Tool, ToolContext};

use tracing::warn;

use crate::config::Config;
use crate::error::Result;

/// Build the registry of every tool the configuration has credentials for.
///
/// Tools without credentials are skipped with a warning so a partial setup
/// still produces a briefing.
pub fn registry_from_config(config: &Config) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();

    match &config.calendar.ics_url {
        Some(url) if !url.trim().is_empty() => {
            registry.register(Box::new(CalendarTool::new(url)))?;
        }
        _ => warn!("calendar.ics_url not set, calendar tool disabled"),
    }

    match &config.github.token {
        Some(token) if !token.trim().is_empty() => {
            registry.register(Box::new(GithubTool::with_api_base(
                token,
                &config.github.api_base,
            )))?;
        }
        _ => warn!("github.token not set, github tool disabled"),
    }

    match &config.linear.token {
        Some(token) if !token.trim().is_empty() => {
            registry.register(Box::new(LinearTool::new(
                token,
                &config.linear.api_url,
                config.linear.teams.clone(),
                config.profile.name.clone(),
            )))?;
        }
        _ => warn!("linear.token not set, linear tool disabled"),
    }

    Ok(registry)
}
