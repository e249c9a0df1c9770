//! Tools CLI command handlers: tool discovery.

use anyhow::Result;

use good_morning::tools::registry_from_config;

use super::common::load_config;
use super::ToolsAction;

/// Static tool info for CLI display.
struct ToolInfo {
    name: &'static str,
    description: &'static str,
    config_hint: &'static str,
}

const TOOLS: &[ToolInfo] = &[
    ToolInfo {
        name: "calendar",
        description: "Events of one day from an ICS feed",
        config_hint: "Set calendar.ics_url or GOOD_MORNING_ICS_URL",
    },
    ToolInfo {
        name: "github",
        description: "My open pull requests and pending review requests",
        config_hint: "Set github.token or GOOD_MORNING_GITHUB_TOKEN",
    },
    ToolInfo {
        name: "linear",
        description: "Issues assigned to me and my teams' review queue",
        config_hint: "Set linear.token or GOOD_MORNING_LINEAR_TOKEN",
    },
];

pub(crate) async fn cmd_tools(action: ToolsAction) -> Result<()> {
    match action {
        ToolsAction::List => {
            let config = load_config()?;
            let registry = registry_from_config(&config)?;

            println!("Briefing tools:");
            println!();
            for tool in TOOLS {
                let status = if registry.has(tool.name) {
                    "ready"
                } else {
                    "not configured"
                };
                println!("  {:<10} {:<16} {}", tool.name, status, tool.description);
                if !registry.has(tool.name) {
                    println!("  {:<10} {}", "", tool.config_hint);
                }
            }
            println!();
            println!("{} of {} tool(s) ready.", registry.len(), TOOLS.len());
        }
    }
    Ok(())
}
