//! CLI module: command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()`.

pub mod common;
pub mod config;
pub mod history;
pub mod run;
pub mod tools;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "good-morning")]
#[command(version)]
#[command(about = "Daily briefing from your calendar, pull requests and issues", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce today's briefing
    Run {
        /// Continue today's saved conversation instead of starting over
        #[arg(long)]
        resume: bool,
        /// Write the report but do not commit it
        #[arg(long)]
        no_commit: bool,
        /// Keep the conversation in memory only
        #[arg(long)]
        no_persist: bool,
        /// Print the report instead of writing it to the output root
        #[arg(long)]
        stdout: bool,
    },
    /// Inspect the briefing tools
    Tools {
        #[command(subcommand)]
        action: ToolsAction,
    },
    /// Validate configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List past briefings or show one day's conversation
    History {
        /// Day to show (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ToolsAction {
    /// List tools and whether they are configured
    List,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Check the config file and credentials
    Check,
}

/// Options of the `run` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunArgs {
    pub resume: bool,
    pub no_commit: bool,
    pub no_persist: bool,
    pub stdout: bool,
}

pub async fn run() -> Result<()> {
    // Load config early so we can respect the logging settings; fall back to
    // defaults if the config file is missing or unreadable.
    let logging_cfg = good_morning::config::Config::load()
        .map(|c| c.logging)
        .unwrap_or_default();
    good_morning::utils::logging::init_logging(&logging_cfg);

    let cli = Cli::parse();

    match cli.command {
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
        }
        Some(Commands::Version) => {
            cmd_version();
        }
        Some(Commands::Run {
            resume,
            no_commit,
            no_persist,
            stdout,
        }) => {
            run::cmd_run(RunArgs {
                resume,
                no_commit,
                no_persist,
                stdout,
            })
            .await?;
        }
        Some(Commands::Tools { action }) => {
            tools::cmd_tools(action).await?;
        }
        Some(Commands::Config { action }) => {
            config::cmd_config(action).await?;
        }
        Some(Commands::History { date }) => {
            history::cmd_history(date).await?;
        }
    }

    Ok(())
}

/// Display version information
fn cmd_version() {
    println!("good-morning {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Daily briefing generator driven by a tool-calling LLM conversation");
}
