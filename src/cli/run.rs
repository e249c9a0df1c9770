//! `run` command handler: produce, write and commit today's briefing.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use good_morning::agent::BriefingAgent;
use good_morning::error::BriefError;
use good_morning::report::{GitRepo, ReportWriter, COMMIT_AUTHOR, COMMIT_MESSAGE};
use good_morning::session::{transcript_file_name, ConversationStore};
use good_morning::tools::registry_from_config;

use super::common::{build_provider, load_config, today};
use super::RunArgs;

pub(crate) async fn cmd_run(args: RunArgs) -> Result<()> {
    let config = load_config()?;
    let provider = build_provider(&config)?;
    let tools = Arc::new(registry_from_config(&config).context("Failed to register tools")?);
    if tools.is_empty() {
        warn!("No tools configured; the briefing will only contain what the model knows");
    }

    let date = today();
    let store = if args.no_persist {
        ConversationStore::in_memory()
    } else {
        let path = config.context_dir().join(transcript_file_name(date));
        ConversationStore::open(
            &path,
            config.session.persistence,
            args.resume || config.session.resume,
        )
        .with_context(|| format!("Failed to open transcript {}", path.display()))?
    };

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, cancelling briefing");
            on_ctrl_c.cancel();
        }
    });

    let mut agent = BriefingAgent::new(&config, date, provider, tools, store);
    let report = briefing_outcome(agent.produce_report(&cancel).await)?;

    let stats = agent.stats();
    info!(
        model_calls = stats.model_calls,
        tool_executions = stats.tool_executions,
        tool_errors = stats.tool_errors,
        input_tokens = stats.input_tokens,
        output_tokens = stats.output_tokens,
        "Briefing produced"
    );

    if args.stdout {
        println!("{}", report);
        return Ok(());
    }

    let writer = ReportWriter::new(config.output_root());
    let path = writer.write(date, &report)?;
    println!("Report written to {}", path.display());

    if config.output.commit && !args.no_commit {
        if GitRepo::is_available() {
            let repo = GitRepo::open_or_init(writer.root())?;
            if repo.commit_all(COMMIT_MESSAGE, COMMIT_AUTHOR)? {
                println!("Committed to {}", repo.path().display());
            }
        } else {
            warn!("git not found on PATH, skipping commit");
        }
    }

    Ok(())
}

/// Map the briefing result to the command result. Cancellation is a
/// failure too, so scripts see a non-zero exit status.
fn briefing_outcome(result: good_morning::Result<String>) -> Result<String> {
    match result {
        Ok(report) => Ok(report),
        Err(BriefError::Cancelled) => {
            bail!("Briefing cancelled, run again with --resume to continue")
        }
        Err(e) => Err(e).context("Failed to produce the briefing"),
    }
}
