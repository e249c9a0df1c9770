//! History command handler: past reports and saved conversations.

use anyhow::{Context, Result};

use good_morning::error::BriefError;
use good_morning::report::ReportWriter;
use good_morning::session::{load_transcript, transcript_file_name, ContentBlock};

use super::common::{load_config, parse_date, preview};

pub(crate) async fn cmd_history(date: Option<String>) -> Result<()> {
    let config = load_config()?;
    let writer = ReportWriter::new(config.output_root());

    let Some(date) = date else {
        let dates = writer.list()?;
        if dates.is_empty() {
            println!("No briefings in {}", writer.root().display());
            return Ok(());
        }
        println!("Briefings in {}:", writer.root().display());
        for date in dates {
            let has_transcript = config
                .context_dir()
                .join(transcript_file_name(date))
                .exists();
            println!(
                "  {}{}",
                date.format("%Y-%m-%d"),
                if has_transcript { "  (conversation saved)" } else { "" }
            );
        }
        return Ok(());
    };

    let date = parse_date(&date)?;
    let path = config.context_dir().join(transcript_file_name(date));
    let transcript = match load_transcript(&path) {
        Ok(t) => t,
        Err(BriefError::NotFound(_)) => {
            println!("No saved conversation for {}", date.format("%Y-%m-%d"));
            return Ok(());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    println!(
        "Conversation for {} ({} turns, updated {})",
        date.format("%Y-%m-%d"),
        transcript.turns.len(),
        transcript.updated_at.to_rfc3339()
    );
    println!();
    for (i, turn) in transcript.turns.iter().enumerate() {
        for block in &turn.content {
            let line = match block {
                ContentBlock::Text { text } => preview(text, 100),
                ContentBlock::ToolUse { name, input, .. } => {
                    format!("-> {}({})", name, preview(&input.to_string(), 80))
                }
                ContentBlock::ToolResult {
                    content, is_error, ..
                } => format!(
                    "<- {}{}",
                    if *is_error { "[error] " } else { "" },
                    preview(content, 80)
                ),
            };
            println!("[{:>3}] {:<9} {}", i, turn.role, line);
        }
    }
    Ok(())
}
