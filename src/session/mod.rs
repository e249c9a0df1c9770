//! Session module - durable conversation history
//!
//! [`ConversationStore`] is the single owner of a briefing conversation. It
//! keeps turns in append order, tracks whether anything arrived since the
//! last model call (the *pending* flag), and rewrites the whole transcript
//! to disk on every append.
//!
//! # Example
//!
//! ```
//! use good_morning::session::{ConversationStore, ContentBlock};
//!
//! let mut store = ConversationStore::in_memory();
//! store.append_user("Summarize my day").unwrap();
//! assert!(store.has_pending());
//!
//! store.clear_pending();
//! store
//!     .append_assistant(vec![ContentBlock::text("Nothing scheduled.")])
//!     .unwrap();
//! assert!(!store.has_pending());
//! assert_eq!(store.len(), 2);
//! ```

pub mod types;

pub use crate::config::PersistenceMode;
pub use types::{ContentBlock, Role, ToolRequest, ToolResult, Transcript, Turn};

use chrono::{NaiveDate, Utc};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{BriefError, Result};

/// File name of the transcript for a given day.
pub fn transcript_file_name(date: NaiveDate) -> String {
    format!("context_manager_{}.json", date.format("%Y-%m-%d"))
}

/// Read a transcript file without opening a store on it.
pub fn load_transcript(path: &Path) -> Result<Transcript> {
    if !path.exists() {
        return Err(BriefError::NotFound(format!(
            "transcript {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Append-only, durably persisted conversation history.
pub struct ConversationStore {
    turns: Vec<Turn>,
    pending: bool,
    path: Option<PathBuf>,
    mode: PersistenceMode,
}

impl ConversationStore {
    /// Store without persistence.
    pub fn in_memory() -> Self {
        Self {
            turns: Vec::new(),
            pending: false,
            path: None,
            mode: PersistenceMode::BestEffort,
        }
    }

    /// Store persisted to `path`.
    ///
    /// With `resume`, an existing transcript at `path` is loaded and the
    /// pending flag is restored from its last turn: a trailing user turn
    /// has not been answered yet. A trailing assistant turn may still hold
    /// tool requests, see [`Self::unanswered_tool_requests`]. Without
    /// `resume` any existing file is overwritten on the first append.
    pub fn open(path: impl Into<PathBuf>, mode: PersistenceMode, resume: bool) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let turns = if resume && path.exists() {
            let transcript = load_transcript(&path)?;
            info!(
                path = %path.display(),
                turns = transcript.turns.len(),
                "Resumed conversation transcript"
            );
            transcript.turns
        } else {
            Vec::new()
        };
        let pending = turns.last().is_some_and(|t| t.role == Role::User);

        Ok(Self {
            turns,
            pending,
            path: Some(path),
            mode,
        })
    }

    /// Transcript location, if persisted.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turn has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a user text turn and mark the store pending.
    pub fn append_user(&mut self, text: impl Into<String>) -> Result<()> {
        self.push(Turn::user(text), true)
    }

    /// Append the model reply. Does not change the pending flag.
    pub fn append_assistant(&mut self, content: Vec<ContentBlock>) -> Result<()> {
        self.push(Turn::assistant(content), false)
    }

    /// Append one turn holding every result of a tool batch and mark the
    /// store pending.
    pub fn append_tool_results(&mut self, results: Vec<ToolResult>) -> Result<()> {
        self.push(Turn::tool_results(results), true)
    }

    /// Point-in-time copy of the history. Later appends do not show up in it.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Tool requests of a trailing assistant turn. They have no results
    /// yet when a run stopped during tool execution.
    pub fn unanswered_tool_requests(&self) -> Vec<ToolRequest> {
        match self.turns.last() {
            Some(turn) if turn.role == Role::Assistant => turn
                .content
                .iter()
                .filter_map(ContentBlock::as_tool_request)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether turns were added since the last model call.
    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Reset the pending flag. Idempotent.
    pub fn clear_pending(&mut self) {
        self.pending = false;
    }

    fn push(&mut self, turn: Turn, marks_pending: bool) -> Result<()> {
        debug!(role = %turn.role, blocks = turn.content.len(), "Appending turn");
        self.turns.push(turn);
        if marks_pending {
            self.pending = true;
        }
        self.persist()
    }

    /// Write the whole history. The in-memory append has already happened
    /// and is kept whatever the outcome.
    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        match write_transcript(path, &self.turns) {
            Ok(()) => Ok(()),
            Err(e) => match self.mode {
                PersistenceMode::FailFast => Err(BriefError::Session(format!(
                    "failed to write {}: {}",
                    path.display(),
                    e
                ))),
                PersistenceMode::BestEffort => {
                    warn!(path = %path.display(), error = %e, "Transcript write failed, continuing");
                    Ok(())
                }
            },
        }
    }
}

/// Write to a sibling temp file, flush it to disk, then rename over the
/// target so a reader never sees a partial transcript.
fn write_transcript(path: &Path, turns: &[Turn]) -> Result<()> {
    let transcript = Transcript {
        updated_at: Utc::now(),
        turns: turns.to_vec(),
    };
    let content = serde_json::to_string_pretty(&transcript)?;
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    sync_parent(path);
    Ok(())
}

/// Flush the directory entry of a rename. Not every platform can open a
/// directory for this, so failures are ignored.
fn sync_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
}
