//! Report output - the dated markdown file and its git history
//!
//! Reports land at `<root>/<YYYY-MM-DD>.md`. The root doubles as a git
//! repository so every day's briefing is versioned.

pub mod git;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::error::{BriefError, Result};

pub use git::{GitRepo, COMMIT_AUTHOR, COMMIT_MESSAGE};

/// File name of the report for `date`.
pub fn report_file_name(date: NaiveDate) -> String {
    format!("{}.md", date.format("%Y-%m-%d"))
}

/// Writes daily reports under an output root.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    root: PathBuf,
}

impl ReportWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the report for `date` lives.
    pub fn report_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(report_file_name(date))
    }

    /// Write the report for `date`, replacing any earlier one.
    ///
    /// The file is written next to its target and renamed into place, so a
    /// reader never sees a half-written report.
    pub fn write(&self, date: NaiveDate, markdown: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            BriefError::Report(format!(
                "cannot create output directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let path = self.report_path(date);
        let tmp = path.with_extension("md.tmp");
        std::fs::write(&tmp, markdown)
            .and_then(|_| std::fs::rename(&tmp, &path))
            .map_err(|e| {
                BriefError::Report(format!("cannot write report {}: {}", path.display(), e))
            })?;

        info!(path = %path.display(), bytes = markdown.len(), "Report written");
        Ok(path)
    }

    /// Read back the report for `date`.
    pub fn read(&self, date: NaiveDate) -> Result<String> {
        let path = self.report_path(date);
        if !path.exists() {
            return Err(BriefError::NotFound(format!(
                "no report for {}",
                date.format("%Y-%m-%d")
            )));
        }
        Ok(std::fs::read_to_string(path)?)
    }

    /// Dates that have a report, newest first.
    pub fn list(&self) -> Result<Vec<NaiveDate>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut dates: Vec<NaiveDate> = std::fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let stem = name.to_str()?.strip_suffix(".md")?.to_string();
                NaiveDate::parse_from_str(&stem, "%Y-%m-%d").ok()
            })
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        Ok(dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_report_path() {
        let writer = ReportWriter::new("/srv/briefings");
        assert_eq!(
            writer.report_path(date(7)),
            PathBuf::from("/srv/briefings/2025-03-07.md")
        );
    }

    #[test]
    fn test_write_creates_root_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path().join("out"));

        let path = writer.write(date(7), "# first").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# first");

        writer.write(date(7), "# second").unwrap();
        assert_eq!(writer.read(date(7)).unwrap(), "# second");
        assert!(!path.with_extension("md.tmp").exists());
    }

    #[test]
    fn test_read_missing_report() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path());
        assert!(matches!(
            writer.read(date(1)),
            Err(BriefError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path());
        writer.write(date(5), "a").unwrap();
        writer.write(date(7), "b").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        assert_eq!(writer.list().unwrap(), vec![date(7), date(5)]);
    }
}
