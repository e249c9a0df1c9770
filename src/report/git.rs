//! Git versioning of the output root.
//!
//! Shells out to the system `git` binary. No libgit2 dependency.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{BriefError, Result};

/// Commit message used for every briefing.
pub const COMMIT_MESSAGE: &str = "Daily summary update";

/// Author recorded on briefing commits.
pub const COMMIT_AUTHOR: &str = "good-morning-agent <agent@good-morning>";

const GITIGNORE: &str = "# System files
.DS_Store
.env

# IDE files
.idea/
.vscode/

# Log files
*.log
";

/// A git working tree rooted at the report directory.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Return `true` if the `git` binary is reachable on PATH.
    pub fn is_available() -> bool {
        Command::new("git")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Open the repository at `path`, running `git init` and writing a
    /// `.gitignore` when it has no `.git` yet.
    pub fn open_or_init(path: impl Into<PathBuf>) -> Result<Self> {
        let repo = Self { path: path.into() };
        std::fs::create_dir_all(&repo.path)?;

        if !repo.path.join(".git").exists() {
            repo.run(&["init"])?;
            std::fs::write(repo.path.join(".gitignore"), GITIGNORE).map_err(|e| {
                BriefError::Report(format!("failed to create .gitignore: {}", e))
            })?;
            info!(path = %repo.path.display(), "Initialized report repository");
        }
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stage everything and commit it.
    ///
    /// Returns `false` without committing when the tree has no changes.
    pub fn commit_all(&self, message: &str, author: &str) -> Result<bool> {
        self.run(&["add", "."])?;

        if self.run(&["status", "--porcelain"])?.trim().is_empty() {
            debug!("Nothing to commit");
            return Ok(false);
        }

        let mut args = Vec::new();
        // A machine without a configured identity still gets a committer.
        if self.run(&["config", "user.email"]).is_err() {
            args.extend(["-c", "user.name=good-morning-agent", "-c", "user.email=agent@good-morning"]);
        }
        args.extend(["commit", "-m", message, "--author", author]);
        self.run(&args)?;

        info!(path = %self.path.display(), "Committed report");
        Ok(true)
    }

    /// Run `git <args>` in the repository and return stdout.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .output()
            .map_err(|e| BriefError::Report(format!("Failed to run git: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        Err(BriefError::Report(format!(
            "git {} failed: {}",
            args.first().copied().unwrap_or_default(),
            detail
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_and_commit() {
        if !GitRepo::is_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let repo = GitRepo::open_or_init(dir.path()).unwrap();
        assert!(dir.path().join(".git").exists());
        assert!(std::fs::read_to_string(dir.path().join(".gitignore"))
            .unwrap()
            .contains(".env"));

        std::fs::write(dir.path().join("2025-03-07.md"), "# hi").unwrap();
        assert!(repo.commit_all(COMMIT_MESSAGE, COMMIT_AUTHOR).unwrap());

        let log = repo.run(&["log", "--format=%an|%s"]).unwrap();
        assert_eq!(log.trim(), "good-morning-agent|Daily summary update");

        // Nothing new: no empty commit.
        assert!(!repo.commit_all(COMMIT_MESSAGE, COMMIT_AUTHOR).unwrap());
    }

    #[test]
    fn test_existing_repo_is_left_alone() {
        if !GitRepo::is_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        GitRepo::open_or_init(dir.path()).unwrap();
        assert!(!dir.path().join(".gitignore").exists());
    }
}
