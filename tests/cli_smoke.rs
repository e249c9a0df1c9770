//! CLI smoke tests: verify all commands that work without API keys.
//!
//! These tests run the compiled binary against an empty temporary home
//! directory and verify exit codes and output. No network access required.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Helper: run good-morning with `home` as HOME and return (exit_code, stdout, stderr).
fn run_cli_in(home: &Path, args: &[&str]) -> (i32, String, String) {
    let bin = env!("CARGO_BIN_EXE_good-morning");
    let mut cmd = Command::new(bin);
    cmd.args(args)
        .current_dir(home)
        .env("HOME", home)
        .env("RUST_LOG", "off"); // suppress tracing noise
    for (key, _) in std::env::vars() {
        if key.starts_with("GOOD_MORNING_") {
            cmd.env_remove(key);
        }
    }
    let output = cmd.output().expect("failed to execute good-morning binary");
    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn run_cli(args: &[&str]) -> (i32, String, String) {
    let home = TempDir::new().unwrap();
    run_cli_in(home.path(), args)
}

// ============================================================================
// Help & Version
// ============================================================================

#[test]
fn cli_no_args_shows_help() {
    let (code, stdout, _stderr) = run_cli(&[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("good-morning"));
}

#[test]
fn cli_help_lists_commands() {
    let (code, stdout, _stderr) = run_cli(&["--help"]);
    assert_eq!(code, 0);
    for command in ["run", "tools", "config", "history", "version"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn cli_version_command() {
    let (code, stdout, _stderr) = run_cli(&["version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains(&format!("good-morning {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn cli_run_help_shows_flags() {
    let (code, stdout, _stderr) = run_cli(&["run", "--help"]);
    assert_eq!(code, 0);
    for flag in ["--resume", "--no-commit", "--no-persist", "--stdout"] {
        assert!(stdout.contains(flag), "missing {flag} in run help");
    }
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn cli_config_check_without_file() {
    let (code, stdout, _stderr) = run_cli(&["config", "check"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No config file found"));
    assert!(stdout.contains("[ERROR] providers.anthropic.api_key"));
    assert!(stdout.contains("[WARN] calendar.ics_url"));
}

#[test]
fn cli_config_check_reports_unknown_field() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".good-morning");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.json"),
        r#"{"agent": {"max_tokns": 100}, "providers": {"anthropic": {"api_key": "sk-test"}}}"#,
    )
    .unwrap();

    let (code, stdout, _stderr) = run_cli_in(home.path(), &["config", "check"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("max_tokns"), "got: {stdout}");
    assert!(stdout.contains("did you mean 'max_tokens'"), "got: {stdout}");
    assert!(!stdout.contains("providers.anthropic.api_key"));
}

#[test]
fn cli_config_check_invalid_json() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".good-morning");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.json"), "{ not json").unwrap();

    let (code, stdout, _stderr) = run_cli_in(home.path(), &["config", "check"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[ERROR] Invalid JSON"));
}

// ============================================================================
// Tools & History
// ============================================================================

#[test]
fn cli_tools_list_unconfigured() {
    let (code, stdout, _stderr) = run_cli(&["tools", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("calendar"));
    assert!(stdout.contains("github"));
    assert!(stdout.contains("linear"));
    assert!(stdout.contains("0 of 3 tool(s) ready."));
}

#[test]
fn cli_history_empty() {
    let (code, stdout, _stderr) = run_cli(&["history"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No briefings"));
}

#[test]
fn cli_history_invalid_date() {
    let (code, _stdout, stderr) = run_cli(&["history", "--date", "yesterday"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("expected YYYY-MM-DD"));
}

#[test]
fn cli_history_missing_day() {
    let (code, stdout, _stderr) = run_cli(&["history", "--date", "2025-03-07"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No saved conversation for 2025-03-07"));
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn cli_run_without_api_key_fails() {
    let (code, _stdout, stderr) = run_cli(&["run", "--no-persist", "--stdout"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("No Anthropic API key configured"));
}

#[test]
fn cli_unknown_command_fails() {
    let (code, _stdout, stderr) = run_cli(&["brew-coffee"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unrecognized subcommand"));
}
