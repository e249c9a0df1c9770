//! Configuration management for good-morning
//!
//! Configuration is loaded once from `~/.good-morning/config.json` with
//! `GOOD_MORNING_*` environment variable overrides (a `.env` file in the
//! working directory is honoured too), then passed explicitly to every
//! component that needs it.

mod types;
pub mod validate;

pub use types::*;

use crate::error::Result;
use std::path::{Path, PathBuf};

impl Config {
    /// Returns the good-morning configuration directory path (~/.good-morning)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".good-morning")
    }

    /// Returns the path to the config file (~/.good-morning/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// If the config file doesn't exist, returns the default configuration
    /// with overrides applied.
    pub fn load() -> Result<Self> {
        // A missing .env is the common case.
        let _ = dotenvy::dotenv();
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply `GOOD_MORNING_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using an arbitrary variable lookup.
    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("GOOD_MORNING_ANTHROPIC_API_KEY") {
            self.providers
                .anthropic
                .get_or_insert_with(ProviderConfig::default)
                .api_key = Some(val);
        }
        if let Some(val) = lookup("GOOD_MORNING_ANTHROPIC_API_BASE") {
            self.providers
                .anthropic
                .get_or_insert_with(ProviderConfig::default)
                .api_base = Some(val);
        }
        if let Some(val) = lookup("GOOD_MORNING_MODEL") {
            self.agent.model = val;
        }
        if let Some(val) = lookup("GOOD_MORNING_MAX_TOKENS") {
            if let Ok(v) = val.parse() {
                self.agent.max_tokens = v;
            }
        }
        if let Some(val) = lookup("GOOD_MORNING_MAX_TOOL_ITERATIONS") {
            if let Ok(v) = val.parse() {
                self.agent.max_tool_iterations = v;
            }
        }

        if let Some(val) = lookup("GOOD_MORNING_ROOT") {
            self.output.root = val;
        }
        if let Some(val) = lookup("GOOD_MORNING_ICS_URL") {
            self.calendar.ics_url = Some(val);
        }
        if let Some(val) = lookup("GOOD_MORNING_GITHUB_TOKEN") {
            self.github.token = Some(val);
        }
        if let Some(val) = lookup("GOOD_MORNING_LINEAR_TOKEN") {
            self.linear.token = Some(val);
        }
        if let Some(val) = lookup("GOOD_MORNING_LINEAR_TEAMS") {
            self.linear.teams = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(val) = lookup("GOOD_MORNING_MY_NAME") {
            self.profile.name = Some(val);
        }
        if let Some(val) = lookup("GOOD_MORNING_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::path())
    }

    /// Save configuration to a specific path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory the dated reports are written to.
    pub fn output_root(&self) -> PathBuf {
        expand_home(&self.output.root)
    }

    /// Directory holding the per-day conversation transcripts.
    pub fn context_dir(&self) -> PathBuf {
        self.output_root().join("context")
    }

    /// Anthropic API key, if configured and non-empty.
    pub fn anthropic_api_key(&self) -> Option<String> {
        self.providers
            .anthropic
            .as_ref()
            .and_then(|p| p.api_key.clone())
            .filter(|k| !k.trim().is_empty())
    }

    /// Anthropic API base URL override.
    pub fn anthropic_api_base(&self) -> Option<String> {
        self.providers
            .anthropic
            .as_ref()
            .and_then(|p| p.api_base.clone())
            .filter(|b| !b.trim().is_empty())
    }
}

/// Expand ~ to home directory in a path string
fn expand_home(path: &str) -> PathBuf {
    if path.is_empty() {
        return PathBuf::from(path);
    }

    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            if let Some(rest) = rest.strip_prefix('/') {
                return home.join(rest);
            }
            if rest.is_empty() {
                return home;
            }
        }
    }

    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.agent.model, "claude-3-5-sonnet-latest");
        assert_eq!(config.agent.max_tokens, 8000);
        assert_eq!(config.agent.max_tool_iterations, 25);
        assert!(config.agent.parallel_tools);
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.linear.api_url, "https://api.linear.app/graphql");
        assert_eq!(config.session.persistence, PersistenceMode::FailFast);
        assert!(config.output.commit);
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{"agent": {"max_tool_iterations": 5}, "linear": {"teams": ["ENG"]}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.agent.max_tool_iterations, 5);
        assert_eq!(config.agent.max_tokens, 8000);
        assert_eq!(config.linear.teams, vec!["ENG"]);
        assert_eq!(config.linear.api_url, "https://api.linear.app/graphql");
    }

    #[test]
    fn test_persistence_mode_deserialize() {
        let config: Config =
            serde_json::from_str(r#"{"session": {"persistence": "best_effort"}}"#).unwrap();
        assert_eq!(config.session.persistence, PersistenceMode::BestEffort);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup_from(&[
            ("GOOD_MORNING_ANTHROPIC_API_KEY", "sk-ant-test"),
            ("GOOD_MORNING_ROOT", "/tmp/briefings"),
            ("GOOD_MORNING_ICS_URL", "https://example.com/cal.ics"),
            ("GOOD_MORNING_GITHUB_TOKEN", "ghp_x"),
            ("GOOD_MORNING_LINEAR_TOKEN", "lin_x"),
            ("GOOD_MORNING_LINEAR_TEAMS", "ENG, OPS,,"),
            ("GOOD_MORNING_MY_NAME", "Sam Doe"),
            ("GOOD_MORNING_MAX_TOOL_ITERATIONS", "7"),
        ]));

        assert_eq!(config.anthropic_api_key().as_deref(), Some("sk-ant-test"));
        assert_eq!(config.output_root(), PathBuf::from("/tmp/briefings"));
        assert_eq!(
            config.context_dir(),
            PathBuf::from("/tmp/briefings/context")
        );
        assert_eq!(
            config.calendar.ics_url.as_deref(),
            Some("https://example.com/cal.ics")
        );
        assert_eq!(config.github.token.as_deref(), Some("ghp_x"));
        assert_eq!(config.linear.token.as_deref(), Some("lin_x"));
        assert_eq!(config.linear.teams, vec!["ENG", "OPS"]);
        assert_eq!(config.profile.name.as_deref(), Some("Sam Doe"));
        assert_eq!(config.agent.max_tool_iterations, 7);
    }

    #[test]
    fn test_env_override_ignores_unparseable_numbers() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup_from(&[("GOOD_MORNING_MAX_TOKENS", "lots")]));
        assert_eq!(config.agent.max_tokens, 8000);
    }

    #[test]
    fn test_blank_api_key_is_none() {
        let mut config = Config::default();
        config.providers.anthropic = Some(ProviderConfig {
            api_key: Some("  ".into()),
            api_base: None,
        });
        assert!(config.anthropic_api_key().is_none());
    }

    #[test]
    fn test_expand_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_home("~/good-morning"), home.join("good-morning"));
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("rel/path"), PathBuf::from("rel/path"));
        assert_eq!(expand_home(""), PathBuf::from(""));
    }

    #[test]
    fn test_config_path() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(Config::path(), home.join(".good-morning/config.json"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.agent.model = "test-model".to_string();
        config.linear.teams = vec!["ENG".into()];
        config.save_to_path(&path).unwrap();

        let loaded: Config =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.agent.model, "test-model");
        assert_eq!(loaded.linear.teams, vec!["ENG"]);
    }

    #[test]
    fn test_load_nonexistent_uses_defaults() {
        let config = Config::load_from_path(Path::new("/nonexistent/path/config.json")).unwrap();
        assert_eq!(config.agent.max_tokens, 8000);
    }
}
