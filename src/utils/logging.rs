//! Logging initialization.
//!
//! Supports three formats:
//! - `pretty`: multi-line human-readable output
//! - `component`: compact single-line output; use [`log_component!`] to add a
//!   `component` field for per-subsystem filtering
//! - `json`: structured JSON lines for log aggregators
//!
//! Events go to stderr (or the configured file) so `run --stdout` keeps
//! stdout for the report alone.

use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Initialize the global tracing subscriber from config.
///
/// Call this once at startup before any tracing events are emitted.
/// `RUST_LOG` takes precedence over `cfg.level`. A log file that cannot be
/// opened falls back to stderr with a notice.
pub fn init_logging(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    let file = cfg.file.as_deref().and_then(|path| {
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Some(Mutex::new(f)),
            Err(e) => {
                eprintln!("Cannot open log file {}: {}; logging to stderr", path, e);
                None
            }
        }
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match (cfg.format, file) {
        (LogFormat::Json, Some(f)) => builder.json().with_writer(f).init(),
        (LogFormat::Json, None) => builder.json().with_writer(std::io::stderr).init(),
        (LogFormat::Pretty, Some(f)) => builder.pretty().with_ansi(false).with_writer(f).init(),
        (LogFormat::Pretty, None) => builder.pretty().with_writer(std::io::stderr).init(),
        (LogFormat::Component, Some(f)) => builder
            .with_target(true)
            .compact()
            .with_ansi(false)
            .with_writer(f)
            .init(),
        (LogFormat::Component, None) => builder
            .with_target(true)
            .compact()
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Emit a component-tagged tracing event.
///
/// Works with any tracing level (`trace`, `debug`, `info`, `warn`, `error`):
///
/// ```
/// # use good_morning::log_component;
/// log_component!(info, "calendar", "feed fetched");
/// log_component!(warn, "agent", "iteration budget low", used = 20u32, limit = 25u32);
/// ```
#[macro_export]
macro_rules! log_component {
    ($level:ident, $component:expr, $msg:expr) => {
        tracing::$level!(component = $component, $msg)
    };
    ($level:ident, $component:expr, $msg:expr, $($key:ident = $val:expr),+ $(,)?) => {
        tracing::$level!(component = $component, $($key = $val,)+ $msg)
    };
}

#[cfg(test)]
mod tests {
    use crate::config::{LogFormat, LoggingConfig};

    #[test]
    fn test_default_logging_config() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.format, LogFormat::Component);
        assert_eq!(cfg.level, "info");
        assert!(cfg.file.is_none());
    }

    #[test]
    fn test_log_format_deserialize() {
        let cfg: LoggingConfig =
            serde_json::from_str(r#"{"format":"json","level":"debug"}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.level, "debug");

        let cfg: LoggingConfig = serde_json::from_str(r#"{"format":"pretty"}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Pretty);
        assert_eq!(cfg.level, "info");
    }

    #[test]
    fn test_log_format_partial_config_uses_defaults() {
        let cfg: LoggingConfig = serde_json::from_str(r#"{"level":"trace"}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Component);
        assert!(cfg.file.is_none());
    }

    #[test]
    fn test_log_component_macro_expands() {
        log_component!(debug, "test", "plain");
        log_component!(debug, "test", "with fields", count = 3usize, name = "x");
    }
}
