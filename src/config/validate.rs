//! Configuration validation with unknown field detection.

use serde_json::Value;
use std::collections::HashSet;

/// Known top-level config field names.
const KNOWN_TOP_LEVEL: &[&str] = &[
    "agent",
    "providers",
    "calendar",
    "github",
    "linear",
    "profile",
    "output",
    "session",
    "logging",
];

/// Known fields per section, checked one level deep.
const KNOWN_SECTIONS: &[(&str, &[&str])] = &[
    (
        "agent",
        &[
            "model",
            "max_tokens",
            "temperature",
            "max_tool_iterations",
            "tool_timeout_secs",
            "parallel_tools",
        ],
    ),
    ("providers", &["anthropic"]),
    ("calendar", &["ics_url"]),
    ("github", &["token", "api_base"]),
    ("linear", &["token", "teams", "api_url"]),
    ("profile", &["name"]),
    ("output", &["root", "commit"]),
    ("session", &["persistence", "resume"]),
    ("logging", &["format", "level", "file"]),
];

/// A validation diagnostic.
#[derive(Debug)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub path: String,
    pub message: String,
}

#[derive(Debug, PartialEq)]
pub enum DiagnosticLevel {
    Ok,
    Warn,
    Error,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            DiagnosticLevel::Ok => "[OK]",
            DiagnosticLevel::Warn => "[WARN]",
            DiagnosticLevel::Error => "[ERROR]",
        };
        if self.path.is_empty() {
            write!(f, "{} {}", prefix, self.message)
        } else {
            write!(f, "{} {}: {}", prefix, self.path, self.message)
        }
    }
}

/// Simple Levenshtein distance for "did you mean?" suggestions.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut row = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            row[j + 1] = (prev[j + 1] + 1).min(row[j] + 1).min(prev[j] + cost);
        }
        prev = row;
    }
    prev[b.len()]
}

/// Suggest the closest known field name (if distance <= 3).
pub fn suggest_field(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(k, _)| format!("did you mean '{}'?", k))
}

fn unknown_field(path: String, key: &str, known: &[&str]) -> Diagnostic {
    let message = match suggest_field(key, known) {
        Some(suggestion) => format!("Unknown field '{}' ({})", key, suggestion),
        None => format!("Unknown field '{}'", key),
    };
    Diagnostic {
        level: DiagnosticLevel::Error,
        path,
        message,
    }
}

/// Validate a raw JSON config value against known field names and flag
/// missing credentials.
pub fn validate_config(raw: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match raw.as_object() {
        Some(o) => o,
        None => {
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Error,
                path: String::new(),
                message: "Config must be a JSON object".to_string(),
            });
            return diagnostics;
        }
    };

    diagnostics.push(Diagnostic {
        level: DiagnosticLevel::Ok,
        path: String::new(),
        message: "Valid JSON".to_string(),
    });

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL.iter().copied().collect();
    let mut has_unknown = false;
    for key in obj.keys() {
        if !known_top.contains(key.as_str()) {
            has_unknown = true;
            diagnostics.push(unknown_field(key.clone(), key, KNOWN_TOP_LEVEL));
        }
    }

    for (section, fields) in KNOWN_SECTIONS {
        let Some(section_obj) = obj.get(*section).and_then(|v| v.as_object()) else {
            continue;
        };
        let known: HashSet<&str> = fields.iter().copied().collect();
        for key in section_obj.keys() {
            if !known.contains(key.as_str()) {
                has_unknown = true;
                diagnostics.push(unknown_field(format!("{}.{}", section, key), key, fields));
            }
        }
    }

    if !has_unknown {
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Ok,
            path: String::new(),
            message: "All fields recognized".to_string(),
        });
    }

    diagnostics
}

/// Check a loaded config (env overrides included) for settings a briefing
/// run cannot do without.
pub fn validate_credentials(config: &crate::config::Config) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if config.anthropic_api_key().is_none() {
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Error,
            path: "providers.anthropic.api_key".into(),
            message: "Missing (set GOOD_MORNING_ANTHROPIC_API_KEY)".into(),
        });
    }

    let optional = [
        ("calendar.ics_url", config.calendar.ics_url.is_some(), "calendar"),
        ("github.token", config.github.token.is_some(), "github"),
        ("linear.token", config.linear.token.is_some(), "linear"),
    ];
    for (path, present, tool) in optional {
        if !present {
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Warn,
                path: path.into(),
                message: format!("Missing; the {} tool will not be registered", tool),
            });
        }
    }

    if config.linear.token.is_some() && config.profile.name.is_none() {
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Warn,
            path: "profile.name".into(),
            message: "Missing; Linear queries need your display name".into(),
        });
    }

    if config.agent.max_tool_iterations == 0 {
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Error,
            path: "agent.max_tool_iterations".into(),
            message: "Must be at least 1".into(),
        });
    }

    diagnostics
}
