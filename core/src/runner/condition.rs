use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Feature complexity tag, ordered from simplest to most complex.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Standard,
    Complex,
}

impl FromStr for Complexity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "standard" => Ok(Self::Standard),
            "complex" => Ok(Self::Complex),
            other => Err(ConfigError::UnknownCondition(format!(
                "unknown complexity level '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Simple => "simple",
            Self::Standard => "standard",
            Self::Complex => "complex",
        };
        f.write_str(s)
    }
}

/// Facts a unit's pre-condition is evaluated against.
///
/// Built once per run by the caller and shared read-only by every dispatched
/// unit; the injected executor receives the same context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionContext {
    #[serde(default)]
    pub feature_id: String,

    #[serde(default)]
    pub complexity: Complexity,

    /// Files the caller marked as sensitive (auth, crypto, payments, ...).
    #[serde(default)]
    pub sensitive_files: Vec<String>,

    /// Free-form payload passed through to executors and hooks.
    #[serde(default)]
    pub extra: serde_json::Value,
}

/// Closed set of pre-condition variants.
///
/// The config document writes these as strings (`"always"`,
/// `"has-sensitive-files"`, `"complexity>=standard"`); parsing happens at
/// config load, so evaluation is a pure match with no expression parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Condition {
    #[default]
    Always,
    HasSensitiveFiles,
    ComplexityAtLeast(Complexity),
}

impl Condition {
    pub fn evaluate(&self, ctx: &ExecutionContext) -> bool {
        match self {
            Self::Always => true,
            Self::HasSensitiveFiles => !ctx.sensitive_files.is_empty(),
            Self::ComplexityAtLeast(level) => ctx.complexity >= *level,
        }
    }
}

impl FromStr for Condition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let normalized = trimmed.to_ascii_lowercase().replace('_', "-");
        if normalized == "always" {
            return Ok(Self::Always);
        }
        if normalized == "has-sensitive-files" {
            return Ok(Self::HasSensitiveFiles);
        }
        if let Some(rest) = normalized.strip_prefix("complexity") {
            let rest = rest.trim_start();
            if let Some(level) = rest.strip_prefix(">=") {
                return Ok(Self::ComplexityAtLeast(level.parse()?));
            }
        }
        Err(ConfigError::UnknownCondition(trimmed.to_string()))
    }
}

impl TryFrom<String> for Condition {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Condition> for String {
    fn from(c: Condition) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::HasSensitiveFiles => f.write_str("has-sensitive-files"),
            Self::ComplexityAtLeast(level) => write!(f, "complexity>={level}"),
        }
    }
}
