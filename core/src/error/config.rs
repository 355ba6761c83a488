use thiserror::Error;

/// Configuration errors, all reported before any execution begins.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Agent '{unit}' has invalid timeout {secs}s (must be within 1..={max}s)")]
    InvalidUnitTimeout { unit: String, secs: u64, max: u64 },

    #[error("Global timeout {secs}s out of range (must be within 1..={max}s)")]
    InvalidGlobalTimeout { secs: u64, max: u64 },

    #[error("Unknown execution mode: {0}")]
    UnknownMode(String),

    #[error("Unknown condition expression: {0}")]
    UnknownCondition(String),

    #[error("Duplicate agent config block: {0}")]
    DuplicateAgent(String),

    #[error("Agent '{unit}' references undeclared agent '{missing}'")]
    UndeclaredDependency { unit: String, missing: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
