//! Error types for the lint boundary
//!
//! The analysis core never fails: these errors only describe what can go wrong
//! while loading documents and configuration, and the public entry points turn
//! them into issues.

use thiserror::Error;

/// Result type for boundary operations
pub type Result<T> = std::result::Result<T, LintError>;

/// Errors raised while getting a document or configuration into memory
#[derive(Error, Debug)]
pub enum LintError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON at {line}:{column}: {message}")]
    Json {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Invalid YAML at {location}: {message}")]
    Yaml { message: String, location: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Unknown issue code: {0}")]
    UnknownCode(String),
}

impl LintError {
    /// Location of the failure inside the source text, when the parser knows it
    pub fn location(&self) -> String {
        match self {
            Self::Json { line, column, .. } => format!("{}:{}", line, column),
            Self::Yaml { location, .. } => location.clone(),
            _ => String::from("#"),
        }
    }

    /// Message without the location prefix
    pub fn detail(&self) -> String {
        match self {
            Self::Json { message, .. } | Self::Yaml { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for LintError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

impl From<serde_yaml::Error> for LintError {
    fn from(err: serde_yaml::Error) -> Self {
        let location = err
            .location()
            .map(|loc| format!("{}:{}", loc.line(), loc.column()))
            .unwrap_or_else(|| String::from("#"));
        Self::Yaml {
            message: err.to_string(),
            location,
        }
    }
}
