//! Error types for replication filtering
//!
//! Every error in this crate is deterministic: a bad configuration or an
//! unparsable statement fails the same way on every attempt, so nothing here
//! is retriable. Errors still carry a category and a metric-safe code so the
//! relay can label them consistently with its other failures.

use crate::common::pattern::PatternError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error categories for metrics and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration errors (invalid patterns, unreadable config)
    Configuration,
    /// Statement errors (DDL text that cannot be resolved)
    Parse,
    /// Everything else
    Other,
}

/// Filter-specific errors
#[derive(Error, Debug)]
pub enum FilterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pattern compilation error
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// DDL statement could not be parsed
    #[error("Parse error: {message} (sql: {sql})")]
    Parse {
        /// What went wrong
        message: String,
        /// The offending statement text
        sql: String,
    },

    /// YAML configuration error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error while loading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilterError {
    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new parse error for the given statement
    pub fn parse(msg: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
            sql: sql.into(),
        }
    }

    /// Filtering is a pure computation; no failure is transient.
    pub fn is_retriable(&self) -> bool {
        false
    }

    /// Get the error category for metrics and alerting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) | Self::Pattern(_) | Self::Yaml(_) => ErrorCategory::Configuration,
            Self::Parse { .. } => ErrorCategory::Parse,
            Self::Io(_) => ErrorCategory::Other,
        }
    }

    /// Get a metric-safe error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Pattern(_) => "pattern_error",
            Self::Parse { .. } => "parse_error",
            Self::Yaml(_) => "yaml_error",
            Self::Io(_) => "io_error",
        }
    }
}

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;
