//! Configuration errors

use std::io;

use thiserror::Error;

use crate::errors::ErrorKind;

/// Result type for configuration loading and validation
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Malformed or incomplete configuration. Always fatal to the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The offending field, when the file parsed but a value was rejected
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "ZM_CONFIG_READ",
            ConfigError::Parse { .. } => "ZM_CONFIG_PARSE",
            ConfigError::Invalid { .. } => "ZM_CONFIG_INVALID",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Config
    }
}
