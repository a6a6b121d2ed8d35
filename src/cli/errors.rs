//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::fmt;
use std::io;

use crate::remote::ConnectivityError;
use crate::restore::RestoreError;
use crate::run::RunError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration missing, unreadable or rejected
    ConfigError,
    /// A command-line argument could not be used
    InvalidArgument,
    /// Remote destination unusable
    ConnectivityError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Run finished with at least one failure
    RunFailed,
    /// Restore could not start or finished with failures
    RestoreFailed,
    /// Uncaught fault
    UnexpectedTermination,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "ZM_CLI_CONFIG_ERROR",
            Self::InvalidArgument => "ZM_CLI_INVALID_ARGUMENT",
            Self::ConnectivityError => "ZM_CLI_CONNECTIVITY_ERROR",
            Self::IoError => "ZM_CLI_IO_ERROR",
            Self::RunFailed => "ZM_CLI_RUN_FAILED",
            Self::RestoreFailed => "ZM_CLI_RESTORE_FAILED",
            Self::UnexpectedTermination => "ZM_CLI_UNEXPECTED_TERMINATION",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
    /// The command already printed its result envelope
    reported: bool,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            reported: false,
        }
    }

    /// Mark the outcome as already printed, so only the exit status is left
    /// to set.
    pub fn reported(mut self) -> Self {
        self.reported = true;
        self
    }

    pub fn is_reported(&self) -> bool {
        self.reported
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn run_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RunFailed, msg)
    }

    pub fn restore_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RestoreFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConnectivityError> for CliError {
    fn from(e: ConnectivityError) -> Self {
        Self::new(CliErrorCode::ConnectivityError, e.to_string())
    }
}

impl From<RunError> for CliError {
    fn from(e: RunError) -> Self {
        match e {
            RunError::Config(e) => Self::config_error(e.to_string()),
            RunError::Connectivity(e) => e.into(),
            RunError::Unexpected { message } => {
                Self::new(CliErrorCode::UnexpectedTermination, message)
            }
        }
    }
}

impl From<RestoreError> for CliError {
    fn from(e: RestoreError) -> Self {
        match e {
            RestoreError::Connectivity(e) => e.into(),
            other @ RestoreError::Unconfigured { .. } => Self::config_error(other.to_string()),
            other => Self::restore_failed(other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
