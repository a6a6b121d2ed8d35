//! Remote endpoint errors

use thiserror::Error;

use crate::errors::ErrorKind;

/// Result type for remote checks
pub type ConnectivityResult<T> = Result<T, ConnectivityError>;

/// The remote endpoint cannot be used. Always fatal to the run.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("remote endpoint {endpoint} is unreachable: {reason}")]
    Unreachable { endpoint: String, reason: String },

    #[error("remote endpoint {endpoint} does not provide '{tool}'")]
    ToolMissing { endpoint: String, tool: String },
}

impl ConnectivityError {
    pub fn code(&self) -> &'static str {
        match self {
            ConnectivityError::Unreachable { .. } => "ZM_REMOTE_UNREACHABLE",
            ConnectivityError::ToolMissing { .. } => "ZM_REMOTE_TOOL_MISSING",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Connectivity
    }
}
