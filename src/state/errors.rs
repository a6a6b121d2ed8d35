//! Persisted state errors

use std::io;

use thiserror::Error;

use crate::errors::ErrorKind;
use crate::exec::ExecError;

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed state file {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("failed to remove artifact of '{dataset}': {source}")]
    Cleanup {
        dataset: String,
        #[source]
        source: ExecError,
    },

    #[error("failed to write state file: {0}")]
    Write(#[source] ExecError),

    #[error("reconciliation finished with {} failures", .0.len())]
    Incomplete(Vec<StateError>),
}

impl StateError {
    pub fn code(&self) -> &'static str {
        match self {
            StateError::Read { .. } => "ZM_STATE_READ",
            StateError::Malformed { .. } => "ZM_STATE_MALFORMED",
            StateError::Cleanup { .. } => "ZM_STATE_CLEANUP",
            StateError::Write(_) => "ZM_STATE_WRITE",
            StateError::Incomplete(_) => "ZM_STATE_INCOMPLETE",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::State
    }

    /// Each underlying failure on its own
    pub fn into_failures(self) -> Vec<StateError> {
        match self {
            StateError::Incomplete(failures) => failures,
            other => vec![other],
        }
    }
}
