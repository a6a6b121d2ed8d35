//! Run-level (fatal) errors
//!
//! Only these unwind a run. Everything else is recorded in the summary.

use thiserror::Error;

use crate::config::ConfigError;
use crate::errors::ErrorKind;
use crate::remote::ConnectivityError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    #[error("unexpected termination: {message}")]
    Unexpected { message: String },
}

impl RunError {
    pub fn code(&self) -> &'static str {
        match self {
            RunError::Config(e) => e.code(),
            RunError::Connectivity(e) => e.code(),
            RunError::Unexpected { .. } => "ZM_RUN_UNEXPECTED_TERMINATION",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RunError::Config(_) => ErrorKind::Config,
            RunError::Connectivity(_) => ErrorKind::Connectivity,
            RunError::Unexpected { .. } => ErrorKind::UnexpectedTermination,
        }
    }
}
