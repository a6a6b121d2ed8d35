//! Replication errors
//!
//! All of these are recoverable: they fail one dataset or one target and
//! the run moves on.

use thiserror::Error;

use crate::dataset::DatasetError;
use crate::errors::ErrorKind;
use crate::exec::ExecError;

/// Result type for replication operations
pub type ReplicationResult<T> = Result<T, ReplicationError>;

#[derive(Debug, Error)]
pub enum ReplicationError {
    /// Source snapshot lookup failed (including "no snapshot")
    #[error(transparent)]
    Source(#[from] DatasetError),

    #[error("no {side} destination is configured")]
    Unconfigured { side: &'static str },

    #[error("could not check destination {target}: {source}")]
    PathQuery {
        target: String,
        #[source]
        source: DatasetError,
    },

    #[error("could not create destination {target}: {source}")]
    PathCreation {
        target: String,
        #[source]
        source: ExecError,
    },

    #[error("transfer to {target} failed: {source}")]
    Transfer {
        target: String,
        #[source]
        source: ExecError,
    },
}

impl ReplicationError {
    pub fn code(&self) -> &'static str {
        match self {
            ReplicationError::Source(e) => e.code(),
            ReplicationError::Unconfigured { .. } => "ZM_REPLICATION_UNCONFIGURED",
            ReplicationError::PathQuery { .. } => "ZM_REPLICATION_PATH_QUERY",
            ReplicationError::PathCreation { .. } => "ZM_REPLICATION_PATH_CREATION",
            ReplicationError::Transfer { .. } => "ZM_REPLICATION_TRANSFER",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ReplicationError::Source(e) => e.kind(),
            ReplicationError::Unconfigured { .. } => ErrorKind::Config,
            ReplicationError::PathQuery { .. } | ReplicationError::PathCreation { .. } => {
                ErrorKind::PathCreation
            }
            ReplicationError::Transfer { .. } => ErrorKind::Transfer,
        }
    }
}
