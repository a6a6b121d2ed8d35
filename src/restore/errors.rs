//! Restore errors
//!
//! `Connectivity` and a missing backup root end the whole restore. The rest
//! are recorded against one dataset of the backup tree.

use thiserror::Error;

use crate::dataset::{DatasetError, InvalidDatasetName};
use crate::errors::ErrorKind;
use crate::exec::ExecError;
use crate::remote::ConnectivityError;
use crate::replication::ReplicationError;

/// Result type for restore operations
pub type RestoreResult<T> = Result<T, RestoreError>;

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("no {side} backup destination is configured")]
    Unconfigured { side: &'static str },

    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Mapping(#[from] ReplicationError),

    #[error("overwrite of existing dataset '{dataset}' was declined")]
    Declined { dataset: String },

    #[error("restore into {target} failed: {source}")]
    Transfer {
        target: String,
        #[source]
        source: ExecError,
    },
}

impl From<InvalidDatasetName> for RestoreError {
    fn from(e: InvalidDatasetName) -> Self {
        RestoreError::Dataset(e.into())
    }
}

impl RestoreError {
    pub fn code(&self) -> &'static str {
        match self {
            RestoreError::Unconfigured { .. } => "ZM_RESTORE_UNCONFIGURED",
            RestoreError::Connectivity(e) => e.code(),
            RestoreError::Dataset(e) => e.code(),
            RestoreError::Mapping(e) => e.code(),
            RestoreError::Declined { .. } => "ZM_RESTORE_DECLINED",
            RestoreError::Transfer { .. } => "ZM_RESTORE_TRANSFER",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RestoreError::Unconfigured { .. } => ErrorKind::Config,
            RestoreError::Connectivity(_) => ErrorKind::Connectivity,
            RestoreError::Dataset(e) => e.kind(),
            RestoreError::Mapping(e) => e.kind(),
            RestoreError::Declined { .. } => ErrorKind::Declined,
            RestoreError::Transfer { .. } => ErrorKind::Transfer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declined_is_not_fatal() {
        let err = RestoreError::Declined {
            dataset: "cache/appdata".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Declined);
        assert!(!err.kind().is_fatal());
        assert!(err.to_string().contains("cache/appdata"));
    }

    #[test]
    fn test_missing_backup_passes_kind_through() {
        let err = RestoreError::from(DatasetError::NotFound {
            dataset: "vault/replication/cache_appdata".to_string(),
            location: "root@10.0.0.5".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::DatasetNotFound);
        assert_eq!(err.code(), "ZM_DATASET_NOT_FOUND");
    }
}
