//! Dataset and snapshot query errors

use thiserror::Error;

use crate::errors::ErrorKind;
use crate::exec::ExecError;

use super::name::InvalidDatasetName;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset '{dataset}' does not exist on {location}")]
    NotFound { dataset: String, location: String },

    #[error("dataset '{dataset}' contains no data")]
    Empty { dataset: String },

    #[error("dataset '{dataset}' has no snapshots")]
    NoSnapshot { dataset: String },

    #[error("snapshot '{snapshot}' does not exist for dataset '{dataset}'")]
    SnapshotNotFound { dataset: String, snapshot: String },

    #[error("unexpected output from `{command}`: {output}")]
    UnexpectedOutput { command: String, output: String },

    #[error(transparent)]
    InvalidName(#[from] InvalidDatasetName),

    #[error(transparent)]
    Query(#[from] ExecError),
}

impl DatasetError {
    pub fn code(&self) -> &'static str {
        match self {
            DatasetError::NotFound { .. } => "ZM_DATASET_NOT_FOUND",
            DatasetError::Empty { .. } => "ZM_DATASET_EMPTY",
            DatasetError::NoSnapshot { .. } => "ZM_DATASET_NO_SNAPSHOT",
            DatasetError::SnapshotNotFound { .. } => "ZM_DATASET_SNAPSHOT_NOT_FOUND",
            DatasetError::UnexpectedOutput { .. } => "ZM_DATASET_UNEXPECTED_OUTPUT",
            DatasetError::InvalidName(_) => "ZM_DATASET_INVALID_NAME",
            DatasetError::Query(_) => "ZM_DATASET_QUERY",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DatasetError::NotFound { .. } => ErrorKind::DatasetNotFound,
            DatasetError::Empty { .. } => ErrorKind::EmptyDataset,
            DatasetError::NoSnapshot { .. } | DatasetError::SnapshotNotFound { .. } => {
                ErrorKind::NoSnapshot
            }
            DatasetError::UnexpectedOutput { .. }
            | DatasetError::InvalidName(_)
            | DatasetError::Query(_) => ErrorKind::Command,
        }
    }
}
