//! Snapshot phase errors

use std::io;

use thiserror::Error;

use crate::dataset::DatasetError;
use crate::errors::ErrorKind;
use crate::exec::ExecError;

/// Result type for the snapshot phase
pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("failed to read artifact {path}: {source}")]
    ArtifactRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write artifact: {0}")]
    ArtifactWrite(#[source] ExecError),

    #[error("snapshot {step} failed: {source}")]
    Scheduler {
        step: &'static str,
        #[source]
        source: ExecError,
    },
}

impl SnapshotError {
    pub fn code(&self) -> &'static str {
        match self {
            SnapshotError::Dataset(e) => e.code(),
            SnapshotError::ArtifactRead { .. } => "ZM_SNAPSHOT_ARTIFACT_READ",
            SnapshotError::ArtifactWrite(_) => "ZM_SNAPSHOT_ARTIFACT_WRITE",
            SnapshotError::Scheduler { .. } => "ZM_SNAPSHOT_SCHEDULER",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SnapshotError::Dataset(e) => e.kind(),
            SnapshotError::ArtifactRead { .. } | SnapshotError::ArtifactWrite(_) => {
                ErrorKind::State
            }
            SnapshotError::Scheduler { .. } => ErrorKind::Command,
        }
    }
}
