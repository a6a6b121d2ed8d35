//! Crate-wide error taxonomy
//!
//! Each subsystem defines its own error enum; every one of them maps into an
//! [`ErrorKind`] so the coordinator can decide between unwinding the run and
//! recording a per-dataset failure.

use std::fmt;

use serde::Serialize;

/// Classification of every failure the orchestrator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or incomplete configuration (FATAL)
    Config,
    /// Remote endpoint unreachable or remote tool missing (FATAL)
    Connectivity,
    /// Configured dataset does not exist
    DatasetNotFound,
    /// Configured dataset holds no data
    EmptyDataset,
    /// No snapshot to replicate or restore from
    NoSnapshot,
    /// Destination hierarchy could not be created
    PathCreation,
    /// Transfer tool reported failure
    Transfer,
    /// A collaborator command (scheduler, pruner, query) failed
    Command,
    /// Persisted state or per-dataset artifact could not be read or written
    State,
    /// Operator declined a destructive step
    Declined,
    /// Uncaught fault (FATAL)
    UnexpectedTermination,
}

impl ErrorKind {
    /// Returns the stable string form used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG",
            ErrorKind::Connectivity => "CONNECTIVITY",
            ErrorKind::DatasetNotFound => "DATASET_NOT_FOUND",
            ErrorKind::EmptyDataset => "EMPTY_DATASET",
            ErrorKind::NoSnapshot => "NO_SNAPSHOT",
            ErrorKind::PathCreation => "PATH_CREATION",
            ErrorKind::Transfer => "TRANSFER",
            ErrorKind::Command => "COMMAND",
            ErrorKind::State => "STATE",
            ErrorKind::Declined => "DECLINED",
            ErrorKind::UnexpectedTermination => "UNEXPECTED_TERMINATION",
        }
    }

    /// Fatal kinds unwind the whole run; the rest are recorded per dataset.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorKind::Config | ErrorKind::Connectivity | ErrorKind::UnexpectedTermination
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
