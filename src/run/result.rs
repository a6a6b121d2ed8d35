//! Run outcomes and the final summary

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::dataset::DatasetName;
use crate::errors::ErrorKind;
use crate::observability::MetricsSnapshot;
use crate::replication::TransferRecord;

/// Where in the lifecycle a failure was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Validating,
    Snapshot,
    Reconcile,
    Replicate,
    Restore,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Validating => "validating",
            Phase::Snapshot => "snapshot",
            Phase::Reconcile => "reconcile",
            Phase::Replicate => "replicate",
            Phase::Restore => "restore",
        }
    }
}

/// One recorded, non-fatal failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub phase: Phase,
    pub kind: ErrorKind,
    pub code: &'static str,
    /// Destination address, when the failure belongs to one target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub reason: String,
}

impl Failure {
    pub fn new(phase: Phase, kind: ErrorKind, code: &'static str, reason: impl Into<String>) -> Self {
        Self {
            phase,
            kind,
            code,
            target: None,
            reason: reason.into(),
        }
    }

    pub fn at(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Everything that happened to one configured dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetOutcome {
    pub dataset: DatasetName,
    pub snapshot_taken: bool,
    pub pruned: bool,
    /// Set when the snapshot phase showed the dataset cannot be replicated
    pub replication_skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicated_snapshot: Option<String>,
    pub transfers: Vec<TransferRecord>,
    pub failures: Vec<Failure>,
}

impl DatasetOutcome {
    pub fn new(dataset: DatasetName) -> Self {
        Self {
            dataset,
            snapshot_taken: false,
            pruned: false,
            replication_skipped: false,
            replicated_snapshot: None,
            transfers: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record(&mut self, failure: Failure) {
        self.failures.push(failure);
    }
}

/// Aggregate verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    AllSucceeded,
    SomeFailed,
}

impl RunResult {
    pub fn from_outcomes(outcomes: &[DatasetOutcome], run_failures: &[Failure]) -> Self {
        if run_failures.is_empty() && outcomes.iter().all(DatasetOutcome::succeeded) {
            RunResult::AllSucceeded
        } else {
            RunResult::SomeFailed
        }
    }

    pub fn is_success(&self) -> bool {
        *self == RunResult::AllSucceeded
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunResult::AllSucceeded => "all_succeeded",
            RunResult::SomeFailed => "some_failed",
        }
    }
}

/// What `zmirror run` prints
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub result: RunResult,
    pub datasets: Vec<DatasetOutcome>,
    /// Failures not owned by any single dataset (reconciliation)
    pub run_failures: Vec<Failure>,
    pub metrics: MetricsSnapshot,
    pub previews: Vec<String>,
}

impl RunSummary {
    pub fn failed_datasets(&self) -> Vec<&DatasetName> {
        self.datasets
            .iter()
            .filter(|o| !o.succeeded())
            .map(|o| &o.dataset)
            .collect()
    }

    /// One line for the final notification
    pub fn headline(&self) -> String {
        let failed = self.failed_datasets().len();
        let mut line = match self.result {
            RunResult::AllSucceeded => {
                format!("all {} dataset(s) succeeded", self.datasets.len())
            }
            RunResult::SomeFailed => format!(
                "{} of {} dataset(s) failed",
                failed,
                self.datasets.len()
            ),
        };
        if !self.run_failures.is_empty() {
            line.push_str(&format!(", {} run-level failure(s)", self.run_failures.len()));
        }
        if self.dry_run {
            line.push_str(" (dry run)");
        }
        line
    }
}
