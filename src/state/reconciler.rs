//! Orphaned artifact cleanup
//!
//! Runs once per run, after every dataset's snapshot phase and before any
//! replication. Datasets recorded by the previous run but no longer
//! configured lose their scheduler artifact; the current set is then written
//! as the new state whether or not anything was removed. An orphan whose
//! artifact could not be removed stays recorded so the next run retries it.

use std::fs;
use std::path::PathBuf;

use crate::dataset::{DatasetName, PathCodec};
use crate::exec::CommandRunner;
use crate::observability::{log_event_with_fields, Event, RunMetrics};
use crate::snapshot::artifact_dir;

use super::atomic::{read_optional, write_atomic};
use super::errors::{StateError, StateResult};
use super::file::RunState;

/// What one reconciliation did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Orphans whose artifact was removed
    pub removed: Vec<DatasetName>,
    /// Orphans whose artifact was already gone
    pub missing: Vec<DatasetName>,
    /// Orphans whose removal failed; still recorded in the state
    pub retained: Vec<DatasetName>,
}

pub struct StateReconciler<'a> {
    pub state_file: PathBuf,
    pub config_root: PathBuf,
    pub codec: &'a PathCodec,
    pub metrics: &'a RunMetrics,
}

impl StateReconciler<'_> {
    /// Previously recorded set; empty when no state file exists yet
    pub fn load(&self) -> StateResult<RunState> {
        let path = self.state_file.display().to_string();
        let content = read_optional(&self.state_file).map_err(|source| StateError::Read {
            path: path.clone(),
            source,
        })?;
        match content {
            None => Ok(RunState::default()),
            Some(content) => {
                RunState::parse(&content).map_err(|reason| StateError::Malformed { path, reason })
            }
        }
    }

    /// Every failure is reported, after the new state has been written:
    /// an unreadable previous state, each orphan that could not be removed,
    /// and the write itself. One failure comes back as itself, several as
    /// [`StateError::Incomplete`].
    pub fn reconcile(
        &self,
        runner: &CommandRunner<'_>,
        current: &[DatasetName],
    ) -> StateResult<ReconcileReport> {
        let mut failures = Vec::new();
        let previous = match self.load() {
            Ok(previous) => previous,
            Err(e) => {
                failures.push(e);
                RunState::default()
            }
        };

        let mut report = ReconcileReport::default();
        for orphan in previous.orphans(current) {
            match self.remove_artifact(runner, &orphan) {
                Ok(true) => report.removed.push(orphan),
                Ok(false) => report.missing.push(orphan),
                Err(e) => {
                    let reason = e.to_string();
                    log_event_with_fields(
                        Event::ArtifactRemoveFailed,
                        &[("dataset", orphan.as_str()), ("reason", reason.as_str())],
                    );
                    report.retained.push(orphan);
                    failures.push(e);
                }
            }
        }

        let mut recorded = current.to_vec();
        recorded.extend(report.retained.iter().cloned());
        let rendered = RunState::new(recorded).render();
        if let Err(e) = runner.apply(&format!("write {}", self.state_file.display()), || {
            write_atomic(&self.state_file, &rendered)
        }) {
            failures.push(StateError::Write(e));
        }

        if failures.len() == 1 {
            return Err(failures.remove(0));
        }
        if !failures.is_empty() {
            return Err(StateError::Incomplete(failures));
        }

        let removed = report.removed.len().to_string();
        let missing = report.missing.len().to_string();
        log_event_with_fields(
            Event::ReconcileComplete,
            &[("removed", removed.as_str()), ("missing", missing.as_str())],
        );
        Ok(report)
    }

    /// `Ok(false)` when there was nothing to remove
    fn remove_artifact(
        &self,
        runner: &CommandRunner<'_>,
        dataset: &DatasetName,
    ) -> StateResult<bool> {
        let dir = artifact_dir(&self.config_root, self.codec, dataset);
        let dir_label = dir.display().to_string();
        let fields = [("dataset", dataset.as_str()), ("config_dir", dir_label.as_str())];

        if !dir.exists() {
            log_event_with_fields(Event::ArtifactMissing, &fields);
            return Ok(false);
        }

        runner
            .apply(&format!("remove {}", dir.display()), || fs::remove_dir_all(&dir))
            .map_err(|source| StateError::Cleanup {
                dataset: dataset.to_string(),
                source,
            })?;
        self.metrics.increment_artifacts_removed();
        log_event_with_fields(Event::ArtifactRemoved, &fields);
        Ok(true)
    }
}
