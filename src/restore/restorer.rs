//! Backup to dataset restore
//!
//! ```text
//! VerifyBackupExists -> SelectSnapshot -> CheckDestinationConflict -> Transfer -> (next child)
//! ```
//!
//! The backup root and every descendant are restored one by one, root
//! first, each from its own snapshot. A declined overwrite stops that
//! dataset and everything below it; siblings continue.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Settings;
use crate::dataset::{DatasetError, DatasetName, DatasetTraverser, SnapshotRecord, SnapshotSelector, Zfs};
use crate::errors::ErrorKind;
use crate::exec::{CommandRunner, Executor};
use crate::notify::{Dispatcher, Notifier};
use crate::observability::{log_event_with_fields, Event, RunMetrics};
use crate::remote::{ConnectivityChecker, Location};
use crate::replication::{DestinationResolver, ReplicationExecutor, TransferTool};
use crate::run::{Failure, Phase, RunResult};

use super::confirm::Confirmer;
use super::errors::{RestoreError, RestoreResult};

/// Which configured backup side to restore from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreSource {
    Local,
    Remote,
}

impl RestoreSource {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "local" => Some(RestoreSource::Local),
            "remote" => Some(RestoreSource::Remote),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreSource::Local => "local",
            RestoreSource::Remote => "remote",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestoreRequest {
    /// Dataset whose backup is restored
    pub dataset: DatasetName,
    pub source: RestoreSource,
    /// Snapshot name to restore every dataset of the tree from; newest when unset
    pub snapshot: Option<String>,
    /// Restore somewhere other than `dataset`
    pub target: Option<DatasetName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Restored,
    Failed,
    /// Below a dataset whose overwrite was declined
    Skipped,
}

/// One dataset of the backup tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoredNode {
    pub backup: DatasetName,
    pub target: DatasetName,
    pub status: NodeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

/// What `zmirror restore` prints
#[derive(Debug, Clone, Serialize)]
pub struct RestoreSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub source: RestoreSource,
    /// Backup root, addressed like a replication target
    pub backup: String,
    pub result: RunResult,
    pub datasets: Vec<RestoredNode>,
    pub previews: Vec<String>,
}

pub struct Restorer<'a> {
    settings: &'a Settings,
    executor: &'a dyn Executor,
    notifier: &'a dyn Notifier,
    confirmer: &'a dyn Confirmer,
}

impl<'a> Restorer<'a> {
    pub fn new(
        settings: &'a Settings,
        executor: &'a dyn Executor,
        notifier: &'a dyn Notifier,
        confirmer: &'a dyn Confirmer,
    ) -> Self {
        Self {
            settings,
            executor,
            notifier,
            confirmer,
        }
    }

    /// Restore the backup tree of `request.dataset`.
    ///
    /// `Err` only when nothing could be attempted: the backup side is not
    /// configured or unusable, or the backup root does not exist.
    pub fn restore(&self, request: &RestoreRequest) -> RestoreResult<RestoreSummary> {
        let started_at = Utc::now();
        let runner = CommandRunner::new(self.executor, self.settings.dry_run);
        let dispatcher = Dispatcher::new(self.notifier, self.settings.notify);

        let result = self.restore_tree(&runner, &dispatcher, request, started_at);
        if let Err(e) = &result {
            let subject = format!("zmirror: restore of {} failed", request.dataset);
            dispatcher.alert(&subject, &e.to_string());
        }
        result
    }

    fn restore_tree(
        &self,
        runner: &CommandRunner<'_>,
        dispatcher: &Dispatcher<'_>,
        request: &RestoreRequest,
        started_at: DateTime<Utc>,
    ) -> RestoreResult<RestoreSummary> {
        let settings = self.settings;
        let (location, base) = self.backup_side(request.source)?;
        if let Location::Remote(endpoint) = &location {
            let transport = settings.transport();
            ConnectivityChecker::new(&transport, &settings.remote_tool).check(runner, endpoint)?;
        }

        let zfs = settings.zfs();
        let resolver = DestinationResolver::new(
            settings.topology,
            &settings.bases,
            settings.remote.as_ref(),
            &settings.codec,
        );
        let backup_root = resolver.target_name(base, &request.dataset)?;
        let backup_label = match &location {
            Location::Local => backup_root.to_string(),
            Location::Remote(endpoint) => endpoint.address(backup_root.as_str()),
        };

        // VerifyBackupExists
        if !zfs.exists(runner, &location, &backup_root)? {
            return Err(DatasetError::NotFound {
                dataset: backup_root.to_string(),
                location: location.label(),
            }
            .into());
        }

        let tool = TransferTool::new(settings.programs.syncoid.clone(), settings.transport());
        let metrics = RunMetrics::new();
        let replicator = ReplicationExecutor::new(&zfs, &tool, &metrics);
        let target_root = request.target.clone().unwrap_or_else(|| request.dataset.clone());
        // A `dataset@name` form selects by the part after '@' for every node.
        let explicit = request
            .snapshot
            .as_deref()
            .map(|s| s.rsplit_once('@').map_or(s, |(_, name)| name));

        let mut declined: Vec<DatasetName> = Vec::new();
        let mut nodes = Vec::new();
        for backup in DatasetTraverser::new(&zfs).list(runner, &location, &backup_root)? {
            let target = match backup.relative_to(&backup_root) {
                Some("") | None => target_root.clone(),
                Some(relative) => target_root.join(relative)?,
            };

            if let Some(ancestor) = declined.iter().find(|d| d.contains(&backup)) {
                log_event_with_fields(
                    Event::RestoreSkipped,
                    &[("backup", backup.as_str()), ("declined", ancestor.as_str())],
                );
                nodes.push(RestoredNode {
                    backup,
                    target,
                    status: NodeStatus::Skipped,
                    snapshot: None,
                    failure: None,
                });
                continue;
            }

            let node = match self.restore_node(runner, &zfs, &replicator, &location, &backup, &target, explicit) {
                Ok(snapshot) => RestoredNode {
                    backup,
                    target,
                    status: NodeStatus::Restored,
                    snapshot: Some(snapshot.full_name()),
                    failure: None,
                },
                Err(e) => {
                    if e.kind() == ErrorKind::Declined {
                        declined.push(backup.clone());
                    }
                    let failure = Failure::new(Phase::Restore, e.kind(), e.code(), e.to_string())
                        .at(target.to_string());
                    let subject = format!("zmirror: restore failed for {}", target);
                    dispatcher.alert(&subject, &failure.reason);
                    RestoredNode {
                        backup,
                        target,
                        status: NodeStatus::Failed,
                        snapshot: None,
                        failure: Some(failure),
                    }
                }
            };
            nodes.push(node);
        }

        let result = if nodes.iter().all(|n| n.status == NodeStatus::Restored) {
            RunResult::AllSucceeded
        } else {
            RunResult::SomeFailed
        };
        let restored = nodes
            .iter()
            .filter(|n| n.status == NodeStatus::Restored)
            .count();
        let headline = format!("{} of {} dataset(s) restored from {}", restored, nodes.len(), backup_label);
        match result {
            RunResult::AllSucceeded => dispatcher.info("zmirror: restore succeeded", &headline),
            RunResult::SomeFailed => dispatcher.alert("zmirror: restore finished with failures", &headline),
        }

        Ok(RestoreSummary {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            dry_run: settings.dry_run,
            source: request.source,
            backup: backup_label,
            result,
            datasets: nodes,
            previews: runner.previews(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn restore_node(
        &self,
        runner: &CommandRunner<'_>,
        zfs: &Zfs,
        replicator: &ReplicationExecutor<'_>,
        location: &Location,
        backup: &DatasetName,
        target: &DatasetName,
        explicit: Option<&str>,
    ) -> RestoreResult<SnapshotRecord> {
        // SelectSnapshot
        let snapshot = SnapshotSelector::new(zfs).select(runner, location, backup, explicit)?;
        let full_name = snapshot.full_name();

        // CheckDestinationConflict
        if zfs.exists(runner, &Location::Local, target)? {
            let question = format!(
                "Dataset {} already exists. Overwrite it with {}?",
                target, full_name
            );
            if !self.confirmer.confirm(&question) {
                log_event_with_fields(
                    Event::RestoreDeclined,
                    &[("snapshot", full_name.as_str()), ("target", target.as_str())],
                );
                return Err(RestoreError::Declined {
                    dataset: target.to_string(),
                });
            }
        }

        // Transfer
        replicator
            .stream(runner, &snapshot, location, target)
            .map_err(|source| RestoreError::Transfer {
                target: target.to_string(),
                source,
            })?;
        log_event_with_fields(
            Event::RestoreComplete,
            &[("snapshot", full_name.as_str()), ("target", target.as_str())],
        );
        Ok(snapshot)
    }

    fn backup_side(&self, source: RestoreSource) -> RestoreResult<(Location, &'a DatasetName)> {
        let settings = self.settings;
        match source {
            RestoreSource::Local => settings
                .bases
                .local
                .as_ref()
                .map(|base| (Location::Local, base))
                .ok_or(RestoreError::Unconfigured { side: "local" }),
            RestoreSource::Remote => match (&settings.bases.remote, &settings.remote) {
                (Some(base), Some(endpoint)) => Ok((Location::Remote(endpoint.clone()), base)),
                _ => Err(RestoreError::Unconfigured { side: "remote" }),
            },
        }
    }
}
