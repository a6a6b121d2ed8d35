//! Per-dataset snapshot phase
//!
//! 1. Dataset must exist (`DatasetNotFound`)
//! 2. Dataset must hold data, compared numerically (`EmptyDataset`)
//! 3. Artifact brought up to date
//! 4. Take snapshots (when auto-snapshot is on)
//! 5. Prune snapshots (when autoprune is on)

use std::path::PathBuf;

use crate::config::RetentionPolicy;
use crate::dataset::{DatasetError, DatasetName, PathCodec, Zfs};
use crate::exec::CommandRunner;
use crate::observability::{log_event_with_fields, Event, RunMetrics};
use crate::remote::Location;

use super::artifact::{artifact_dir, sync_artifact, ArtifactSpec, ArtifactStatus};
use super::errors::{SnapshotError, SnapshotResult};
use super::scheduler::Scheduler;

/// What one dataset's snapshot phase did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotReport {
    pub artifact: ArtifactStatus,
    pub taken: bool,
    pub pruned: bool,
}

pub struct SnapshotPhase<'a> {
    pub zfs: &'a Zfs,
    pub scheduler: &'a Scheduler,
    pub codec: &'a PathCodec,
    pub config_root: PathBuf,
    pub retention: RetentionPolicy,
    pub auto_snapshot: bool,
    pub autoprune: bool,
    pub metrics: &'a RunMetrics,
}

impl SnapshotPhase<'_> {
    pub fn run(
        &self,
        runner: &CommandRunner<'_>,
        dataset: &DatasetName,
    ) -> SnapshotResult<SnapshotReport> {
        let local = Location::Local;
        if !self.zfs.exists(runner, &local, dataset)? {
            return Err(DatasetError::NotFound {
                dataset: dataset.to_string(),
                location: local.label(),
            }
            .into());
        }
        if self.zfs.used_bytes(runner, &local, dataset)? == 0 {
            return Err(DatasetError::Empty {
                dataset: dataset.to_string(),
            }
            .into());
        }

        let dir = artifact_dir(&self.config_root, self.codec, dataset);
        let content = ArtifactSpec {
            dataset,
            retention: &self.retention,
            autosnap: self.auto_snapshot,
            autoprune: self.autoprune,
        }
        .render();
        let artifact = sync_artifact(runner, &dir, &content)?;
        let dir_label = dir.display().to_string();
        let fields = [("dataset", dataset.as_str()), ("config_dir", dir_label.as_str())];
        match artifact {
            ArtifactStatus::Written => {
                self.metrics.increment_artifacts_written();
                log_event_with_fields(Event::ArtifactWritten, &fields);
            }
            ArtifactStatus::Unchanged => log_event_with_fields(Event::ArtifactUnchanged, &fields),
        }

        if self.auto_snapshot {
            self.scheduler
                .take_snapshots(runner, &dir)
                .map_err(|source| SnapshotError::Scheduler {
                    step: "take",
                    source,
                })?;
            self.metrics.increment_snapshots_taken();
            log_event_with_fields(Event::SnapshotsTaken, &fields);
        }

        if self.autoprune {
            self.scheduler
                .prune_snapshots(runner, &dir)
                .map_err(|source| SnapshotError::Scheduler {
                    step: "prune",
                    source,
                })?;
            self.metrics.increment_prunes();
            log_event_with_fields(Event::SnapshotsPruned, &fields);
        }

        Ok(SnapshotReport {
            artifact,
            taken: self.auto_snapshot,
            pruned: self.autoprune,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::exec::{CommandOutput, ScriptedExecutor};
    use crate::remote::SshTransport;
    use tempfile::TempDir;

    struct Fixture {
        zfs: Zfs,
        scheduler: Scheduler,
        codec: PathCodec,
        metrics: RunMetrics,
        root: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                zfs: Zfs::new("zfs", SshTransport::default()),
                scheduler: Scheduler::new("sanoid"),
                codec: PathCodec::default(),
                metrics: RunMetrics::new(),
                root: TempDir::new().unwrap(),
            }
        }

        fn phase(&self, autoprune: bool) -> SnapshotPhase<'_> {
            SnapshotPhase {
                zfs: &self.zfs,
                scheduler: &self.scheduler,
                codec: &self.codec,
                config_root: self.root.path().to_path_buf(),
                retention: RetentionPolicy {
                    hourly: 24,
                    daily: 7,
                    weekly: 4,
                    monthly: 3,
                    yearly: 0,
                },
                auto_snapshot: true,
                autoprune,
                metrics: &self.metrics,
            }
        }
    }

    fn name(s: &str) -> DatasetName {
        DatasetName::parse(s).unwrap()
    }

    #[test]
    fn test_full_phase() {
        let fx = Fixture::new();
        let exec = ScriptedExecutor::new();
        exec.respond("get -Hp", CommandOutput::success("123456\n"));
        let runner = CommandRunner::new(&exec, false);

        let report = fx.phase(true).run(&runner, &name("cache/appdata")).unwrap();

        assert_eq!(report.artifact, ArtifactStatus::Written);
        assert!(report.taken && report.pruned);
        assert!(fx.root.path().join("cache_appdata/sanoid.conf").exists());
        assert_eq!(exec.count("--take-snapshots"), 1);
        assert_eq!(exec.count("--prune-snapshots"), 1);

        let metrics = fx.metrics.snapshot();
        assert_eq!(metrics.artifacts_written, 1);
        assert_eq!(metrics.snapshots_taken, 1);
        assert_eq!(metrics.prunes_run, 1);
    }

    #[test]
    fn test_second_run_leaves_artifact_alone() {
        let fx = Fixture::new();
        let exec = ScriptedExecutor::new();
        exec.respond("get -Hp", CommandOutput::success("1\n"));
        let runner = CommandRunner::new(&exec, false);

        fx.phase(false).run(&runner, &name("cache/appdata")).unwrap();
        let second = fx.phase(false).run(&runner, &name("cache/appdata")).unwrap();

        assert_eq!(second.artifact, ArtifactStatus::Unchanged);
        assert_eq!(exec.count("--prune-snapshots"), 0);
    }

    #[test]
    fn test_missing_dataset() {
        let fx = Fixture::new();
        let exec = ScriptedExecutor::new();
        exec.respond(
            "list -H -o name cache/gone",
            CommandOutput::failure(1, "cannot open 'cache/gone': dataset does not exist"),
        );
        let runner = CommandRunner::new(&exec, false);

        let err = fx.phase(true).run(&runner, &name("cache/gone")).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DatasetNotFound);
        assert_eq!(exec.count("sanoid"), 0);
    }

    #[test]
    fn test_empty_dataset_is_numeric_zero() {
        let fx = Fixture::new();
        let exec = ScriptedExecutor::new();
        exec.respond("get -Hp", CommandOutput::success("0\n"));
        let runner = CommandRunner::new(&exec, false);

        let err = fx.phase(true).run(&runner, &name("cache/empty")).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyDataset);
        assert!(!fx.root.path().join("cache_empty").exists());
    }

    #[test]
    fn test_scheduler_failure() {
        let fx = Fixture::new();
        let exec = ScriptedExecutor::new();
        exec.respond("get -Hp", CommandOutput::success("1\n"));
        exec.respond("--take-snapshots", CommandOutput::failure(1, "could not take"));
        let runner = CommandRunner::new(&exec, false);

        let err = fx.phase(true).run(&runner, &name("cache/appdata")).unwrap_err();

        assert!(matches!(err, SnapshotError::Scheduler { step: "take", .. }));
        assert_eq!(exec.count("--prune-snapshots"), 0);
    }

    #[test]
    fn test_dry_run_queries_but_never_mutates() {
        let fx = Fixture::new();
        let exec = ScriptedExecutor::new();
        exec.respond("get -Hp", CommandOutput::success("1\n"));
        let runner = CommandRunner::new(&exec, true);

        fx.phase(true).run(&runner, &name("cache/appdata")).unwrap();

        assert_eq!(exec.count("sanoid"), 0);
        assert_eq!(exec.count("zfs"), 2);
        assert!(!fx.root.path().join("cache_appdata").exists());
        let previews = runner.previews();
        assert_eq!(previews.len(), 3);
        assert!(previews[1].ends_with("--take-snapshots"));
    }
}
