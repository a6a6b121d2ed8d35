//! Snapshot transfer
//!
//! Two primitives, both routed through the runner:
//!
//! - `mirror`: the transfer tool replicates a dataset tree into a target,
//!   with flags derived from the mirror mode.
//! - `stream`: one selected snapshot is sent and received into a dataset,
//!   overwriting it. The executor owns the pipe between the two ends.

use serde::Serialize;

use crate::config::MirrorMode;
use crate::dataset::{DatasetName, SnapshotRecord, SnapshotSelector, Zfs};
use crate::exec::{CommandRunner, CommandSpec, ExecResult, Pipeline};
use crate::observability::{log_event_with_fields, Event, RunMetrics};
use crate::remote::{Location, SshTransport};

use super::destination::DestinationTarget;
use super::ensure::PathEnsurer;
use super::errors::{ReplicationError, ReplicationResult};

/// Always passed: include descendants, never create a sync-only snapshot.
pub const BASE_FLAGS: [&str; 2] = ["-r", "--no-sync-snap"];

/// Passed only in strict mirror mode.
pub const STRICT_FLAGS: [&str; 2] = ["--delete-target-snapshots", "--force-delete"];

/// Transfer tool flags for `mode`
pub fn mirror_flags(mode: MirrorMode) -> Vec<&'static str> {
    let mut flags = BASE_FLAGS.to_vec();
    if mode == MirrorMode::StrictMirror {
        flags.extend(STRICT_FLAGS);
    }
    flags
}

/// Builds transfer tool invocations.
#[derive(Debug, Clone)]
pub struct TransferTool {
    program: String,
    transport: SshTransport,
}

impl TransferTool {
    pub fn new(program: impl Into<String>, transport: SshTransport) -> Self {
        Self {
            program: program.into(),
            transport,
        }
    }

    pub fn mirror_command(
        &self,
        source: &DatasetName,
        target: &DestinationTarget,
        mode: MirrorMode,
    ) -> CommandSpec {
        let mut command = CommandSpec::new(self.program.clone()).args(mirror_flags(mode));
        if target.location.is_remote() {
            let options = self.transport.options();
            for option in options.iter().filter(|o| o.as_str() != "-o") {
                command = command.arg(format!("--sshoption={}", option));
            }
        }
        command.arg(source.as_str()).arg(target.address())
    }
}

/// Result of one target's transfer attempt
#[derive(Debug)]
pub struct TargetOutcome {
    pub target: DestinationTarget,
    pub result: ReplicationResult<()>,
}

/// Summary of a successful transfer, for the run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub target: DestinationTarget,
    pub snapshot: String,
}

pub struct ReplicationExecutor<'a> {
    zfs: &'a Zfs,
    tool: &'a TransferTool,
    ensurer: PathEnsurer<'a>,
    metrics: &'a RunMetrics,
}

impl<'a> ReplicationExecutor<'a> {
    pub fn new(zfs: &'a Zfs, tool: &'a TransferTool, metrics: &'a RunMetrics) -> Self {
        Self {
            zfs,
            tool,
            ensurer: PathEnsurer::new(zfs, metrics),
            metrics,
        }
    }

    /// Replicate `source` to every target.
    ///
    /// The newest source snapshot is resolved once up front; without one
    /// nothing is attempted. Each target is then ensured and transferred
    /// independently, in order, and gets its own outcome.
    pub fn replicate(
        &self,
        runner: &CommandRunner<'_>,
        source: &DatasetName,
        targets: &[DestinationTarget],
        mode: MirrorMode,
    ) -> ReplicationResult<(SnapshotRecord, Vec<TargetOutcome>)> {
        let latest = SnapshotSelector::new(self.zfs).latest(runner, &Location::Local, source)?;

        let outcomes = targets
            .iter()
            .map(|target| TargetOutcome {
                target: target.clone(),
                result: self.replicate_one(runner, source, &latest, target, mode),
            })
            .collect();
        Ok((latest, outcomes))
    }

    fn replicate_one(
        &self,
        runner: &CommandRunner<'_>,
        source: &DatasetName,
        latest: &SnapshotRecord,
        target: &DestinationTarget,
        mode: MirrorMode,
    ) -> ReplicationResult<()> {
        let address = target.address();
        let snapshot = latest.full_name();
        let result = self
            .ensurer
            .ensure(runner, target)
            .and_then(|_| self.mirror(runner, source, target, mode));

        match &result {
            Ok(()) => {
                self.metrics.increment_transfers_completed();
                log_event_with_fields(
                    Event::TransferComplete,
                    &[("snapshot", snapshot.as_str()), ("target", address.as_str())],
                );
            }
            Err(e) => {
                self.metrics.increment_transfers_failed();
                let reason = e.to_string();
                log_event_with_fields(
                    Event::TransferFailed,
                    &[("reason", reason.as_str()), ("target", address.as_str())],
                );
            }
        }
        result
    }

    /// Run the transfer tool for one target.
    pub fn mirror(
        &self,
        runner: &CommandRunner<'_>,
        source: &DatasetName,
        target: &DestinationTarget,
        mode: MirrorMode,
    ) -> ReplicationResult<()> {
        runner
            .run(&self.tool.mirror_command(source, target, mode))
            .map(|_| ())
            .map_err(|source| ReplicationError::Transfer {
                target: target.address(),
                source,
            })
    }

    /// `zfs send <snapshot>` at `from`, piped into `zfs receive -F <into>`
    /// locally.
    pub fn stream_pipeline(&self, snapshot: &SnapshotRecord, from: &Location, into: &DatasetName) -> Pipeline {
        let sender = self.zfs.command(from, ["send".to_string(), snapshot.full_name()]);
        let receiver = self
            .zfs
            .command(&Location::Local, ["receive", "-F", into.as_str()]);
        Pipeline::new(sender, receiver)
    }

    /// Overwrite `into` with the contents of `snapshot`.
    pub fn stream(
        &self,
        runner: &CommandRunner<'_>,
        snapshot: &SnapshotRecord,
        from: &Location,
        into: &DatasetName,
    ) -> ExecResult<()> {
        runner
            .run_pipeline(&self.stream_pipeline(snapshot, from, into))
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::exec::{CommandOutput, ScriptedExecutor};
    use crate::remote::RemoteEndpoint;

    const SNAPSHOTS: &str = "cache/appdata@autosnap_2024-01-01_00:00:01_daily\n\
cache/appdata@autosnap_2024-01-02_00:00:01_daily\n";

    fn name(s: &str) -> DatasetName {
        DatasetName::parse(s).unwrap()
    }

    fn local_target() -> DestinationTarget {
        DestinationTarget {
            location: Location::Local,
            base: name("backup/replication"),
            dataset: name("backup/replication/cache_appdata"),
        }
    }

    fn remote_target() -> DestinationTarget {
        DestinationTarget {
            location: Location::Remote(RemoteEndpoint::new("root", "10.0.0.5")),
            base: name("vault/replication"),
            dataset: name("vault/replication/cache_appdata"),
        }
    }

    fn tool() -> TransferTool {
        TransferTool::new("syncoid", SshTransport::default())
    }

    #[test]
    fn test_strict_always_deletes_basic_never() {
        for target in [local_target(), remote_target()] {
            let strict = tool().mirror_command(&name("cache/appdata"), &target, MirrorMode::StrictMirror);
            let basic = tool().mirror_command(&name("cache/appdata"), &target, MirrorMode::Basic);

            for flag in STRICT_FLAGS {
                assert!(strict.argv().iter().any(|a| a == flag));
                assert!(!basic.argv().iter().any(|a| a == flag));
            }
            for flag in BASE_FLAGS {
                assert!(strict.argv().iter().any(|a| a == flag));
                assert!(basic.argv().iter().any(|a| a == flag));
            }
        }
    }

    #[test]
    fn test_mirror_command_rendering() {
        assert_eq!(
            tool()
                .mirror_command(&name("cache/appdata"), &local_target(), MirrorMode::Basic)
                .to_string(),
            "syncoid -r --no-sync-snap cache/appdata backup/replication/cache_appdata"
        );
        assert_eq!(
            tool()
                .mirror_command(&name("cache/appdata"), &remote_target(), MirrorMode::StrictMirror)
                .to_string(),
            "syncoid -r --no-sync-snap --delete-target-snapshots --force-delete \
             --sshoption=BatchMode=yes --sshoption=ConnectTimeout=5 \
             cache/appdata root@10.0.0.5:vault/replication/cache_appdata"
        );
    }

    #[test]
    fn test_no_snapshot_attempts_nothing() {
        let exec = ScriptedExecutor::new();
        let runner = CommandRunner::new(&exec, false);
        let zfs = Zfs::new("zfs", SshTransport::default());
        let tool = tool();
        let metrics = RunMetrics::new();

        let err = ReplicationExecutor::new(&zfs, &tool, &metrics)
            .replicate(&runner, &name("cache/appdata"), &[remote_target()], MirrorMode::StrictMirror)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoSnapshot);
        assert_eq!(exec.count("syncoid"), 0);
        assert_eq!(exec.count("create"), 0);
    }

    #[test]
    fn test_failed_target_does_not_block_next() {
        let exec = ScriptedExecutor::new();
        exec.respond("-t snapshot", CommandOutput::success(SNAPSHOTS));
        exec.respond(
            "syncoid -r --no-sync-snap --delete-target-snapshots --force-delete cache/appdata backup",
            CommandOutput::failure(2, "CRITICAL ERROR: target exists"),
        );
        let runner = CommandRunner::new(&exec, false);
        let zfs = Zfs::new("zfs", SshTransport::default());
        let tool = tool();
        let metrics = RunMetrics::new();

        let (latest, outcomes) = ReplicationExecutor::new(&zfs, &tool, &metrics)
            .replicate(
                &runner,
                &name("cache/appdata"),
                &[local_target(), remote_target()],
                MirrorMode::StrictMirror,
            )
            .unwrap();

        assert_eq!(latest.name, "autosnap_2024-01-02_00:00:01_daily");
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].result.as_ref().unwrap_err().kind(), ErrorKind::Transfer);
        assert!(outcomes[1].result.is_ok());
        assert_eq!(exec.count("syncoid"), 2);

        let metrics = metrics.snapshot();
        assert_eq!(metrics.transfers_failed, 1);
        assert_eq!(metrics.transfers_completed, 1);
    }

    #[test]
    fn test_dry_run_transfers_are_previewed() {
        let exec = ScriptedExecutor::new();
        exec.respond("-t snapshot", CommandOutput::success(SNAPSHOTS));
        let zfs = Zfs::new("zfs", SshTransport::default());
        let tool = tool();
        let metrics = RunMetrics::new();

        let dry = CommandRunner::new(&exec, true);
        ReplicationExecutor::new(&zfs, &tool, &metrics)
            .replicate(&dry, &name("cache/appdata"), &[local_target()], MirrorMode::Basic)
            .unwrap();
        assert_eq!(exec.count("syncoid"), 0);

        let real = CommandRunner::new(&exec, false);
        ReplicationExecutor::new(&zfs, &tool, &metrics)
            .replicate(&real, &name("cache/appdata"), &[local_target()], MirrorMode::Basic)
            .unwrap();
        let executed = exec.executed();
        let real_transfer = executed.iter().find(|c| c.starts_with("syncoid")).unwrap();
        assert!(dry.previews().contains(real_transfer));
    }

    #[test]
    fn test_stream_pipeline_from_remote() {
        let zfs = Zfs::new("zfs", SshTransport::default());
        let tool = tool();
        let metrics = RunMetrics::new();
        let snapshot = SnapshotRecord {
            dataset: name("vault/replication/cache_appdata"),
            name: "autosnap_2024-01-02_00:00:01_daily".to_string(),
            order: 1,
        };

        let pipe = ReplicationExecutor::new(&zfs, &tool, &metrics).stream_pipeline(
            &snapshot,
            &Location::Remote(RemoteEndpoint::new("root", "10.0.0.5")),
            &name("cache/appdata"),
        );

        assert_eq!(
            pipe.to_string(),
            "ssh -o BatchMode=yes -o ConnectTimeout=5 root@10.0.0.5 \
             'zfs send vault/replication/cache_appdata@autosnap_2024-01-02_00:00:01_daily' \
             | zfs receive -F cache/appdata"
        );
    }
}
