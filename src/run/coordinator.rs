//! Run lifecycle
//!
//! ```text
//! Validating -> PerDatasetSnapshot* -> Reconciling -> PerDatasetReplicate* -> Summarizing
//! ```
//!
//! Only `Validating` can abort a run. A failure inside either per-dataset
//! loop is recorded against that dataset and the loop moves on; once
//! validation has passed, a summary is always produced.

use chrono::Utc;
use uuid::Uuid;

use crate::config::{Config, ConfigValidator, Settings};
use crate::errors::ErrorKind;
use crate::exec::{CommandRunner, Executor};
use crate::notify::{Dispatcher, Notifier};
use crate::observability::{log_event_with_fields, Event, ObservationScope, RunMetrics};
use crate::replication::{DestinationResolver, ReplicationExecutor, TransferRecord, TransferTool};
use crate::snapshot::{Scheduler, SnapshotPhase};
use crate::state::StateReconciler;

use super::context::DatasetContext;
use super::errors::RunError;
use super::result::{DatasetOutcome, Failure, Phase, RunResult, RunSummary};

/// Drives one complete run over the configured datasets.
pub struct RunCoordinator<'a> {
    settings: &'a Settings,
    executor: &'a dyn Executor,
    notifier: &'a dyn Notifier,
}

impl<'a> RunCoordinator<'a> {
    pub fn new(settings: &'a Settings, executor: &'a dyn Executor, notifier: &'a dyn Notifier) -> Self {
        Self {
            settings,
            executor,
            notifier,
        }
    }

    /// First half of `Validating`: raw configuration to typed settings.
    pub fn validate(config: &Config) -> Result<Settings, RunError> {
        match ConfigValidator::validate(config) {
            Ok(settings) => {
                let count = settings.datasets.len().to_string();
                log_event_with_fields(
                    Event::ConfigValidated,
                    &[
                        ("datasets", count.as_str()),
                        ("topology", settings.topology.as_str()),
                    ],
                );
                Ok(settings)
            }
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(
                    Event::ConfigRejected,
                    &[("code", e.code()), ("reason", reason.as_str())],
                );
                Err(e.into())
            }
        }
    }

    pub fn run(&self) -> Result<RunSummary, RunError> {
        let settings = self.settings;
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let runner = CommandRunner::new(self.executor, settings.dry_run);
        let dispatcher = Dispatcher::new(self.notifier, settings.notify);
        let metrics = RunMetrics::new();

        let run_label = run_id.to_string();
        let count = settings.datasets.len().to_string();
        let dry_run = settings.dry_run.to_string();
        log_event_with_fields(
            Event::RunBegin,
            &[
                ("datasets", count.as_str()),
                ("dry_run", dry_run.as_str()),
                ("run_id", run_label.as_str()),
                ("topology", settings.topology.as_str()),
            ],
        );

        // Second half of Validating: the remote side must be usable before
        // any dataset is touched.
        if let Err(e) = ConfigValidator::verify_remote(settings, &runner) {
            dispatcher.alert("zmirror: remote destination unusable", &e.to_string());
            return Err(e.into());
        }

        let zfs = settings.zfs();
        let contexts = DatasetContext::sequence(run_id, &settings.datasets);

        let scheduler = Scheduler::new(settings.programs.sanoid.clone());
        let snapshot_phase = SnapshotPhase {
            zfs: &zfs,
            scheduler: &scheduler,
            codec: &settings.codec,
            config_root: settings.config_root.clone(),
            retention: settings.retention,
            auto_snapshot: settings.auto_snapshot,
            autoprune: settings.autoprune,
            metrics: &metrics,
        };
        let mut outcomes: Vec<DatasetOutcome> = contexts
            .iter()
            .map(|ctx| self.snapshot_dataset(ctx, &runner, &snapshot_phase, &dispatcher))
            .collect();

        let mut run_failures = Vec::new();
        let reconciler = StateReconciler {
            state_file: settings.state_file.clone(),
            config_root: settings.config_root.clone(),
            codec: &settings.codec,
            metrics: &metrics,
        };
        if let Err(e) = reconciler.reconcile(&runner, &settings.datasets) {
            for e in e.into_failures() {
                let failure = Failure::new(Phase::Reconcile, e.kind(), e.code(), e.to_string());
                dispatcher.alert("zmirror: state reconciliation failed", &failure.reason);
                run_failures.push(failure);
            }
        }

        if settings.replication {
            let tool = TransferTool::new(settings.programs.syncoid.clone(), settings.transport());
            let replicator = ReplicationExecutor::new(&zfs, &tool, &metrics);
            let resolver = DestinationResolver::new(
                settings.topology,
                &settings.bases,
                settings.remote.as_ref(),
                &settings.codec,
            );
            for (ctx, outcome) in contexts.iter().zip(outcomes.iter_mut()) {
                self.replicate_dataset(ctx, &runner, &resolver, &replicator, &dispatcher, outcome);
            }
        }

        for outcome in &outcomes {
            metrics.increment_datasets_processed();
            if !outcome.succeeded() {
                metrics.increment_datasets_failed();
            }
        }
        let result = RunResult::from_outcomes(&outcomes, &run_failures);
        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            dry_run: settings.dry_run,
            result,
            datasets: outcomes,
            run_failures,
            metrics: metrics.snapshot(),
            previews: runner.previews(),
        };

        let headline = summary.headline();
        log_event_with_fields(
            Event::RunSummary,
            &[
                ("result", result.as_str()),
                ("run_id", run_label.as_str()),
                ("summary", headline.as_str()),
            ],
        );
        match result {
            RunResult::AllSucceeded => dispatcher.info("zmirror: run succeeded", &headline),
            RunResult::SomeFailed => dispatcher.alert("zmirror: run finished with failures", &headline),
        }
        Ok(summary)
    }

    fn snapshot_dataset(
        &self,
        ctx: &DatasetContext<'_>,
        runner: &CommandRunner<'_>,
        phase: &SnapshotPhase<'_>,
        dispatcher: &Dispatcher<'_>,
    ) -> DatasetOutcome {
        let mut outcome = DatasetOutcome::new(ctx.dataset.clone());
        let progress = ctx.progress();
        let scope = ObservationScope::with_fields(
            "SNAPSHOT_PHASE",
            &[("dataset", ctx.dataset.as_str()), ("progress", progress.as_str())],
        );

        match phase.run(runner, ctx.dataset) {
            Ok(report) => {
                outcome.snapshot_taken = report.taken;
                outcome.pruned = report.pruned;
                scope.complete();
            }
            Err(e) => {
                let failure = Failure::new(Phase::Snapshot, e.kind(), e.code(), e.to_string());
                scope.fail(&failure.reason);
                // Nothing to replicate from a dataset that is missing or empty.
                outcome.replication_skipped =
                    matches!(e.kind(), ErrorKind::DatasetNotFound | ErrorKind::EmptyDataset);
                report_failure(dispatcher, ctx, &mut outcome, failure);
            }
        }
        outcome
    }

    fn replicate_dataset(
        &self,
        ctx: &DatasetContext<'_>,
        runner: &CommandRunner<'_>,
        resolver: &DestinationResolver<'_>,
        replicator: &ReplicationExecutor<'_>,
        dispatcher: &Dispatcher<'_>,
        outcome: &mut DatasetOutcome,
    ) {
        if outcome.replication_skipped {
            log_event_with_fields(Event::ReplicationSkipped, &[("dataset", ctx.dataset.as_str())]);
            return;
        }
        let progress = ctx.progress();
        let scope = ObservationScope::with_fields(
            "REPLICATION",
            &[("dataset", ctx.dataset.as_str()), ("progress", progress.as_str())],
        );

        let replicated = resolver.resolve(ctx.dataset).and_then(|targets| {
            replicator.replicate(runner, ctx.dataset, &targets, self.settings.mirror_mode)
        });
        let (latest, target_outcomes) = match replicated {
            Ok(replicated) => replicated,
            Err(e) => {
                let failure = Failure::new(Phase::Replicate, e.kind(), e.code(), e.to_string());
                scope.fail(&failure.reason);
                report_failure(dispatcher, ctx, outcome, failure);
                return;
            }
        };

        let snapshot = latest.full_name();
        let attempted = target_outcomes.len();
        let mut failed = 0;
        for target_outcome in target_outcomes {
            match target_outcome.result {
                Ok(()) => outcome.transfers.push(TransferRecord {
                    target: target_outcome.target,
                    snapshot: snapshot.clone(),
                }),
                Err(e) => {
                    failed += 1;
                    let failure = Failure::new(Phase::Replicate, e.kind(), e.code(), e.to_string())
                        .at(target_outcome.target.address());
                    report_failure(dispatcher, ctx, outcome, failure);
                }
            }
        }
        outcome.replicated_snapshot = Some(snapshot.clone());

        if failed == 0 {
            scope.complete_with_fields(&[("snapshot", snapshot.as_str())]);
        } else {
            scope.fail(&format!("{} of {} target(s) failed", failed, attempted));
        }
    }
}

/// Record a failure against its dataset and notify once.
fn report_failure(
    dispatcher: &Dispatcher<'_>,
    ctx: &DatasetContext<'_>,
    outcome: &mut DatasetOutcome,
    failure: Failure,
) {
    let subject = format!("zmirror: {} failed for {}", failure.phase.as_str(), ctx.dataset);
    let message = match &failure.target {
        Some(target) => format!("{} ({})", failure.reason, target),
        None => failure.reason.clone(),
    };
    dispatcher.alert(&subject, &message);
    outcome.record(failure);
}
