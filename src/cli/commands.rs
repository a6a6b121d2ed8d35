//! CLI command implementations
//!
//! Each command loads and validates the configuration, wires the system
//! executor and the configured notification sink, and prints exactly one
//! JSON object on stdout. A run or restore that finished with failures
//! prints its summary as that object and exits non-zero.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use serde_json::json;

use crate::config::{Config, ConfigValidator, DestinationTopology, NotifyLevel, Settings};
use crate::dataset::DatasetName;
use crate::exec::{CommandRunner, Executor, SystemExecutor};
use crate::notify::{CommandNotifier, Dispatcher, LogNotifier, Notifier};
use crate::observability::{log_event_with_fields, Event};
use crate::restore::{AssumeYes, Confirmer, RestoreRequest, RestoreSource, Restorer};
use crate::run::{RunCoordinator, RunError};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response, PromptConfirmer};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let executor = SystemExecutor::new();
    let result = match cmd {
        Command::Run { config, dry_run } => run_lifecycle(&config, dry_run, &executor),
        Command::Check { config } => check(&config, &executor),
        Command::Restore {
            config,
            dataset,
            from,
            snapshot,
            target,
            yes,
            dry_run,
        } => {
            let confirmer: &dyn Confirmer = if yes { &AssumeYes } else { &PromptConfirmer };
            restore(
                &config,
                RestoreArgs {
                    dataset,
                    from,
                    snapshot,
                    target,
                    dry_run,
                },
                confirmer,
                &executor,
            )
        }
    };
    if let Err(e) = &result {
        if !e.is_reported() {
            // Best effort: the exit status still reports the failure.
            let _ = write_error(e.code_str(), e.message());
        }
    }
    result
}

/// Full lifecycle run
pub fn run_lifecycle(config_path: &Path, dry_run: bool, executor: &dyn Executor) -> CliResult<()> {
    let settings = load_settings(config_path, dry_run, executor)?;
    let notifier = notifier_for(settings.notify_command.as_deref(), executor);

    let summary = guarded(notifier.as_ref(), settings.notify, || {
        RunCoordinator::new(&settings, executor, notifier.as_ref()).run()
    })??;

    write_response(serde_json::to_value(&summary)?)?;
    if summary.result.is_success() {
        Ok(())
    } else {
        Err(CliError::run_failed(summary.headline()).reported())
    }
}

/// Validate configuration and probe the remote destination. Touches no
/// dataset.
pub fn check(config_path: &Path, executor: &dyn Executor) -> CliResult<()> {
    let settings = load_settings(config_path, false, executor)?;
    let notifier = notifier_for(settings.notify_command.as_deref(), executor);

    let runner = CommandRunner::new(executor, settings.dry_run);
    if let Err(e) = ConfigValidator::verify_remote(&settings, &runner) {
        Dispatcher::new(notifier.as_ref(), settings.notify)
            .alert("zmirror: remote destination unusable", &e.to_string());
        return Err(e.into());
    }

    write_response(json!({
        "datasets": settings.datasets,
        "topology": settings.topology.as_str(),
        "mirror_mode": settings.mirror_mode.as_str(),
        "replication": settings.replication,
        "dry_run": settings.dry_run,
        "remote": settings.remote.as_ref().map(|endpoint| endpoint.to_string()),
    }))
}

/// Restore arguments after clap parsing
#[derive(Debug, Clone)]
pub struct RestoreArgs {
    pub dataset: String,
    pub from: Option<String>,
    pub snapshot: Option<String>,
    pub target: Option<String>,
    pub dry_run: bool,
}

/// Restore a dataset tree from its replica
pub fn restore(
    config_path: &Path,
    args: RestoreArgs,
    confirmer: &dyn Confirmer,
    executor: &dyn Executor,
) -> CliResult<()> {
    let settings = load_settings(config_path, args.dry_run, executor)?;
    let request = restore_request(&settings, args)?;
    let notifier = notifier_for(settings.notify_command.as_deref(), executor);

    let summary = guarded(notifier.as_ref(), settings.notify, || {
        Restorer::new(&settings, executor, notifier.as_ref(), confirmer).restore(&request)
    })??;

    write_response(serde_json::to_value(&summary)?)?;
    if summary.result.is_success() {
        Ok(())
    } else {
        Err(CliError::restore_failed(format!(
            "restore of {} finished with failures",
            request.dataset
        ))
        .reported())
    }
}

fn restore_request(settings: &Settings, args: RestoreArgs) -> CliResult<RestoreRequest> {
    let dataset = DatasetName::parse(&args.dataset)
        .map_err(|e| CliError::invalid_argument(e.to_string()))?;
    let target = args
        .target
        .as_deref()
        .map(DatasetName::parse)
        .transpose()
        .map_err(|e| CliError::invalid_argument(e.to_string()))?;
    let source = match args.from.as_deref() {
        Some(from) => RestoreSource::parse(from).ok_or_else(|| {
            CliError::invalid_argument(format!("'{}' is not one of: local, remote", from))
        })?,
        None if settings.topology == DestinationTopology::Remote => RestoreSource::Remote,
        None => RestoreSource::Local,
    };
    Ok(RestoreRequest {
        dataset,
        source,
        snapshot: args.snapshot,
        target,
    })
}

/// Load, apply the CLI dry-run override, validate.
///
/// A rejected configuration is notified once through whatever sink the raw
/// file names, since no typed settings exist yet.
fn load_settings(config_path: &Path, dry_run: bool, executor: &dyn Executor) -> CliResult<Settings> {
    let mut config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            let reason = e.to_string();
            log_event_with_fields(
                Event::ConfigRejected,
                &[("code", e.code()), ("reason", reason.as_str())],
            );
            Dispatcher::new(&LogNotifier, NotifyLevel::All)
                .alert("zmirror: configuration rejected", &reason);
            return Err(RunError::from(e).into());
        }
    };
    if dry_run {
        config.dry_run = "yes".to_string();
    }

    RunCoordinator::validate(&config).map_err(|e| {
        let notifier = notifier_for(config.notify_command.as_deref(), executor);
        let level = NotifyLevel::parse(&config.notify).unwrap_or(NotifyLevel::All);
        Dispatcher::new(notifier.as_ref(), level).alert("zmirror: configuration rejected", &e.to_string());
        CliError::from(e)
    })
}

/// The external notification command when one is configured, the
/// structured log otherwise
fn notifier_for<'a>(command: Option<&str>, executor: &'a dyn Executor) -> Box<dyn Notifier + 'a> {
    match command.map(str::trim).filter(|c| !c.is_empty()) {
        Some(program) => Box::new(CommandNotifier::new(program, executor)),
        None => Box::new(LogNotifier),
    }
}

/// Run `work`, turning a panic into one `UnexpectedTermination` report.
fn guarded<T, F>(notifier: &dyn Notifier, level: NotifyLevel, work: F) -> CliResult<T>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(work)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        log_event_with_fields(Event::UnexpectedTermination, &[("reason", message.as_str())]);
        Dispatcher::new(notifier, level).alert("zmirror: unexpected termination", &message);
        CliError::from(RunError::Unexpected { message })
    })
}

/// Human-readable panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
