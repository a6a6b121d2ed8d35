//! Restore Flow Tests
//!
//! A replica is streamed back into place dataset by dataset. An existing
//! destination is only overwritten after confirmation.

use std::fs;

use serde_json::json;
use tempfile::TempDir;
use zmirror::cli::{self, CliErrorCode, RestoreArgs};
use zmirror::config::{Config, ConfigValidator, Settings};
use zmirror::dataset::DatasetName;
use zmirror::errors::ErrorKind;
use zmirror::exec::{CommandOutput, ScriptedExecutor};
use zmirror::notify::{MemoryNotifier, NotificationSeverity};
use zmirror::restore::{
    AssumeYes, NodeStatus, RestoreRequest, RestoreSource, Restorer, ScriptedConfirmer,
};
use zmirror::run::RunResult;

const MISSING: &str = "dataset does not exist";

fn config() -> serde_json::Value {
    json!({
        "datasets": ["cache/appdata"],
        "replication": "yes",
        "destination": "local",
        "local_base": "backup/replication",
    })
}

fn settings() -> Settings {
    let config = Config::from_json(&config().to_string()).expect("config parses");
    ConfigValidator::validate(&config).expect("config validates")
}

fn request() -> RestoreRequest {
    RestoreRequest {
        dataset: DatasetName::parse("cache/appdata").unwrap(),
        source: RestoreSource::Local,
        snapshot: None,
        target: None,
    }
}

fn replica(exec: &ScriptedExecutor) {
    exec.respond(
        "-t snapshot",
        CommandOutput::success("backup/replication/cache_appdata@autosnap_2024-03-02_00:00:01_daily\n"),
    );
}

#[test]
fn test_declined_overwrite_is_a_failure_without_transfer() {
    let settings = settings();
    let exec = ScriptedExecutor::new();
    replica(&exec);
    let notifier = MemoryNotifier::new();
    let confirmer = ScriptedConfirmer::new([false]);

    let summary = Restorer::new(&settings, &exec, &notifier, &confirmer)
        .restore(&request())
        .unwrap();

    assert_eq!(summary.result, RunResult::SomeFailed);
    assert_eq!(summary.datasets.len(), 1);
    let node = &summary.datasets[0];
    assert_eq!(node.status, NodeStatus::Failed);
    assert_eq!(node.failure.as_ref().unwrap().kind, ErrorKind::Declined);
    assert_eq!(exec.count("zfs send"), 0);
    assert_eq!(exec.count("zfs receive"), 0);

    let asked = confirmer.asked();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].contains("cache/appdata already exists"));

    // The failure itself, then the summary
    assert_eq!(notifier.with_severity(NotificationSeverity::Alert).len(), 2);
}

#[test]
fn test_confirmed_overwrite_streams_latest() {
    let settings = settings();
    let exec = ScriptedExecutor::new();
    replica(&exec);
    let notifier = MemoryNotifier::new();

    let summary = Restorer::new(&settings, &exec, &notifier, &AssumeYes)
        .restore(&request())
        .unwrap();

    assert!(summary.result.is_success());
    assert_eq!(summary.backup, "backup/replication/cache_appdata");
    assert_eq!(
        summary.datasets[0].snapshot.as_deref(),
        Some("backup/replication/cache_appdata@autosnap_2024-03-02_00:00:01_daily")
    );
    assert_eq!(
        exec.count(
            "zfs send backup/replication/cache_appdata@autosnap_2024-03-02_00:00:01_daily \
             | zfs receive -F cache/appdata"
        ),
        1
    );
    assert_eq!(notifier.with_severity(NotificationSeverity::Normal).len(), 1);
}

#[test]
fn test_unknown_snapshot_fails_node() {
    let settings = settings();
    let exec = ScriptedExecutor::new();
    replica(&exec);
    exec.respond("list -H -o name cache/appdata", CommandOutput::failure(1, MISSING));
    let notifier = MemoryNotifier::new();
    let mut request = request();
    request.snapshot = Some("autosnap_1999-01-01_00:00:01_daily".to_string());

    let summary = Restorer::new(&settings, &exec, &notifier, &AssumeYes)
        .restore(&request)
        .unwrap();

    assert_eq!(summary.result, RunResult::SomeFailed);
    let failure = summary.datasets[0].failure.as_ref().unwrap();
    assert_eq!(failure.code, "ZM_DATASET_SNAPSHOT_NOT_FOUND");
    assert_eq!(exec.count("zfs receive"), 0);
}

#[test]
fn test_remote_side_unconfigured() {
    let settings = settings();
    let exec = ScriptedExecutor::new();
    let notifier = MemoryNotifier::new();
    let mut request = request();
    request.source = RestoreSource::Remote;

    let err = Restorer::new(&settings, &exec, &notifier, &AssumeYes)
        .restore(&request)
        .unwrap_err();

    assert_eq!(err.code(), "ZM_RESTORE_UNCONFIGURED");
    assert!(exec.executed().is_empty());
    assert_eq!(notifier.len(), 1);
}

#[test]
fn test_cli_restore_reports_declined_as_failure() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("zmirror.json");
    fs::write(&config_path, config().to_string()).unwrap();
    let exec = ScriptedExecutor::new();
    replica(&exec);
    let confirmer = ScriptedConfirmer::new([false]);

    let err = cli::restore(
        &config_path,
        RestoreArgs {
            dataset: "cache/appdata".to_string(),
            from: None,
            snapshot: None,
            target: None,
            dry_run: false,
        },
        &confirmer,
        &exec,
    )
    .unwrap_err();

    assert_eq!(err.code(), &CliErrorCode::RestoreFailed);
    assert!(err.is_reported());
    assert_eq!(exec.count("zfs receive"), 0);
}
