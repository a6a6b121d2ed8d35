//! Observable lifecycle events
//!
//! Events are explicit and typed. Every line the orchestrator logs for a
//! state transition goes through one of these.

use std::fmt;

/// Observable events in a zmirror run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Run lifecycle
    /// Run started
    RunBegin,
    /// Configuration validated, typed settings ready
    ConfigValidated,
    /// Configuration rejected (FATAL)
    ConfigRejected,
    /// Remote endpoint reachable and tooling present
    RemoteVerified,
    /// Remote endpoint unusable (FATAL)
    RemoteUnusable,
    /// Run summary produced
    RunSummary,
    /// Uncaught fault (FATAL)
    UnexpectedTermination,

    // Snapshot phase
    /// Per-dataset artifact rewritten
    ArtifactWritten,
    /// Per-dataset artifact already current
    ArtifactUnchanged,
    /// Snapshots taken for a dataset
    SnapshotsTaken,
    /// Snapshots pruned for a dataset
    SnapshotsPruned,

    // Reconciliation
    /// Orphaned artifact removed
    ArtifactRemoved,
    /// Orphaned artifact was already gone
    ArtifactMissing,
    /// Orphaned artifact could not be removed; kept for the next run
    ArtifactRemoveFailed,
    /// Reconciliation finished and state written
    ReconcileComplete,

    // Replication
    /// Destination hierarchy created
    PathCreated,
    /// Destination hierarchy already present
    PathPresent,
    /// Transfer to one target succeeded
    TransferComplete,
    /// Transfer to one target failed
    TransferFailed,
    /// Dataset not replicated because its snapshot phase found nothing to send
    ReplicationSkipped,

    // Restore
    /// Restore of one dataset completed
    RestoreComplete,
    /// Operator declined overwriting an existing dataset
    RestoreDeclined,
    /// Dataset below a declined one left untouched
    RestoreSkipped,

    // Execution
    /// A mutating action was previewed instead of executed
    DryRunPreview,
    /// A notification was emitted
    Notified,
    /// The notification sink rejected a notification
    NotifyFailed,
    /// A notification delivered to the log sink
    NotificationLogged,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RunBegin => "RUN_BEGIN",
            Event::ConfigValidated => "CONFIG_VALIDATED",
            Event::ConfigRejected => "CONFIG_REJECTED",
            Event::RemoteVerified => "REMOTE_VERIFIED",
            Event::RemoteUnusable => "REMOTE_UNUSABLE",
            Event::RunSummary => "RUN_SUMMARY",
            Event::UnexpectedTermination => "UNEXPECTED_TERMINATION",

            Event::ArtifactWritten => "ARTIFACT_WRITTEN",
            Event::ArtifactUnchanged => "ARTIFACT_UNCHANGED",
            Event::SnapshotsTaken => "SNAPSHOTS_TAKEN",
            Event::SnapshotsPruned => "SNAPSHOTS_PRUNED",

            Event::ArtifactRemoved => "ARTIFACT_REMOVED",
            Event::ArtifactMissing => "ARTIFACT_MISSING",
            Event::ArtifactRemoveFailed => "ARTIFACT_REMOVE_FAILED",
            Event::ReconcileComplete => "RECONCILE_COMPLETE",

            Event::PathCreated => "PATH_CREATED",
            Event::PathPresent => "PATH_PRESENT",
            Event::TransferComplete => "TRANSFER_COMPLETE",
            Event::TransferFailed => "TRANSFER_FAILED",
            Event::ReplicationSkipped => "REPLICATION_SKIPPED",

            Event::RestoreComplete => "RESTORE_COMPLETE",
            Event::RestoreDeclined => "RESTORE_DECLINED",
            Event::RestoreSkipped => "RESTORE_SKIPPED",

            Event::DryRunPreview => "DRY_RUN_PREVIEW",
            Event::Notified => "NOTIFIED",
            Event::NotifyFailed => "NOTIFY_FAILED",
            Event::NotificationLogged => "NOTIFICATION",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Event::ConfigRejected | Event::RemoteUnusable | Event::UnexpectedTermination
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_strings_are_screaming_snake() {
        let events = [
            Event::RunBegin,
            Event::ConfigValidated,
            Event::ConfigRejected,
            Event::RemoteVerified,
            Event::RemoteUnusable,
            Event::RunSummary,
            Event::UnexpectedTermination,
            Event::ArtifactWritten,
            Event::ArtifactUnchanged,
            Event::SnapshotsTaken,
            Event::SnapshotsPruned,
            Event::ArtifactRemoved,
            Event::ArtifactMissing,
            Event::ArtifactRemoveFailed,
            Event::ReconcileComplete,
            Event::PathCreated,
            Event::PathPresent,
            Event::TransferComplete,
            Event::TransferFailed,
            Event::ReplicationSkipped,
            Event::RestoreComplete,
            Event::RestoreDeclined,
            Event::RestoreSkipped,
            Event::DryRunPreview,
            Event::Notified,
            Event::NotifyFailed,
            Event::NotificationLogged,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }

        let distinct: std::collections::HashSet<&str> = events.iter().map(|e| e.as_str()).collect();
        assert_eq!(distinct.len(), events.len());
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::ConfigRejected.is_fatal());
        assert!(Event::RemoteUnusable.is_fatal());
        assert!(Event::UnexpectedTermination.is_fatal());
        assert!(!Event::TransferFailed.is_fatal());
        assert!(!Event::RunBegin.is_fatal());
    }
}
