//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Per-run counters
//!
//! Observability is read-only: nothing here influences control flow, and a
//! failed log write is swallowed rather than surfaced.
//!
//! ```ignore
//! use zmirror::observability::{log_event_with_fields, Event, Logger};
//!
//! Logger::info("RUN_BEGIN", &[("datasets", "2")]);
//! log_event_with_fields(Event::PathCreated, &[("target", "vault/replication/cache_appdata")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, RunMetrics};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_of(event), event.as_str(), fields);
}

fn severity_of(event: Event) -> Severity {
    if event.is_fatal() {
        return Severity::Fatal;
    }
    match event {
        Event::TransferFailed | Event::ArtifactRemoveFailed => Severity::Error,
        Event::ArtifactMissing
        | Event::RestoreDeclined
        | Event::RestoreSkipped
        | Event::NotifyFailed => Severity::Warn,
        _ => Severity::Info,
    }
}
