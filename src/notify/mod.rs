//! Operator notifications
//!
//! The orchestrator reports through a [`Notifier`] sink wrapped in a
//! [`Dispatcher`] that applies the configured verbosity. Delivery bypasses
//! the dry-run runner: a dry run still tells the operator what happened.
//! A failed delivery is logged and never changes the outcome of a run.

mod sinks;

use std::cell::RefCell;

use serde::Serialize;

use crate::config::NotifyLevel;
use crate::exec::ExecResult;
use crate::observability::{log_event_with_fields, Event};

pub use sinks::{CommandNotifier, LogNotifier, MemoryNotifier};

/// Sink-facing importance of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSeverity {
    Normal,
    Alert,
}

impl NotificationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationSeverity::Normal => "normal",
            NotificationSeverity::Alert => "alert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub subject: String,
    pub message: String,
    pub severity: NotificationSeverity,
}

/// Delivers notifications somewhere an operator will see them.
pub trait Notifier {
    fn deliver(&self, notification: &Notification) -> ExecResult<()>;
}

/// Filters by verbosity and delivers to one sink.
pub struct Dispatcher<'a> {
    sink: &'a dyn Notifier,
    level: NotifyLevel,
    delivered: RefCell<Vec<Notification>>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(sink: &'a dyn Notifier, level: NotifyLevel) -> Self {
        Self {
            sink,
            level,
            delivered: RefCell::new(Vec::new()),
        }
    }

    pub fn info(&self, subject: &str, message: &str) {
        self.send(subject, message, NotificationSeverity::Normal);
    }

    pub fn alert(&self, subject: &str, message: &str) {
        self.send(subject, message, NotificationSeverity::Alert);
    }

    pub fn send(&self, subject: &str, message: &str, severity: NotificationSeverity) {
        if !self.level.permits(severity) {
            return;
        }
        let notification = Notification {
            subject: subject.to_string(),
            message: message.to_string(),
            severity,
        };
        match self.sink.deliver(&notification) {
            Ok(()) => {
                log_event_with_fields(
                    Event::Notified,
                    &[("severity", severity.as_str()), ("subject", subject)],
                );
                self.delivered.borrow_mut().push(notification);
            }
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(
                    Event::NotifyFailed,
                    &[("subject", subject), ("reason", reason.as_str())],
                );
            }
        }
    }

    /// Notifications accepted by the sink so far
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filtering() {
        let sink = MemoryNotifier::new();

        let errors_only = Dispatcher::new(&sink, NotifyLevel::Error);
        errors_only.info("zmirror", "all good");
        errors_only.alert("zmirror", "transfer failed");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, NotificationSeverity::Alert);

        let silent = Dispatcher::new(&sink, NotifyLevel::None);
        silent.alert("zmirror", "ignored");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_failed_delivery_is_swallowed() {
        struct Broken;
        impl Notifier for Broken {
            fn deliver(&self, _: &Notification) -> ExecResult<()> {
                Err(crate::exec::ExecError::Failed {
                    command: "notify".to_string(),
                    code: Some(1),
                    stderr: "down".to_string(),
                })
            }
        }

        let dispatcher = Dispatcher::new(&Broken, NotifyLevel::All);
        dispatcher.alert("zmirror", "x");
        assert!(dispatcher.delivered().is_empty());
    }
}
