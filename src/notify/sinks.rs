//! Notification sinks

use std::sync::Mutex;

use crate::exec::{CommandSpec, ExecError, ExecResult, Executor};
use crate::observability::{Event, Logger};

use super::{Notification, NotificationSeverity, Notifier};

const EVENT_NAME: &str = "zmirror";

/// Runs an external notification program:
/// `<program> -e zmirror -s <subject> -d <message> -i normal|alert`
pub struct CommandNotifier<'a> {
    program: String,
    executor: &'a dyn Executor,
}

impl<'a> CommandNotifier<'a> {
    pub fn new(program: impl Into<String>, executor: &'a dyn Executor) -> Self {
        Self {
            program: program.into(),
            executor,
        }
    }

    pub fn command(&self, notification: &Notification) -> CommandSpec {
        CommandSpec::new(self.program.clone())
            .args(["-e", EVENT_NAME, "-s"])
            .arg(notification.subject.clone())
            .arg("-d")
            .arg(notification.message.clone())
            .arg("-i")
            .arg(notification.severity.as_str())
    }
}

impl Notifier for CommandNotifier<'_> {
    fn deliver(&self, notification: &Notification) -> ExecResult<()> {
        let command = self.command(notification);
        let output = self.executor.execute(&command)?;
        if output.is_success() {
            Ok(())
        } else {
            Err(ExecError::Failed {
                command: command.to_string(),
                code: output.code,
                stderr: output.stderr,
            })
        }
    }
}

/// Writes notifications to the structured log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, notification: &Notification) -> ExecResult<()> {
        let fields = [
            ("subject", notification.subject.as_str()),
            ("message", notification.message.as_str()),
        ];
        match notification.severity {
            NotificationSeverity::Normal => {
                Logger::info(Event::NotificationLogged.as_str(), &fields)
            }
            NotificationSeverity::Alert => {
                Logger::error(Event::NotificationLogged.as_str(), &fields)
            }
        }
        Ok(())
    }
}

/// Keeps notifications in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    records: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Notification> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notifications with the given severity
    pub fn with_severity(&self, severity: NotificationSeverity) -> Vec<Notification> {
        self.records()
            .into_iter()
            .filter(|n| n.severity == severity)
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn deliver(&self, notification: &Notification) -> ExecResult<()> {
        if let Ok(mut records) = self.records.lock() {
            records.push(notification.clone());
        }
        Ok(())
    }
}
