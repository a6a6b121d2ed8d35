//! Command execution errors

use std::io;

use thiserror::Error;

use crate::errors::ErrorKind;

/// Result type for command execution
pub type ExecResult<T> = Result<T, ExecError>;

/// Failure to run an external command or a local mutating action
#[derive(Debug, Error)]
pub enum ExecError {
    /// The process could not be started at all
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The process ran and reported failure
    #[error("`{command}` exited with {}: {}", status_label(.code), .stderr.trim())]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A local filesystem action failed
    #[error("{description}: {source}")]
    Action {
        description: String,
        #[source]
        source: io::Error,
    },
}

fn status_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "signal".to_string(),
    }
}

impl ExecError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ExecError::Spawn { .. } => "ZM_EXEC_SPAWN",
            ExecError::Failed { .. } => "ZM_EXEC_FAILED",
            ExecError::Action { .. } => "ZM_EXEC_ACTION",
        }
    }

    /// Collaborator failures are reported as command failures; callers that
    /// know better (path creation, transfer) re-wrap them.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecError::Action { .. } => ErrorKind::State,
            _ => ErrorKind::Command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_display_includes_status_and_stderr() {
        let err = ExecError::Failed {
            command: "zfs create -p vault/x".to_string(),
            code: Some(1),
            stderr: "cannot create 'vault/x': permission denied\n".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("zfs create -p vault/x"));
        assert!(display.contains("status 1"));
        assert!(display.contains("permission denied"));
        assert!(!display.ends_with('\n'));
    }

    #[test]
    fn test_signal_exit() {
        let err = ExecError::Failed {
            command: "syncoid".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_kinds_and_codes() {
        let spawn = ExecError::Spawn {
            command: "sanoid".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(spawn.kind(), ErrorKind::Command);
        assert_eq!(spawn.code(), "ZM_EXEC_SPAWN");

        let action = ExecError::Action {
            description: "write /etc/x".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(action.kind(), ErrorKind::State);
    }
}
