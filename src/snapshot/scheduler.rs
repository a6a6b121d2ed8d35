//! External snapshot scheduler
//!
//! The scheduler decides snapshot names and expiry from the artifact in its
//! config directory. Both entry points either succeed or fail as a whole.

use std::path::Path;

use crate::exec::{CommandRunner, CommandSpec, ExecResult};

#[derive(Debug, Clone)]
pub struct Scheduler {
    program: String,
}

impl Scheduler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, config_dir: &Path, action: &str) -> CommandSpec {
        CommandSpec::new(self.program.clone())
            .arg(format!("--configdir={}", config_dir.display()))
            .arg(action)
    }

    pub fn take_command(&self, config_dir: &Path) -> CommandSpec {
        self.command(config_dir, "--take-snapshots")
    }

    pub fn prune_command(&self, config_dir: &Path) -> CommandSpec {
        self.command(config_dir, "--prune-snapshots")
    }

    pub fn take_snapshots(&self, runner: &CommandRunner<'_>, config_dir: &Path) -> ExecResult<()> {
        runner.run(&self.take_command(config_dir)).map(|_| ())
    }

    pub fn prune_snapshots(&self, runner: &CommandRunner<'_>, config_dir: &Path) -> ExecResult<()> {
        runner.run(&self.prune_command(config_dir)).map(|_| ())
    }
}
