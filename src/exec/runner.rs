//! Dry-run aware command runner
//!
//! Every mutating action in the crate goes through [`CommandRunner`]. In
//! normal mode the action is executed; in dry-run mode its description is
//! logged and journaled and a synthetic success is returned. Non-mutating
//! queries always execute so previews reflect real storage state.

use std::cell::RefCell;
use std::io;

use crate::observability::{log_event_with_fields, Event};

use super::command::{CommandOutput, CommandSpec, Pipeline};
use super::errors::{ExecError, ExecResult};
use super::Executor;

/// Routes commands to an [`Executor`], honoring dry-run.
pub struct CommandRunner<'a> {
    executor: &'a dyn Executor,
    dry_run: bool,
    journal: RefCell<Vec<String>>,
}

impl<'a> CommandRunner<'a> {
    pub fn new(executor: &'a dyn Executor, dry_run: bool) -> Self {
        Self {
            executor,
            dry_run,
            journal: RefCell::new(Vec::new()),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run a read-only command. Executes in dry-run too; the exit status is
    /// left for the caller to interpret.
    pub fn query(&self, command: &CommandSpec) -> ExecResult<CommandOutput> {
        self.executor.execute(command)
    }

    /// Run a mutating command, requiring success.
    pub fn run(&self, command: &CommandSpec) -> ExecResult<CommandOutput> {
        let description = command.to_string();
        if self.dry_run {
            self.preview(description);
            return Ok(CommandOutput::synthetic());
        }
        let output = self.executor.execute(command)?;
        require_success(description, output)
    }

    /// Run a mutating pipeline, requiring success of both ends.
    pub fn run_pipeline(&self, pipeline: &Pipeline) -> ExecResult<CommandOutput> {
        let description = pipeline.to_string();
        if self.dry_run {
            self.preview(description);
            return Ok(CommandOutput::synthetic());
        }
        let output = self.executor.execute_pipeline(pipeline)?;
        require_success(description, output)
    }

    /// Apply a local mutating action described by `description`.
    pub fn apply<F>(&self, description: &str, action: F) -> ExecResult<()>
    where
        F: FnOnce() -> io::Result<()>,
    {
        if self.dry_run {
            self.preview(description.to_string());
            return Ok(());
        }
        action().map_err(|source| ExecError::Action {
            description: description.to_string(),
            source,
        })
    }

    /// Descriptions of every action previewed so far, in order
    pub fn previews(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    fn preview(&self, description: String) {
        log_event_with_fields(Event::DryRunPreview, &[("command", description.as_str())]);
        self.journal.borrow_mut().push(description);
    }
}

fn require_success(command: String, output: CommandOutput) -> ExecResult<CommandOutput> {
    if output.is_success() {
        Ok(output)
    } else {
        Err(ExecError::Failed {
            command,
            code: output.code,
            stderr: output.stderr,
        })
    }
}
