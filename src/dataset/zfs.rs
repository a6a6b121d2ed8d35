//! Storage command primitives
//!
//! Builds `zfs` invocations for a [`Location`] and interprets their output.
//! Queries go through [`CommandRunner::query`]; the only mutating primitive
//! here (`create`) goes through [`CommandRunner::run`].

use crate::exec::{CommandOutput, CommandRunner, CommandSpec, ExecResult};
use crate::remote::{Location, SshTransport};

use super::errors::{DatasetError, DatasetResult};
use super::name::DatasetName;

const MISSING_MARKER: &str = "does not exist";

/// The storage tool, reachable locally or over ssh
#[derive(Debug, Clone)]
pub struct Zfs {
    program: String,
    transport: SshTransport,
}

impl Zfs {
    pub fn new(program: impl Into<String>, transport: SshTransport) -> Self {
        Self {
            program: program.into(),
            transport,
        }
    }

    pub fn transport(&self) -> &SshTransport {
        &self.transport
    }

    /// `zfs <args>` at `location`
    pub fn command<I, S>(&self, location: &Location, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transport
            .at(location, CommandSpec::new(self.program.clone()).args(args))
    }

    pub fn exists_command(&self, location: &Location, name: &DatasetName) -> CommandSpec {
        self.command(location, ["list", "-H", "-o", "name", name.as_str()])
    }

    pub fn create_command(&self, location: &Location, name: &DatasetName) -> CommandSpec {
        self.command(location, ["create", "-p", name.as_str()])
    }

    /// Whether `name` exists at `location`. Never mutates.
    pub fn exists(
        &self,
        runner: &CommandRunner<'_>,
        location: &Location,
        name: &DatasetName,
    ) -> DatasetResult<bool> {
        let command = self.exists_command(location, name);
        let output = runner.query(&command)?;
        if output.is_success() {
            return Ok(true);
        }
        if output.stderr.contains(MISSING_MARKER) {
            return Ok(false);
        }
        Err(failed(&command, output).into())
    }

    /// Create `name` and any missing parents.
    pub fn create(
        &self,
        runner: &CommandRunner<'_>,
        location: &Location,
        name: &DatasetName,
    ) -> ExecResult<()> {
        runner.run(&self.create_command(location, name)).map(|_| ())
    }

    /// Exact bytes used by `dataset`.
    pub fn used_bytes(
        &self,
        runner: &CommandRunner<'_>,
        location: &Location,
        dataset: &DatasetName,
    ) -> DatasetResult<u64> {
        let command = self.command(location, ["get", "-Hp", "-o", "value", "used", dataset.as_str()]);
        let output = self.query_existing(runner, &command, location, dataset)?;
        let value = output.lines().next().unwrap_or_default().to_string();
        value
            .parse::<u64>()
            .map_err(|_| DatasetError::UnexpectedOutput {
                command: command.to_string(),
                output: value,
            })
    }

    /// Names of `root` and every descendant, in tool order.
    pub fn list_tree(
        &self,
        runner: &CommandRunner<'_>,
        location: &Location,
        root: &DatasetName,
    ) -> DatasetResult<Vec<String>> {
        let command = self.command(
            location,
            ["list", "-H", "-r", "-t", "filesystem,volume", "-o", "name", root.as_str()],
        );
        let output = self.query_existing(runner, &command, location, root)?;
        Ok(output.lines().map(str::to_string).collect())
    }

    /// Full snapshot names (`dataset@snap`) of `dataset` only, oldest first.
    pub fn list_snapshots(
        &self,
        runner: &CommandRunner<'_>,
        location: &Location,
        dataset: &DatasetName,
    ) -> DatasetResult<Vec<String>> {
        let command = self.command(
            location,
            [
                "list", "-H", "-t", "snapshot", "-o", "name", "-s", "createtxg", "-d", "1",
                dataset.as_str(),
            ],
        );
        let output = self.query_existing(runner, &command, location, dataset)?;
        Ok(output.lines().map(str::to_string).collect())
    }

    fn query_existing(
        &self,
        runner: &CommandRunner<'_>,
        command: &CommandSpec,
        location: &Location,
        dataset: &DatasetName,
    ) -> DatasetResult<CommandOutput> {
        let output = runner.query(command)?;
        if output.is_success() {
            return Ok(output);
        }
        if output.stderr.contains(MISSING_MARKER) {
            return Err(DatasetError::NotFound {
                dataset: dataset.to_string(),
                location: location.label(),
            });
        }
        Err(failed(command, output).into())
    }
}

fn failed(command: &CommandSpec, output: CommandOutput) -> crate::exec::ExecError {
    crate::exec::ExecError::Failed {
        command: command.to_string(),
        code: output.code,
        stderr: output.stderr,
    }
}
