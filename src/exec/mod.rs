//! Command execution
//!
//! All interaction with external tools (storage queries, snapshot scheduler,
//! transfer tool, remote transport, notification command) is expressed as a
//! [`CommandSpec`] or [`Pipeline`] and handed to an [`Executor`].
//!
//! Mutating work is additionally routed through [`CommandRunner`], which is
//! the single place dry-run is decided.

mod command;
mod errors;
mod runner;
mod scripted;
mod system;

pub use command::{quote, CommandOutput, CommandSpec, Pipeline};
pub use errors::{ExecError, ExecResult};
pub use runner::CommandRunner;
pub use scripted::ScriptedExecutor;
pub use system::SystemExecutor;

/// Executes commands. Blocking; one call runs one process (or one pipe of
/// two processes) to completion.
///
/// A non-zero exit is NOT an error at this level: it is reported in
/// [`CommandOutput::code`]. `Err` means the process could not be run.
pub trait Executor {
    fn execute(&self, command: &CommandSpec) -> ExecResult<CommandOutput>;

    fn execute_pipeline(&self, pipeline: &Pipeline) -> ExecResult<CommandOutput>;
}
