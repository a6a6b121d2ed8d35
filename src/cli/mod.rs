//! CLI module for zmirror
//!
//! Provides command-line interface for:
//! - run: full snapshot, reconcile and replication lifecycle
//! - check: configuration and connectivity only
//! - restore: stream a replica back into place

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, panic_message, restore, run, run_command, run_lifecycle, RestoreArgs};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{prompt, write_error, write_response, PromptConfirmer};
