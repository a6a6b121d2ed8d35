//! zmirror CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Parses CLI arguments and dispatches (via cli::run)
//! 2. Exits with non-zero on failure or on an uncaught fault
//!
//! The command has already printed its JSON envelope by the time an error
//! reaches here.
//!
//! All logic is delegated to the CLI module.

use std::panic;

use zmirror::cli;
use zmirror::observability::{log_event_with_fields, Event};

fn main() {
    match panic::catch_unwind(cli::run) {
        Ok(Ok(())) => {}
        Ok(Err(_)) => std::process::exit(1),
        Err(payload) => {
            let message = cli::panic_message(payload.as_ref());
            log_event_with_fields(Event::UnexpectedTermination, &[("reason", message.as_str())]);
            std::process::exit(1);
        }
    }
}
