//! Terminal I/O for the CLI
//!
//! - Results: single JSON object on stdout
//! - Questions: stderr, answers read from stdin
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde_json::Value;

use crate::restore::{is_affirmative, Confirmer};

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Ask `question` on stderr and read one line from stdin.
///
/// `None` at end of input.
pub fn prompt(question: &str) -> CliResult<Option<String>> {
    let mut stderr = io::stderr();
    write!(stderr, "{} [y/N] ", question)?;
    stderr.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Confirms on the terminal. Anything but an explicit yes declines,
/// including end of input and read errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptConfirmer;

impl Confirmer for PromptConfirmer {
    fn confirm(&self, question: &str) -> bool {
        matches!(prompt(question), Ok(Some(answer)) if is_affirmative(&answer))
    }
}
