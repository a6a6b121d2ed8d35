//! Process-backed executor

use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread;

use super::command::{CommandOutput, CommandSpec, Pipeline};
use super::errors::{ExecError, ExecResult};
use super::Executor;

/// Runs commands as child processes, blocking until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    pub fn new() -> Self {
        Self
    }
}

fn command_for(spec: &CommandSpec) -> Command {
    let mut command = Command::new(spec.program());
    command.args(spec.argv());
    command
}

fn spawn_error(spec: &impl ToString, source: std::io::Error) -> ExecError {
    ExecError::Spawn {
        command: spec.to_string(),
        source,
    }
}

fn to_output(output: Output) -> CommandOutput {
    CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

impl Executor for SystemExecutor {
    fn execute(&self, command: &CommandSpec) -> ExecResult<CommandOutput> {
        let output = command_for(command)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(command, e))?;
        Ok(to_output(output))
    }

    fn execute_pipeline(&self, pipeline: &Pipeline) -> ExecResult<CommandOutput> {
        let mut sender = command_for(&pipeline.sender)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(&pipeline.sender, e))?;

        let stream = match sender.stdout.take() {
            Some(stream) => stream,
            None => {
                let _ = sender.kill();
                let _ = sender.wait();
                return Err(spawn_error(
                    &pipeline.sender,
                    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout not captured"),
                ));
            }
        };

        // Drain the sender's stderr concurrently so a chatty sender cannot
        // block on a full pipe while the receiver waits on its stdout.
        let sender_stderr = sender.stderr.take().map(|mut err| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = err.read_to_string(&mut buf);
                buf
            })
        });

        let receiver = command_for(&pipeline.receiver)
            .stdin(Stdio::from(stream))
            .output();

        let receiver = match receiver {
            Ok(output) => output,
            Err(e) => {
                let _ = sender.kill();
                let _ = sender.wait();
                return Err(spawn_error(&pipeline.receiver, e));
            }
        };

        let sender_status = sender
            .wait()
            .map_err(|e| spawn_error(&pipeline.sender, e))?;
        let sender_err = sender_stderr
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        let mut output = to_output(receiver);
        if !sender_status.success() {
            output.code = sender_status.code();
        }
        if !sender_err.trim().is_empty() {
            output.stderr = format!("{}{}", sender_err, output.stderr);
        }
        Ok(output)
    }
}
