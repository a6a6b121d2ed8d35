//! In-memory executor with scripted responses
//!
//! Used by tests and by anything that needs to drive the orchestrator
//! without touching real storage. Commands are matched by substring against
//! their rendered form; the first matching rule wins.

use std::cell::RefCell;
use std::collections::VecDeque;

use super::command::{CommandOutput, CommandSpec, Pipeline};
use super::errors::ExecResult;
use super::Executor;

struct Rule {
    needle: String,
    responses: VecDeque<CommandOutput>,
}

/// Records every executed command and answers from a script.
///
/// Unmatched commands succeed with empty output.
#[derive(Default)]
pub struct ScriptedExecutor {
    rules: RefCell<Vec<Rule>>,
    history: RefCell<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every command containing `needle` with `output`.
    pub fn respond(&self, needle: &str, output: CommandOutput) -> &Self {
        self.respond_sequence(needle, vec![output])
    }

    /// Answer successive matches with successive outputs; the last one
    /// repeats once the sequence is exhausted.
    pub fn respond_sequence(&self, needle: &str, outputs: Vec<CommandOutput>) -> &Self {
        self.rules.borrow_mut().push(Rule {
            needle: needle.to_string(),
            responses: outputs.into(),
        });
        self
    }

    /// Every executed command, rendered, in execution order
    pub fn executed(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    /// Number of executed commands containing `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.history
            .borrow()
            .iter()
            .filter(|c| c.contains(needle))
            .count()
    }

    fn answer(&self, rendered: String) -> CommandOutput {
        let mut rules = self.rules.borrow_mut();
        let output = rules
            .iter_mut()
            .find(|rule| rendered.contains(&rule.needle))
            .and_then(|rule| {
                if rule.responses.len() > 1 {
                    rule.responses.pop_front()
                } else {
                    rule.responses.front().cloned()
                }
            })
            .unwrap_or_else(|| CommandOutput::success(""));
        self.history.borrow_mut().push(rendered);
        output
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, command: &CommandSpec) -> ExecResult<CommandOutput> {
        Ok(self.answer(command.to_string()))
    }

    fn execute_pipeline(&self, pipeline: &Pipeline) -> ExecResult<CommandOutput> {
        Ok(self.answer(pipeline.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_commands_succeed() {
        let exec = ScriptedExecutor::new();
        let out = exec.execute(&CommandSpec::new("zfs").arg("list")).unwrap();
        assert!(out.is_success());
        assert_eq!(exec.executed(), vec!["zfs list"]);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let exec = ScriptedExecutor::new();
        exec.respond("zfs list", CommandOutput::failure(1, "missing"))
            .respond("zfs", CommandOutput::success("other"));

        let out = exec.execute(&CommandSpec::new("zfs").arg("list")).unwrap();
        assert_eq!(out.code, Some(1));
    }

    #[test]
    fn test_sequence_then_repeat_last() {
        let exec = ScriptedExecutor::new();
        exec.respond_sequence(
            "zfs list",
            vec![CommandOutput::failure(1, ""), CommandOutput::success("x")],
        );
        let cmd = CommandSpec::new("zfs").arg("list");

        assert!(!exec.execute(&cmd).unwrap().is_success());
        assert!(exec.execute(&cmd).unwrap().is_success());
        assert!(exec.execute(&cmd).unwrap().is_success());
        assert_eq!(exec.count("zfs list"), 3);
    }
}
