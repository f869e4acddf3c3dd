//! Scripted stand-in for [`Runner`] used by the tests of downstream crates.

use crate::{CommandOutput, CommandSpec, ExecError, Runner};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Output(CommandOutput),
    TimedOut,
    SpawnError,
}

#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    reply: Reply,
    remaining: Option<usize>,
}

/// Replies to commands whose command line (or stdin text) contains a needle.
///
/// Rules are checked in the order they were added; the first live match wins.
/// Commands that match nothing succeed with empty output. Every command is
/// recorded and can be inspected afterwards.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    rules: RefCell<Vec<Rule>>,
    tools: HashSet<String>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tools(mut self, tools: &[&str]) -> Self {
        self.tools.extend(tools.iter().map(|tool| tool.to_string()));
        self
    }

    pub fn on(self, needle: &str, code: i32, output: &str) -> Self {
        self.push(needle, Reply::Output(CommandOutput::new(code, output)), None)
    }

    /// Like [`ScriptedRunner::on`] but the rule is used only once.
    pub fn on_once(self, needle: &str, code: i32, output: &str) -> Self {
        self.push(needle, Reply::Output(CommandOutput::new(code, output)), Some(1))
    }

    pub fn timeout_on(self, needle: &str) -> Self {
        self.push(needle, Reply::TimedOut, None)
    }

    pub fn spawn_error_on(self, needle: &str) -> Self {
        self.push(needle, Reply::SpawnError, None)
    }

    fn push(self, needle: &str, reply: Reply, remaining: Option<usize>) -> Self {
        self.rules.borrow_mut().push(Rule {
            needle: needle.to_string(),
            reply,
            remaining,
        });
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(haystack).collect()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.command_lines()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.count(needle) > 0
    }
}

fn haystack(spec: &CommandSpec) -> String {
    match spec.stdin_text() {
        Some(stdin) => format!("{}\n{}", spec.command_line(), stdin),
        None => spec.command_line(),
    }
}

impl Runner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        self.calls.borrow_mut().push(spec.clone());
        let line = haystack(spec);

        let mut rules = self.rules.borrow_mut();
        let rule = rules
            .iter_mut()
            .find(|rule| rule.remaining != Some(0) && line.contains(&rule.needle));
        let Some(rule) = rule else {
            return Ok(CommandOutput::new(0, ""));
        };
        if let Some(remaining) = rule.remaining.as_mut() {
            *remaining -= 1;
        }

        match &rule.reply {
            Reply::Output(output) => Ok(output.clone()),
            Reply::TimedOut => Err(ExecError::TimedOut {
                program: spec.program().to_string(),
                timeout: spec.timeout_duration().unwrap_or(Duration::ZERO),
            }),
            Reply::SpawnError => Err(ExecError::Spawn {
                program: spec.program().to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "program not found"),
            }),
        }
    }

    fn has_tool(&self, tool: &str) -> bool {
        self.tools.contains(tool)
    }
}
