use std::io;
use std::time::Duration;
use thiserror::Error;

mod spec;
mod system;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use spec::CommandSpec;
pub use system::SystemRunner;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} timed out after {}s", timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
}

/// Exit code and the combined stdout + stderr of a finished process.
///
/// `output` is empty for streamed (non-captured) commands. `code` is `-1`
/// when the process was killed by a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub output: String,
}

impl CommandOutput {
    pub fn new(code: i32, output: impl Into<String>) -> Self {
        Self {
            code,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn trimmed(&self) -> &str {
        self.output.trim()
    }
}

pub trait Runner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError>;

    /// Whether `tool` resolves to an executable on PATH.
    fn has_tool(&self, tool: &str) -> bool;
}

/// Run a command and fold any execution error into a failed output with
/// exit code 1, the way the menus report failures.
pub fn run_lossy(runner: &dyn Runner, spec: &CommandSpec) -> CommandOutput {
    match runner.run(spec) {
        Ok(output) => output,
        Err(err) => {
            tracing::warn!(command = %spec.command_line(), error = %err, "command failed to run");
            CommandOutput::new(1, err.to_string())
        }
    }
}
