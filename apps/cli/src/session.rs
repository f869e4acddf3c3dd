use crate::ui::Console;
use anyhow::Result;
use reclaim_exec::{run_lossy, CommandOutput, CommandSpec, Runner};
use reclaim_host_linux::ActionPlan;
use reclaim_safety::{confirm, Confirmation, Prompter};
use std::io;

/// End of input or Ctrl-D at a prompt; unwinds the menus and exits 0.
pub fn is_interrupt(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|io_err| io_err.kind() == io::ErrorKind::UnexpectedEof)
    })
}

/// Everything a menu needs to talk to the user and the machine.
pub struct Session<'a> {
    pub runner: &'a dyn Runner,
    prompter: &'a mut dyn Prompter,
    pub console: Console,
}

impl<'a> Session<'a> {
    pub fn new(runner: &'a dyn Runner, prompter: &'a mut dyn Prompter, console: Console) -> Self {
        Self {
            runner,
            prompter,
            console,
        }
    }

    pub fn ask(&mut self, question: &str) -> Result<String> {
        self.console.flush()?;
        Ok(self.prompter.ask(question)?.trim().to_string())
    }

    pub fn ask_or(&mut self, question: &str, default: &str) -> Result<String> {
        let answer = self.ask(question)?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    pub fn choose(&mut self) -> Result<String> {
        self.ask("\nSelect an option: ")
    }

    pub fn pause(&mut self) -> Result<()> {
        self.ask("\nPress Enter to continue...").map(|_| ())
    }

    pub fn confirm(&mut self, confirmation: &Confirmation) -> Result<bool> {
        self.console.flush()?;
        Ok(confirm(&mut *self.prompter, confirmation)?.allowed())
    }

    pub fn yes_no(&mut self, question: &str) -> Result<bool> {
        self.confirm(&Confirmation::yes_no(question))
    }

    /// Run a command and echo whatever it printed.
    pub fn run(&mut self, spec: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!(command = %spec.command_line(), "running");
        self.console.flush()?;
        let out = run_lossy(self.runner, spec);
        self.console.output(&out.output)?;
        Ok(out)
    }

    /// Run a command without echoing its output.
    pub fn capture(&mut self, spec: &CommandSpec) -> CommandOutput {
        tracing::debug!(command = %spec.command_line(), "capturing");
        run_lossy(self.runner, spec)
    }

    /// Print a non-interrupt error as one red line; interrupts propagate.
    pub fn settle(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Err(err) if is_interrupt(&err) => Err(err),
            Err(err) => {
                tracing::warn!(error = %err, "menu action failed");
                self.console.error(&format!("{:#}", err))?;
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    /// Header, warnings, preview, confirmation, steps, then follow-up.
    /// Returns whether the steps ran.
    pub fn execute(&mut self, plan: &ActionPlan) -> Result<bool> {
        self.console.header(plan.title)?;
        for warning in &plan.warnings {
            self.console.warning(warning)?;
        }
        for spec in &plan.preview {
            self.run(spec)?;
        }
        if let Some(confirmation) = &plan.confirmation {
            if !self.confirm(confirmation)? {
                self.console.warning("Operation cancelled")?;
                return Ok(false);
            }
        }
        let mut failures = 0;
        for spec in &plan.steps {
            if !self.run(spec)?.success() {
                failures += 1;
            }
        }
        if failures > 0 {
            self.console
                .warning(&format!("{} of {} step(s) reported errors", failures, plan.steps.len()))?;
        } else if !plan.done.is_empty() {
            self.console.success(plan.done)?;
        }
        for spec in &plan.followup {
            self.run(spec)?;
        }
        Ok(true)
    }
}
