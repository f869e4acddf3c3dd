use reclaim_exec::CommandSpec;
use reclaim_safety::Confirmation;

/// A confirm-then-run action: show what is there, ask, run, show the result.
#[derive(Debug, Clone)]
pub struct ActionPlan {
    pub title: &'static str,
    pub warnings: Vec<&'static str>,
    pub preview: Vec<CommandSpec>,
    pub confirmation: Option<Confirmation>,
    pub steps: Vec<CommandSpec>,
    pub done: &'static str,
    pub followup: Vec<CommandSpec>,
}

impl ActionPlan {
    pub fn new(title: &'static str, done: &'static str) -> Self {
        Self {
            title,
            warnings: Vec::new(),
            preview: Vec::new(),
            confirmation: None,
            steps: Vec::new(),
            done,
            followup: Vec::new(),
        }
    }

    pub fn warn(mut self, warning: &'static str) -> Self {
        self.warnings.push(warning);
        self
    }

    pub fn preview(mut self, spec: CommandSpec) -> Self {
        self.preview.push(spec);
        self
    }

    pub fn confirm(mut self, confirmation: Confirmation) -> Self {
        self.confirmation = Some(confirmation);
        self
    }

    pub fn step(mut self, spec: CommandSpec) -> Self {
        self.steps.push(spec);
        self
    }

    pub fn followup(mut self, spec: CommandSpec) -> Self {
        self.followup.push(spec);
        self
    }

    pub fn step_lines(&self) -> Vec<String> {
        self.steps.iter().map(script_of).collect()
    }
}

/// The `sh -c` script of a shell spec, or the full command line otherwise.
pub fn script_of(spec: &CommandSpec) -> String {
    match spec.arguments() {
        [flag, script] if spec.program() == "sh" && flag == "-c" => script.clone(),
        _ => spec.command_line(),
    }
}
