use reclaim_exec::{CommandSpec, Runner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installer {
    Apt,
    Snap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    pub installer: Installer,
}

pub const RECOMMENDED: [Tool; 3] = [
    Tool {
        name: "ncdu",
        description: "NCurses Disk Usage - Interactive analyzer (RECOMMENDED)",
        installer: Installer::Apt,
    },
    Tool {
        name: "duf",
        description: "Modern df alternative - Better filesystem overview",
        installer: Installer::Apt,
    },
    Tool {
        name: "dust",
        description: "Modern du alternative - Tree-style disk usage (requires snap)",
        installer: Installer::Snap,
    },
];

pub const OPTIONAL: [&str; 4] = ["docker", "npm", "pip", "pip3"];

pub fn recommended(name: &str) -> Option<Tool> {
    RECOMMENDED.iter().copied().find(|tool| tool.name == name)
}

impl Tool {
    pub fn install_spec(&self) -> CommandSpec {
        match self.installer {
            Installer::Apt => CommandSpec::shell(format!(
                "sudo apt-get update && sudo apt-get install -y {}",
                self.name
            )),
            Installer::Snap => CommandSpec::shell(format!("sudo snap install {}", self.name)),
        }
    }
}

/// `(name, installed)` for each recommended tool, then each optional one.
pub fn inventory(runner: &dyn Runner) -> (Vec<(Tool, bool)>, Vec<(&'static str, bool)>) {
    let recommended = RECOMMENDED
        .iter()
        .map(|tool| (*tool, runner.has_tool(tool.name)))
        .collect();
    let optional = OPTIONAL
        .iter()
        .map(|name| (*name, runner.has_tool(name)))
        .collect();
    (recommended, optional)
}
