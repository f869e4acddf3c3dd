use crate::plan::ActionPlan;
use crate::shell::quote;
use reclaim_exec::{CommandSpec, Runner};
use reclaim_safety::Confirmation;
use std::path::{Path, PathBuf};

pub const DEFAULT_JOURNAL_DAYS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupTask {
    AptCache,
    JournalLogs,
    TempFiles,
    UserCache,
    Thumbnails,
    NpmCache,
    PipCache,
}

impl CleanupTask {
    pub const ALL: [CleanupTask; 7] = [
        CleanupTask::AptCache,
        CleanupTask::JournalLogs,
        CleanupTask::TempFiles,
        CleanupTask::UserCache,
        CleanupTask::Thumbnails,
        CleanupTask::NpmCache,
        CleanupTask::PipCache,
    ];

    pub fn menu_label(&self) -> &'static str {
        match self {
            CleanupTask::AptCache => "Clean APT package cache",
            CleanupTask::JournalLogs => "Clean old journal logs",
            CleanupTask::TempFiles => "Clean temporary files",
            CleanupTask::UserCache => "Clean user caches",
            CleanupTask::Thumbnails => "Clean thumbnail cache",
            CleanupTask::NpmCache => "Clean npm cache (if installed)",
            CleanupTask::PipCache => "Clean pip cache (if installed)",
        }
    }

    /// Why the task cannot run on this machine, if it cannot.
    pub fn unavailable(&self, runner: &dyn Runner, home: &Path) -> Option<&'static str> {
        match self {
            CleanupTask::Thumbnails if !thumbnails_dir(home).exists() => Some("No thumbnail cache found"),
            CleanupTask::NpmCache if !runner.has_tool("npm") => Some("npm is not installed"),
            CleanupTask::PipCache if !runner.has_tool("pip") && !runner.has_tool("pip3") => {
                Some("pip is not installed")
            }
            CleanupTask::PipCache if !pip_cache_dir(home).exists() => Some("No pip cache found"),
            _ => None,
        }
    }

    /// The interactive version: sizes first, one y/n question, then cleanup.
    pub fn plan(&self, home: &Path, journal_days: u32) -> ActionPlan {
        let proceed = || Confirmation::yes_no("\nProceed with cleanup?");
        match self {
            CleanupTask::AptCache => ActionPlan::new("Cleaning APT Cache", "APT cache cleanup completed")
                .preview(apt_cache_size())
                .confirm(proceed())
                .step(CommandSpec::shell("sudo apt-get clean"))
                .step(CommandSpec::shell("sudo apt-get autoclean"))
                .step(CommandSpec::shell("sudo apt-get autoremove -y"))
                .followup(apt_cache_size()),
            CleanupTask::JournalLogs => ActionPlan::new("Cleaning Journal Logs", "Journal cleanup completed")
                .preview(journal_usage())
                .confirm(Confirmation::yes_no(format!(
                    "\nProceed with cleanup (keep last {} days)?",
                    journal_days
                )))
                .step(journal_vacuum(journal_days))
                .followup(journal_usage()),
            CleanupTask::TempFiles => ActionPlan::new("Cleaning Temporary Files", "/tmp and /var/tmp cleaned")
                .warn("This will remove all files in /tmp and /var/tmp")
                .preview(CommandSpec::shell("sudo du -sh /tmp 2>/dev/null"))
                .preview(CommandSpec::shell("sudo du -sh /var/tmp 2>/dev/null"))
                .confirm(proceed())
                .step(CommandSpec::shell("sudo rm -rf /tmp/*"))
                .step(CommandSpec::shell("sudo rm -rf /var/tmp/*")),
            CleanupTask::UserCache => ActionPlan::new("Cleaning User Cache", "User cache cleaned")
                .preview(du_sh(&user_cache_dir(home)))
                .confirm(proceed())
                .step(remove_contents(&user_cache_dir(home))),
            CleanupTask::Thumbnails => ActionPlan::new("Cleaning Thumbnail Cache", "Thumbnail cache cleaned")
                .preview(du_sh(&thumbnails_dir(home)))
                .confirm(proceed())
                .step(remove_contents(&thumbnails_dir(home))),
            CleanupTask::NpmCache => ActionPlan::new("Cleaning npm Cache", "npm cache cleaned")
                .preview(CommandSpec::shell("npm cache verify"))
                .confirm(proceed())
                .step(CommandSpec::shell("npm cache clean --force")),
            CleanupTask::PipCache => ActionPlan::new("Cleaning pip Cache", "pip cache cleaned")
                .preview(du_sh(&pip_cache_dir(home)))
                .confirm(proceed())
                .step(remove_contents(&pip_cache_dir(home))),
        }
    }

    /// "Run all" clears the pip cache whenever the directory exists, pip or not.
    pub fn skipped_unattended(&self, runner: &dyn Runner, home: &Path) -> bool {
        match self {
            CleanupTask::PipCache => !pip_cache_dir(home).exists(),
            other => other.unavailable(runner, home).is_some(),
        }
    }

    /// Commands used by "run all", which asks once up front.
    pub fn unattended_steps(&self, home: &Path) -> Vec<CommandSpec> {
        match self {
            CleanupTask::JournalLogs => vec![journal_vacuum(DEFAULT_JOURNAL_DAYS)],
            CleanupTask::NpmCache => vec![CommandSpec::shell("npm cache clean --force 2>/dev/null")],
            // Already covered by the user cache step.
            CleanupTask::Thumbnails => Vec::new(),
            other => other.plan(home, DEFAULT_JOURNAL_DAYS).steps,
        }
    }
}

pub fn run_all_summary() -> &'static [&'static str] {
    &[
        "APT cache cleanup",
        "Journal logs (keep 3 days)",
        "Temporary files",
        "User caches",
        "Thumbnail cache",
        "npm cache (if installed)",
        "pip cache (if installed)",
    ]
}

pub fn user_cache_dir(home: &Path) -> PathBuf {
    home.join(".cache")
}

pub fn thumbnails_dir(home: &Path) -> PathBuf {
    user_cache_dir(home).join("thumbnails")
}

pub fn pip_cache_dir(home: &Path) -> PathBuf {
    user_cache_dir(home).join("pip")
}

fn apt_cache_size() -> CommandSpec {
    CommandSpec::shell("sudo du -sh /var/cache/apt 2>/dev/null")
}

fn journal_usage() -> CommandSpec {
    CommandSpec::shell("sudo journalctl --disk-usage")
}

fn journal_vacuum(days: u32) -> CommandSpec {
    CommandSpec::shell(format!("sudo journalctl --vacuum-time={}d", days))
}

fn du_sh(path: &Path) -> CommandSpec {
    CommandSpec::shell(format!("du -sh {} 2>/dev/null", quote(&path.display().to_string())))
}

fn remove_contents(dir: &Path) -> CommandSpec {
    CommandSpec::shell(format!("rm -rf {}/*", quote(&dir.display().to_string())))
}
