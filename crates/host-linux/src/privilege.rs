use reclaim_exec::{run_lossy, CommandSpec, Runner};
use std::path::{Path, PathBuf};

#[cfg(unix)]
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}

/// Passwordless sudo, probed with `sudo -n true`.
pub fn has_passwordless_sudo(runner: &dyn Runner) -> bool {
    let probe = CommandSpec::shell("sudo -n true 2>/dev/null").captured();
    run_lossy(runner, &probe).success()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Privileges {
    pub sudo: bool,
    pub home: PathBuf,
}

impl Privileges {
    pub fn new(sudo: bool, home: impl Into<PathBuf>) -> Self {
        Self {
            sudo,
            home: home.into(),
        }
    }

    pub fn detect(runner: &dyn Runner) -> Self {
        let sudo = has_passwordless_sudo(runner);
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        tracing::debug!(sudo, home = %home.display(), "detected privileges");
        Self { sudo, home }
    }

    /// `"sudo "` for absolute paths outside the home directory, when sudo
    /// needs no password; empty otherwise.
    pub fn sudo_prefix(&self, path: &str) -> &'static str {
        if self.sudo && path.starts_with('/') && Path::new(path) != self.home {
            "sudo "
        } else {
            ""
        }
    }
}
