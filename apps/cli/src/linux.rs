//! The `storage-manager` menus.

use crate::session::Session;
use anyhow::{anyhow, Result};
use reclaim_core::format_size;
use reclaim_host_linux::cleanup::{self, CleanupTask, DEFAULT_JOURNAL_DAYS};
use reclaim_host_linux::docker::{self, DockerAction};
use reclaim_host_linux::shell::{expand_tilde, parse_positive};
use reclaim_host_linux::space::first_field;
use reclaim_host_linux::tools::{self, Tool};
use reclaim_host_linux::{analysis, current_usage_spec, free_space_bytes, visualize, Privileges, SPACE_HOGS};
use std::path::Path;

const WSL_GUIDE: &[&str] = &[
    "Why Compaction is Needed:",
    "WSL uses virtual disk files (VHDX) that grow as you use space but don't",
    "automatically shrink when you delete files. After cleanup, you must compact",
    "the VHDX to reclaim the space on Windows.",
    "",
    "Steps to Compact WSL Disks (Run in Windows PowerShell as Admin):",
    "",
    "Method 1 - Modern WSL (WSL 2.0+):",
    "1. Shutdown all WSL instances:",
    "   wsl --shutdown",
    "2. Compact Ubuntu-22.04 disk:",
    "   wsl --manage Ubuntu-22.04 --set-sparse true",
    "3. Compact docker-desktop-data (if using Docker):",
    "   wsl --manage docker-desktop-data --set-sparse true",
    "",
    "Method 2 - Diskpart (if Method 1 doesn't work):",
    "1. Shutdown WSL:",
    "   wsl --shutdown",
    "2. Open diskpart:",
    "   diskpart",
    "3. In diskpart, for Ubuntu:",
    r#"   select vdisk file="%LOCALAPPDATA%\Packages\CanonicalGroupLimited.Ubuntu22.04LTS_79rhkp1fndgsc\LocalState\ext4.vhdx""#,
    "   compact vdisk",
    "   detach vdisk",
    "4. For Docker:",
    r#"   select vdisk file="%LOCALAPPDATA%\Docker\wsl\data\ext4.vhdx""#,
    "   compact vdisk",
    "   detach vdisk",
    "5. Exit diskpart:",
    "   exit",
    "",
    "Method 3 - Optimize-VHD (requires Hyper-V):",
    r#"optimize-vhd -Path "$env:LOCALAPPDATA\Packages\CanonicalGroupLimited.Ubuntu22.04LTS_79rhkp1fndgsc\LocalState\ext4.vhdx" -Mode Full"#,
    "",
    "Important Notes:",
    "• Always run 'wsl --shutdown' before compacting",
    "• Compaction can take several minutes",
    "• Make sure no WSL instances are running",
    "• The VHDX file paths may vary based on your installation",
    "• Backup important data before compacting",
    "",
    "The Windows companion `wsl-compactor` automates all three methods.",
];

pub struct StorageManager<'a> {
    session: Session<'a>,
    privs: Privileges,
}

impl<'a> StorageManager<'a> {
    pub fn new(session: Session<'a>, privs: Privileges) -> Self {
        Self { session, privs }
    }

    /// Root check before the menu. Returns `false` when the user backs out.
    pub fn startup(&mut self, running_as_root: bool) -> Result<bool> {
        if !running_as_root {
            return Ok(true);
        }
        self.session
            .console
            .warning("Warning: Running as root. Some operations may behave differently.")?;
        self.session.yes_no("Continue anyway?")
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            self.session.console.header("Linux Storage Manager")?;
            self.session.console.bold("Current Disk Usage:")?;
            let usage = self.session.capture(&current_usage_spec());
            if usage.success() {
                self.session.console.output(&usage.output)?;
            } else {
                self.session.console.line("Unable to get disk usage")?;
            }

            self.session.console.blank()?;
            self.session.console.bold("Main Menu:")?;
            let items = [
                "Storage Visualization",
                "System Cleanup (Safe)",
                "Docker Management",
                "Advanced Analysis",
                "Check & Install Tools",
                "WSL Disk Compaction Info",
            ];
            for (idx, label) in items.iter().enumerate() {
                self.session.console.item(&(idx + 1).to_string(), label)?;
            }
            self.session.console.item("0", "Exit")?;
            if !self.privs.sudo {
                self.session
                    .console
                    .warning("Running without sudo - some features may be limited")?;
            }

            let choice = self.session.choose()?;
            let result = match choice.as_str() {
                "1" => self.visualization_menu(),
                "2" => self.cleanup_menu(),
                "3" => self.docker_menu(),
                "4" => self.analysis_menu(),
                "5" => self.tools_menu(),
                "6" => self.wsl_info(),
                "0" => {
                    self.session.console.info("Exiting Storage Manager. Goodbye!")?;
                    return Ok(());
                }
                _ => {
                    self.session.console.error("Invalid option. Please try again.")?;
                    self.session.pause()
                }
            };
            self.session.settle(result)?;
        }
    }

    /// Shared loop for numbered submenus: `0` goes back, anything else is
    /// dispatched and followed by a pause.
    fn submenu<F>(&mut self, title: &str, items: &[(&str, u8)], mut dispatch: F) -> Result<()>
    where
        F: FnMut(&mut Self, usize) -> Result<()>,
    {
        loop {
            self.session.console.header(title)?;
            for (idx, (label, level)) in items.iter().enumerate() {
                self.session
                    .console
                    .caution_item(&(idx + 1).to_string(), label, *level)?;
            }
            self.session.console.item("0", "Back to main menu")?;

            let choice = self.session.choose()?;
            if choice == "0" {
                return Ok(());
            }
            let result = match choice.parse::<usize>() {
                Ok(number) if (1..=items.len()).contains(&number) => dispatch(&mut *self, number),
                _ => self.session.console.error("Invalid option. Please try again.").map_err(Into::into),
            };
            self.session.settle(result)?;
            self.session.pause()?;
        }
    }

    fn ask_path(&mut self, question: &str, default: &str) -> Result<String> {
        let raw = self.session.ask_or(question, default)?;
        Ok(expand_tilde(&raw, &self.privs.home))
    }

    fn ask_number(&mut self, question: &str, default: u32) -> Result<u32> {
        let raw = self.session.ask(question)?;
        parse_positive(&raw, default)
    }

    /// Make sure `tool` is on PATH, offering to install it. `false` means
    /// the caller should give up.
    fn ensure_tool(&mut self, name: &str, question: &str) -> Result<bool> {
        if self.session.runner.has_tool(name) {
            return Ok(true);
        }
        self.session.console.warning(&format!("{} is not installed.", name))?;
        if !self.session.yes_no(question)? {
            return Ok(false);
        }
        let tool = tools::recommended(name).ok_or_else(|| anyhow!("no installer known for {}", name))?;
        self.install(tool)
    }

    fn install(&mut self, tool: Tool) -> Result<bool> {
        self.session.console.info(&format!("Installing {}...", tool.name))?;
        if self.session.run(&tool.install_spec())?.success() {
            self.session
                .console
                .success(&format!("{} installed successfully!", tool.name))?;
            Ok(true)
        } else {
            self.session.console.error(&format!("Failed to install {}", tool.name))?;
            Ok(false)
        }
    }

    // Storage visualization

    fn visualization_menu(&mut self) -> Result<()> {
        let items = [
            ("Interactive disk usage (ncdu) - RECOMMENDED", 0),
            ("Quick directory size overview (du)", 0),
            ("Filesystem overview (df)", 0),
            ("Modern disk usage (dust)", 0),
            ("Modern filesystem overview (duf)", 0),
            ("Top 20 largest directories", 0),
            ("Common space hogs quick check", 0),
        ];
        self.submenu("Storage Visualization", &items, |this, choice| match choice {
            1 => this.ncdu(),
            2 => this.du_overview(),
            3 => this.df(),
            4 => this.dust(),
            5 => this.duf(),
            6 => this.top_entries(),
            _ => this.space_hogs(),
        })
    }

    fn ncdu(&mut self) -> Result<()> {
        if !self.ensure_tool("ncdu", "Would you like to install it?")? {
            return Ok(());
        }
        self.session.console.info("Launching ncdu...")?;
        self.session
            .console
            .info("Use arrow keys to navigate, 'd' to delete, 'q' to quit")?;
        let path = self.ask_path("Enter path to scan (default: /): ", "/")?;
        self.session.run(&visualize::ncdu(&self.privs, &path))?;
        Ok(())
    }

    fn du_overview(&mut self) -> Result<()> {
        self.session.console.info("Directory Size Analysis")?;
        let path = self.ask_path("Enter path to analyze (default: /): ", "/")?;
        let depth = self.ask_number("Enter depth level (default: 1): ", visualize::DEFAULT_DU_DEPTH)?;
        self.session.console.bold(&format!("\nTop directories in {}:", path))?;
        self.session.run(&visualize::du_overview(&self.privs, &path, depth))?;
        Ok(())
    }

    fn df(&mut self) -> Result<()> {
        let [usage, inodes] = visualize::df_specs();
        self.session.console.bold("\nFilesystem Usage:")?;
        self.session.run(&usage)?;
        self.session.console.bold("\nInode Usage:")?;
        self.session.run(&inodes)?;
        Ok(())
    }

    fn dust(&mut self) -> Result<()> {
        if !self.ensure_tool("dust", "Would you like to install it via snap?")? {
            return Ok(());
        }
        let path = self.ask_path("Enter path to analyze (default: /): ", "/")?;
        let depth = self.ask_number("Enter depth level (default: 3): ", visualize::DEFAULT_DUST_DEPTH)?;
        self.session.run(&visualize::dust(&path, depth))?;
        Ok(())
    }

    fn duf(&mut self) -> Result<()> {
        if !self.ensure_tool("duf", "Would you like to install it?")? {
            return Ok(());
        }
        self.session.run(&visualize::duf())?;
        Ok(())
    }

    fn top_entries(&mut self) -> Result<()> {
        self.session
            .console
            .info("Finding top 20 largest directories and files...")?;
        self.session.console.warning("This may take a few minutes...")?;
        self.session.run(&visualize::top_entries(&self.privs))?;
        Ok(())
    }

    fn space_hogs(&mut self) -> Result<()> {
        self.session.console.header("Common Space Hogs")?;
        for (path, description) in SPACE_HOGS {
            let out = self.session.capture(&visualize::dir_size(&self.privs, path));
            if out.success() {
                let size = first_field(&out.output).unwrap_or("N/A");
                self.session
                    .console
                    .line(&format!("{:30} {:>10} ({})", description, size, path))?;
            }
        }
        self.session.console.bold("\nHome directories:")?;
        self.session.run(&visualize::home_dirs_usage(&self.privs))?;
        if self.session.runner.has_tool("docker") {
            self.session.console.bold("\nDocker system usage:")?;
            self.session.run(&visualize::docker_system_df())?;
        }
        Ok(())
    }

    // System cleanup

    fn cleanup_menu(&mut self) -> Result<()> {
        let mut items: Vec<(&str, u8)> = CleanupTask::ALL
            .iter()
            .map(|task| (task.menu_label(), 0))
            .collect();
        items.push(("Run ALL safe cleanups", 0));
        self.submenu("System Cleanup (Safe Operations)", &items, |this, choice| {
            match CleanupTask::ALL.get(choice - 1) {
                Some(task) => this.cleanup(*task),
                None => this.cleanup_all(),
            }
        })
    }

    fn cleanup(&mut self, task: CleanupTask) -> Result<()> {
        let home = self.privs.home.clone();
        if let Some(reason) = task.unavailable(self.session.runner, &home) {
            self.session.console.warning(reason)?;
            return Ok(());
        }
        let days = if task == CleanupTask::JournalLogs {
            self.ask_number(
                &format!("\nKeep logs from last N days (default: {}): ", DEFAULT_JOURNAL_DAYS),
                DEFAULT_JOURNAL_DAYS,
            )?
        } else {
            DEFAULT_JOURNAL_DAYS
        };
        self.session.execute(&task.plan(&home, days))?;
        Ok(())
    }

    fn cleanup_all(&mut self) -> Result<()> {
        self.session.console.header("Running All Safe Cleanups")?;
        self.session
            .console
            .warning("This will perform ALL safe cleanup operations:")?;
        for line in cleanup::run_all_summary() {
            self.session.console.line(&format!("  - {}", line))?;
        }
        if !self.session.yes_no("\nProceed with all cleanups?")? {
            self.session.console.warning("Cleanup cancelled")?;
            return Ok(());
        }

        let home = self.privs.home.clone();
        let before = free_space_bytes(Path::new("/")).ok();
        self.session.console.info("Starting comprehensive cleanup...")?;
        for task in CleanupTask::ALL {
            if task.skipped_unattended(self.session.runner, &home) {
                continue;
            }
            let steps = task.unattended_steps(&home);
            if steps.is_empty() {
                continue;
            }
            self.session.console.line(&format!("\n{}", "=".repeat(70)))?;
            self.session.console.line(task.plan(&home, DEFAULT_JOURNAL_DAYS).title)?;
            self.session.console.line(&"=".repeat(70))?;
            for spec in &steps {
                self.session.run(spec)?;
            }
        }
        self.session.console.success("\nAll safe cleanups completed!")?;

        let after = free_space_bytes(Path::new("/")).ok();
        if let (Some(before), Some(after)) = (before, after) {
            self.session.console.info(&format!(
                "Space reclaimed on /: {}",
                format_size(after.saturating_sub(before))
            ))?;
        }
        self.session.console.info("Disk usage after cleanup:")?;
        let usage = self.session.capture(&current_usage_spec());
        self.session.console.output(&usage.output)?;
        Ok(())
    }

    // Docker

    fn docker_menu(&mut self) -> Result<()> {
        if !self.session.runner.has_tool("docker") {
            self.session.console.error("Docker is not installed or not in PATH")?;
            return self.session.pause();
        }
        let items: Vec<(&str, u8)> = DockerAction::ALL
            .iter()
            .map(|action| (action.menu_label(), action.risk()))
            .collect();
        loop {
            self.session.console.header("Docker Management")?;
            self.session.console.bold("Docker Storage Info:")?;
            self.session.run(&docker::storage_summary())?;
            self.session.console.bold("\nDocker Management Options:")?;
            for (idx, (label, level)) in items.iter().enumerate() {
                self.session
                    .console
                    .caution_item(&(idx + 1).to_string(), label, *level)?;
            }
            self.session.console.item("0", "Back to main menu")?;

            let choice = self.session.choose()?;
            if choice == "0" {
                return Ok(());
            }
            let action = choice
                .parse::<usize>()
                .ok()
                .and_then(|number| number.checked_sub(1))
                .and_then(|idx| DockerAction::ALL.get(idx).copied());
            let result = match action {
                Some(action) => self.session.execute(&action.plan()).map(|_| ()),
                None => self.session.console.error("Invalid option. Please try again.").map_err(Into::into),
            };
            self.session.settle(result)?;
            self.session.pause()?;
        }
    }

    // Advanced analysis

    fn analysis_menu(&mut self) -> Result<()> {
        let items = [
            ("Find largest files", 0),
            ("Find largest directories", 0),
            ("Find old files (not accessed recently)", 0),
            ("Analyze file types", 0),
            ("Find duplicate files (by size)", 0),
            ("Directory size analysis", 0),
        ];
        self.submenu("Advanced Analysis", &items, |this, choice| match choice {
            1 => this.largest_files(),
            2 => this.largest_dirs(),
            3 => this.old_files(),
            4 => this.file_types(),
            5 => this.duplicates(),
            _ => this.directory_growth(),
        })
    }

    fn largest_files(&mut self) -> Result<()> {
        self.session.console.header("Find Largest Files")?;
        let count = self.ask_number("How many files to show? (default: 20): ", analysis::DEFAULT_COUNT)?;
        let path = self.ask_path("Path to search (default: /): ", "/")?;
        self.session.console.warning("This may take several minutes...")?;
        self.session
            .console
            .info(&format!("Searching for {} largest files in {}...", count, path))?;
        self.session.run(&analysis::largest_files(&self.privs, &path, count))?;
        Ok(())
    }

    fn largest_dirs(&mut self) -> Result<()> {
        self.session.console.header("Find Largest Directories")?;
        let path = self.ask_path("Path to search (default: /): ", "/")?;
        let depth = self.ask_number("Directory depth (default: 2): ", analysis::DEFAULT_DIR_DEPTH)?;
        let count = self.ask_number(
            "How many directories to show? (default: 20): ",
            analysis::DEFAULT_COUNT,
        )?;
        self.session
            .console
            .info(&format!("Finding largest directories in {}...", path))?;
        self.session
            .run(&analysis::largest_dirs(&self.privs, &path, depth, count))?;
        Ok(())
    }

    fn old_files(&mut self) -> Result<()> {
        self.session.console.header("Find Old Files")?;
        let path = self.ask_path("Path to search (default: /home): ", "/home")?;
        let days = self.ask_number(
            "Not accessed in how many days? (default: 180): ",
            analysis::DEFAULT_OLD_DAYS,
        )?;
        self.session.console.info(&format!(
            "Finding files not accessed in {} days in {}...",
            days, path
        ))?;
        self.session.console.warning("This may take a while...")?;
        self.session.run(&analysis::old_files(&self.privs, &path, days))?;
        Ok(())
    }

    fn file_types(&mut self) -> Result<()> {
        self.session.console.header("Analyze File Types")?;
        let path = self.ask_path("Path to search (default: ~): ", "~")?;
        let extension = self
            .session
            .ask("File extension to search (e.g., .log, .tmp, .zip): ")?;
        if extension.is_empty() {
            self.session.console.error("Extension is required")?;
            return Ok(());
        }
        let [listing, total] = analysis::file_type(&self.privs, &path, &extension);
        self.session
            .console
            .info(&format!("Finding {} files in {}...", extension, path))?;
        self.session.run(&listing)?;
        self.session
            .console
            .info(&format!("\nTotal size of {} files:", extension))?;
        self.session.run(&total)?;
        Ok(())
    }

    fn duplicates(&mut self) -> Result<()> {
        self.session.console.header("Find Duplicate Files (by size)")?;
        let path = self.ask_path("Path to search (default: ~): ", "~")?;
        self.session.console.info("Finding files with duplicate sizes...")?;
        self.session.console.warning("This only checks file size, not content")?;
        self.session.console.warning("This may take a while...")?;
        self.session.run(&analysis::duplicate_sizes(&self.privs, &path))?;
        Ok(())
    }

    fn directory_growth(&mut self) -> Result<()> {
        self.session.console.header("Directory Size Analysis")?;
        let path = self.ask_path("Path to analyze (default: /var/log): ", "/var/log")?;
        self.session.console.info(&format!("Analyzing {}...", path))?;
        self.session.run(&analysis::directory_growth(&self.privs, &path))?;
        Ok(())
    }

    // Tools

    fn tools_menu(&mut self) -> Result<()> {
        self.session.console.header("Tool Installation & Status")?;
        self.session.console.bold("Tool Status:")?;
        let (recommended, optional) = tools::inventory(self.session.runner);
        for (tool, installed) in &recommended {
            let status = if *installed { "✓ Installed" } else { "✗ Not installed" };
            self.session
                .console
                .line(&format!("{:15} {:18} - {}", tool.name, status, tool.description))?;
        }
        self.session.console.bold("\nOptional tools:")?;
        for (name, installed) in &optional {
            let status = if *installed { "✓ Installed" } else { "○ Not installed" };
            self.session.console.line(&format!("{:15} {}", name, status))?;
        }

        self.session.console.bold("\nInstallation Options:")?;
        self.session.console.item("1", "Install ncdu (recommended)")?;
        self.session.console.item("2", "Install duf")?;
        self.session.console.item("3", "Install dust (via snap)")?;
        self.session.console.item("4", "Install all recommended tools")?;
        self.session.console.item("0", "Back to main menu")?;

        let choice = self.session.choose()?;
        let picked: Vec<Tool> = match choice.as_str() {
            "0" => return Ok(()),
            "1" => vec![tools::RECOMMENDED[0]],
            "2" => vec![tools::RECOMMENDED[1]],
            "3" => vec![tools::RECOMMENDED[2]],
            "4" => tools::RECOMMENDED.to_vec(),
            _ => {
                self.session.console.error("Invalid option. Please try again.")?;
                return self.session.pause();
            }
        };
        for tool in picked {
            self.install(tool)?;
        }
        self.session.pause()
    }

    fn wsl_info(&mut self) -> Result<()> {
        self.session.console.header("WSL Disk Compaction Information")?;
        for line in WSL_GUIDE {
            self.session.console.line(line)?;
        }
        self.session.pause()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::console;
    use crate::session::is_interrupt;
    use reclaim_exec::testing::ScriptedRunner;
    use reclaim_safety::testing::ScriptedPrompter;

    fn manager<'a>(
        runner: &'a ScriptedRunner,
        prompter: &'a mut ScriptedPrompter,
        sudo: bool,
    ) -> (StorageManager<'a>, crate::ui::capture::Captured) {
        let (console, buffer) = console();
        let session = Session::new(runner, prompter, console);
        (StorageManager::new(session, Privileges::new(sudo, "/home/me")), buffer)
    }

    #[test]
    fn root_user_can_back_out() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["n"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, true);
        assert!(!manager.startup(true).unwrap());
        assert!(buffer.text().contains("Running as root"));

        let mut prompter = ScriptedPrompter::new(&[]);
        let (mut manager, _) = self::manager(&runner, &mut prompter, true);
        assert!(manager.startup(false).unwrap());
    }

    #[test]
    fn exit_from_main_menu() {
        let runner = ScriptedRunner::new().on("df -h /", 0, "Filesystem Size Used\n/dev/sdc 1T 200G");
        let mut prompter = ScriptedPrompter::new(&["0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, false);
        manager.run().unwrap();
        let text = buffer.text();
        assert!(text.contains("/dev/sdc 1T 200G"));
        assert!(text.contains("Running without sudo"));
        assert!(text.contains("Goodbye!"));
    }

    #[test]
    fn end_of_input_unwinds_as_interrupt() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["1", "2"]);
        let (mut manager, _) = manager(&runner, &mut prompter, false);
        let err = manager.run().unwrap_err();
        assert!(is_interrupt(&err));
    }

    #[test]
    fn du_overview_uses_defaults_and_sudo() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["1", "2", "", "", "", "0", "0"]);
        let (mut manager, _) = manager(&runner, &mut prompter, true);
        manager.run().unwrap();
        assert!(runner.ran("sudo du -h -d 1 / 2>/dev/null | sort -hr | head -20"));
    }

    #[test]
    fn bad_depth_is_rejected_without_running() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["1", "2", "/var", "0", "", "0", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, false);
        manager.run().unwrap();
        assert!(!runner.ran("du -h -d"));
        assert!(buffer.text().contains("'0' is not a positive whole number"));
    }

    #[test]
    fn missing_ncdu_declined_runs_nothing() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["1", "1", "n", "", "0", "0"]);
        let (mut manager, _) = manager(&runner, &mut prompter, false);
        manager.run().unwrap();
        assert!(!runner.ran("apt-get install"));
        assert!(!runner.ran("ncdu"));
    }

    #[test]
    fn space_hogs_tabulate_sizes() {
        let runner = ScriptedRunner::new()
            .on("du -sh /var/log", 0, "2.5G\t/var/log\n")
            .on("du -sh /var/lib/docker", 1, "");
        let mut prompter = ScriptedPrompter::new(&["1", "7", "", "0", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, false);
        manager.run().unwrap();
        let text = buffer.text();
        assert!(text.contains("System logs"));
        assert!(text.contains("2.5G"));
        assert!(!text.contains("Docker storage"));
        assert!(!runner.ran("docker system df"));
    }

    #[test]
    fn journal_cleanup_keeps_requested_days() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["2", "2", "7", "y", "", "0", "0"]);
        let (mut manager, _) = manager(&runner, &mut prompter, true);
        manager.run().unwrap();
        assert!(runner.ran("sudo journalctl --vacuum-time=7d"));
        assert_eq!(runner.count("sudo journalctl --disk-usage"), 2);
    }

    #[test]
    fn npm_cleanup_skipped_when_missing() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["2", "6", "", "0", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, false);
        manager.run().unwrap();
        assert!(buffer.text().contains("npm is not installed"));
        assert!(!runner.ran("npm cache"));
    }

    #[test]
    fn run_all_cleanups_confirms_once() {
        let runner = ScriptedRunner::new().with_tools(&["npm"]);
        let mut prompter = ScriptedPrompter::new(&["2", "8", "y", "", "0", "0"]);
        let (mut manager, _) = manager(&runner, &mut prompter, true);
        manager.run().unwrap();
        assert!(runner.ran("sudo apt-get autoremove -y"));
        assert!(runner.ran("sudo journalctl --vacuum-time=3d"));
        assert!(runner.ran("sudo rm -rf /tmp/*"));
        assert!(runner.ran("rm -rf /home/me/.cache/*"));
        assert!(runner.ran("npm cache clean --force 2>/dev/null"));
        assert!(!runner.ran("/home/me/.cache/pip"));
    }

    #[test]
    fn run_all_clears_pip_cache_when_present() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(home.path().join(".cache/pip")).unwrap();
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["2", "8", "y", "", "0", "0"]);
        let (console, buffer) = console();
        let session = Session::new(&runner, &mut prompter, console);
        let mut manager = StorageManager::new(session, Privileges::new(true, home.path()));
        manager.run().unwrap();
        assert!(runner.ran(".cache/pip/*"));
        assert!(buffer.text().contains("Cleaning pip Cache"));
        assert!(!runner.ran("npm cache"));
    }

    #[test]
    fn docker_menu_requires_docker() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["3", "", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, false);
        manager.run().unwrap();
        assert!(buffer.text().contains("Docker is not installed"));
        assert!(!runner.ran("docker"));
    }

    #[test]
    fn volume_prune_needs_exact_phrase() {
        let runner = ScriptedRunner::new().with_tools(&["docker"]);
        let mut prompter = ScriptedPrompter::new(&["3", "10", "yes", "delete volumes", "", "0", "0"]);
        let (mut manager, _) = manager(&runner, &mut prompter, false);
        manager.run().unwrap();
        assert!(runner.ran("docker volume ls -f dangling=true"));
        assert!(!runner.ran("docker volume prune"));

        let runner = ScriptedRunner::new().with_tools(&["docker"]);
        let mut prompter = ScriptedPrompter::new(&["3", "10", "YES", "DELETE VOLUMES", "", "0", "0"]);
        let (mut manager, _) = self::manager(&runner, &mut prompter, false);
        manager.run().unwrap();
        assert!(runner.ran("docker volume prune -f"));
    }

    #[test]
    fn build_cache_prune_needs_both_answers() {
        let runner = ScriptedRunner::new().with_tools(&["docker"]);
        let mut prompter = ScriptedPrompter::new(&["3", "8", "y", "n", "", "0", "0"]);
        let (mut manager, _) = manager(&runner, &mut prompter, false);
        manager.run().unwrap();
        assert!(!runner.ran("docker builder prune"));
    }

    #[test]
    fn file_types_require_extension() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["4", "4", "", "", "", "0", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, false);
        manager.run().unwrap();
        assert!(buffer.text().contains("Extension is required"));
        assert!(!runner.ran("find"));
    }

    #[test]
    fn duplicates_default_to_home() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["4", "5", "", "", "0", "0"]);
        let (mut manager, _) = manager(&runner, &mut prompter, true);
        manager.run().unwrap();
        assert!(runner.ran("find /home/me -type f -exec du -b {} + 2>/dev/null | sort -n | uniq -d -w 15"));
        assert!(!runner.ran("sudo find /home/me"));
    }

    #[test]
    fn install_all_tools() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["5", "4", "", "0"]);
        let (mut manager, _) = manager(&runner, &mut prompter, false);
        manager.run().unwrap();
        assert!(runner.ran("sudo apt-get install -y ncdu"));
        assert!(runner.ran("sudo apt-get install -y duf"));
        assert!(runner.ran("sudo snap install dust"));
    }
}
