//! The `wsl-compactor` menus.

use crate::config::CompactorSettings;
use crate::session::Session;
use anyhow::Result;
use reclaim_compaction::{
    is_unsupported_diagnostic, Capabilities, CompactionMethod, CompactionOutcome, CompactionSelector,
    CompactionTarget, FsSizeProbe, SizeProbe,
};
use reclaim_core::{format_size, VirtualDiskRecord};
use reclaim_exec::run_lossy;
use reclaim_host_windows::wsl::{self, distro_usage_spec, list_verbose_spec, set_sparse_spec};
use reclaim_host_windows::{
    drive_usage_spec, free_space_bytes, optimize_vhd_available, owner_label, standard_methods,
    system_drive_root, DiskInventory, DiskpartMethod, OptimizeVhdMethod,
};
use reclaim_report::{write_compaction_report, CompactionEntry, CompactionReport};
use reclaim_safety::{require_elevated, SafetyDecision};
use std::path::PathBuf;

const TROUBLESHOOTING: &[(&str, &[&str])] = &[
    (
        "1. \"Not running as Administrator\"",
        &[
            "Solution: Close this program and re-run it as Administrator",
            "• Press Win+X → Select 'Terminal (Admin)' or 'PowerShell (Admin)'",
            "• Or right-click the program → 'Run as administrator'",
        ],
    ),
    (
        "2. \"The parameter is incorrect\" (Modern method)",
        &[
            "Solution: Your WSL version doesn't support the modern method",
            "• Use Option 5 (Diskpart method) instead",
            "• Or update WSL: Run 'wsl --update' in PowerShell",
        ],
    ),
    (
        "3. \"Process cannot access the file\"",
        &[
            "Solution: WSL is still running or file is in use",
            "• Make sure all WSL/Ubuntu windows are closed",
            "• Run Option 3 (Shutdown WSL) first",
            "• Wait 30 seconds, then try again",
            "• If using Docker, quit Docker Desktop completely",
        ],
    ),
    (
        "4. Compaction doesn't free much space",
        &[
            "Solution: Make sure you deleted files in WSL first!",
            "• Run storage-manager inside WSL first",
            "• Clean up files, Docker images, etc.",
            "• Then come back and compact on Windows",
        ],
    ),
    (
        "5. Can't find VHDX files",
        &[
            "Solution: Use Option 2 to locate them",
            "• Common locations:",
            r"  %LOCALAPPDATA%\Packages\*Ubuntu*\LocalState\ext4.vhdx",
            r"  %LOCALAPPDATA%\Docker\wsl\data\ext4.vhdx",
        ],
    ),
    (
        "6. Optimize-VHD not found",
        &[
            "Solution: Hyper-V is not installed",
            "• Use Option 4 (Modern method) or Option 5 (Diskpart) instead",
            "• Or install Hyper-V feature (Windows Pro/Enterprise only)",
        ],
    ),
    (
        "7. Compaction timed out",
        &[
            "Solution: Large disks can take a long time",
            "• Raise the limit with --compact-timeout-secs (or RECLAIM_COMPACT_TIMEOUT)",
            "• Re-run Option 7 once nothing else is using the disk",
        ],
    ),
];

const WORKFLOW: &[&str] = &[
    "1. Clean up files in WSL using storage-manager",
    "2. Come to Windows and run Option 7 (Quick Compact All)",
    "3. Run Option 8 (Verify) to confirm space was reclaimed",
    "4. If modern method fails, use Option 5 (Diskpart) instead",
];

/// What `main` should do after the startup checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Startup {
    Continue,
    Exit(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tool {
    Diskpart,
    OptimizeVhd,
}

/// Which files a compaction menu should work on.
enum Selection {
    All,
    One(usize),
}

pub struct WslManager<'a> {
    session: Session<'a>,
    settings: CompactorSettings,
    elevated: bool,
    local_app_data: Option<PathBuf>,
    inventory: DiskInventory,
}

impl<'a> WslManager<'a> {
    pub fn new(
        session: Session<'a>,
        settings: CompactorSettings,
        elevated: bool,
        local_app_data: Option<PathBuf>,
    ) -> Self {
        Self {
            session,
            settings,
            elevated,
            local_app_data,
            inventory: DiskInventory::default(),
        }
    }

    pub fn startup(&mut self, on_windows: bool) -> Result<Startup> {
        if !on_windows {
            self.session.console.error("This tool must be run on Windows!")?;
            self.session
                .console
                .info("This is the Windows-side companion to storage-manager")?;
            self.session
                .console
                .info("Use storage-manager on Linux/WSL instead")?;
            return Ok(Startup::Exit(1));
        }

        self.session.console.header("Windows WSL Storage Manager")?;
        if !self.elevated {
            self.session.console.warning("WARNING: Not running as Administrator!")?;
            self.session
                .console
                .warning("Most features require Administrator privileges")?;
            self.session.console.line("\nTo run as Administrator:")?;
            self.session
                .console
                .line("1. Right-click on PowerShell or Command Prompt")?;
            self.session.console.line("2. Select 'Run as Administrator'")?;
            self.session.console.line("3. Run wsl-compactor again\n")?;
            if !self.session.yes_no("Continue anyway?")? {
                self.session
                    .console
                    .info("Please restart as Administrator for full functionality")?;
                return Ok(Startup::Exit(0));
            }
        }

        if !wsl::is_installed(self.session.runner) {
            self.session
                .console
                .error("WSL does not appear to be installed or configured")?;
            self.session
                .console
                .info("Install WSL first: https://docs.microsoft.com/en-us/windows/wsl/install")?;
            return Ok(Startup::Exit(1));
        }
        Ok(Startup::Continue)
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            self.session.console.header("Windows WSL Storage Manager")?;
            if self.elevated {
                self.session
                    .console
                    .success("Running as Administrator - All features available")?;
            } else {
                self.session
                    .console
                    .error("NOT running as Administrator - Some features unavailable")?;
                self.session
                    .console
                    .warning("Please run as Administrator for full functionality")?;
            }

            self.session.console.bold("\nMain Menu:")?;
            let items = [
                "Show WSL Distributions & Disk Usage",
                "Find & Show VHDX Files",
                "Shutdown WSL",
                "Compact WSL Disks (Modern Method)",
                "Compact Using Diskpart (Manual)",
                "Compact Using Optimize-VHD (Hyper-V)",
                "Quick Compact All (Recommended)",
                "Verify Compaction Results",
                "Troubleshooting & Help",
            ];
            for (idx, label) in items.iter().enumerate() {
                self.session.console.item(&(idx + 1).to_string(), label)?;
            }
            self.session.console.item("0", "Exit")?;

            let choice = self.session.choose()?;
            let result = match choice.as_str() {
                "1" => self.show_distributions(),
                "2" => self.find_vhdx_files(),
                "3" => self.shutdown(),
                "4" => self.compact_sparse(),
                "5" => self.compact_with(Tool::Diskpart),
                "6" => self.compact_with(Tool::OptimizeVhd),
                "7" => self.quick_compact_all(),
                "8" => self.verify(),
                "9" => self.troubleshooting(),
                "0" => {
                    self.session
                        .console
                        .info("Exiting Windows Storage Manager. Goodbye!")?;
                    return Ok(());
                }
                _ => self
                    .session
                    .console
                    .error("Invalid option. Please try again.")
                    .map_err(Into::into),
            };
            self.session.settle(result)?;
            self.session.pause()?;
        }
    }

    fn require_admin(&mut self) -> Result<bool> {
        match require_elevated(self.elevated) {
            SafetyDecision::Allow => Ok(true),
            SafetyDecision::Deny(reason) => {
                self.session.console.error(&reason)?;
                self.session
                    .console
                    .info("Please restart this program as Administrator")?;
                Ok(false)
            }
        }
    }

    /// `wsl --shutdown` followed by the configured settle time.
    fn shutdown_and_wait(&mut self) -> Result<bool> {
        let out = wsl::shutdown(self.session.runner);
        if !out.success() {
            self.session
                .console
                .error(&format!("Failed to shutdown WSL: {}", out.trimmed()))?;
            return Ok(false);
        }
        self.session.console.info(&format!(
            "Waiting {} seconds for complete shutdown...",
            self.settings.shutdown_wait.as_secs()
        ))?;
        self.session.console.flush()?;
        std::thread::sleep(self.settings.shutdown_wait);
        Ok(true)
    }

    fn distros(&mut self) -> Result<Option<Vec<String>>> {
        match wsl::list_distros(self.session.runner) {
            Ok(distros) if distros.is_empty() => {
                self.session.console.warning("No WSL distributions found")?;
                Ok(None)
            }
            Ok(distros) => Ok(Some(distros)),
            Err(err) => {
                tracing::warn!(error = %err, "listing distributions failed");
                self.session.console.error("Failed to get WSL distributions")?;
                Ok(None)
            }
        }
    }

    fn show_distributions(&mut self) -> Result<()> {
        self.session.console.header("WSL Distributions")?;
        self.session.console.info("Checking WSL distributions...")?;
        let listing = self.session.capture(&list_verbose_spec());
        if !listing.success() {
            self.session.console.error("Failed to get WSL distributions")?;
            self.session
                .console
                .error("Make sure WSL is installed and configured")?;
            return Ok(());
        }
        self.session.console.bold("\nWSL Distributions:")?;
        self.session.console.output(&listing.output.replace('\0', ""))?;

        self.session.console.bold("\nDisk Usage in Distributions:")?;
        let Ok(distros) = wsl::list_distros(self.session.runner) else {
            return Ok(());
        };
        for distro in distros {
            self.session.console.line(&format!("\n{}:", distro))?;
            let usage = self.session.capture(&distro_usage_spec(&distro));
            if usage.success() {
                self.session.console.output(&usage.output)?;
            } else {
                self.session
                    .console
                    .warning(&format!("Could not get disk usage for {}", distro))?;
            }
        }
        Ok(())
    }

    fn find_vhdx_files(&mut self) -> Result<()> {
        self.session.console.header("Finding VHDX Files")?;
        self.session
            .console
            .info("Searching for VHDX files (this may take a minute)...")?;
        let Some(root) = self.local_app_data.clone() else {
            self.session.console.error("Could not find LOCALAPPDATA directory")?;
            return Ok(());
        };
        self.session
            .console
            .info(&format!("Searching in: {}", root.display()))?;

        self.inventory = DiskInventory::scan(&root);
        if self.inventory.is_empty() {
            self.session.console.warning("No VHDX files found")?;
            return Ok(());
        }

        self.session
            .console
            .bold(&format!("\nFound {} VHDX file(s):\n", self.inventory.len()))?;
        let lines: Vec<String> = self
            .inventory
            .numbered()
            .map(|(number, disk)| {
                format!(
                    "{}. {}\n   Size: {} ({:.2} GB)\n   Path: {}\n",
                    number,
                    disk.owner_label,
                    format_size(disk.size_bytes),
                    disk.size_gb(),
                    disk.path.display()
                )
            })
            .collect();
        for line in lines {
            self.session.console.line(&line)?;
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.session.console.header("Shutdown WSL")?;
        self.session
            .console
            .warning("This will shutdown ALL running WSL distributions")?;
        self.session.console.info("Any unsaved work in WSL will be lost!")?;
        if !self.session.yes_no("\nProceed with shutdown?")? {
            self.session.console.warning("Shutdown cancelled")?;
            return Ok(());
        }
        self.session.console.info("Shutting down WSL...")?;
        if self.shutdown_and_wait()? {
            self.session.console.success("WSL shutdown successfully")?;
        }
        Ok(())
    }

    fn compact_sparse(&mut self) -> Result<()> {
        if !self.require_admin()? {
            return Ok(());
        }
        self.session.console.header("Compact WSL Disks (Modern Method)")?;
        let Some(distros) = self.distros()? else {
            return Ok(());
        };

        self.session.console.bold("Available distributions:")?;
        for (idx, distro) in distros.iter().enumerate() {
            self.session.console.line(&format!("{}. {}", idx + 1, distro))?;
        }
        self.session.console.bold("\nOptions:")?;
        self.session.console.line("A. Compact all distributions")?;
        self.session.console.line("S. Select specific distribution")?;
        self.session.console.line("C. Cancel")?;

        let choice = self.session.ask("\nYour choice: ")?.to_uppercase();
        let picked: Vec<String> = match choice.as_str() {
            "C" => {
                self.session.console.warning("Compaction cancelled")?;
                return Ok(());
            }
            "A" => distros,
            "S" => {
                let answer = self.session.ask("Enter distribution number: ")?;
                match answer.parse::<usize>() {
                    Ok(number) if (1..=distros.len()).contains(&number) => {
                        vec![distros[number - 1].clone()]
                    }
                    Ok(_) => {
                        self.session.console.error("Invalid selection")?;
                        return Ok(());
                    }
                    Err(_) => {
                        self.session.console.error("Invalid input")?;
                        return Ok(());
                    }
                }
            }
            _ => {
                self.session.console.error("Invalid choice")?;
                return Ok(());
            }
        };

        self.session.console.info("Shutting down WSL first...")?;
        if !self.shutdown_and_wait()? {
            return Ok(());
        }

        self.session.console.bold("\nCompacting distributions...\n")?;
        for distro in &picked {
            self.session.console.line(&format!("Compacting: {}", distro))?;
            let spec = set_sparse_spec(distro).timeout(self.settings.compact_timeout);
            let out = run_lossy(self.session.runner, &spec);
            if out.success() {
                self.session
                    .console
                    .success(&format!("Successfully compacted {}", distro))?;
            } else if is_unsupported_diagnostic(&out.output) {
                self.session
                    .console
                    .warning(&format!("Modern method not supported for {}", distro))?;
                self.session
                    .console
                    .info("Try using Diskpart method (Option 5) instead")?;
            } else if out.trimmed().is_empty() {
                self.session.console.error(&format!(
                    "Failed to compact {} (exit code {})",
                    distro, out.code
                ))?;
            } else {
                self.session
                    .console
                    .error(&format!("Failed to compact {}: {}", distro, out.trimmed()))?;
            }
        }

        self.session.console.success("\nCompaction process completed!")?;
        self.session
            .console
            .info("Check your disk space to verify space was reclaimed")
            .map_err(Into::into)
    }

    /// Menus 5 and 6: one tool against one or all discovered files.
    fn compact_with(&mut self, tool: Tool) -> Result<()> {
        if !self.require_admin()? {
            return Ok(());
        }
        match tool {
            Tool::Diskpart => self.session.console.header("Compact Using Diskpart (Manual Method)")?,
            Tool::OptimizeVhd => {
                self.session
                    .console
                    .header("Compact Using Optimize-VHD (Hyper-V Method)")?;
                self.session
                    .console
                    .info("Checking if Optimize-VHD is available (requires Hyper-V)...")?;
                if !optimize_vhd_available(self.session.runner) {
                    self.session.console.error("Optimize-VHD cmdlet not found")?;
                    self.session
                        .console
                        .warning("This requires Hyper-V to be installed")?;
                    self.session
                        .console
                        .info("Install Hyper-V or use Diskpart method (Option 5) instead")?;
                    return Ok(());
                }
            }
        }

        if self.inventory.is_empty() {
            self.session.console.info("Finding VHDX files first...")?;
            self.find_vhdx_files()?;
        }
        if self.inventory.is_empty() {
            self.session.console.error("No VHDX files found to compact")?;
            return Ok(());
        }

        let Some(selection) = self.select_disk()? else {
            return Ok(());
        };
        let disks: Vec<VirtualDiskRecord> = match selection {
            Selection::All => self.inventory.disks().to_vec(),
            Selection::One(number) => self.inventory.get(number).cloned().into_iter().collect(),
        };

        self.session.console.info("\nShutting down WSL first...")?;
        if !self.shutdown_and_wait()? {
            return Ok(());
        }

        let runner = self.session.runner;
        let timeout = self.settings.compact_timeout;
        let method: Box<dyn CompactionMethod + 'a> = match tool {
            Tool::Diskpart => Box::new(DiskpartMethod::new(runner, timeout)),
            Tool::OptimizeVhd => Box::new(OptimizeVhdMethod::new(runner, timeout)),
        };
        let mut selector = CompactionSelector::new(vec![method], Box::new(FsSizeProbe), Capabilities { hyperv: true });

        let (heading, verb, done, failed) = match tool {
            Tool::Diskpart => (
                "\nCompacting VHDX files using Diskpart...\n",
                "Compacting",
                "Compaction completed!",
                "Diskpart failed",
            ),
            Tool::OptimizeVhd => (
                "\nOptimizing VHDX files...\n",
                "Optimizing",
                "Optimization completed!",
                "Optimize-VHD failed",
            ),
        };
        self.session.console.bold(heading)?;
        for disk in disks {
            self.session
                .console
                .line(&format!("{}: {}", verb, disk.file_name()))?;
            self.session
                .console
                .line(&format!("Path: {}", disk.path.display()))?;
            self.session
                .console
                .line(&format!("Size before: {}", format_size(disk.size_bytes)))?;
            self.session.console.info("Running (this may take several minutes)...")?;
            self.session.console.flush()?;

            let target = CompactionTarget::new(disk, None);
            let outcome = selector.compact(&target);
            if outcome.ok {
                self.session.console.success(done)?;
                if let Some(after) = FsSizeProbe.size_of(target.path()) {
                    self.session
                        .console
                        .line(&format!("Size after: {}", format_size(after)))?;
                    self.session
                        .console
                        .line(&format!("Space saved: {}", format_size(outcome.bytes_saved)))?;
                }
            } else {
                let reason = outcome.error_message.unwrap_or_default();
                self.session.console.error(&format!("{}: {}", failed, reason))?;
            }
            self.session.console.blank()?;
        }
        Ok(())
    }

    fn select_disk(&mut self) -> Result<Option<Selection>> {
        self.session.console.bold("\nSelect VHDX file to compact:")?;
        let lines: Vec<String> = self
            .inventory
            .numbered()
            .map(|(number, disk)| format!("{}. {} ({:.2} GB)", number, disk.file_name(), disk.size_gb()))
            .collect();
        for line in lines {
            self.session.console.line(&line)?;
        }
        self.session.console.line("A. Compact all")?;
        self.session.console.line("C. Cancel")?;

        let choice = self.session.ask("\nYour choice: ")?.to_uppercase();
        match choice.as_str() {
            "C" => {
                self.session.console.warning("Compaction cancelled")?;
                Ok(None)
            }
            "A" => Ok(Some(Selection::All)),
            other => match other.parse::<usize>() {
                Ok(number) if self.inventory.get(number).is_some() => Ok(Some(Selection::One(number))),
                Ok(_) => {
                    self.session.console.error("Invalid selection")?;
                    Ok(None)
                }
                Err(_) => {
                    self.session.console.error("Invalid input")?;
                    Ok(None)
                }
            },
        }
    }

    fn quick_compact_all(&mut self) -> Result<()> {
        if !self.require_admin()? {
            return Ok(());
        }
        self.session.console.header("Quick Compact All WSL Disks")?;
        self.session
            .console
            .warning("This will compact ALL WSL distributions to reclaim disk space")?;
        self.session
            .console
            .info("This is the recommended option after cleaning up files in WSL")?;
        self.session.console.bold("\nThis will:")?;
        self.session.console.line("  1. Shutdown all WSL instances")?;
        self.session.console.line("  2. Compact all WSL distribution disks")?;
        self.session
            .console
            .line("  3. Compact Docker Desktop disk (if present)\n")?;
        self.session
            .console
            .warning("Estimated time: 5-30 minutes depending on disk sizes")?;

        if !self.session.yes_no("\nProceed with compaction?")? {
            self.session.console.warning("Compaction cancelled")?;
            return Ok(());
        }
        let Some(distros) = self.distros()? else {
            return Ok(());
        };

        let free_before = free_space_bytes(&system_drive_root()).ok();
        self.session.console.info("\nStep 1: Shutting down WSL...")?;
        if !self.shutdown_and_wait()? {
            return Ok(());
        }
        self.session.console.success("WSL shutdown complete")?;

        self.session.console.bold("\nStep 2: Compacting distributions...\n")?;
        let runner = self.session.runner;
        let timeout = self.settings.compact_timeout;
        let capabilities = Capabilities {
            hyperv: optimize_vhd_available(runner),
        };
        tracing::info!(hyperv = capabilities.hyperv, "probed compaction capabilities");
        let mut selector = CompactionSelector::new(standard_methods(runner, timeout), Box::new(FsSizeProbe), capabilities);

        let mut succeeded = 0usize;
        let mut failed = 0usize;
        let mut entries = Vec::new();

        for distro in &distros {
            self.session.console.line(&format!("Compacting: {}", distro))?;
            match wsl::vhdx_from_registry(runner, distro) {
                Some(path) => {
                    let record = disk_record(path, None);
                    let target = CompactionTarget::new(record, Some(distro.clone()));
                    let outcome = selector.compact(&target);
                    if self.announce(distro, &outcome)? {
                        succeeded += 1;
                    } else {
                        failed += 1;
                    }
                    entries.push(CompactionEntry {
                        disk: target.record,
                        distro: Some(distro.clone()),
                        outcome,
                    });
                }
                None => {
                    // No disk path to measure; the sparse setting still applies by name.
                    let spec = set_sparse_spec(distro).timeout(timeout);
                    if run_lossy(runner, &spec).success() {
                        self.session
                            .console
                            .success(&format!("{} compacted successfully", distro))?;
                        succeeded += 1;
                    } else {
                        self.session
                            .console
                            .error(&format!("Could not locate VHDX for {}", distro))?;
                        failed += 1;
                    }
                }
            }
        }

        if let Some(path) = self.local_app_data.as_deref().and_then(wsl::docker_desktop_vhdx) {
            self.session
                .console
                .bold("\nStep 3: Compacting Docker Desktop disk...\n")?;
            let target = CompactionTarget::new(disk_record(path, Some("Docker Desktop")), None);
            let outcome = selector.compact(&target);
            if self.announce("Docker Desktop", &outcome)? {
                succeeded += 1;
            } else {
                failed += 1;
            }
            entries.push(CompactionEntry {
                disk: target.record,
                distro: None,
                outcome,
            });
        }

        self.session.console.bold("\nCompaction Summary:")?;
        self.session
            .console
            .line(&format!("  Successfully compacted: {}", succeeded))?;
        if failed > 0 {
            self.session.console.line(&format!("  Failed: {}", failed))?;
        }

        if let Some(base) = self.settings.report_dir.clone() {
            let free_after = free_space_bytes(&system_drive_root()).ok();
            let report = CompactionReport::new(entries, free_before, free_after);
            match write_compaction_report(&base, &report) {
                Ok(paths) => self
                    .session
                    .console
                    .info(&format!("Report written to {}", paths.compaction_json.display()))?,
                Err(err) => self
                    .session
                    .console
                    .error(&format!("Could not write report: {:#}", err))?,
            }
        }

        self.session.console.success("\nCompaction process completed!")?;
        self.session
            .console
            .info("Check your Windows disk space to see reclaimed space")?;
        self.session
            .console
            .info("Run Option 8 (Verify Compaction Results) to confirm")
            .map_err(Into::into)
    }

    /// Print one selector outcome; returns whether it succeeded.
    fn announce(&mut self, label: &str, outcome: &CompactionOutcome) -> Result<bool> {
        if outcome.ok {
            let method = outcome.method.map(|kind| kind.as_str()).unwrap_or("unknown");
            self.session.console.success(&format!(
                "{} compacted via {} ({} saved)",
                label,
                method,
                format_size(outcome.bytes_saved)
            ))?;
        } else {
            let reason = outcome.error_message.as_deref().unwrap_or("no method succeeded");
            self.session
                .console
                .error(&format!("Failed to compact {}: {}", label, reason))?;
        }
        Ok(outcome.ok)
    }

    fn verify(&mut self) -> Result<()> {
        self.session.console.header("Verify Compaction Results")?;
        self.session
            .console
            .info("Checking VHDX file sizes and disk space...")?;
        self.find_vhdx_files()?;

        self.session.console.bold("\nWindows Disk Space:")?;
        let usage = self.session.capture(&drive_usage_spec());
        if usage.success() {
            self.session.console.output(&usage.output)?;
        }

        self.session.console.bold("\nTips:")?;
        self.session
            .console
            .line("• Compare VHDX file sizes with what you expect after cleanup")?;
        self.session
            .console
            .line("• Check Windows C: drive free space - it should have increased")?;
        self.session
            .console
            .line("• If space wasn't reclaimed, try the Diskpart method (Option 5)")
            .map_err(Into::into)
    }

    fn troubleshooting(&mut self) -> Result<()> {
        self.session.console.header("Troubleshooting & Help")?;
        self.session.console.bold("Common Issues and Solutions:\n")?;
        for (issue, lines) in TROUBLESHOOTING {
            self.session.console.line(issue)?;
            for line in *lines {
                self.session.console.line(&format!("   {}", line))?;
            }
            self.session.console.blank()?;
        }
        self.session.console.bold("Recommended Workflow:")?;
        for line in WORKFLOW {
            self.session.console.line(line)?;
        }
        self.session.console.bold("\nNeed more help?")?;
        self.session
            .console
            .line("• WSL documentation: https://docs.microsoft.com/en-us/windows/wsl/")
            .map_err(Into::into)
    }
}

fn disk_record(path: PathBuf, label: Option<&str>) -> VirtualDiskRecord {
    let label = label.unwrap_or_else(|| owner_label(&path));
    VirtualDiskRecord::from_file(&path, label).unwrap_or_else(|| VirtualDiskRecord::new(path, 0, label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::console;
    use crate::ui::capture::Captured;
    use reclaim_compaction::MethodKind;
    use reclaim_exec::testing::ScriptedRunner;
    use reclaim_report::read_compaction_report;
    use reclaim_safety::testing::ScriptedPrompter;
    use std::path::Path;
    use std::time::Duration;

    fn settings(report_dir: Option<PathBuf>) -> CompactorSettings {
        CompactorSettings {
            compact_timeout: Duration::from_secs(60),
            shutdown_wait: Duration::ZERO,
            report_dir,
        }
    }

    fn manager<'a>(
        runner: &'a ScriptedRunner,
        prompter: &'a mut ScriptedPrompter,
        elevated: bool,
        local_app_data: Option<&Path>,
        report_dir: Option<PathBuf>,
    ) -> (WslManager<'a>, Captured) {
        let (console, buffer) = console();
        let session = Session::new(runner, prompter, console);
        let manager = WslManager::new(
            session,
            settings(report_dir),
            elevated,
            local_app_data.map(Path::to_path_buf),
        );
        (manager, buffer)
    }

    fn write_disk(root: &Path, relative: &str, len: usize) -> PathBuf {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, vec![0u8; len]).unwrap();
        path
    }

    #[test]
    fn refuses_other_platforms() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&[]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, true, None, None);
        assert_eq!(manager.startup(false).unwrap(), Startup::Exit(1));
        assert!(buffer.text().contains("must be run on Windows"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn non_admin_can_decline_and_exit_cleanly() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["n"]);
        let (mut manager, _) = manager(&runner, &mut prompter, false, None, None);
        assert_eq!(manager.startup(true).unwrap(), Startup::Exit(0));
        assert!(!runner.ran("wsl --list"));
    }

    #[test]
    fn missing_wsl_fails_startup() {
        let runner = ScriptedRunner::new().on("wsl --list", 1, "not installed");
        let mut prompter = ScriptedPrompter::new(&[]);
        let (mut manager, _) = manager(&runner, &mut prompter, true, None, None);
        assert_eq!(manager.startup(true).unwrap(), Startup::Exit(1));

        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["y"]);
        let (mut manager, _) = self::manager(&runner, &mut prompter, false, None, None);
        assert_eq!(manager.startup(true).unwrap(), Startup::Continue);
    }

    #[test]
    fn compaction_requires_admin() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["7", "", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, false, None, None);
        manager.run().unwrap();
        assert!(buffer
            .text()
            .contains("This operation requires Administrator privileges"));
        assert!(!runner.ran("wsl --shutdown"));
    }

    #[test]
    fn lists_discovered_disks_with_labels() {
        let dir = tempfile::tempdir().unwrap();
        write_disk(dir.path(), "Docker/wsl/data/ext4.vhdx", 2048);
        write_disk(dir.path(), "Packages/CanonicalGroupLimited.Ubuntu22.04LTS/LocalState/ext4.vhdx", 1024);
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["2", "", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, true, Some(dir.path()), None);
        manager.run().unwrap();
        let text = buffer.text();
        assert!(text.contains("Found 2 VHDX file(s)"));
        let docker = text.find("1. Docker").unwrap();
        let ubuntu = text.find("2. Ubuntu 22.04").unwrap();
        assert!(docker < ubuntu);
        assert!(text.contains("Size: 2.00 KB"));
    }

    #[test]
    fn shutdown_can_be_cancelled() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["3", "n", "", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, true, None, None);
        manager.run().unwrap();
        assert!(buffer.text().contains("Shutdown cancelled"));
        assert!(!runner.ran("wsl --shutdown"));
    }

    #[test]
    fn sparse_menu_reports_unsupported_wsl() {
        let runner = ScriptedRunner::new()
            .on("wsl --list --quiet", 0, "Ubuntu\r\ndocker-desktop\r\n")
            .on("--set-sparse", 1, "Invalid command line option: --manage");
        let mut prompter = ScriptedPrompter::new(&["4", "S", "1", "", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, true, None, None);
        manager.run().unwrap();
        let text = buffer.text();
        assert!(text.contains("Modern method not supported for Ubuntu"));
        assert!(text.contains("Try using Diskpart method (Option 5) instead"));
        assert_eq!(runner.count("--set-sparse"), 1);
        assert!(runner.ran("wsl --shutdown"));
        let sparse = runner
            .calls()
            .into_iter()
            .find(|spec| spec.command_line().contains("--set-sparse"))
            .unwrap();
        assert_eq!(sparse.timeout_duration(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn sparse_menu_rejects_out_of_range_selection() {
        let runner = ScriptedRunner::new().on("wsl --list --quiet", 0, "Ubuntu\n");
        let mut prompter = ScriptedPrompter::new(&["4", "S", "5", "", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, true, None, None);
        manager.run().unwrap();
        assert!(buffer.text().contains("Invalid selection"));
        assert!(!runner.ran("wsl --shutdown"));
    }

    #[test]
    fn diskpart_menu_compacts_selected_file() {
        let dir = tempfile::tempdir().unwrap();
        let disk = write_disk(dir.path(), "Docker/wsl/data/ext4.vhdx", 4096);
        let runner = ScriptedRunner::new().with_tools(&["diskpart"]);
        let mut prompter = ScriptedPrompter::new(&["5", "1", "", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, true, Some(dir.path()), None);
        manager.run().unwrap();
        assert!(runner.ran(&format!("select vdisk file=\"{}\"", disk.display())));
        assert!(buffer.text().contains("Compaction completed!"));
        assert!(buffer.text().contains("Space saved: 0.00 B"));
    }

    #[test]
    fn optimize_menu_needs_hyperv() {
        let dir = tempfile::tempdir().unwrap();
        write_disk(dir.path(), "Docker/wsl/data/ext4.vhdx", 4096);
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["6", "", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, true, Some(dir.path()), None);
        manager.run().unwrap();
        assert!(buffer.text().contains("Optimize-VHD cmdlet not found"));
        assert!(!runner.ran("-Mode Full"));
    }

    #[test]
    fn quick_compact_all_uses_selector_and_writes_report() {
        let apps = tempfile::tempdir().unwrap();
        let reports = tempfile::tempdir().unwrap();
        let ubuntu = write_disk(apps.path(), "Packages/Ubuntu/LocalState/ext4.vhdx", 100);
        write_disk(apps.path(), "Docker/wsl/data/ext4.vhdx", 100);

        let runner = ScriptedRunner::new()
            .with_tools(&["diskpart"])
            .on("wsl --list --quiet", 0, "Ubuntu\nDebian\n")
            .on("Get-Command Optimize-VHD", 0, "")
            .on("$name = \"Ubuntu\"", 0, &format!("{}\n", ubuntu.display()))
            .on("$name = \"Debian\"", 2, "")
            .on("--set-sparse true", 1, "Invalid command line option: --manage");
        let mut prompter = ScriptedPrompter::new(&["7", "y", "", "0"]);
        let (mut manager, buffer) = manager(
            &runner,
            &mut prompter,
            true,
            Some(apps.path()),
            Some(reports.path().to_path_buf()),
        );
        manager.run().unwrap();

        let text = buffer.text();
        assert!(text.contains("Ubuntu compacted via diskpart"), "{}", text);
        assert!(text.contains("Could not locate VHDX for Debian"));
        assert!(text.contains("Docker Desktop compacted via diskpart"));
        assert!(text.contains("Successfully compacted: 2"));
        assert!(text.contains("Failed: 1"));
        assert!(!runner.ran("Optimize-VHD -Path"));
        assert_eq!(runner.count("compact vdisk"), 2);

        let run_dir = std::fs::read_dir(reports.path().join("reports"))
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let report = read_compaction_report(run_dir.join("compaction.json")).unwrap();
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.entries[0].distro.as_deref(), Some("Ubuntu"));
        assert_eq!(report.entries[0].outcome.method, Some(MethodKind::Diskpart));
    }

    #[test]
    fn quick_compact_all_cancelled_does_nothing() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["7", "n", "", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, true, None, None);
        manager.run().unwrap();
        assert!(buffer.text().contains("Compaction cancelled"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn troubleshooting_mentions_timeout_flag() {
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::new(&["9", "", "0"]);
        let (mut manager, buffer) = manager(&runner, &mut prompter, false, None, None);
        manager.run().unwrap();
        assert!(buffer.text().contains("--compact-timeout-secs"));
    }
}
