use crate::wsl::{escape_double_quoted, set_sparse_spec};
use reclaim_compaction::{CompactionMethod, CompactionTarget, MethodKind, MethodReport};
use reclaim_exec::{run_lossy, CommandOutput, CommandSpec, ExecError, Runner};
use std::io;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1800);

pub fn diskpart_script(path: &Path) -> String {
    format!(
        "select vdisk file=\"{}\"\nattach vdisk readonly\ncompact vdisk\ndetach vdisk\nexit\n",
        path.display()
    )
}

pub fn optimize_vhd_script(path: &Path) -> String {
    format!(
        "Optimize-VHD -Path \"{}\" -Mode Full",
        escape_double_quoted(&path.display().to_string())
    )
}

/// Whether Hyper-V's `Optimize-VHD` cmdlet is installed.
pub fn optimize_vhd_available(runner: &dyn Runner) -> bool {
    let out = run_lossy(
        runner,
        &CommandSpec::powershell(
            "Get-Command Optimize-VHD -ErrorAction SilentlyContinue | Select-Object -First 1",
        ),
    );
    out.success() && !out.trimmed().is_empty()
}

fn report_from(result: Result<CommandOutput, ExecError>) -> MethodReport {
    match result {
        Ok(out) if out.success() => MethodReport::succeeded(),
        Ok(out) if out.trimmed().is_empty() => MethodReport::failed(format!("exit code {}", out.code)),
        Ok(out) => MethodReport::failed(out.output),
        Err(err @ ExecError::TimedOut { .. }) => MethodReport::timed_out(err.to_string()),
        Err(ExecError::Spawn { program, source }) if source.kind() == io::ErrorKind::NotFound => {
            MethodReport::tool_missing(format!("{} not found", program))
        }
        Err(err) => MethodReport::failed(err.to_string()),
    }
}

/// `wsl --manage <distro> --set-sparse true`; needs the owning distribution.
pub struct SparseMethod<'a> {
    runner: &'a dyn Runner,
    timeout: Duration,
}

impl<'a> SparseMethod<'a> {
    pub fn new(runner: &'a dyn Runner, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

impl CompactionMethod for SparseMethod<'_> {
    fn kind(&self) -> MethodKind {
        MethodKind::Sparse
    }

    fn applies_to(&self, target: &CompactionTarget) -> bool {
        target.distro.is_some()
    }

    fn compact(&self, target: &CompactionTarget) -> MethodReport {
        let Some(distro) = target.distro.as_deref() else {
            return MethodReport::tool_missing("no registered distribution");
        };
        report_from(self.runner.run(&set_sparse_spec(distro).timeout(self.timeout)))
    }
}

pub struct OptimizeVhdMethod<'a> {
    runner: &'a dyn Runner,
    timeout: Duration,
}

impl<'a> OptimizeVhdMethod<'a> {
    pub fn new(runner: &'a dyn Runner, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

impl CompactionMethod for OptimizeVhdMethod<'_> {
    fn kind(&self) -> MethodKind {
        MethodKind::OptimizeVhd
    }

    fn compact(&self, target: &CompactionTarget) -> MethodReport {
        let spec = CommandSpec::powershell(optimize_vhd_script(target.path())).timeout(self.timeout);
        report_from(self.runner.run(&spec))
    }
}

/// Feeds a `compact vdisk` script to diskpart on stdin.
pub struct DiskpartMethod<'a> {
    runner: &'a dyn Runner,
    timeout: Duration,
}

impl<'a> DiskpartMethod<'a> {
    pub fn new(runner: &'a dyn Runner, timeout: Duration) -> Self {
        Self { runner, timeout }
    }
}

impl CompactionMethod for DiskpartMethod<'_> {
    fn kind(&self) -> MethodKind {
        MethodKind::Diskpart
    }

    fn compact(&self, target: &CompactionTarget) -> MethodReport {
        if !self.runner.has_tool("diskpart") {
            return MethodReport::tool_missing("diskpart not found");
        }
        let spec = CommandSpec::new("diskpart")
            .stdin(diskpart_script(target.path()))
            .timeout(self.timeout);
        report_from(self.runner.run(&spec))
    }
}

pub fn standard_methods<'a>(runner: &'a dyn Runner, timeout: Duration) -> Vec<Box<dyn CompactionMethod + 'a>> {
    vec![
        Box::new(SparseMethod::new(runner, timeout)),
        Box::new(OptimizeVhdMethod::new(runner, timeout)),
        Box::new(DiskpartMethod::new(runner, timeout)),
    ]
}
