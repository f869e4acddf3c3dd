use anyhow::{anyhow, Result};
use reclaim_exec::{run_lossy, CommandOutput, CommandSpec, Runner};
use std::path::{Path, PathBuf};

/// Escape a value for use inside a double-quoted PowerShell string.
pub fn escape_double_quoted(value: &str) -> String {
    value.replace('`', "``").replace('"', "`\"")
}

/// Parse `wsl --list --quiet` output.
///
/// wsl.exe writes UTF-16, so captured text often carries NULs and a BOM.
/// Blank lines are dropped and duplicates removed, keeping first-seen order.
pub fn parse_quiet_list(output: &str) -> Vec<String> {
    let mut distros: Vec<String> = Vec::new();
    for raw in output.lines() {
        let cleaned = raw.replace('\0', "");
        let cleaned = cleaned.trim().trim_start_matches('\u{feff}').trim();
        if cleaned.is_empty() || distros.iter().any(|known| known == cleaned) {
            continue;
        }
        distros.push(cleaned.to_string());
    }
    distros
}

pub fn list_quiet_spec() -> CommandSpec {
    CommandSpec::powershell("wsl --list --quiet")
}

pub fn list_verbose_spec() -> CommandSpec {
    CommandSpec::powershell("wsl --list --verbose")
}

pub fn shutdown_spec() -> CommandSpec {
    CommandSpec::powershell("wsl --shutdown")
}

pub fn distro_usage_spec(distro: &str) -> CommandSpec {
    CommandSpec::powershell(format!("wsl -d \"{}\" df -h /", escape_double_quoted(distro)))
}

pub fn set_sparse_spec(distro: &str) -> CommandSpec {
    CommandSpec::powershell(format!(
        "wsl --manage \"{}\" --set-sparse true",
        escape_double_quoted(distro)
    ))
}

pub fn is_installed(runner: &dyn Runner) -> bool {
    run_lossy(runner, &CommandSpec::powershell("wsl --list")).success()
}

pub fn list_distros(runner: &dyn Runner) -> Result<Vec<String>> {
    let out = run_lossy(runner, &list_quiet_spec());
    if !out.success() {
        return Err(anyhow!("failed to list WSL distributions: {}", out.trimmed()));
    }
    Ok(parse_quiet_list(&out.output))
}

pub fn shutdown(runner: &dyn Runner) -> CommandOutput {
    tracing::info!("shutting down WSL");
    run_lossy(runner, &shutdown_spec())
}

/// PowerShell that prints `<BasePath>\ext4.vhdx` for a registered distro.
/// Exits 2 when the distro is unknown and 3 when it has no base path.
pub fn registry_lookup_script(distro: &str) -> String {
    format!(
        r#"
$ErrorActionPreference = 'SilentlyContinue'
$name = "{}"
$key = 'HKCU:\Software\Microsoft\Windows\CurrentVersion\Lxss'
$item = Get-ChildItem -Path $key | ForEach-Object {{ Get-ItemProperty $_.PSPath }} | Where-Object {{ $_.DistributionName -eq $name }} | Select-Object -First 1
if ($null -eq $item) {{ exit 2 }}
$base = $item.BasePath
if ([string]::IsNullOrWhiteSpace($base)) {{ exit 3 }}
$vhdx = Join-Path -Path $base -ChildPath 'ext4.vhdx'
Write-Output $vhdx
"#,
        escape_double_quoted(distro)
    )
}

/// Last non-empty line of the lookup output, if any.
pub fn parse_registry_output(output: &str) -> Option<PathBuf> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from)
}

pub fn vhdx_from_registry(runner: &dyn Runner, distro: &str) -> Option<PathBuf> {
    let out = run_lossy(runner, &CommandSpec::powershell(registry_lookup_script(distro)));
    if !out.success() {
        tracing::debug!(distro, code = out.code, "registry lookup found no disk");
        return None;
    }
    parse_registry_output(&out.output).filter(|path| path.exists())
}

pub fn docker_desktop_vhdx(local_app_data: &Path) -> Option<PathBuf> {
    let candidate = local_app_data
        .join("Docker")
        .join("wsl")
        .join("data")
        .join("ext4.vhdx");
    candidate.exists().then_some(candidate)
}
