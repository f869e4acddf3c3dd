//! Windows host glue for WSL disk maintenance: locating VHDX images,
//! driving `wsl.exe`, and the three compaction methods.

pub mod discovery;
pub mod methods;
pub mod wsl;

#[cfg(windows)]
mod elevation;
#[cfg(not(windows))]
#[path = "elevation_stub.rs"]
mod elevation;

#[cfg(windows)]
mod space;
#[cfg(not(windows))]
#[path = "space_stub.rs"]
mod space;

pub use discovery::{discover_virtual_disks, local_app_data, owner_label, DiskInventory};
pub use elevation::is_elevated;
pub use methods::{
    diskpart_script, optimize_vhd_available, standard_methods, DiskpartMethod, OptimizeVhdMethod,
    SparseMethod, DEFAULT_TIMEOUT,
};
pub use space::free_space_bytes;

use reclaim_exec::CommandSpec;
use std::path::PathBuf;

/// Root of the system drive, `C:\` unless `%SystemDrive%` says otherwise.
pub fn system_drive_root() -> PathBuf {
    let drive = std::env::var("SystemDrive")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "C:".to_string());
    PathBuf::from(format!("{}\\", drive.trim_end_matches('\\')))
}

/// Per-drive used/free/total table in GB.
pub fn drive_usage_spec() -> CommandSpec {
    CommandSpec::powershell(
        "Get-PSDrive -PSProvider FileSystem | Where-Object {$_.Used -ne $null} | Format-Table Name, \
         @{Label='Used(GB)';Expression={[math]::Round($_.Used/1GB,2)}}, \
         @{Label='Free(GB)';Expression={[math]::Round($_.Free/1GB,2)}}, \
         @{Label='Total(GB)';Expression={[math]::Round(($_.Used+$_.Free)/1GB,2)}} -AutoSize",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_usage_reports_gigabytes() {
        let spec = drive_usage_spec();
        let script = spec.arguments().last().unwrap();
        assert!(script.starts_with("Get-PSDrive -PSProvider FileSystem"));
        assert!(script.contains("Label='Total(GB)'"));
        assert!(spec.is_captured());
    }

    #[cfg(not(windows))]
    #[test]
    fn stubs_report_unsupported_host() {
        assert!(!is_elevated());
        assert!(free_space_bytes(std::path::Path::new("/")).is_err());
    }
}
