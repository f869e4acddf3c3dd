use anyhow::{anyhow, Result};
use reclaim_exec::CommandSpec;
use std::path::Path;

/// Bytes available to unprivileged users on the filesystem holding `path`.
#[cfg(unix)]
pub fn free_space_bytes(path: &Path) -> Result<u64> {
    use libc::statvfs;
    use std::ffi::CString;
    use std::mem::MaybeUninit;

    let c_path = CString::new(path.display().to_string())
        .map_err(|_| anyhow!("invalid path {}", path.display()))?;
    let mut stats = MaybeUninit::zeroed();
    let result = unsafe { statvfs(c_path.as_ptr(), stats.as_mut_ptr()) };
    if result != 0 {
        return Err(anyhow!(
            "statvfs failed for {}: {}",
            path.display(),
            std::io::Error::last_os_error()
        ));
    }
    let stats: libc::statvfs = unsafe { stats.assume_init() };
    Ok((stats.f_bavail as u64).saturating_mul(stats.f_frsize as u64))
}

#[cfg(not(unix))]
pub fn free_space_bytes(path: &Path) -> Result<u64> {
    Err(anyhow!("free space query for {} requires a Unix host", path.display()))
}

pub fn current_usage_spec() -> CommandSpec {
    CommandSpec::shell("df -h /").captured()
}

/// Well-known directories that tend to grow, with a short description.
pub const SPACE_HOGS: &[(&str, &str)] = &[
    ("/var/lib/docker", "Docker storage"),
    ("/var/log", "System logs"),
    ("/var/cache/apt", "APT cache"),
    ("/var/lib/apt", "APT library"),
    ("/var/lib/snapd", "Snap packages"),
    ("/tmp", "Temporary files"),
    ("/var/tmp", "Variable temporary files"),
];

/// First whitespace-separated field of `du -sh` output, e.g. `1.2G`.
pub fn first_field(output: &str) -> Option<&str> {
    output.split_whitespace().next()
}
