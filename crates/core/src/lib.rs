use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;

pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// A virtual disk image found on the host, with the label of whatever owns it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct VirtualDiskRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub owner_label: String,
}

impl VirtualDiskRecord {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64, owner_label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size_bytes,
            owner_label: owner_label.into(),
        }
    }

    /// Build a record from the file on disk. Missing files yield `None`.
    pub fn from_file(path: impl AsRef<Path>, owner_label: impl Into<String>) -> Option<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).ok()?;
        if !meta.is_file() {
            return None;
        }
        Some(Self::new(path, meta.len(), owner_label))
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn size_gb(&self) -> f64 {
        bytes_to_gb(self.size_bytes)
    }
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

/// Human readable size with two decimals, e.g. `1.50 GB`.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if value < 1024.0 {
            return format!("{:.2} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2} PB", value)
}

pub fn now_utc_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
