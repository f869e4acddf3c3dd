use anyhow::{Context, Result};
use reclaim_compaction::CompactionOutcome;
use reclaim_core::{now_utc_rfc3339, VirtualDiskRecord, REPORT_SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ReportPaths {
    pub run_id: String,
    pub root: PathBuf,
    pub compaction_json: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionEntry {
    pub disk: VirtualDiskRecord,
    pub distro: Option<String>,
    pub outcome: CompactionOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionReport {
    pub run_id: String,
    pub created_at_utc: String,
    pub schema_version: String,
    pub free_bytes_before: Option<u64>,
    pub free_bytes_after: Option<u64>,
    pub succeeded: usize,
    pub failed: usize,
    pub total_bytes_saved: u64,
    pub entries: Vec<CompactionEntry>,
}

impl CompactionReport {
    pub fn new(entries: Vec<CompactionEntry>, free_bytes_before: Option<u64>, free_bytes_after: Option<u64>) -> Self {
        let succeeded = entries.iter().filter(|entry| entry.outcome.ok).count();
        let total_bytes_saved = entries.iter().map(|entry| entry.outcome.bytes_saved).sum();
        Self {
            run_id: Uuid::new_v4().to_string(),
            created_at_utc: now_utc_rfc3339(),
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            free_bytes_before,
            free_bytes_after,
            succeeded,
            failed: entries.len() - succeeded,
            total_bytes_saved,
            entries,
        }
    }
}

/// Write `<base>/reports/<run id>/compaction.json`.
pub fn write_compaction_report(base: impl AsRef<Path>, report: &CompactionReport) -> Result<ReportPaths> {
    let root = base.as_ref().join("reports").join(&report.run_id);
    std::fs::create_dir_all(&root).with_context(|| format!("create {}", root.display()))?;

    let compaction_json = root.join("compaction.json");
    let data = serde_json::to_string_pretty(report)?;
    std::fs::write(&compaction_json, data).with_context(|| format!("write {}", compaction_json.display()))?;

    Ok(ReportPaths {
        run_id: report.run_id.clone(),
        root,
        compaction_json,
    })
}

pub fn read_compaction_report(path: impl AsRef<Path>) -> Result<CompactionReport> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parse {}", path.display()))
}
