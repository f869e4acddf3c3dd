use clap::builder::FalseyValueParser;
use clap::{Args, Parser};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// tracing filter directive, e.g. `info` or `reclaim_compaction=debug`
    #[arg(long, env = "RECLAIM_LOG", default_value = "warn")]
    pub log_level: String,

    /// Disable ANSI colours
    #[arg(long, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,
}

/// Menu-driven disk usage analysis and cleanup for Linux and WSL.
#[derive(Debug, Parser)]
#[command(name = "storage-manager", version)]
pub struct StorageManagerArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Windows-side companion: shut down WSL and compact its virtual disks.
#[derive(Debug, Parser)]
#[command(name = "wsl-compactor", version)]
pub struct WslCompactorArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Upper bound for a single compaction method, in seconds
    #[arg(long, env = "RECLAIM_COMPACT_TIMEOUT", default_value_t = 1800)]
    pub compact_timeout_secs: u64,

    /// Pause after `wsl --shutdown` so disk files are released, in seconds
    #[arg(long, env = "RECLAIM_SHUTDOWN_WAIT", default_value_t = 10)]
    pub shutdown_wait_secs: u64,

    /// Write a JSON report of each Quick Compact All run under this directory
    #[arg(long, env = "RECLAIM_REPORT_DIR")]
    pub report_dir: Option<PathBuf>,
}

/// Settings the WSL menu needs once arguments are parsed.
#[derive(Debug, Clone)]
pub struct CompactorSettings {
    pub compact_timeout: Duration,
    pub shutdown_wait: Duration,
    pub report_dir: Option<PathBuf>,
}

impl From<&WslCompactorArgs> for CompactorSettings {
    fn from(args: &WslCompactorArgs) -> Self {
        Self {
            compact_timeout: Duration::from_secs(args.compact_timeout_secs),
            shutdown_wait: Duration::from_secs(args.shutdown_wait_secs),
            report_dir: args.report_dir.clone(),
        }
    }
}
