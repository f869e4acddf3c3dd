//! Compaction strategy selection for virtual disk images.
//!
//! A [`CompactionSelector`] walks a fixed priority chain of
//! [`CompactionMethod`]s (sparse management, Optimize-VHD, diskpart) for one
//! disk image and reports how many bytes the image shrank by. Methods only
//! run external tools; deciding whether a failure means "try the next one" or
//! "stop" happens here.

use reclaim_core::VirtualDiskRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

mod outcome;

pub use outcome::{Attempt, AttemptResult, CompactionOutcome};

/// Diagnostics that mean "this tool does not know that option", as opposed to
/// a real failure. Matched case-insensitively.
pub const UNSUPPORTED_PHRASES: &[&str] = &[
    "unknown option",
    "unrecognized option",
    "parameter is incorrect",
    "invalid command line option",
];

pub fn is_unsupported_diagnostic(text: &str) -> bool {
    let lower = text.to_lowercase();
    UNSUPPORTED_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// The three compaction mechanisms, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodKind {
    Sparse,
    OptimizeVhd,
    Diskpart,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Sparse => "sparse",
            MethodKind::OptimizeVhd => "optimize-vhd",
            MethodKind::Diskpart => "diskpart",
        }
    }

    pub fn needs_hyperv(&self) -> bool {
        matches!(self, MethodKind::OptimizeVhd)
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionTarget {
    pub record: VirtualDiskRecord,
    /// Registered WSL distribution that owns the disk, if any.
    pub distro: Option<String>,
}

impl CompactionTarget {
    pub fn new(record: VirtualDiskRecord, distro: Option<String>) -> Self {
        Self { record, distro }
    }

    pub fn path(&self) -> &Path {
        &self.record.path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodStatus {
    Succeeded,
    Failed,
    TimedOut,
    ToolMissing,
}

/// Raw result of running one method: a status plus whatever the tool printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodReport {
    pub status: MethodStatus,
    pub diagnostic: String,
}

impl MethodReport {
    pub fn succeeded() -> Self {
        Self::with(MethodStatus::Succeeded, "")
    }

    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self::with(MethodStatus::Failed, diagnostic)
    }

    pub fn timed_out(diagnostic: impl Into<String>) -> Self {
        Self::with(MethodStatus::TimedOut, diagnostic)
    }

    pub fn tool_missing(diagnostic: impl Into<String>) -> Self {
        Self::with(MethodStatus::ToolMissing, diagnostic)
    }

    fn with(status: MethodStatus, diagnostic: impl Into<String>) -> Self {
        Self {
            status,
            diagnostic: diagnostic.into().trim().to_string(),
        }
    }
}

pub trait CompactionMethod {
    fn kind(&self) -> MethodKind;

    /// Whether the method can act on this target at all, e.g. the sparse
    /// method needs a registered distribution.
    fn applies_to(&self, _target: &CompactionTarget) -> bool {
        true
    }

    fn compact(&self, target: &CompactionTarget) -> MethodReport;
}

pub trait SizeProbe {
    fn size_of(&self, path: &Path) -> Option<u64>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsSizeProbe;

impl SizeProbe for FsSizeProbe {
    fn size_of(&self, path: &Path) -> Option<u64> {
        std::fs::metadata(path).ok().map(|meta| meta.len())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Hyper-V's `Optimize-VHD` cmdlet is installed.
    pub hyperv: bool,
}

pub struct CompactionSelector<'a> {
    methods: Vec<Box<dyn CompactionMethod + 'a>>,
    probe: Box<dyn SizeProbe + 'a>,
    capabilities: Capabilities,
    attempted: HashMap<PathBuf, CompactionOutcome>,
}

impl<'a> CompactionSelector<'a> {
    /// Methods are ordered by [`MethodKind`] priority regardless of the order
    /// they are passed in.
    pub fn new(
        mut methods: Vec<Box<dyn CompactionMethod + 'a>>,
        probe: Box<dyn SizeProbe + 'a>,
        capabilities: Capabilities,
    ) -> Self {
        methods.sort_by_key(|method| method.kind());
        Self {
            methods,
            probe,
            capabilities,
            attempted: HashMap::new(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn attempted_paths(&self) -> impl Iterator<Item = &Path> {
        self.attempted.keys().map(PathBuf::as_path)
    }

    /// Run the chain for `target` once. Later calls for the same path return
    /// the first outcome without running anything.
    pub fn compact(&mut self, target: &CompactionTarget) -> CompactionOutcome {
        let path = target.path();
        if let Some(previous) = self.attempted.get(path) {
            tracing::debug!(path = %path.display(), "already attempted, reusing outcome");
            return previous.clone();
        }

        let outcome = self.run_chain(target);
        self.attempted.insert(path.to_path_buf(), outcome.clone());
        outcome
    }

    fn run_chain(&self, target: &CompactionTarget) -> CompactionOutcome {
        let path = target.path();
        let before = self.probe.size_of(path);
        let mut attempts = Vec::new();

        for method in &self.methods {
            let kind = method.kind();
            if kind.needs_hyperv() && !self.capabilities.hyperv {
                attempts.push(Attempt::new(kind, AttemptResult::skipped("Hyper-V unavailable")));
                continue;
            }
            if !method.applies_to(target) {
                attempts.push(Attempt::new(kind, AttemptResult::skipped("not applicable to this disk")));
                continue;
            }

            tracing::info!(method = %kind, path = %path.display(), "attempting compaction");
            let report = method.compact(target);
            match report.status {
                MethodStatus::Succeeded => {
                    attempts.push(Attempt::new(kind, AttemptResult::Succeeded));
                    let after = self.probe.size_of(path);
                    let saved = match (before, after) {
                        (Some(before), Some(after)) => before.saturating_sub(after),
                        _ => 0,
                    };
                    tracing::info!(method = %kind, saved, "compaction succeeded");
                    return CompactionOutcome::success(kind, saved, attempts);
                }
                MethodStatus::ToolMissing => {
                    let reason = if report.diagnostic.is_empty() {
                        "tool missing".to_string()
                    } else {
                        report.diagnostic
                    };
                    attempts.push(Attempt::new(kind, AttemptResult::Skipped { reason }));
                }
                MethodStatus::TimedOut => {
                    tracing::warn!(method = %kind, path = %path.display(), "compaction timed out");
                    attempts.push(Attempt::new(
                        kind,
                        AttemptResult::TimedOut {
                            diagnostic: report.diagnostic,
                        },
                    ));
                    return CompactionOutcome::failure(attempts);
                }
                MethodStatus::Failed if is_unsupported_diagnostic(&report.diagnostic) => {
                    tracing::info!(method = %kind, "method unsupported, trying next");
                    attempts.push(Attempt::new(
                        kind,
                        AttemptResult::Unsupported {
                            diagnostic: report.diagnostic,
                        },
                    ));
                }
                MethodStatus::Failed => {
                    tracing::warn!(method = %kind, diagnostic = %report.diagnostic, "compaction method failed");
                    attempts.push(Attempt::new(
                        kind,
                        AttemptResult::Failed {
                            diagnostic: report.diagnostic,
                        },
                    ));
                }
            }
        }

        CompactionOutcome::failure(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    type CallLog = Rc<RefCell<Vec<MethodKind>>>;

    struct FakeMethod {
        kind: MethodKind,
        report: MethodReport,
        applies: bool,
        calls: CallLog,
    }

    impl CompactionMethod for FakeMethod {
        fn kind(&self) -> MethodKind {
            self.kind
        }

        fn applies_to(&self, _target: &CompactionTarget) -> bool {
            self.applies
        }

        fn compact(&self, _target: &CompactionTarget) -> MethodReport {
            self.calls.borrow_mut().push(self.kind);
            self.report.clone()
        }
    }

    struct FakeProbe(RefCell<VecDeque<Option<u64>>>);

    impl FakeProbe {
        fn sizes(sizes: &[Option<u64>]) -> Box<Self> {
            Box::new(Self(RefCell::new(sizes.iter().copied().collect())))
        }
    }

    impl SizeProbe for FakeProbe {
        fn size_of(&self, _path: &Path) -> Option<u64> {
            self.0.borrow_mut().pop_front().flatten()
        }
    }

    const ALL: [MethodKind; 3] = [MethodKind::Sparse, MethodKind::OptimizeVhd, MethodKind::Diskpart];

    fn methods(reports: [MethodReport; 3], calls: &CallLog) -> Vec<Box<dyn CompactionMethod>> {
        ALL.iter()
            .zip(reports)
            .map(|(kind, report)| {
                Box::new(FakeMethod {
                    kind: *kind,
                    report,
                    applies: true,
                    calls: calls.clone(),
                }) as Box<dyn CompactionMethod>
            })
            .collect()
    }

    fn target(path: &str) -> CompactionTarget {
        CompactionTarget::new(
            VirtualDiskRecord::new(path, 100, "Ubuntu"),
            Some("Ubuntu".to_string()),
        )
    }

    fn hyperv() -> Capabilities {
        Capabilities { hyperv: true }
    }

    #[test]
    fn unsupported_at_each_position_moves_to_the_next_method() {
        for failing in 0..2 {
            let calls = CallLog::default();
            let mut reports = [
                MethodReport::succeeded(),
                MethodReport::succeeded(),
                MethodReport::succeeded(),
            ];
            for report in reports.iter_mut().take(failing + 1) {
                *report = MethodReport::failed("Error: The parameter is incorrect.");
            }
            let mut selector = CompactionSelector::new(
                methods(reports, &calls),
                FakeProbe::sizes(&[Some(100), Some(60)]),
                hyperv(),
            );
            let outcome = selector.compact(&target("/d/ext4.vhdx"));
            assert!(outcome.ok, "position {}", failing);
            assert_eq!(outcome.method, Some(ALL[failing + 1]));
            assert_eq!(calls.borrow().as_slice(), &ALL[..failing + 2]);
            assert_eq!(outcome.bytes_saved, 40);
        }
    }

    #[test]
    fn genuine_failure_is_recorded_and_chain_continues() {
        let calls = CallLog::default();
        let mut selector = CompactionSelector::new(
            methods(
                [
                    MethodReport::failed("access denied"),
                    MethodReport::failed("file in use"),
                    MethodReport::succeeded(),
                ],
                &calls,
            ),
            FakeProbe::sizes(&[Some(10), Some(4)]),
            hyperv(),
        );
        let outcome = selector.compact(&target("/d/ext4.vhdx"));
        assert!(outcome.ok);
        assert_eq!(outcome.attempts.len(), 3);
        assert!(matches!(outcome.attempts[0].result, AttemptResult::Failed { .. }));
    }

    #[test]
    fn all_failures_give_non_empty_summary() {
        let calls = CallLog::default();
        let mut selector = CompactionSelector::new(
            methods(
                [
                    MethodReport::failed("unknown option --set-sparse"),
                    MethodReport::failed(""),
                    MethodReport::failed("DiskPart has encountered an error"),
                ],
                &calls,
            ),
            FakeProbe::sizes(&[Some(100)]),
            hyperv(),
        );
        let outcome = selector.compact(&target("/d/ext4.vhdx"));
        assert!(!outcome.ok);
        assert_eq!(outcome.bytes_saved, 0);
        let message = outcome.error_message.unwrap();
        assert!(message.starts_with("sparse: unsupported"));
        assert!(message.contains("optimize-vhd: failed"));
        assert!(message.contains("diskpart: failed (DiskPart has encountered an error)"));
    }

    #[test]
    fn timeout_stops_the_chain() {
        let calls = CallLog::default();
        let mut selector = CompactionSelector::new(
            methods(
                [
                    MethodReport::failed("unknown option"),
                    MethodReport::timed_out("powershell timed out after 1800s"),
                    MethodReport::succeeded(),
                ],
                &calls,
            ),
            FakeProbe::sizes(&[Some(100)]),
            hyperv(),
        );
        let outcome = selector.compact(&target("/d/ext4.vhdx"));
        assert!(!outcome.ok);
        assert_eq!(calls.borrow().as_slice(), &[MethodKind::Sparse, MethodKind::OptimizeVhd]);
        assert!(outcome.error_message.unwrap().contains("timed out after 1800s"));
    }

    #[test]
    fn optimize_vhd_never_runs_without_hyperv() {
        let calls = CallLog::default();
        let mut selector = CompactionSelector::new(
            methods(
                [
                    MethodReport::failed("unknown option"),
                    MethodReport::succeeded(),
                    MethodReport::succeeded(),
                ],
                &calls,
            ),
            FakeProbe::sizes(&[Some(100), Some(100)]),
            Capabilities::default(),
        );
        let outcome = selector.compact(&target("/d/ext4.vhdx"));
        assert_eq!(outcome.method, Some(MethodKind::Diskpart));
        assert!(!calls.borrow().contains(&MethodKind::OptimizeVhd));
        assert_eq!(
            outcome.attempts[1].result,
            AttemptResult::Skipped {
                reason: "Hyper-V unavailable".to_string()
            }
        );
    }

    #[test]
    fn missing_tool_and_inapplicable_methods_are_skipped() {
        let calls = CallLog::default();
        let methods: Vec<Box<dyn CompactionMethod>> = vec![
            Box::new(FakeMethod {
                kind: MethodKind::Diskpart,
                report: MethodReport::tool_missing("diskpart not found"),
                applies: true,
                calls: calls.clone(),
            }),
            Box::new(FakeMethod {
                kind: MethodKind::Sparse,
                report: MethodReport::succeeded(),
                applies: false,
                calls: calls.clone(),
            }),
        ];
        let mut selector = CompactionSelector::new(methods, FakeProbe::sizes(&[Some(1)]), hyperv());
        let outcome = selector.compact(&target("/d/docker.vhdx"));
        assert!(!outcome.ok);
        assert_eq!(calls.borrow().as_slice(), &[MethodKind::Diskpart]);
        assert_eq!(
            outcome.error_message.as_deref(),
            Some("sparse: skipped (not applicable to this disk); diskpart: skipped (diskpart not found)")
        );
    }

    #[test]
    fn growth_and_unreadable_sizes_clamp_to_zero() {
        for sizes in [[Some(10), Some(20)], [None, Some(5)], [Some(10), None]] {
            let calls = CallLog::default();
            let mut selector = CompactionSelector::new(
                methods(
                    [
                        MethodReport::succeeded(),
                        MethodReport::succeeded(),
                        MethodReport::succeeded(),
                    ],
                    &calls,
                ),
                FakeProbe::sizes(&sizes),
                hyperv(),
            );
            let outcome = selector.compact(&target("/d/ext4.vhdx"));
            assert!(outcome.ok);
            assert_eq!(outcome.bytes_saved, 0);
        }
    }

    #[test]
    fn each_path_is_attempted_once() {
        let calls = CallLog::default();
        let mut selector = CompactionSelector::new(
            methods(
                [
                    MethodReport::failed("boom"),
                    MethodReport::failed("boom"),
                    MethodReport::failed("boom"),
                ],
                &calls,
            ),
            FakeProbe::sizes(&[Some(1), Some(1)]),
            hyperv(),
        );
        let first = selector.compact(&target("/d/a.vhdx"));
        let second = selector.compact(&target("/d/a.vhdx"));
        assert_eq!(first, second);
        assert_eq!(calls.borrow().len(), 3);

        selector.compact(&target("/d/b.vhdx"));
        assert_eq!(calls.borrow().len(), 6);
        assert_eq!(selector.attempted_paths().count(), 2);
    }

    #[test]
    fn unsupported_phrases_match_case_insensitively() {
        assert!(is_unsupported_diagnostic("Unrecognized option: --manage"));
        assert!(is_unsupported_diagnostic("INVALID COMMAND LINE OPTION"));
        assert!(!is_unsupported_diagnostic("The process cannot access the file"));
        assert!(!is_unsupported_diagnostic(""));
    }

    struct ShrinkFile;

    impl CompactionMethod for ShrinkFile {
        fn kind(&self) -> MethodKind {
            MethodKind::Diskpart
        }

        fn compact(&self, target: &CompactionTarget) -> MethodReport {
            match std::fs::OpenOptions::new()
                .write(true)
                .open(target.path())
                .and_then(|file| file.set_len(1024))
            {
                Ok(()) => MethodReport::succeeded(),
                Err(err) => MethodReport::failed(err.to_string()),
            }
        }
    }

    #[test]
    fn measures_real_file_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ext4.vhdx");
        std::fs::write(&path, vec![0u8; 4096]).unwrap();

        let record = VirtualDiskRecord::from_file(&path, "Docker").unwrap();
        let methods: Vec<Box<dyn CompactionMethod>> = vec![Box::new(ShrinkFile)];
        let mut selector = CompactionSelector::new(methods, Box::new(FsSizeProbe), Capabilities::default());
        let outcome = selector.compact(&CompactionTarget::new(record, None));
        assert!(outcome.ok);
        assert_eq!(outcome.bytes_saved, 3072);
    }
}
