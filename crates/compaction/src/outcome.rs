use crate::MethodKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AttemptResult {
    Succeeded,
    Unsupported { diagnostic: String },
    Failed { diagnostic: String },
    TimedOut { diagnostic: String },
    Skipped { reason: String },
}

impl AttemptResult {
    pub fn skipped(reason: &str) -> Self {
        AttemptResult::Skipped {
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub method: MethodKind,
    #[serde(flatten)]
    pub result: AttemptResult,
}

impl Attempt {
    pub fn new(method: MethodKind, result: AttemptResult) -> Self {
        Self { method, result }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, detail) = match &self.result {
            AttemptResult::Succeeded => ("succeeded", ""),
            AttemptResult::Unsupported { diagnostic } => ("unsupported", diagnostic.as_str()),
            AttemptResult::Failed { diagnostic } => ("failed", diagnostic.as_str()),
            AttemptResult::TimedOut { diagnostic } => ("timed out", diagnostic.as_str()),
            AttemptResult::Skipped { reason } => ("skipped", reason.as_str()),
        };
        if detail.is_empty() {
            write!(f, "{}: {}", self.method, label)
        } else {
            write!(f, "{}: {} ({})", self.method, label, first_line(detail))
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().map(str::trim).find(|line| !line.is_empty()).unwrap_or("")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionOutcome {
    pub ok: bool,
    pub bytes_saved: u64,
    pub error_message: Option<String>,
    pub method: Option<MethodKind>,
    pub attempts: Vec<Attempt>,
}

impl CompactionOutcome {
    pub fn success(method: MethodKind, bytes_saved: u64, attempts: Vec<Attempt>) -> Self {
        Self {
            ok: true,
            bytes_saved,
            error_message: None,
            method: Some(method),
            attempts,
        }
    }

    pub fn failure(attempts: Vec<Attempt>) -> Self {
        let summary = if attempts.is_empty() {
            "no compaction methods available".to_string()
        } else {
            attempts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        };
        Self {
            ok: false,
            bytes_saved: 0,
            error_message: Some(summary),
            method: None,
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_without_attempts_still_explains() {
        let outcome = CompactionOutcome::failure(Vec::new());
        assert_eq!(outcome.error_message.as_deref(), Some("no compaction methods available"));
    }

    #[test]
    fn attempt_display_keeps_first_diagnostic_line() {
        let attempt = Attempt::new(
            MethodKind::Diskpart,
            AttemptResult::Failed {
                diagnostic: "\nVirtual Disk Service error:\nThe file is in use.".to_string(),
            },
        );
        assert_eq!(attempt.to_string(), "diskpart: failed (Virtual Disk Service error:)");
    }

    #[test]
    fn attempts_serialize_flat() {
        let attempt = Attempt::new(
            MethodKind::OptimizeVhd,
            AttemptResult::Skipped {
                reason: "Hyper-V unavailable".to_string(),
            },
        );
        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(json["method"], "optimize-vhd");
        assert_eq!(json["result"], "skipped");
        assert_eq!(json["reason"], "Hyper-V unavailable");
    }
}
