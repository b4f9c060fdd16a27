//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the scan and deduplication engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scan progress, tapped at every phase boundary and periodically within
    /// long-running phases
    ScanProgress(ScanProgress),
    /// Progress of a `trash` operation
    DeleteProgress(DeleteProgress),
    /// Terminal result of a `trash` operation
    DeleteResult(DeleteResult),
}

/// The closed set of phases a scan passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Starting,
    Discovery,
    Grouping,
    Analyzing,
    TrailingHash,
    Hashing,
    Duplicates,
    Preparing,
    Rendering,
    Complete,
    Cancelled,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Starting => "starting",
            Phase::Discovery => "discovery",
            Phase::Grouping => "grouping",
            Phase::Analyzing => "analyzing",
            Phase::TrailingHash => "trailing_hash",
            Phase::Hashing => "hashing",
            Phase::Duplicates => "duplicates",
            Phase::Preparing => "preparing",
            Phase::Rendering => "rendering",
            Phase::Complete => "complete",
            Phase::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// `scan-progress` wire payload: `{phase, current, total, message}`.
///
/// `current <= total` whenever `total > 0`; `total == 0` means indeterminate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    pub phase: Phase,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

impl ScanProgress {
    pub fn boundary(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase,
            current: 0,
            total: 0,
            message: message.into(),
        }
    }

    pub fn tick(phase: Phase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            message: String::new(),
        }
    }
}

/// `delete-progress` wire payload, emitted while `trash` is running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteProgress {
    pub current: usize,
    pub total: usize,
    pub current_file: PathBuf,
    pub deleted_bytes: u64,
}

/// `delete-result` wire payload, the terminal event of a `trash` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted_count: usize,
    pub failed_count: usize,
    pub total_bytes: u64,
    /// Unix timestamp (seconds) until which the UI should keep showing this result
    pub show_until: i64,
}
