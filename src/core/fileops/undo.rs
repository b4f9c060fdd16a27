//! Append-only undo log for reversible file operations.
//!
//! Only `move` pushes an entry - trash goes to system recovery, rename is
//! user-visible, create-folder is benign (§3 Lifecycles). UndoEntries live
//! for the process lifetime only; they are not persisted.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOp {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoEntry {
    pub timestamp: i64,
    pub operations: Vec<MoveOp>,
}

impl UndoEntry {
    pub fn new_move(operations: Vec<MoveOp>) -> Self {
        Self {
            timestamp: now_unix_seconds(),
            operations,
        }
    }
}

fn now_unix_seconds() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// A small, low-contention stack of undo entries protected by a single
/// mutex.
#[derive(Default)]
pub struct UndoStack {
    entries: Mutex<Vec<UndoEntry>>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: UndoEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn pop(&self) -> Option<UndoEntry> {
        self.entries.lock().unwrap().pop()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
