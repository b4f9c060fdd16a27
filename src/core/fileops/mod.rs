//! # FileOps Module
//!
//! Safe bulk file operations: move, batch-move, rename, trash, and
//! create-folder, plus an append-only undo log for the reversible ones.

mod undo;

pub use undo::{MoveOp, UndoEntry, UndoStack};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{FileOpError, PhotoCleanerError, Result};
use crate::events::{Event, EventSender};
use crate::events::{DeleteProgress, DeleteResult};

/// Duration (seconds) the UI should keep showing a `delete-result` toast.
const DELETE_RESULT_DISPLAY_SECONDS: i64 = 8;

/// `move_files`: move each path into `destination`, resolving collisions
/// by appending ` (n)` before the extension starting at n=2. Pushes a new
/// `UndoEntry` covering every file that succeeded, even if a later file in
/// the batch fails - the first error is surfaced only after the loop.
pub fn move_files(
    files: &[PathBuf],
    destination: &Path,
    undo_stack: &UndoStack,
) -> Result<Vec<MoveOp>> {
    fs::create_dir_all(destination).map_err(|source| FileOpError::Io {
        path: destination.to_path_buf(),
        source,
    })?;

    let mut operations = Vec::new();
    let mut first_error = None;

    for file in files {
        let Some(file_name) = file.file_name() else {
            first_error.get_or_insert(PhotoCleanerError::FileOp(FileOpError::InvalidName {
                reason: format!("{} has no file name", file.display()),
            }));
            continue;
        };

        let dest = resolve_collision(destination, Path::new(file_name));
        match move_one(file, &dest) {
            Ok(()) => operations.push(MoveOp {
                from: file.clone(),
                to: dest,
            }),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    if !operations.is_empty() {
        undo_stack.push(UndoEntry::new_move(operations.clone()));
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(operations),
    }
}

/// `move_files_batch`: execute an explicit `{from, to}` list in order,
/// used for undo replay. Does NOT push a new undo entry.
pub fn move_files_batch(operations: &[MoveOp]) -> Result<()> {
    for op in operations {
        move_one(&op.from, &op.to)?;
    }
    Ok(())
}

fn move_one(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(PhotoCleanerError::FileOp(FileOpError::NotFound {
            path: from.to_path_buf(),
        }));
    }

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|source| FileOpError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    // rename fails across filesystems; fall back to copy + verify + delete.
    let source_size = fs::metadata(from)
        .map_err(|source| FileOpError::Io {
            path: from.to_path_buf(),
            source,
        })?
        .len();

    fs::copy(from, to).map_err(|source| FileOpError::Io {
        path: to.to_path_buf(),
        source,
    })?;

    let dest_size = fs::metadata(to)
        .map_err(|source| FileOpError::Io {
            path: to.to_path_buf(),
            source,
        })?
        .len();

    if dest_size != source_size {
        let _ = fs::remove_file(to);
        return Err(PhotoCleanerError::FileOp(FileOpError::Io {
            path: to.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("copy verification failed: source {source_size} bytes, dest {dest_size} bytes"),
            ),
        }));
    }

    fs::remove_file(from).map_err(|source| FileOpError::Io {
        path: from.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn resolve_collision(dest_dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = dest_dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = file_name
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let extension = file_name.extension().and_then(|e| e.to_str());

    let mut n = 2;
    loop {
        let candidate_name = match extension {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = dest_dir.join(candidate_name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// `rename`: rename in place; fails if `new_name` contains a path
/// separator or matches an existing file.
pub fn rename(path: &Path, new_name: &str) -> Result<()> {
    if new_name.contains('/') || new_name.contains('\\') {
        return Err(PhotoCleanerError::FileOp(FileOpError::InvalidName {
            reason: "name must not contain a path separator".into(),
        }));
    }

    let Some(parent) = path.parent() else {
        return Err(PhotoCleanerError::FileOp(FileOpError::InvalidName {
            reason: "path has no parent directory".into(),
        }));
    };

    let dest = parent.join(new_name);
    if dest.exists() {
        return Err(PhotoCleanerError::FileOp(FileOpError::MoveConflict { path: dest }));
    }

    fs::rename(path, &dest).map_err(|source| FileOpError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// `create_folder`: create a directory including parents; succeeds if it
/// already exists as a directory.
pub fn create_folder(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|source| FileOpError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrashResult {
    pub deleted_count: usize,
    pub failed_count: usize,
    pub total_bytes: u64,
}

/// `trash`: send files to the OS recycle facility. NOT undoable by this
/// system. Emits streaming `delete-progress` and a terminal
/// `delete-result` event.
pub fn trash(files: &[PathBuf], events: &EventSender) -> Result<TrashResult> {
    let total = files.len();
    let mut deleted_count = 0;
    let mut failed_count = 0;
    let mut total_bytes = 0u64;

    for (i, file) in files.iter().enumerate() {
        let size = fs::metadata(file).map(|m| m.len()).unwrap_or(0);

        match trash::delete(file) {
            Ok(()) => {
                deleted_count += 1;
                total_bytes += size;
            }
            Err(_) => failed_count += 1,
        }

        events.send(Event::DeleteProgress(DeleteProgress {
            current: i + 1,
            total,
            current_file: file.clone(),
            deleted_bytes: total_bytes,
        }));
    }

    let show_until = now_unix_seconds() + DELETE_RESULT_DISPLAY_SECONDS;

    events.send(Event::DeleteResult(DeleteResult {
        deleted_count,
        failed_count,
        total_bytes,
        show_until,
    }));

    Ok(TrashResult {
        deleted_count,
        failed_count,
        total_bytes,
    })
}

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// `reveal_in_finder`: OS-specific "show in file manager" invocation. No
/// core logic lives here; this is a thin shim satisfying the command
/// surface.
pub fn reveal_in_finder(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PhotoCleanerError::FileOp(FileOpError::NotFound {
            path: path.to_path_buf(),
        }));
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg("-R")
            .arg(path)
            .spawn()
            .map_err(|source| FileOpError::Io {
                path: path.to_path_buf(),
                source,
            })?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("explorer")
            .arg("/select,")
            .arg(path)
            .spawn()
            .map_err(|source| FileOpError::Io {
                path: path.to_path_buf(),
                source,
            })?;
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(parent) = path.parent() {
            std::process::Command::new("xdg-open")
                .arg(parent)
                .spawn()
                .map_err(|source| FileOpError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
    }

    Ok(())
}

/// `undo`: pop the last `UndoEntry` and invoke `move_files_batch` with
/// `{from: op.to, to: op.from}` reversed.
pub fn undo(undo_stack: &UndoStack) -> Result<()> {
    let Some(entry) = undo_stack.pop() else {
        return Err(PhotoCleanerError::FileOp(FileOpError::NothingToUndo));
    };

    let reversed: Vec<MoveOp> = entry
        .operations
        .iter()
        .map(|op| MoveOp {
            from: op.to.clone(),
            to: op.from.clone(),
        })
        .collect();

    move_files_batch(&reversed)
}
