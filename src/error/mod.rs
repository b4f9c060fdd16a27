//! # Error Module
//!
//! User-friendly error types for the scan and deduplication engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **User-friendly messages** - non-technical users should understand

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum PhotoCleanerError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("File operation error: {0}")]
    FileOp(#[from] FileOpError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur during directory discovery
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan was cancelled")]
    Cancelled,

    #[error("A scan is already in progress")]
    ScanInProgress,
}

/// Errors that occur while hashing file content
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Cannot hash cloud placeholder file: {path}")]
    CloudPlaceholder { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur with the persistent hash cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to open cache database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Cache corruption detected at {path}. Delete this file and try again.")]
    Corrupted { path: PathBuf },
}

/// Errors that occur during move/rename/trash/undo operations
#[derive(Error, Debug)]
pub enum FileOpError {
    #[error("Destination already exists and no free name could be found: {path}")]
    MoveConflict { path: PathBuf },

    #[error("Invalid name: {reason}")]
    InvalidName { reason: String },

    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Nothing to undo")]
    NothingToUndo,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PhotoCleanerError>;
