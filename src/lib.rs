//! # photo-dedup-core
//!
//! A scan and deduplication engine for large photographic file
//! collections spread across multiple directory trees, including
//! cloud-synced folders with placeholder files.
//!
//! ## Core Philosophy
//! - **Never auto-delete** - bulk operations are explicit and reversible
//!   where that's possible
//! - **Exact duplicates only** - content equality (SHA-256), not
//!   perceptual similarity
//! - **Build trust** - the keeper of a duplicate group and the
//!   smart-select recommendation are separate, auditable concepts
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and thin
//! presentation layers:
//! - `core` - discovery, collapsing, hashing, detection, file operations
//! - `config` - the configuration shape the core reads (doesn't own)
//! - `events` - event-driven progress reporting (GUI-ready)
//! - `error` - user-friendly error types
//! - `cli` - command-line interface

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PhotoCleanerError, Result};
