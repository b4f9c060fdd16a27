//! # Core Module
//!
//! The GUI-agnostic scan and deduplication engine.
//!
//! ## Modules
//! - `scanner` - discovers raw files in directory trees (C2)
//! - `collapser` - groups related files into logical photos (C3)
//! - `cache` - persists content hashes to avoid recomputation (C1)
//! - `hasher` - computes trailing/full content hashes (C4)
//! - `detector` - the three-pass duplicate detection pipeline (C5)
//! - `smart_select` - recommends which duplicates to delete (C7)
//! - `fileops` - move/rename/trash/undo (C8)
//! - `orchestrator` - composes the above into one scan (C9)
//! - `formats` - accepted extensions and their classification
//! - `cancellation` - cooperative cancellation token

pub mod cache;
pub mod cancellation;
pub mod collapser;
pub mod detector;
pub mod fileops;
pub mod formats;
pub mod hasher;
pub mod orchestrator;
pub mod scanner;
pub mod smart_select;

pub use cancellation::CancellationToken;
pub use collapser::{LogicalPhoto, RelatedFile, RelatedKind};
pub use orchestrator::ScanOrchestrator;
pub use scanner::RawFile;
