//! # Scanner Module
//!
//! Recursive filesystem discovery (the Discoverer, C2): walks enabled
//! roots, filters by extension, and emits `RawFile` records. Does not
//! decode or interpret file content - classification and grouping is the
//! collapser's job.

mod filter;
mod walker;

pub use filter::ExtensionFilter;
pub use walker::{DiscoverConfig, WalkDirDiscoverer};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::events::EventSender;

/// A single filesystem entry discovered during a scan, before any
/// grouping/classification has happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    pub path: PathBuf,
    pub name: String,
    /// Lower-cased, no leading dot.
    pub extension: String,
    pub directory: PathBuf,
    pub size: u64,
    /// Integer seconds since epoch.
    pub modified_at: i64,
    pub is_cloud_placeholder: bool,
}

/// Result of a discovery pass.
#[derive(Debug, Default)]
pub struct DiscoverResult {
    pub files: Vec<RawFile>,
    /// Per-item warnings; the walk is not aborted by these.
    pub warnings: Vec<ScanError>,
}

/// Trait for discoverers - implement to swap in a fake for testing.
pub trait Discoverer: Send + Sync {
    fn discover(&self, roots: &[PathBuf]) -> Result<DiscoverResult, ScanError>;

    fn discover_with_events(
        &self,
        roots: &[PathBuf],
        events: &EventSender,
    ) -> Result<DiscoverResult, ScanError>;
}
