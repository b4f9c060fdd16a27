//! # ScanOrchestrator Module
//!
//! Composes Discoverer → Collapser → DuplicateDetector (using the hash
//! cache and hasher) into a single scan, driving progress events and
//! enforcing the "one scan at a time" and cancellation contracts.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::cache::CacheBackend;
use crate::core::cancellation::CancellationToken;
use crate::core::collapser::{self, LogicalPhoto};
use crate::core::detector;
use crate::core::scanner::{DiscoverConfig, Discoverer, WalkDirDiscoverer};
use crate::error::{PhotoCleanerError, Result, ScanError};
use crate::events::{Event, EventSender, Phase, ScanProgress};

/// Composes the other components into `scan(roots) -> LogicalPhoto[]`.
///
/// Overlapping scans are rejected with `ScanInProgress` rather than
/// queued - the caller decides whether to retry.
pub struct ScanOrchestrator {
    cache: Box<dyn CacheBackend>,
    discover_config: DiscoverConfig,
    scanning: Arc<AtomicBool>,
    cancellation: CancellationToken,
}

impl ScanOrchestrator {
    pub fn new(cache: Box<dyn CacheBackend>) -> Self {
        Self {
            cache,
            discover_config: DiscoverConfig::default(),
            scanning: Arc::new(AtomicBool::new(false)),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_discover_config(mut self, config: DiscoverConfig) -> Self {
        self.discover_config = config;
        self
    }

    /// A handle the caller can use to cancel the currently running scan
    /// (or the next one, if called before `scan` starts).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn scan(&self, roots: Vec<PathBuf>) -> Result<Vec<LogicalPhoto>> {
        self.scan_with_events(roots, &crate::events::null_sender())
    }

    pub fn scan_with_events(
        &self,
        roots: Vec<PathBuf>,
        events: &EventSender,
    ) -> Result<Vec<LogicalPhoto>> {
        if self
            .scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PhotoCleanerError::Scan(ScanError::ScanInProgress));
        }

        let result = self.run_scan(roots, events);

        self.scanning.store(false, Ordering::SeqCst);

        result
    }

    fn run_scan(&self, roots: Vec<PathBuf>, events: &EventSender) -> Result<Vec<LogicalPhoto>> {
        events.send(Event::ScanProgress(ScanProgress::boundary(
            Phase::Starting,
            format!("starting scan over {} root(s)", roots.len()),
        )));

        let discoverer = WalkDirDiscoverer::new(self.discover_config.clone())
            .with_cancellation(self.cancellation.clone());

        let discovered = match discoverer.discover_with_events(&roots, events) {
            Ok(result) => result,
            Err(ScanError::Cancelled) => return Ok(self.cancelled_result(events, Vec::new())),
            Err(e) => return Err(PhotoCleanerError::Scan(e)),
        };

        events.send(Event::ScanProgress(ScanProgress::boundary(
            Phase::Grouping,
            format!("grouping {} file(s)", discovered.files.len()),
        )));

        let photos = collapser::collapse(discovered.files);

        if self.cancellation.is_cancelled() {
            return Ok(self.cancelled_result(events, photos));
        }

        let outcome = match detector::detect(photos, self.cache.as_ref(), events, &self.cancellation)
        {
            Ok(outcome) => outcome,
            Err(e) => return Err(PhotoCleanerError::Scan(e)),
        };

        if outcome.cancelled {
            events.send(Event::ScanProgress(ScanProgress::boundary(
                Phase::Cancelled,
                "scan cancelled",
            )));
            return Ok(outcome.photos);
        }

        events.send(Event::ScanProgress(ScanProgress::boundary(
            Phase::Rendering,
            "preparing results",
        )));
        events.send(Event::ScanProgress(ScanProgress::boundary(
            Phase::Complete,
            format!("{} photo(s)", outcome.photos.len()),
        )));

        Ok(outcome.photos)
    }

    /// Cancellation observed before detection ran at all: the photos are
    /// already fully collapsed, so they are returned as-is (every one
    /// non-duplicate, unhashed) rather than discarded.
    fn cancelled_result(&self, events: &EventSender, photos: Vec<LogicalPhoto>) -> Vec<LogicalPhoto> {
        events.send(Event::ScanProgress(ScanProgress::boundary(
            Phase::Cancelled,
            "scan cancelled",
        )));
        photos
    }
}
