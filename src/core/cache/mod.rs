//! # Cache Module
//!
//! Persists content hashes keyed by absolute path to avoid re-reading
//! unchanged files across scans.
//!
//! ## Backends
//! - `SqliteCache` - persistent storage, the default
//! - `InMemoryCache` - graceful-degradation fallback when the database
//!   can't be opened, and a test double

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryCache;
pub use sqlite::SqliteCache;
pub use traits::CacheBackend;

use std::path::PathBuf;

/// One row of the hash cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashCacheEntry {
    pub path: PathBuf,
    pub size: u64,
    pub modified_at: i64,
    pub trailing_hash: Option<String>,
    pub full_hash: Option<String>,
}

/// Cache statistics, exposed for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub total_entries: usize,
    pub trailing_hash_count: usize,
    pub full_hash_count: usize,
}

/// Open the default SQLite-backed cache at `path`, falling back to an
/// in-memory cache (logged once) if the database can't be opened.
pub fn open_with_fallback(path: &std::path::Path) -> Box<dyn CacheBackend> {
    match SqliteCache::open(path) {
        Ok(cache) => Box::new(cache),
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "failed to open hash cache database, falling back to in-memory cache"
            );
            Box::new(InMemoryCache::new())
        }
    }
}
