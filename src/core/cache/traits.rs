//! Cache backend trait definition.

use std::path::Path;

use crate::error::CacheError;

use super::{CacheStats, HashCacheEntry};

/// Trait for hash cache backends.
///
/// `lookup` and `store` are keyed by absolute path; entries are valid only
/// while `(size, modified_at)` match the filesystem's current stat - a
/// mismatch is a miss, and the stale row is left for `store` to overwrite.
pub trait CacheBackend: Send + Sync {
    /// Return the cached hashes for `path` if present and still valid for
    /// the given `size`/`modified_at`.
    fn lookup(
        &self,
        path: &Path,
        size: u64,
        modified_at: i64,
    ) -> Result<Option<HashCacheEntry>, CacheError>;

    /// Upsert the entry for `path`. A `Some` hash field overwrites; a
    /// `None` field leaves the existing column untouched - unless the
    /// stat no longer matches the stored row, in which case the whole
    /// entry is treated as stale and replaced.
    fn store(
        &self,
        path: &Path,
        size: u64,
        modified_at: i64,
        trailing_hash: Option<&str>,
        full_hash: Option<&str>,
    ) -> Result<(), CacheError>;

    /// Remove a specific entry.
    fn remove(&self, path: &Path) -> Result<(), CacheError>;

    /// Clear all cached entries.
    fn clear(&self) -> Result<(), CacheError>;

    /// Cache statistics, mostly useful for diagnostics/CLI output.
    fn stats(&self) -> Result<CacheStats, CacheError>;
}
