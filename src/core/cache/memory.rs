//! In-memory cache backend: the graceful-degradation fallback when the
//! SQLite database can't be opened, and a test double.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::CacheError;

use super::{CacheBackend, CacheStats, HashCacheEntry};

pub struct InMemoryCache {
    entries: RwLock<HashMap<PathBuf, HashCacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> CacheError {
    CacheError::Corrupted {
        path: PathBuf::from("<in-memory>"),
    }
}

impl CacheBackend for InMemoryCache {
    fn lookup(
        &self,
        path: &Path,
        size: u64,
        modified_at: i64,
    ) -> Result<Option<HashCacheEntry>, CacheError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;

        Ok(entries
            .get(path)
            .filter(|e| e.size == size && e.modified_at == modified_at)
            .cloned())
    }

    fn store(
        &self,
        path: &Path,
        size: u64,
        modified_at: i64,
        trailing_hash: Option<&str>,
        full_hash: Option<&str>,
    ) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;

        let (final_trailing, final_full) = match entries.get(path) {
            Some(existing) if existing.size == size && existing.modified_at == modified_at => (
                trailing_hash
                    .map(str::to_owned)
                    .or_else(|| existing.trailing_hash.clone()),
                full_hash
                    .map(str::to_owned)
                    .or_else(|| existing.full_hash.clone()),
            ),
            _ => (
                trailing_hash.map(str::to_owned),
                full_hash.map(str::to_owned),
            ),
        };

        entries.insert(
            path.to_path_buf(),
            HashCacheEntry {
                path: path.to_path_buf(),
                size,
                modified_at,
                trailing_hash: final_trailing,
                full_hash: final_full,
            },
        );

        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(path);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.clear();
        Ok(())
    }

    fn stats(&self) -> Result<CacheStats, CacheError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;

        Ok(CacheStats {
            total_entries: entries.len(),
            trailing_hash_count: entries.values().filter(|e| e.trailing_hash.is_some()).count(),
            full_hash_count: entries.values().filter(|e| e.full_hash.is_some()).count(),
        })
    }
}
