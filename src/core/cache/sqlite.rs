//! SQLite cache backend for persistent storage.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::CacheError;

use super::{CacheBackend, CacheStats, HashCacheEntry};

/// SQLite-backed persistent hash cache.
///
/// Uses WAL (write-ahead logging) mode so readers never block on a writer.
pub struct SqliteCache {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteCache {
    /// Open or create a cache database at `path`.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| CacheError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS file_hashes (
                path TEXT PRIMARY KEY,
                size INTEGER NOT NULL,
                modified_at INTEGER NOT NULL,
                trailing_hash TEXT,
                full_hash TEXT
            )",
            [],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::Corrupted {
            path: self.db_path.clone(),
        })
    }
}

struct Row {
    size: i64,
    modified_at: i64,
    trailing_hash: Option<String>,
    full_hash: Option<String>,
}

impl CacheBackend for SqliteCache {
    fn lookup(
        &self,
        path: &Path,
        size: u64,
        modified_at: i64,
    ) -> Result<Option<HashCacheEntry>, CacheError> {
        let conn = self.lock()?;
        let path_str = path.to_string_lossy();

        let row: Option<Row> = conn
            .query_row(
                "SELECT size, modified_at, trailing_hash, full_hash FROM file_hashes WHERE path = ?",
                [&path_str],
                |r| {
                    Ok(Row {
                        size: r.get(0)?,
                        modified_at: r.get(1)?,
                        trailing_hash: r.get(2)?,
                        full_hash: r.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        match row {
            Some(row) if row.size == size as i64 && row.modified_at == modified_at => {
                Ok(Some(HashCacheEntry {
                    path: path.to_path_buf(),
                    size,
                    modified_at,
                    trailing_hash: row.trailing_hash,
                    full_hash: row.full_hash,
                }))
            }
            _ => Ok(None),
        }
    }

    fn store(
        &self,
        path: &Path,
        size: u64,
        modified_at: i64,
        trailing_hash: Option<&str>,
        full_hash: Option<&str>,
    ) -> Result<(), CacheError> {
        let conn = self.lock()?;
        let path_str = path.to_string_lossy();

        let existing: Option<Row> = conn
            .query_row(
                "SELECT size, modified_at, trailing_hash, full_hash FROM file_hashes WHERE path = ?",
                [&path_str],
                |r| {
                    Ok(Row {
                        size: r.get(0)?,
                        modified_at: r.get(1)?,
                        trailing_hash: r.get(2)?,
                        full_hash: r.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        // Partial-update upsert: a present field overwrites, an absent one
        // preserves the existing column - but only when the stat still
        // matches what's stored. A size/mtime mismatch means the file
        // changed since that row was written, so its old hashes are
        // meaningless and must not survive into the new row.
        let (final_trailing, final_full) = match existing {
            Some(row) if row.size == size as i64 && row.modified_at == modified_at => (
                trailing_hash.map(str::to_owned).or(row.trailing_hash),
                full_hash.map(str::to_owned).or(row.full_hash),
            ),
            _ => (
                trailing_hash.map(str::to_owned),
                full_hash.map(str::to_owned),
            ),
        };

        conn.execute(
            "INSERT OR REPLACE INTO file_hashes (path, size, modified_at, trailing_hash, full_hash)
             VALUES (?, ?, ?, ?, ?)",
            params![path_str, size as i64, modified_at, final_trailing, final_full],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), CacheError> {
        let conn = self.lock()?;
        let path_str = path.to_string_lossy();

        conn.execute("DELETE FROM file_hashes WHERE path = ?", [&path_str])
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM file_hashes", [])
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    fn stats(&self) -> Result<CacheStats, CacheError> {
        let conn = self.lock()?;

        let total_entries: usize = conn
            .query_row("SELECT COUNT(*) FROM file_hashes", [], |r| {
                r.get::<_, i64>(0).map(|v| v as usize)
            })
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        let trailing_hash_count: usize = conn
            .query_row(
                "SELECT COUNT(*) FROM file_hashes WHERE trailing_hash IS NOT NULL",
                [],
                |r| r.get::<_, i64>(0).map(|v| v as usize),
            )
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        let full_hash_count: usize = conn
            .query_row(
                "SELECT COUNT(*) FROM file_hashes WHERE full_hash IS NOT NULL",
                [],
                |r| r.get::<_, i64>(0).map(|v| v as usize),
            )
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(CacheStats {
            total_entries,
            trailing_hash_count,
            full_hash_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_database_file() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("hash_cache.db");

        let cache = SqliteCache::open(&db_path).unwrap();

        assert!(db_path.exists());
        assert_eq!(cache.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn lookup_miss_on_unknown_path() {
        let dir = TempDir::new().unwrap();
        let cache = SqliteCache::open(&dir.path().join("db")).unwrap();

        assert!(cache
            .lookup(Path::new("/nope.arw"), 100, 1000)
            .unwrap()
            .is_none());
    }

    #[test]
    fn store_then_lookup_round_trips() {
        let dir = TempDir::new().unwrap();
        let cache = SqliteCache::open(&dir.path().join("db")).unwrap();
        let path = Path::new("/a.arw");

        cache.store(path, 100, 1000, Some("trail"), None).unwrap();

        let entry = cache.lookup(path, 100, 1000).unwrap().unwrap();
        assert_eq!(entry.trailing_hash.as_deref(), Some("trail"));
        assert_eq!(entry.full_hash, None);
    }

    #[test]
    fn partial_store_preserves_other_field() {
        let dir = TempDir::new().unwrap();
        let cache = SqliteCache::open(&dir.path().join("db")).unwrap();
        let path = Path::new("/a.arw");

        cache.store(path, 100, 1000, Some("trail"), None).unwrap();
        cache.store(path, 100, 1000, None, Some("full")).unwrap();

        let entry = cache.lookup(path, 100, 1000).unwrap().unwrap();
        assert_eq!(entry.trailing_hash.as_deref(), Some("trail"));
        assert_eq!(entry.full_hash.as_deref(), Some("full"));
    }

    #[test]
    fn mismatched_stat_invalidates_entry() {
        let dir = TempDir::new().unwrap();
        let cache = SqliteCache::open(&dir.path().join("db")).unwrap();
        let path = Path::new("/a.arw");

        cache.store(path, 100, 1000, Some("trail"), Some("full")).unwrap();

        assert!(cache.lookup(path, 100, 2000).unwrap().is_none());
        assert!(cache.lookup(path, 200, 1000).unwrap().is_none());
    }

    #[test]
    fn store_after_mutation_discards_stale_hashes() {
        let dir = TempDir::new().unwrap();
        let cache = SqliteCache::open(&dir.path().join("db")).unwrap();
        let path = Path::new("/a.arw");

        cache.store(path, 100, 1000, Some("trail"), Some("full")).unwrap();
        // File changed: new size/mtime, only a trailing hash computed so far.
        cache.store(path, 200, 2000, Some("new-trail"), None).unwrap();

        let entry = cache.lookup(path, 200, 2000).unwrap().unwrap();
        assert_eq!(entry.trailing_hash.as_deref(), Some("new-trail"));
        assert_eq!(entry.full_hash, None);
    }

    #[test]
    fn clear_removes_all_entries() {
        let dir = TempDir::new().unwrap();
        let cache = SqliteCache::open(&dir.path().join("db")).unwrap();

        cache.store(Path::new("/a"), 1, 1, Some("x"), None).unwrap();
        cache.store(Path::new("/b"), 1, 1, Some("y"), None).unwrap();

        cache.clear().unwrap();

        assert_eq!(cache.stats().unwrap().total_entries, 0);
    }

    #[test]
    fn remove_deletes_specific_entry() {
        let dir = TempDir::new().unwrap();
        let cache = SqliteCache::open(&dir.path().join("db")).unwrap();
        let path = Path::new("/a");

        cache.store(path, 1, 1, Some("x"), None).unwrap();
        cache.remove(path).unwrap();

        assert!(cache.lookup(path, 1, 1).unwrap().is_none());
    }
}
