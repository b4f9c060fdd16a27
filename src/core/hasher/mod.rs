//! # Hasher Module
//!
//! Computes content hashes of a file on demand, consulting and updating
//! the hash cache so unchanged files are never re-read.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::core::cache::CacheBackend;
use crate::error::HashError;

/// Bytes digested for the trailing hash, or the whole file if smaller.
pub const TRAILING_HASH_BYTES: u64 = 1024 * 1024;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Computes trailing and full content hashes, cache-consulting.
pub trait Hasher: Send + Sync {
    fn trailing_hash(&self, path: &Path, size: u64, modified_at: i64) -> Result<String, HashError>;
    fn full_hash(&self, path: &Path, size: u64, modified_at: i64) -> Result<String, HashError>;
}

/// SHA-256 content hasher backed by a `CacheBackend`.
pub struct Sha256Hasher<'a> {
    cache: &'a dyn CacheBackend,
}

impl<'a> Sha256Hasher<'a> {
    pub fn new(cache: &'a dyn CacheBackend) -> Self {
        Self { cache }
    }

    fn open(path: &Path) -> Result<File, HashError> {
        File::open(path).map_err(|source| HashError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<'a> Hasher for Sha256Hasher<'a> {
    fn trailing_hash(&self, path: &Path, size: u64, modified_at: i64) -> Result<String, HashError> {
        if let Some(entry) = self
            .cache
            .lookup(path, size, modified_at)
            .ok()
            .flatten()
        {
            if let Some(hash) = entry.trailing_hash {
                return Ok(hash);
            }
        }

        let mut file = Self::open(path)?;

        let start = size.saturating_sub(TRAILING_HASH_BYTES);
        file.seek(SeekFrom::Start(start))
            .map_err(|source| HashError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let mut buf = Vec::with_capacity((size - start) as usize);
        file.read_to_end(&mut buf).map_err(|source| HashError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let digest = hex_digest(&buf);

        let _ = self.cache.store(path, size, modified_at, Some(&digest), None);

        Ok(digest)
    }

    fn full_hash(&self, path: &Path, size: u64, modified_at: i64) -> Result<String, HashError> {
        if let Some(entry) = self
            .cache
            .lookup(path, size, modified_at)
            .ok()
            .flatten()
        {
            if let Some(hash) = entry.full_hash {
                return Ok(hash);
            }
        }

        let mut file = Self::open(path)?;
        let mut hasher = Sha256::new();
        let mut buf = [0u8; READ_BUFFER_SIZE];

        loop {
            let n = file.read(&mut buf).map_err(|source| HashError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        let digest = format!("{:x}", hasher.finalize());

        let _ = self.cache.store(path, size, modified_at, None, Some(&digest));

        Ok(digest)
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Hash a file, failing fast for cloud placeholders rather than computing
/// anything - the caller (the detector, pass B/C) must check
/// `is_cloud_placeholder` itself and never call into the hasher for one,
/// but this guard exists as a defense against misuse from other callers.
pub fn reject_placeholder(path: &Path, is_cloud_placeholder: bool) -> Result<(), HashError> {
    if is_cloud_placeholder {
        return Err(HashError::CloudPlaceholder {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::InMemoryCache;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    #[test]
    fn full_hash_is_sha256_of_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.bin", b"hello world");
        let cache = InMemoryCache::new();
        let hasher = Sha256Hasher::new(&cache);

        let digest = hasher.full_hash(&path, 11, 1000).unwrap();

        let expected = format!("{:x}", Sha256::digest(b"hello world"));
        assert_eq!(digest, expected);
    }

    #[test]
    fn trailing_hash_of_small_file_equals_full_hash_of_whole_content() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.bin", b"short");
        let cache = InMemoryCache::new();
        let hasher = Sha256Hasher::new(&cache);

        let trailing = hasher.trailing_hash(&path, 5, 1000).unwrap();
        let expected = format!("{:x}", Sha256::digest(b"short"));

        assert_eq!(trailing, expected);
    }

    #[test]
    fn trailing_hash_only_digests_last_megabyte() {
        let dir = TempDir::new().unwrap();
        let mut contents = vec![0u8; 2 * 1024 * 1024];
        contents[2 * 1024 * 1024 - 1] = 0xAB;
        let path = write_file(&dir, "big.bin", &contents);
        let cache = InMemoryCache::new();
        let hasher = Sha256Hasher::new(&cache);

        let trailing = hasher
            .trailing_hash(&path, contents.len() as u64, 1000)
            .unwrap();

        let expected = hex_digest(&contents[contents.len() - TRAILING_HASH_BYTES as usize..]);
        assert_eq!(trailing, expected);
    }

    #[test]
    fn repeat_call_with_unchanged_stat_reads_cache_not_disk() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.bin", b"hello world");
        let cache = InMemoryCache::new();
        let hasher = Sha256Hasher::new(&cache);

        let first = hasher.full_hash(&path, 11, 1000).unwrap();

        // Remove the file: a second call must still succeed purely from cache.
        std::fs::remove_file(&path).unwrap();
        let second = hasher.full_hash(&path, 11, 1000).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn changed_mtime_forces_recompute() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.bin", b"hello world");
        let cache = InMemoryCache::new();
        let hasher = Sha256Hasher::new(&cache);

        hasher.full_hash(&path, 11, 1000).unwrap();

        std::fs::remove_file(&path).unwrap();
        let result = hasher.full_hash(&path, 11, 2000);

        assert!(result.is_err());
    }

    #[test]
    fn placeholder_rejected_without_touching_filesystem() {
        let result = reject_placeholder(Path::new("/cloud/file.arw"), true);
        assert!(matches!(result, Err(HashError::CloudPlaceholder { .. })));
    }
}
