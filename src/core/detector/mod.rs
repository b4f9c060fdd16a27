//! # DuplicateDetector Module
//!
//! Three-pass duplicate detection over a collapsed photo set: size
//! grouping, then trailing-hash pruning, then full-hash confirmation.
//! Passes B and C parallelize sub-bucket hashing across a bounded worker
//! pool.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::core::cache::CacheBackend;
use crate::core::cancellation::CancellationToken;
use crate::core::collapser::LogicalPhoto;
use crate::core::hasher::{Hasher, Sha256Hasher};
use crate::error::ScanError;
use crate::events::{Event, EventSender, Phase, ScanProgress};

const PROGRESS_TICK_INTERVAL: usize = 50;

fn worker_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(8)
}

/// Outcome of a (possibly cancelled) detection run.
pub struct DetectOutcome {
    pub photos: Vec<LogicalPhoto>,
    pub cancelled: bool,
}

/// Run the three-pass detector over `photos`, annotating `hash`,
/// `is_duplicate`, and `duplicate_of` in place.
///
/// On cancellation, the current hash in progress is allowed to finish;
/// buckets not yet started are folded back into the result untouched
/// (`is_duplicate = false`, no hash) rather than discarded.
pub fn detect(
    photos: Vec<LogicalPhoto>,
    cache: &dyn CacheBackend,
    events: &EventSender,
    cancellation: &CancellationToken,
) -> Result<DetectOutcome, ScanError> {
    events.send(Event::ScanProgress(ScanProgress::boundary(
        Phase::Analyzing,
        format!("analyzing {} photos", photos.len()),
    )));

    // Pass A: size grouping.
    let mut size_buckets: HashMap<u64, Vec<LogicalPhoto>> = HashMap::new();
    for photo in photos {
        size_buckets.entry(photo.size).or_default().push(photo);
    }

    let mut singletons = Vec::new();
    let mut candidate_buckets = Vec::new();
    for (_, bucket) in size_buckets {
        if bucket.len() < 2 {
            singletons.extend(bucket);
        } else {
            candidate_buckets.push(bucket);
        }
    }

    // Pass B: trailing-hash pruning.
    events.send(Event::ScanProgress(ScanProgress::boundary(
        Phase::TrailingHash,
        format!("computing trailing hashes over {} candidate group(s)", candidate_buckets.len()),
    )));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_pool_size())
        .build()
        .map_err(|e| ScanError::ReadDirectory {
            path: Default::default(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?;

    let mut trailing_survivors: Vec<Vec<LogicalPhoto>> = Vec::new();
    let mut hashed_count = 0usize;
    let mut cancelled = false;

    let mut bucket_iter = candidate_buckets.into_iter();
    for bucket in &mut bucket_iter {
        if cancellation.is_cancelled() {
            cancelled = true;
            break;
        }

        let hasher = Sha256Hasher::new(cache);
        let mut sub_buckets: HashMap<String, Vec<LogicalPhoto>> = HashMap::new();

        let (placeholders, hashable): (Vec<_>, Vec<_>) =
            bucket.into_iter().partition(|p| p.primary.is_cloud_placeholder);
        singletons.extend(placeholders);

        let hashed: Vec<(LogicalPhoto, Option<String>)> = pool.install(|| {
            hashable
                .into_par_iter()
                .map(|photo| {
                    // Checked before starting this file's hash, never mid-read.
                    if cancellation.is_cancelled() {
                        return (photo, None);
                    }
                    let trailing = hasher
                        .trailing_hash(&photo.primary.path, photo.size, photo.modified_at)
                        .ok();
                    (photo, trailing)
                })
                .collect()
        });

        for (photo, trailing) in hashed {
            hashed_count += 1;
            if hashed_count % PROGRESS_TICK_INTERVAL == 0 {
                events.send(Event::ScanProgress(ScanProgress::tick(
                    Phase::TrailingHash,
                    hashed_count,
                    0,
                )));
            }

            match trailing {
                Some(hash) => sub_buckets.entry(hash).or_default().push(photo),
                None => singletons.push(photo),
            }
        }

        for (_, sub_bucket) in sub_buckets {
            if sub_bucket.len() < 2 {
                singletons.extend(sub_bucket);
            } else {
                trailing_survivors.push(sub_bucket);
            }
        }
    }
    // Buckets never started: fold back in untouched, not duplicates.
    for remaining_bucket in bucket_iter {
        singletons.extend(remaining_bucket);
    }

    // Pass C: full-hash confirmation.
    events.send(Event::ScanProgress(ScanProgress::boundary(
        Phase::Hashing,
        format!("confirming {} sub-group(s) with full hashes", trailing_survivors.len()),
    )));

    let mut full_hash_groups: HashMap<String, Vec<LogicalPhoto>> = HashMap::new();
    let mut full_hashed_count = 0usize;

    let mut survivor_iter = trailing_survivors.into_iter();
    if !cancelled {
        for sub_bucket in &mut survivor_iter {
            if cancellation.is_cancelled() {
                cancelled = true;
                break;
            }

            let hasher = Sha256Hasher::new(cache);

            let hashed: Vec<(LogicalPhoto, Option<String>)> = pool.install(|| {
                sub_bucket
                    .into_par_iter()
                    .map(|photo| {
                        if cancellation.is_cancelled() {
                            return (photo, None);
                        }
                        let full = hasher
                            .full_hash(&photo.primary.path, photo.size, photo.modified_at)
                            .ok();
                        (photo, full)
                    })
                    .collect()
            });

            for (mut photo, full) in hashed {
                full_hashed_count += 1;
                if full_hashed_count % PROGRESS_TICK_INTERVAL == 0 {
                    events.send(Event::ScanProgress(ScanProgress::tick(
                        Phase::Hashing,
                        full_hashed_count,
                        0,
                    )));
                }

                match full {
                    Some(hash) => {
                        photo.hash = Some(hash.clone());
                        full_hash_groups.entry(hash).or_default().push(photo);
                    }
                    None => singletons.push(photo),
                }
            }
        }
    }
    // Sub-buckets never started: their members are untouched, non-duplicate.
    for remaining_sub_bucket in survivor_iter {
        singletons.extend(remaining_sub_bucket);
    }

    events.send(Event::ScanProgress(ScanProgress::boundary(
        Phase::Duplicates,
        format!("{} group(s) share a full hash", full_hash_groups.values().filter(|g| g.len() > 1).count()),
    )));

    let mut result = singletons;
    for (_, mut group) in full_hash_groups {
        if group.len() < 2 {
            result.extend(group);
            continue;
        }

        annotate_duplicate_group(&mut group);
        result.extend(group);
    }

    Ok(DetectOutcome { photos: result, cancelled })
}

/// Keeper selection: shortest `primary.path` length, ties broken
/// lexicographically. Every other member is marked `is_duplicate = true`
/// with `duplicate_of` set to the keeper's id.
fn annotate_duplicate_group(group: &mut [LogicalPhoto]) {
    let keeper_index = group
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let a_path = a.primary.path.to_string_lossy();
            let b_path = b.primary.path.to_string_lossy();
            a_path
                .len()
                .cmp(&b_path.len())
                .then_with(|| a_path.cmp(&b_path))
        })
        .map(|(i, _)| i)
        .expect("group is non-empty");

    let keeper_id = group[keeper_index].id.clone();

    for (i, photo) in group.iter_mut().enumerate() {
        if i == keeper_index {
            photo.is_duplicate = false;
            photo.duplicate_of = None;
        } else {
            photo.is_duplicate = true;
            photo.duplicate_of = Some(keeper_id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::InMemoryCache;
    use crate::core::scanner::RawFile;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn photo_with_content(dir: &TempDir, name: &str, contents: &[u8]) -> LogicalPhoto {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();

        let raw = RawFile {
            path: path.clone(),
            name: name.to_string(),
            extension: "jpg".to_string(),
            directory: dir.path().to_path_buf(),
            size: contents.len() as u64,
            modified_at: 1000,
            is_cloud_placeholder: false,
        };

        LogicalPhoto {
            id: format!("id-{name}"),
            primary: raw,
            related: Vec::new(),
            thumbnail_path: Some(path),
            size: contents.len() as u64,
            modified_at: 1000,
            hash: None,
            is_duplicate: false,
            duplicate_of: None,
        }
    }

    #[test]
    fn unique_sizes_are_never_duplicates() {
        let dir = TempDir::new().unwrap();
        let photos = vec![
            photo_with_content(&dir, "a.jpg", b"aaa"),
            photo_with_content(&dir, "b.jpg", b"bbbb"),
        ];

        let cache = InMemoryCache::new();
        let result = detect(
            photos,
            &cache,
            &crate::events::null_sender(),
            &CancellationToken::new(),
        )
        .unwrap();
        let result = result.photos;

        assert!(result.iter().all(|p| !p.is_duplicate));
    }

    #[test]
    fn identical_content_forms_a_duplicate_group() {
        let dir = TempDir::new().unwrap();
        let photos = vec![
            photo_with_content(&dir, "a.jpg", b"same content"),
            photo_with_content(&dir, "bb.jpg", b"same content"),
            photo_with_content(&dir, "c.jpg", b"same content"),
        ];

        let cache = InMemoryCache::new();
        let result = detect(
            photos,
            &cache,
            &crate::events::null_sender(),
            &CancellationToken::new(),
        )
        .unwrap();
        let result = result.photos;

        let duplicates: Vec<_> = result.iter().filter(|p| p.is_duplicate).collect();
        assert_eq!(duplicates.len(), 2);

        let keeper = result.iter().find(|p| !p.is_duplicate).unwrap();
        assert!(duplicates.iter().all(|d| d.duplicate_of.as_deref() == Some(keeper.id.as_str())));
    }

    #[test]
    fn keeper_is_shortest_path_with_lexicographic_tiebreak() {
        let dir = TempDir::new().unwrap();
        let photos = vec![
            photo_with_content(&dir, "zzzzz.jpg", b"same"),
            photo_with_content(&dir, "a.jpg", b"same"),
        ];

        let cache = InMemoryCache::new();
        let result = detect(
            photos,
            &cache,
            &crate::events::null_sender(),
            &CancellationToken::new(),
        )
        .unwrap();
        let result = result.photos;

        let keeper = result.iter().find(|p| !p.is_duplicate).unwrap();
        assert!(keeper.primary.path.ends_with("a.jpg"));
    }

    #[test]
    fn placeholders_are_never_hashed_or_marked_duplicate() {
        let dir = TempDir::new().unwrap();
        let mut placeholder = photo_with_content(&dir, "stub.jpg", b"");
        placeholder.primary.is_cloud_placeholder = true;
        placeholder.primary.size = 10_000_000;
        placeholder.size = 10_000_000;

        let mut twin = photo_with_content(&dir, "twin.jpg", b"");
        twin.primary.size = 10_000_000;
        twin.size = 10_000_000;

        let cache = InMemoryCache::new();
        let result = detect(
            vec![placeholder, twin],
            &cache,
            &crate::events::null_sender(),
            &CancellationToken::new(),
        )
        .unwrap();
        let result = result.photos;

        let placeholder_result = result.iter().find(|p| p.primary.is_cloud_placeholder).unwrap();
        assert!(!placeholder_result.is_duplicate);
        assert!(placeholder_result.hash.is_none());
    }

    #[test]
    fn cancellation_before_detection_returns_all_photos_as_non_duplicates() {
        let dir = TempDir::new().unwrap();
        let photos = vec![
            photo_with_content(&dir, "a.jpg", b"same content"),
            photo_with_content(&dir, "b.jpg", b"same content"),
        ];

        let cache = InMemoryCache::new();
        let token = CancellationToken::new();
        token.cancel();

        let outcome = detect(photos, &cache, &crate::events::null_sender(), &token).unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.photos.len(), 2);
        assert!(outcome.photos.iter().all(|p| !p.is_duplicate && p.hash.is_none()));
    }
}
