//! # Collapser Module
//!
//! Groups `RawFile` records that share a base name within one directory
//! into a single `LogicalPhoto`, classifying the non-primary members as
//! sidecars, JPEG previews, or traceability-only RAW siblings.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::formats::{self, Kind};
use crate::core::scanner::RawFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedKind {
    Sidecar,
    JpegPreview,
    Raw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedFile {
    pub path: PathBuf,
    pub name: String,
    pub kind: RelatedKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalPhoto {
    /// Stable within a scan; deterministic function of `primary.path`.
    pub id: String,
    pub primary: RawFile,
    pub related: Vec<RelatedFile>,
    pub thumbnail_path: Option<PathBuf>,
    pub size: u64,
    pub modified_at: i64,
    /// Full content digest; present only after the detector has needed it.
    pub hash: Option<String>,
    pub is_duplicate: bool,
    pub duplicate_of: Option<String>,
}

impl LogicalPhoto {
    fn from_group(primary: RawFile, members: Vec<RawFile>) -> Self {
        let mut related = Vec::new();
        let mut thumbnail_path = if formats::is_standard(&primary.extension) {
            Some(primary.path.clone())
        } else {
            None
        };

        for member in members {
            if member.path == primary.path {
                continue;
            }

            let kind = match formats::classify(&member.extension) {
                Some(Kind::Sidecar) => RelatedKind::Sidecar,
                Some(Kind::Standard) => {
                    // Only a jpeg_preview when the primary is RAW - a
                    // non-jpeg standard raster alongside a RAW primary
                    // (rare) still counts as traceability, not a preview.
                    if formats::is_raw(&primary.extension)
                        && matches!(member.extension.as_str(), "jpg" | "jpeg")
                    {
                        thumbnail_path.get_or_insert_with(|| member.path.clone());
                        RelatedKind::JpegPreview
                    } else {
                        RelatedKind::Raw
                    }
                }
                Some(Kind::Raw) => RelatedKind::Raw,
                None => continue,
            };

            related.push(RelatedFile {
                path: member.path,
                name: member.name,
                kind,
            });
        }

        let id = compute_id(&primary.path);
        let size = primary.size;
        let modified_at = primary.modified_at;

        Self {
            id,
            primary,
            related,
            thumbnail_path,
            size,
            modified_at,
            hash: None,
            is_duplicate: false,
            duplicate_of: None,
        }
    }
}

fn compute_id(path: &std::path::Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    format!("{:x}", hasher.finalize())
}

fn base_name(raw: &RawFile) -> String {
    raw.name
        .strip_suffix(&format!(".{}", raw.extension))
        .unwrap_or(&raw.name)
        .to_lowercase()
}

/// Group raw files by base name within each directory, selecting a
/// primary per group and classifying the rest as related files.
///
/// Base-name groups that contain no RAW or standard-raster member (a lone
/// sidecar) are discarded entirely - not a photo.
pub fn collapse(raw_files: Vec<RawFile>) -> Vec<LogicalPhoto> {
    let mut by_directory: HashMap<PathBuf, HashMap<String, Vec<RawFile>>> = HashMap::new();

    for raw in raw_files {
        let dir = raw.directory.clone();
        let key = base_name(&raw);
        by_directory.entry(dir).or_default().entry(key).or_default().push(raw);
    }

    let mut photos = Vec::new();
    let mut seen_paths: HashSet<PathBuf> = HashSet::new();

    for (_, groups) in by_directory {
        for (_, mut members) in groups {
            members.sort_by(|a, b| a.path.cmp(&b.path));

            let primary_index = select_primary(&members);
            let Some(primary_index) = primary_index else {
                continue;
            };

            let primary = members.remove(primary_index);

            if !seen_paths.insert(primary.path.clone()) {
                continue;
            }
            members.retain(|m| seen_paths.insert(m.path.clone()));

            photos.push(LogicalPhoto::from_group(primary, members));
        }
    }

    photos
}

/// Index of the chosen primary within `members`, or `None` if the group
/// has no RAW or standard-raster candidate.
fn select_primary(members: &[RawFile]) -> Option<usize> {
    let raw_candidates: Vec<usize> = members
        .iter()
        .enumerate()
        .filter(|(_, m)| formats::is_raw(&m.extension))
        .map(|(i, _)| i)
        .collect();

    if !raw_candidates.is_empty() {
        return Some(
            raw_candidates
                .into_iter()
                .min_by(|&a, &b| members[a].path.cmp(&members[b].path))
                .unwrap(),
        );
    }

    let standard_candidates: Vec<usize> = members
        .iter()
        .enumerate()
        .filter(|(_, m)| formats::is_standard(&m.extension))
        .map(|(i, _)| i)
        .collect();

    standard_candidates
        .into_iter()
        .min_by(|&a, &b| members[a].path.cmp(&members[b].path))
}
