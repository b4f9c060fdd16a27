//! # SmartSelect Module
//!
//! Given duplicate groups, applies an ordered, narrowing rule engine to
//! recommend which members should be deleted, and exposes a safety check
//! so the UI can warn before a group would be erased entirely.

use std::collections::HashSet;

use regex::Regex;

use crate::core::collapser::LogicalPhoto;

/// One duplicate group: the keeper plus every member sharing its
/// `duplicate_of`/id.
pub type DuplicateGroup<'a> = Vec<&'a LogicalPhoto>;

trait Rule {
    /// Returns true if the path is "preferred" (should survive this rule).
    fn prefers(&self, photo: &LogicalPhoto) -> bool;
}

struct OrganizedYearFolder(Regex);
impl OrganizedYearFolder {
    fn new() -> Self {
        Self(Regex::new(r"/Camera Uploads/\d{4}/").unwrap())
    }
}
impl Rule for OrganizedYearFolder {
    fn prefers(&self, photo: &LogicalPhoto) -> bool {
        self.0.is_match(&photo.primary.path.to_string_lossy())
    }
}

struct HumanDateName(Regex);
impl HumanDateName {
    fn new() -> Self {
        Self(Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap())
    }
}
impl Rule for HumanDateName {
    fn prefers(&self, photo: &LogicalPhoto) -> bool {
        self.0.is_match(&photo.primary.name)
    }
}

struct InsideCameraUploads;
impl Rule for InsideCameraUploads {
    fn prefers(&self, photo: &LogicalPhoto) -> bool {
        // Accepts both the full "/Dropbox/Camera Uploads/" path and
        // display-shortened forms sync clients substitute (e.g. "Dropbox
        // (Maestral)/Camera Uploads/", "~/Camera Uploads/") - all of them
        // contain the "Camera Uploads/" segment itself.
        photo
            .primary
            .path
            .to_string_lossy()
            .contains("Camera Uploads/")
    }
}

fn rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(OrganizedYearFolder::new()),
        Box::new(HumanDateName::new()),
        Box::new(InsideCameraUploads),
    ]
}

/// Apply the ordered rule set to one duplicate group, returning the ids
/// recommended for deletion.
///
/// Each rule partitions the surviving candidates into "preferred" and
/// "other". If both sides are non-empty, "other" is moved into the
/// deletion set and the next rule only considers "preferred". A rule that
/// does not split (everyone on one side) is skipped.
pub fn select_group(group: &[&LogicalPhoto]) -> HashSet<String> {
    let mut deletions = HashSet::new();
    let mut surviving: Vec<&LogicalPhoto> = group.to_vec();

    for rule in rules() {
        let (preferred, other): (Vec<_>, Vec<_>) =
            surviving.iter().partition(|p| rule.prefers(p));

        if preferred.is_empty() || other.is_empty() {
            continue;
        }

        for photo in &other {
            deletions.insert(photo.id.clone());
        }
        surviving = preferred;
    }

    deletions
}

/// Apply `select_group` across every duplicate group.
pub fn select(groups: &[DuplicateGroup<'_>]) -> HashSet<String> {
    groups.iter().flat_map(|g| select_group(g)).collect()
}

/// Count of groups whose *every* member is in `selection` - such groups
/// would erase all copies and must be surfaced as a blocking warning.
pub fn groups_fully_selected(groups: &[DuplicateGroup<'_>], selection: &HashSet<String>) -> usize {
    groups
        .iter()
        .filter(|group| group.iter().all(|p| selection.contains(&p.id)))
        .count()
}
