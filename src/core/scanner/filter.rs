//! Extension-based file filtering for the discoverer.

use std::path::Path;

use crate::core::formats;

/// Filters directory entries down to accepted, non-hidden files.
pub struct ExtensionFilter {
    extensions: Option<std::collections::HashSet<String>>,
    include_hidden: bool,
}

impl ExtensionFilter {
    pub fn new() -> Self {
        Self {
            extensions: None,
            include_hidden: false,
        }
    }

    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the default RAW ∪ standard ∪ sidecar set.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = Some(
            extensions
                .into_iter()
                .map(|e| formats::normalize(&e))
                .collect(),
        );
        self
    }

    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = formats::normalize(ext);

        match &self.extensions {
            Some(allowed) => allowed.contains(&ext),
            None => formats::is_accepted(&ext),
        }
    }

    /// Should this directory be descended into?
    pub fn should_descend(&self, dir_name: &str) -> bool {
        if dir_name.starts_with('@') {
            return false;
        }
        if !self.include_hidden && dir_name.starts_with('.') {
            return false;
        }
        true
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new()
    }
}
