//! Configuration shape consumed (not owned) by the core.
//!
//! The configuration file itself belongs to the UI collaborator; the core
//! only needs to read `directories[*].path` where `enabled`. We still own
//! `load`/`save` so the CLI and the Tauri command surface share one
//! implementation, resolving its persistence path via `dirs` the same way
//! the cache module resolves its own database path.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PhotoCleanerError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub path: PathBuf,
    pub enabled: bool,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Size,
    ModifiedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    Grid,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterMode {
    All,
    DuplicatesOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub directories: Vec<DirectoryConfig>,
    #[serde(default = "default_view_mode")]
    pub view_mode: ViewMode,
    #[serde(default = "default_sort_field")]
    pub sort_field: SortField,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
    #[serde(default = "default_filter_mode")]
    pub filter_mode: FilterMode,
}

fn default_view_mode() -> ViewMode {
    ViewMode::Grid
}

fn default_sort_field() -> SortField {
    SortField::Name
}

fn default_sort_order() -> SortOrder {
    SortOrder::Ascending
}

fn default_filter_mode() -> FilterMode {
    FilterMode::All
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            view_mode: default_view_mode(),
            sort_field: default_sort_field(),
            sort_order: default_sort_order(),
            filter_mode: default_filter_mode(),
        }
    }
}

impl AppConfig {
    /// Enabled roots, in declaration order - the only thing the core
    /// actually consumes from configuration.
    pub fn enabled_roots(&self) -> Vec<PathBuf> {
        self.directories
            .iter()
            .filter(|d| d.enabled)
            .map(|d| d.path.clone())
            .collect()
    }

    /// Load from `path`, defaulting to an empty config when the file is
    /// absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| PhotoCleanerError::Config(format!("reading {}: {e}", path.display())))?;

        serde_json::from_str(&contents)
            .map_err(|e| PhotoCleanerError::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| PhotoCleanerError::Config(format!("creating {}: {e}", parent.display())))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| PhotoCleanerError::Config(format!("serializing config: {e}")))?;

        fs::write(path, contents)
            .map_err(|e| PhotoCleanerError::Config(format!("writing {}: {e}", path.display())))
    }
}

/// Resolve `<app-data>/config.json` via the `dirs` crate, the same way the
/// cache database path is resolved.
pub fn default_config_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("photo-dedup").join("config.json"))
        .ok_or_else(|| PhotoCleanerError::Config("could not determine app data directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = AppConfig::load(&path).unwrap();
        assert!(config.directories.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.directories.push(DirectoryConfig {
            path: PathBuf::from("/photos/vacation"),
            enabled: true,
            name: "Vacation".into(),
        });
        config.directories.push(DirectoryConfig {
            path: PathBuf::from("/photos/archive"),
            enabled: false,
            name: "Archive".into(),
        });

        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();

        assert_eq!(loaded.directories.len(), 2);
        assert_eq!(loaded.enabled_roots(), vec![PathBuf::from("/photos/vacation")]);
    }

    #[test]
    fn enabled_roots_filters_disabled_directories() {
        let config = AppConfig {
            directories: vec![
                DirectoryConfig {
                    path: PathBuf::from("/a"),
                    enabled: true,
                    name: "a".into(),
                },
                DirectoryConfig {
                    path: PathBuf::from("/b"),
                    enabled: false,
                    name: "b".into(),
                },
            ],
            ..Default::default()
        };

        assert_eq!(config.enabled_roots(), vec![PathBuf::from("/a")]);
    }
}
