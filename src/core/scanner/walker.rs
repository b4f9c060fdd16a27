//! Directory walking implementation using walkdir.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use walkdir::WalkDir;

use crate::core::cancellation::CancellationToken;
use crate::error::ScanError;
use crate::events::{Event, EventSender, Phase, ScanProgress};

use super::{filter::ExtensionFilter, DiscoverResult, Discoverer, RawFile};

const PROGRESS_TICK_INTERVAL: usize = 200;

/// Configuration for the directory walk.
#[derive(Debug, Clone)]
pub struct DiscoverConfig {
    pub follow_symlinks: bool,
    pub include_hidden: bool,
    pub max_depth: Option<usize>,
    pub extensions: Option<Vec<String>>,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            max_depth: None,
            extensions: None,
        }
    }
}

/// Discoverer implementation using the `walkdir` crate.
pub struct WalkDirDiscoverer {
    config: DiscoverConfig,
    filter: ExtensionFilter,
    cancellation: Option<CancellationToken>,
}

impl WalkDirDiscoverer {
    pub fn new(config: DiscoverConfig) -> Self {
        let mut filter = ExtensionFilter::new().with_hidden(config.include_hidden);
        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self {
            config,
            filter,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(CancellationToken::is_cancelled)
            .unwrap_or(false)
    }

    fn scan_root(
        &self,
        root: &Path,
        events: Option<&EventSender>,
        discovered_so_far: &mut usize,
    ) -> Result<(Vec<RawFile>, Vec<ScanError>), ScanError> {
        if !root.exists() || !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(self.config.max_depth.unwrap_or(usize::MAX));

        for entry_result in walker.into_iter().filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if entry.file_type().is_dir() {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| self.filter.should_descend(name))
                    .unwrap_or(true)
            } else {
                true
            }
        }) {
            if self.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if entry.file_type().is_dir() {
                        continue;
                    }

                    if !self.filter.should_include(path) {
                        continue;
                    }

                    match stat_raw_file(path) {
                        Ok(raw) => {
                            *discovered_so_far += 1;
                            if let Some(sender) = events {
                                if *discovered_so_far % PROGRESS_TICK_INTERVAL == 0 {
                                    sender.send(Event::ScanProgress(ScanProgress::tick(
                                        Phase::Discovery,
                                        *discovered_so_far,
                                        0,
                                    )));
                                }
                            }
                            files.push(raw);
                        }
                        Err(warning) => warnings.push(warning),
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let warning = if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path }
                    } else {
                        ScanError::ReadDirectory {
                            path,
                            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                        }
                    };
                    warnings.push(warning);
                }
            }
        }

        Ok((files, warnings))
    }
}

impl Discoverer for WalkDirDiscoverer {
    fn discover(&self, roots: &[PathBuf]) -> Result<DiscoverResult, ScanError> {
        self.discover_with_events(roots, &crate::events::null_sender())
    }

    fn discover_with_events(
        &self,
        roots: &[PathBuf],
        events: &EventSender,
    ) -> Result<DiscoverResult, ScanError> {
        events.send(Event::ScanProgress(ScanProgress::boundary(
            Phase::Discovery,
            format!("scanning {} root(s)", roots.len()),
        )));

        let mut all_files = Vec::new();
        let mut all_warnings = Vec::new();
        let mut discovered = 0usize;

        for root in roots {
            match self.scan_root(root, Some(events), &mut discovered) {
                Ok((files, warnings)) => {
                    all_files.extend(files);
                    all_warnings.extend(warnings);
                }
                Err(ScanError::Cancelled) => {
                    events.send(Event::ScanProgress(ScanProgress::boundary(
                        Phase::Cancelled,
                        "discovery cancelled",
                    )));
                    return Err(ScanError::Cancelled);
                }
                Err(e) => all_warnings.push(e),
            }
        }

        Ok(DiscoverResult {
            files: all_files,
            warnings: all_warnings,
        })
    }
}

fn stat_raw_file(path: &Path) -> Result<RawFile, ScanError> {
    let metadata = fs::metadata(path).map_err(|source| ScanError::ReadDirectory {
        path: path.to_path_buf(),
        source,
    })?;

    // RawFile.path is contracted as canonicalised with no `..` (§3) -
    // ids and keeper selection derive from this string downstream.
    let path = fs::canonicalize(path).map_err(|source| ScanError::ReadDirectory {
        path: path.to_path_buf(),
        source,
    })?;

    let size = metadata.len();
    let modified_at = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    let is_cloud_placeholder = detect_cloud_placeholder(&path, size);

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(crate::core::formats::normalize)
        .unwrap_or_default();
    let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();

    Ok(RawFile {
        path,
        name,
        extension,
        directory,
        size,
        modified_at,
        is_cloud_placeholder,
    })
}

/// Zero-size files are provisionally flagged as cloud placeholders on
/// every platform. On macOS we additionally consult the file's extended
/// attributes for the cloud-sync "excluded item" marker some clients set,
/// since a zero-size file there is sometimes just an empty file rather
/// than a dataless stub.
fn detect_cloud_placeholder(path: &Path, size: u64) -> bool {
    if size != 0 {
        return false;
    }

    #[cfg(target_os = "macos")]
    {
        has_macos_placeholder_marker(path)
    }

    #[cfg(not(target_os = "macos"))]
    {
        let _ = path;
        true
    }
}

#[cfg(target_os = "macos")]
fn has_macos_placeholder_marker(path: &Path) -> bool {
    match xattr::list(path) {
        Ok(attrs) => attrs
            .into_iter()
            .any(|name| name.to_string_lossy().contains("com.apple.metadata:com_apple_backup_excludeItem")),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    #[test]
    fn empty_directory_yields_no_files() {
        let dir = TempDir::new().unwrap();
        let discoverer = WalkDirDiscoverer::new(DiscoverConfig::default());

        let result = discoverer.discover(&[dir.path().to_path_buf()]).unwrap();

        assert!(result.files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn finds_accepted_extensions_only() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "photo.arw", b"raw");
        write_file(&dir, "photo.jpg", b"jpeg");
        write_file(&dir, "photo.xmp", b"<xmp/>");
        write_file(&dir, "notes.txt", b"text");

        let discoverer = WalkDirDiscoverer::new(DiscoverConfig::default());
        let result = discoverer.discover(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(result.files.len(), 3);
    }

    #[test]
    fn skips_hidden_files_and_directories_by_default() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, ".hidden.jpg", b"jpeg");
        let hidden_dir = dir.path().join(".git");
        fs::create_dir(&hidden_dir).unwrap();
        fs::write(hidden_dir.join("inside.jpg"), b"jpeg").unwrap();
        write_file(&dir, "visible.jpg", b"jpeg");

        let discoverer = WalkDirDiscoverer::new(DiscoverConfig::default());
        let result = discoverer.discover(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("visible.jpg"));
    }

    #[test]
    fn skips_at_prefixed_directories() {
        let dir = TempDir::new().unwrap();
        let meta_dir = dir.path().join("@eaDir");
        fs::create_dir(&meta_dir).unwrap();
        fs::write(meta_dir.join("thumb.jpg"), b"jpeg").unwrap();
        write_file(&dir, "real.jpg", b"jpeg");

        let discoverer = WalkDirDiscoverer::new(DiscoverConfig::default());
        let result = discoverer.discover(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("real.jpg"));
    }

    #[test]
    fn traverses_nested_directories() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "root.jpg", b"jpeg");
        let subdir = dir.path().join("2024");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("nested.jpg"), b"jpeg").unwrap();

        let discoverer = WalkDirDiscoverer::new(DiscoverConfig::default());
        let result = discoverer.discover(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn zero_size_file_is_flagged_as_placeholder() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "stub.arw", b"");

        let discoverer = WalkDirDiscoverer::new(DiscoverConfig::default());
        let result = discoverer.discover(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].is_cloud_placeholder);
    }

    #[test]
    fn nonexistent_root_is_reported_as_a_warning_not_a_panic() {
        let discoverer = WalkDirDiscoverer::new(DiscoverConfig::default());
        let result = discoverer
            .discover(&[PathBuf::from("/nonexistent/path/12345")])
            .unwrap();

        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn extensions_are_normalized_to_lowercase() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "IMG_01.ARW", b"raw");

        let discoverer = WalkDirDiscoverer::new(DiscoverConfig::default());
        let result = discoverer.discover(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(result.files[0].extension, "arw");
    }

    #[test]
    fn emitted_path_is_canonicalised() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "a.jpg", b"jpeg");
        let subdir = dir.path().join("sub");
        fs::create_dir(&subdir).unwrap();

        // Walk through a root containing a `..` component; the emitted
        // path must not carry it through.
        let root_with_dotdot = subdir.join("..");

        let discoverer = WalkDirDiscoverer::new(DiscoverConfig::default());
        let result = discoverer.discover(&[root_with_dotdot]).unwrap();

        assert_eq!(result.files.len(), 1);
        let emitted = &result.files[0].path;
        assert!(!emitted.components().any(|c| c.as_os_str() == ".."));
        assert_eq!(*emitted, fs::canonicalize(dir.path().join("a.jpg")).unwrap());
    }
}
