//! Accepted file extensions and their classification.
//!
//! All matching is case-insensitive; extensions are normalized to
//! lower-case with no leading dot before comparison.

const RAW_EXTENSIONS: &[&str] = &[
    "arw", "cr2", "cr3", "nef", "dng", "raf", "orf", "rw2", "pef",
];

const STANDARD_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "heic", "heif", "tiff", "bmp",
];

const SIDECAR_EXTENSIONS: &[&str] = &["xmp", "xml"];

/// How a file's extension classifies it for collapsing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Raw,
    Standard,
    Sidecar,
}

/// Normalize an extension to the lower-case, no-dot form used everywhere else.
pub fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

pub fn is_raw(extension: &str) -> bool {
    RAW_EXTENSIONS.contains(&normalize(extension).as_str())
}

pub fn is_standard(extension: &str) -> bool {
    STANDARD_EXTENSIONS.contains(&normalize(extension).as_str())
}

pub fn is_sidecar(extension: &str) -> bool {
    SIDECAR_EXTENSIONS.contains(&normalize(extension).as_str())
}

/// Is this extension one the discoverer should pick up at all?
pub fn is_accepted(extension: &str) -> bool {
    is_raw(extension) || is_standard(extension) || is_sidecar(extension)
}

pub fn classify(extension: &str) -> Option<Kind> {
    let ext = normalize(extension);
    if RAW_EXTENSIONS.contains(&ext.as_str()) {
        Some(Kind::Raw)
    } else if STANDARD_EXTENSIONS.contains(&ext.as_str()) {
        Some(Kind::Standard)
    } else if SIDECAR_EXTENSIONS.contains(&ext.as_str()) {
        Some(Kind::Sidecar)
    } else {
        None
    }
}
