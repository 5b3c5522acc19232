use std::fs;
use std::path::Path;

/// The only recognised image extension (compared case-insensitively)
pub const JPEG_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file with a `.jpg` extension
    Jpeg,
    Directory,
    /// Anything else: other files, missing paths, special files, broken links
    Other,
}

/// Check if a file name carries the JPEG extension
pub fn has_jpeg_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(JPEG_EXTENSION))
}

/// Classify a path, following symlinks. Never fails: unreadable paths are `Other`.
pub fn classify(path: &Path) -> EntryKind {
    let Ok(meta) = fs::metadata(path) else {
        return EntryKind::Other;
    };

    if meta.is_dir() {
        EntryKind::Directory
    } else if meta.is_file() && has_jpeg_extension(path) {
        EntryKind::Jpeg
    } else {
        EntryKind::Other
    }
}
