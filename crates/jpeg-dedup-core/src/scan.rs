use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::classify::{classify, EntryKind};
use crate::date;
use crate::error::{Error, Result};
use crate::hash;
use crate::registry::{ImageRecord, Registry};

/// Counters gathered while scanning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// JPEG files hashed
    pub jpeg_files: u64,
    /// JPEG files whose content was already registered
    pub duplicates: u64,
    /// New records that used the file modification time
    pub timestamp_fallbacks: u64,
    /// Nested entries that could not be read
    pub unreadable: u64,
}

/// Scan every root in order against one shared registry.
pub fn explore_all(roots: &[PathBuf], registry: &mut Registry) -> Result<ScanStats> {
    let mut explorer = Explorer::new(registry);
    for root in roots {
        explorer.explore_root(root)?;
    }
    Ok(explorer.stats())
}

/// Scan a single root.
pub fn explore(root: &Path, registry: &mut Registry) -> Result<ScanStats> {
    let mut explorer = Explorer::new(registry);
    explorer.explore_root(root)?;
    Ok(explorer.stats())
}

/// Depth-first walker that fills a [`Registry`].
///
/// Errors on a root abort the scan. Errors below a root are logged and the
/// entry is skipped.
pub struct Explorer<'a> {
    registry: &'a mut Registry,
    visited_dirs: HashSet<PathBuf>,
    stats: ScanStats,
}

impl<'a> Explorer<'a> {
    pub fn new(registry: &'a mut Registry) -> Self {
        Self {
            registry,
            visited_dirs: HashSet::new(),
            stats: ScanStats::default(),
        }
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn explore_root(&mut self, root: &Path) -> Result<()> {
        fs::metadata(root).map_err(|source| Error::SourceInaccessible {
            path: root.to_path_buf(),
            source,
        })?;
        self.explore(root, true)
    }

    fn explore(&mut self, path: &Path, is_root: bool) -> Result<()> {
        match classify(path) {
            EntryKind::Directory => self.explore_dir(path, is_root),
            EntryKind::Jpeg => self.add_file(path, is_root),
            EntryKind::Other => {
                if path.is_file() {
                    debug!("Skipping non-JPG file: {}", path.display());
                } else {
                    debug!("Invalid path: {}", path.display());
                }
                Ok(())
            }
        }
    }

    fn explore_dir(&mut self, dir: &Path, is_root: bool) -> Result<()> {
        debug!("Processing directory: {}", dir.display());

        let canonical = match fs::canonicalize(dir) {
            Ok(p) => p,
            Err(e) => return self.recover(inaccessible(dir, e), is_root),
        };
        if !self.visited_dirs.insert(canonical) {
            debug!("Directory already visited, skipping: {}", dir.display());
            return Ok(());
        }

        let children = match sorted_children(dir) {
            Ok(c) => c,
            Err(e) => return self.recover(inaccessible(dir, e), is_root),
        };
        for child in children {
            self.explore(&child, false)?;
        }
        Ok(())
    }

    fn add_file(&mut self, path: &Path, is_root: bool) -> Result<()> {
        debug!("Checking JPG file: {}", path.display());

        let digest = match hash::digest_file(path) {
            Ok(d) => d,
            Err(e) => return self.recover(e, is_root),
        };
        debug!("sha256 digest: {digest}");
        self.stats.jpeg_files += 1;

        if let Some(original) = self.registry.original_of(&digest) {
            debug!("Duplicate of '{}' found, skipping.", original.display());
            self.stats.duplicates += 1;
            return Ok(());
        }

        let display_timestamp = match self.resolve_timestamp(path) {
            Ok(ts) => ts,
            Err(e) => return self.recover(e, is_root),
        };

        self.registry.insert_if_absent(
            digest,
            ImageRecord {
                source_path: path.to_path_buf(),
                display_timestamp,
            },
        );
        debug!("Added to list.");
        Ok(())
    }

    /// EXIF capture time, or the modification time when EXIF has nothing usable.
    fn resolve_timestamp(&mut self, path: &Path) -> Result<String> {
        match date::exif::extract_capture_time(path) {
            Ok(Some(ts)) => return Ok(ts),
            Ok(None) => warn!(
                "No EXIF date and time found in {}; modified date will be used instead",
                path.display()
            ),
            Err(e) => warn!("{e}; modified date will be used instead"),
        }
        let ts = date::modified_timestamp(path)?;
        self.stats.timestamp_fallbacks += 1;
        Ok(ts)
    }

    fn recover(&mut self, err: Error, is_root: bool) -> Result<()> {
        if is_root {
            return Err(err);
        }
        warn!("Skipping unreadable entry: {err}");
        self.stats.unreadable += 1;
        Ok(())
    }
}

fn inaccessible(path: &Path, source: std::io::Error) -> Error {
    Error::SourceInaccessible {
        path: path.to_path_buf(),
        source,
    }
}

/// Immediate children of `dir`, ordered by file name.
fn sorted_children(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut children = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{jpeg_with_capture_time, plain_jpeg};
    use tempfile::tempdir;

    fn set_mtime(path: &Path, ts: &str) {
        let dt = date::parse_canonical(ts).unwrap();
        filetime::set_file_mtime(path, date::to_file_time(&dt)).unwrap();
    }

    #[test]
    fn test_duplicates_collapse_to_one_record() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let bytes = jpeg_with_capture_time("2023:05:01 10:15:30", b"same");
        fs::create_dir_all(root.join("x/y")).unwrap();
        for p in ["a.jpg", "b.JPG", "x/c.jpg", "x/y/d.jpg"] {
            fs::write(root.join(p), &bytes).unwrap();
        }

        let mut reg = Registry::new();
        let stats = explore(root, &mut reg).unwrap();

        assert_eq!(reg.len(), 1);
        assert_eq!(stats.jpeg_files, 4);
        assert_eq!(stats.duplicates, 3);
        let rec = reg.records().next().unwrap();
        assert_eq!(rec.source_path, root.join("a.jpg"));
        assert_eq!(rec.display_timestamp, "20230501_101530");
    }

    #[test]
    fn test_first_seen_keeps_path_and_timestamp() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        fs::create_dir(&first).unwrap();
        fs::create_dir(&second).unwrap();

        // The later copy has a newer mtime; it must not replace either field
        let bytes = plain_jpeg(b"dup");
        fs::write(first.join("z.jpg"), &bytes).unwrap();
        fs::write(second.join("a.jpg"), &bytes).unwrap();
        set_mtime(&first.join("z.jpg"), "20100101_120000");
        set_mtime(&second.join("a.jpg"), "20220202_020202");

        let mut reg = Registry::new();
        explore_all(&[first.clone(), second.clone()], &mut reg).unwrap();

        assert_eq!(reg.len(), 1);
        let rec = reg.records().next().unwrap();
        assert_eq!(rec.source_path, first.join("z.jpg"));
        assert_eq!(rec.display_timestamp, "20100101_120000");
    }

    #[test]
    fn test_missing_exif_falls_back_to_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.jpg");
        fs::write(&path, plain_jpeg(b"c")).unwrap();
        set_mtime(&path, "20200101_000000");

        let mut reg = Registry::new();
        let stats = explore(&path, &mut reg).unwrap();

        assert_eq!(stats.timestamp_fallbacks, 1);
        assert_eq!(reg.records().next().unwrap().display_timestamp, "20200101_000000");
    }

    #[test]
    fn test_unreadable_exif_falls_back_to_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();
        set_mtime(&path, "20190315_081500");

        let mut reg = Registry::new();
        explore(dir.path(), &mut reg).unwrap();

        assert_eq!(reg.len(), 1);
        assert_eq!(reg.records().next().unwrap().display_timestamp, "20190315_081500");
    }

    #[test]
    fn test_non_jpeg_files_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();
        fs::write(dir.path().join("b.jpeg"), plain_jpeg(b"b")).unwrap();
        fs::write(dir.path().join("readme"), b"text").unwrap();

        let mut reg = Registry::new();
        let stats = explore(dir.path(), &mut reg).unwrap();

        assert!(reg.is_empty());
        assert_eq!(stats, ScanStats::default());
    }

    #[test]
    fn test_order_is_lexicographic_depth_first() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("b")).unwrap();
        fs::write(root.join("c.jpg"), plain_jpeg(b"3")).unwrap();
        fs::write(root.join("b/z.jpg"), plain_jpeg(b"2")).unwrap();
        fs::write(root.join("a.jpg"), plain_jpeg(b"1")).unwrap();

        let mut reg = Registry::new();
        explore(root, &mut reg).unwrap();

        let paths: Vec<PathBuf> = reg.records().map(|r| r.source_path.clone()).collect();
        assert_eq!(paths, [root.join("a.jpg"), root.join("b/z.jpg"), root.join("c.jpg")]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let mut reg = Registry::new();
        let roots = [dir.path().to_path_buf(), dir.path().join("nope")];

        let err = explore_all(&roots, &mut reg).unwrap_err();
        assert!(matches!(err, Error::SourceInaccessible { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub/a.jpg"), plain_jpeg(b"a")).unwrap();
        std::os::unix::fs::symlink(&root, root.join("sub/loop")).unwrap();

        let mut reg = Registry::new();
        let stats = explore(&root, &mut reg).unwrap();

        assert_eq!(reg.len(), 1);
        assert_eq!(stats.jpeg_files, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_nested_link_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), plain_jpeg(b"a")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.jpg"), dir.path().join("b.jpg")).unwrap();

        let mut reg = Registry::new();
        explore(dir.path(), &mut reg).unwrap();

        assert_eq!(reg.len(), 1);
    }
}
