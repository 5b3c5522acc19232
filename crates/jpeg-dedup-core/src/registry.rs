use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// First place this content was seen
    pub source_path: PathBuf,
    /// Capture (or fallback) time as `YYYYMMDD_HHMMSS`
    pub display_timestamp: String,
}

/// Digest -> record map that iterates in first-insertion order.
#[derive(Debug, Default)]
pub struct Registry {
    records: Vec<(String, ImageRecord)>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, digest: &str) -> Option<&ImageRecord> {
        self.index.get(digest).map(|&i| &self.records[i].1)
    }

    pub fn contains(&self, digest: &str) -> bool {
        self.index.contains_key(digest)
    }

    /// Insert unless the digest is already present. An existing record is
    /// never replaced; returns false in that case.
    pub fn insert_if_absent(&mut self, digest: String, record: ImageRecord) -> bool {
        if self.index.contains_key(&digest) {
            return false;
        }
        self.index.insert(digest.clone(), self.records.len());
        self.records.push((digest, record));
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ImageRecord)> {
        self.records.iter().map(|(d, r)| (d.as_str(), r))
    }

    pub fn records(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter().map(|(_, r)| r)
    }

    /// Source path of the record holding `digest`, for duplicate reporting.
    pub fn original_of(&self, digest: &str) -> Option<&Path> {
        self.get(digest).map(|r| r.source_path.as_path())
    }
}
