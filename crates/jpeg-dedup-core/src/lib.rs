pub mod classify;
pub mod date;
pub mod error;
pub mod hash;
pub mod registry;
pub mod scan;
pub mod writer;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

pub use error::{Error, Result};
pub use registry::{ImageRecord, Registry};

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Files or directories to scan, in order
    pub sources: Vec<PathBuf>,
    /// Existing directory receiving the unique copies
    pub destination: PathBuf,
    /// Hide the copy progress bar. The per-file diagnostics themselves are
    /// `debug!` records; whether they appear is up to the installed logger.
    /// Never changes what gets scanned or copied.
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    pub jpeg_files: u64,
    pub duplicates_skipped: u64,
    pub unique_images: u64,
    pub timestamp_fallbacks: u64,
    pub unreadable_entries: u64,
    pub files_copied: u64,
    pub copy_failures: u64,
}

/// Run the whole pipeline: check the destination, scan every source into a
/// fresh registry, then copy the unique images out.
///
/// Nothing is read from the sources if the destination is missing, and
/// nothing is copied unless the scan finished without a fatal error.
pub fn process(options: &ProcessOptions) -> anyhow::Result<ProcessResult> {
    if !options.destination.is_dir() {
        return Err(Error::DestinationMissing(options.destination.clone()))
            .context("No files will be copied");
    }

    info!("Scanning source files and directories...");
    let mut registry = Registry::new();
    let scan_stats = scan::explore_all(&options.sources, &mut registry)
        .context("Source scan failed; no files will be copied")?;

    info!("Copying all non-duplicates to destination directory...");
    let progress = copy_progress(registry.len() as u64, options.verbose);
    let written = writer::write_output(&registry, &options.destination, &progress)
        .context("Copy aborted")?;
    progress.finish_and_clear();

    let result = ProcessResult {
        jpeg_files: scan_stats.jpeg_files,
        duplicates_skipped: scan_stats.duplicates,
        unique_images: registry.len() as u64,
        timestamp_fallbacks: scan_stats.timestamp_fallbacks,
        unreadable_entries: scan_stats.unreadable,
        files_copied: written.written.len() as u64,
        copy_failures: written.failed,
    };
    info!(
        "Done! {} JPEG files, {} duplicates skipped, {} copied to {}, {} failed",
        result.jpeg_files,
        result.duplicates_skipped,
        result.files_copied,
        options.destination.display(),
        result.copy_failures
    );
    Ok(result)
}

fn copy_progress(total: u64, verbose: bool) -> ProgressBar {
    if verbose || total == 0 {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} copying files") {
        pb.set_style(style);
    }
    pb
}
