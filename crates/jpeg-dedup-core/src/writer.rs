use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use log::{debug, error};

use crate::date;
use crate::error::{Error, Result};
use crate::registry::{ImageRecord, Registry};

/// Result of the copy phase.
#[derive(Debug, Default)]
pub struct WriteResult {
    /// Destination paths written, in registry order
    pub written: Vec<PathBuf>,
    /// Records whose copy was abandoned
    pub failed: u64,
}

/// Copy every record into `output_dir` as `<timestamp>[_N].jpg`, then stamp
/// the copy's access and modification times with the record's timestamp.
///
/// A missing source or a permission problem abandons that record only. Any
/// other failure stops the loop; files already written stay in place.
pub fn write_output(
    registry: &Registry,
    output_dir: &Path,
    progress: &ProgressBar,
) -> Result<WriteResult> {
    let mut result = WriteResult::default();

    for record in registry.records() {
        let dest = free_destination(output_dir, &record.display_timestamp);

        match copy_record(record, &dest) {
            Ok(()) => {
                debug!(
                    "Copied '{}' to '{}'.",
                    record.source_path.display(),
                    dest.display()
                );
                result.written.push(dest);
            }
            Err(e) if is_per_file(&e) => {
                progress.suspend(|| {
                    error!(
                        "Could not copy '{}' to '{}': {e}",
                        record.source_path.display(),
                        dest.display()
                    )
                });
                result.failed += 1;
            }
            Err(e) => {
                progress.suspend(|| {
                    error!("Unexpected error while copying files: {e}");
                    error!("The remaining files will not be copied.");
                });
                return Err(e);
            }
        }
        progress.inc(1);
    }

    Ok(result)
}

/// First of `T.jpg`, `T_2.jpg`, `T_3.jpg`, ... that nothing occupies.
pub fn free_destination(output_dir: &Path, timestamp: &str) -> PathBuf {
    let mut dest = output_dir.join(format!("{timestamp}.jpg"));
    let mut counter = 2u32;
    while occupied(&dest) {
        debug!(
            "Destination '{}' already exists, trying a different filename.",
            dest.display()
        );
        dest = output_dir.join(format!("{timestamp}_{counter}.jpg"));
        counter += 1;
    }
    dest
}

// Dangling symlinks count as occupied
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn copy_record(record: &ImageRecord, dest: &Path) -> Result<()> {
    let when = date::parse_canonical(&record.display_timestamp)?;

    let mut src = File::open(&record.source_path).map_err(|e| Error::io(&record.source_path, e))?;
    let out = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| Error::io(dest, e))?;

    let mut out = BufWriter::new(out);
    let copied = io::copy(&mut src, &mut out).and_then(|_| out.flush());
    drop(out);
    if let Err(e) = copied {
        let _ = fs::remove_file(dest);
        return Err(Error::io(dest, e));
    }

    let ft = date::to_file_time(&when);
    filetime::set_file_times(dest, ft, ft).map_err(|e| Error::io(dest, e))?;
    Ok(())
}

fn is_per_file(err: &Error) -> bool {
    match err.io_kind() {
        Some(kind) => matches!(
            kind,
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
        ),
        None => matches!(err, Error::InvalidTimestamp(_)),
    }
}
