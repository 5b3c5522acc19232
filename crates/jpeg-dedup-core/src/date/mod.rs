pub mod exif;

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Local, NaiveDateTime, Offset, TimeZone};
use filetime::FileTime;

use crate::error::{Error, Result};

/// `YYYYMMDD_HHMMSS`, used for output names and record timestamps
pub const CANONICAL_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn format_canonical(dt: &NaiveDateTime) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

pub fn parse_canonical(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, CANONICAL_FORMAT)
        .map_err(|_| Error::InvalidTimestamp(s.to_string()))
}

/// Filesystem modification time of `path` in local time, canonical form.
pub fn modified_timestamp(path: &Path) -> Result<String> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| Error::io(path, e))?;
    let local: DateTime<Local> = modified.into();
    Ok(format_canonical(&local.naive_local()))
}

/// Convert a naive local time to a file time.
pub fn to_file_time(dt: &NaiveDateTime) -> FileTime {
    FileTime::from_unix_time(unix_seconds_in(dt, &Local), 0)
}

/// Seconds since the epoch for wall-clock time `dt` in `tz`.
///
/// On a DST overlap the earlier instant wins. A time skipped by a DST gap is
/// read with the offset in force before the gap, so 02:30 on a spring-forward
/// night lands at 03:30 of the new offset.
pub fn unix_seconds_in<Tz: TimeZone>(dt: &NaiveDateTime, tz: &Tz) -> i64 {
    if let Some(t) = tz.from_local_datetime(dt).earliest() {
        return t.timestamp();
    }
    let before_gap = *dt - Duration::days(1);
    match tz.offset_from_local_datetime(&before_gap).earliest() {
        Some(offset) => dt.and_utc().timestamp() - i64::from(offset.fix().local_minus_utc()),
        None => dt.and_utc().timestamp(),
    }
}
