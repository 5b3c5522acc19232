use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};

use crate::error::{Error, Result};

/// Read EXIF `DateTimeOriginal` and return it in canonical form.
///
/// `Ok(None)` when the file has no EXIF block or the tag is missing.
/// `Err(MetadataRead)` when the file isn't a readable container or the
/// tag holds something other than `YYYY:MM:DD HH:MM:SS`.
/// EXIF datetimes have no timezone info - they are local time as-is.
pub fn extract_capture_time(path: &Path) -> Result<Option<String>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = BufReader::new(file);

    let exif = match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(None),
        Err(e) => return Err(read_error(path, e.to_string())),
    };

    let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) else {
        return Ok(None);
    };

    let raw = match &field.value {
        Value::Ascii(parts) => match parts.first() {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => return Ok(None),
        },
        other => return Err(read_error(path, format!("unexpected DateTimeOriginal value {other:?}"))),
    };

    match canonical_from_exif(&raw) {
        Some(ts) => Ok(Some(ts)),
        None => Err(read_error(path, format!("malformed DateTimeOriginal {raw:?}"))),
    }
}

/// "2023:05:01 10:15:30" -> "20230501_101530"
fn canonical_from_exif(raw: &str) -> Option<String> {
    let raw = raw.trim().trim_end_matches('\0');
    let dt = NaiveDateTime::parse_from_str(raw, "%Y:%m:%d %H:%M:%S").ok()?;
    Some(super::format_canonical(&dt))
}

fn read_error(path: &Path, message: String) -> Error {
    Error::MetadataRead {
        path: path.to_path_buf(),
        message,
    }
}
