use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O failure on a specific file
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Destination directory does not exist (checked before scanning)
    #[error("destination directory doesn't exist: {}", .0.display())]
    DestinationMissing(PathBuf),

    /// A scan root could not be accessed
    #[error("source could not be read: {}: {source}", .path.display())]
    SourceInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file could not be read as a JPEG/EXIF container
    #[error("could not read EXIF from {}: {message}", .path.display())]
    MetadataRead { path: PathBuf, message: String },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Underlying I/O error kind, if this error came from the filesystem.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::Io { source, .. } | Error::SourceInaccessible { source, .. } => {
                Some(source.kind())
            }
            _ => None,
        }
    }
}
