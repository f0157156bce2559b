//! Rating Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;

/// A rating error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for rating operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Reading the image (or its temporary copy) failed.
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// The file does not start with a JPEG start-of-image marker.
    #[display("not a JPEG file")]
    NotJpeg,
    /// A JPEG segment header points past the end of the file.
    #[display("truncated or malformed JPEG segment")]
    Malformed,
    /// A rating was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The raw value found in the metadata.
        value: String,
    },
    /// No metadata tool with this name is installed.
    #[display("{_0} not found on PATH")]
    ToolNotFound(#[error(not(source))] &'static str),
    /// An external metadata tool exited unsuccessfully.
    #[display("metadata tool failed: {_0}")]
    ToolFailed(#[error(not(source))] String),
    /// The configured reader name is not one we know.
    #[display("unknown rating reader '{_0}' (expected auto, builtin or exiftool)")]
    UnknownReader(#[error(not(source))] String),
    /// The blocking task reading the file panicked or was aborted.
    #[display("background read task failed")]
    Task,
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Task)
    }
}
