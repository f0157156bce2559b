//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::model::RootRole;
use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A root was never chosen (not on the command line, in config, or in
    /// remembered settings).
    #[display("no {_0} folder has been set")]
    RootUnset(#[error(not(source))] RootRole),
    /// A root is missing, unreadable, or not a directory.
    #[display("cannot access {role} folder: {}", path.display())]
    RootUnavailable { role: RootRole, path: PathBuf },
    /// Copying a counterpart into the staging area failed.
    #[display("failed to stage {}: {source}", path.display())]
    Stage { path: PathBuf, source: IoError },
    /// Moving staged files into the destination failed.
    #[display("failed to promote {}: {source}", path.display())]
    Promote { path: PathBuf, source: IoError },
    /// The worker task panicked.
    #[display("sync worker stopped unexpectedly: {_0}")]
    Worker(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RootUnavailable { .. } | Self::Stage { .. } | Self::Promote { .. })
    }
}
