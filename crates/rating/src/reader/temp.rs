//! Temporary-copy reader decorator.
//!
//! Photo trees are named by people, so paths contain Japanese, emoji, and
//! characters that the Windows ANSI APIs used by some metadata libraries
//! choke on. Reading from a copy at a plain ASCII temp path sidesteps that.

use crate::Rating;
use crate::error::{ErrorKind, Result};
use crate::reader::{RatingReader, ReaderHandle};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{Builder, TempPath};

/// Wraps another reader and hands it a temporary copy of each file.
///
/// The copy is owned by a [`TempPath`] guard, so it is deleted when the read
/// returns, fails, or the future is dropped halfway through.
///
/// # Examples
///
/// ```no_run
/// use picksync_rating::reader::{RatingReader, TempCopyReader, XmpReader};
/// use std::path::Path;
///
/// # async fn example() -> picksync_rating::error::Result<()> {
/// let reader = TempCopyReader::new(XmpReader);
/// let rating = reader.read_rating(Path::new("/mnt/select/0001/撮影_001.jpg")).await?;
/// # Ok(())
/// # }
/// ```
pub struct TempCopyReader {
    inner: ReaderHandle,
    /// Where to put the copies; `None` for the system temp directory.
    dir: Option<PathBuf>,
}
impl TempCopyReader {
    pub fn new(inner: impl RatingReader + 'static) -> Self {
        Self::from_handle(Arc::new(inner))
    }

    pub fn from_handle(inner: ReaderHandle) -> Self {
        Self { inner, dir: None }
    }

    /// Put temporary copies in `dir` instead of the system temp directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    fn temp_path(&self, source: &Path) -> Result<TempPath> {
        // Keep the extension; some tools sniff it before the magic bytes.
        let suffix = match source.extension().and_then(OsStr::to_str) {
            Some(ext) if ext.is_ascii() => format!(".{ext}"),
            _ => ".jpg".to_string(),
        };
        let mut builder = Builder::new();
        builder.prefix("picksync-").suffix(&suffix);
        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(ErrorKind::Io)?;
        // Close the handle (Windows won't let anyone else open it otherwise)
        // but keep the delete-on-drop guard.
        Ok(file.into_temp_path())
    }
}

#[async_trait]
impl RatingReader for TempCopyReader {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn read_rating(&self, path: &Path) -> Result<Rating> {
        let copy = self.temp_path(path)?;
        tokio::fs::copy(path, &copy).await.map_err(ErrorKind::Io)?;
        tracing::trace!(source = %path.display(), copy = %copy.display(), "Reading rating from temporary copy");
        let rating = self.inner.read_rating(&copy).await;
        if let Err(e) = copy.close() {
            tracing::warn!(error = %e, "Failed to delete temporary copy");
        }
        rating
    }
}
