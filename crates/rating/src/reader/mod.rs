//! Rating reader trait and implementations.
//!
//! A [`RatingReader`] turns a file path into a [`Rating`]. The built-in
//! [`XmpReader`] parses the XMP packet itself; [`ExiftoolReader`] shells out
//! to exiftool for the odd file the built-in parser can't handle. Either one
//! should be wrapped in a [`TempCopyReader`] before use on real photo trees,
//! see [`reader_for`].

mod builtin;
mod exiftool;
#[cfg(feature = "mock")]
mod mock;
mod temp;

pub use self::builtin::XmpReader;
pub use self::exiftool::ExiftoolReader;
#[cfg(feature = "mock")]
pub use self::mock::{MockReader, jpeg_with_rating};
pub use self::temp::TempCopyReader;
use crate::Rating;
use crate::error::{Error, ErrorKind, Result};
use async_trait::async_trait;
use derive_more::Display;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Reads the star rating embedded in an image file.
///
/// Implementations report failures as errors; deciding whether a failure is
/// fatal is the caller's business. A file with no rating is
/// [`Rating::Unrated`], not an error.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use picksync_rating::{Rating, reader::RatingReader, error::Result};
///
/// async fn is_keeper(reader: &dyn RatingReader, path: &Path) -> Result<bool> {
///     Ok(reader.read_rating(path).await?.is_selected())
/// }
/// ```
#[async_trait]
pub trait RatingReader: Send + Sync {
    /// Name of the reader, for logging.
    fn name(&self) -> &str;

    /// Read the rating of the image at `path`.
    async fn read_rating(&self, path: &Path) -> Result<Rating>;
}

pub type ReaderHandle = Arc<dyn RatingReader + Send + Sync>;

/// Which metadata implementation to use.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReaderKind {
    /// exiftool when it is installed, the built-in parser otherwise.
    #[default]
    #[display("auto")]
    Auto,
    /// Always the built-in parser.
    #[display("builtin")]
    Builtin,
    /// Always exiftool; fails when it isn't installed.
    #[display("exiftool")]
    Exiftool,
}
impl FromStr for ReaderKind {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "builtin" | "xmp" => Ok(Self::Builtin),
            "exiftool" => Ok(Self::Exiftool),
            _ => exn::bail!(ErrorKind::UnknownReader(s.to_string())),
        }
    }
}

/// Builds a reader of the requested kind, wrapped in a [`TempCopyReader`].
pub fn reader_for(kind: ReaderKind) -> Result<ReaderHandle> {
    Ok(match kind {
        ReaderKind::Builtin => Arc::new(TempCopyReader::new(XmpReader)),
        ReaderKind::Exiftool => Arc::new(TempCopyReader::new(ExiftoolReader::discover()?)),
        ReaderKind::Auto => match ExiftoolReader::discover() {
            Ok(exiftool) => Arc::new(TempCopyReader::new(exiftool)),
            Err(_) => {
                tracing::info!("exiftool not found in PATH; using built-in XMP parser");
                Arc::new(TempCopyReader::new(XmpReader))
            },
        },
    })
}
