//! In-memory reader and JPEG fixtures for testing.

use crate::Rating;
use crate::error::{ErrorKind, Result};
use crate::reader::RatingReader;
use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

enum Outcome {
    Rated(Rating),
    Fails(String),
}

/// Rating reader backed by a file-name lookup table.
///
/// Files not in the table are [`Rating::Unrated`]. Every path asked about is
/// recorded, so tests can assert on what was (not) read.
///
/// # Examples
///
/// ```
/// use picksync_rating::{Rating, reader::{MockReader, RatingReader}};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let reader = MockReader::with_ratings([("a.jpg", Rating::Stars(5))]).failing("broken.jpg", "corrupt");
/// assert_eq!(reader.read_rating(Path::new("/x/a.jpg")).await.unwrap(), Rating::Stars(5));
/// assert_eq!(reader.read_rating(Path::new("/x/b.jpg")).await.unwrap(), Rating::Unrated);
/// assert!(reader.read_rating(Path::new("/x/broken.jpg")).await.is_err());
/// assert_eq!(reader.reads().len(), 3);
/// # }
/// ```
#[derive(Default)]
pub struct MockReader {
    table: HashMap<OsString, Outcome>,
    reads: Mutex<Vec<PathBuf>>,
}
impl MockReader {
    pub fn with_ratings(ratings: impl IntoIterator<Item = (impl Into<OsString>, Rating)>) -> Self {
        let table = ratings.into_iter().map(|(name, rating)| (name.into(), Outcome::Rated(rating))).collect();
        Self { table, ..Default::default() }
    }

    /// Make reads of `name` fail with `message`.
    pub fn failing(mut self, name: impl Into<OsString>, message: impl Into<String>) -> Self {
        self.table.insert(name.into(), Outcome::Fails(message.into()));
        self
    }

    /// Every path read so far, in order.
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().map(|reads| reads.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RatingReader for MockReader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn read_rating(&self, path: &Path) -> Result<Rating> {
        if let Ok(mut reads) = self.reads.lock() {
            reads.push(path.to_path_buf());
        }
        match path.file_name().and_then(|name| self.table.get(name)) {
            Some(Outcome::Rated(rating)) => Ok(*rating),
            Some(Outcome::Fails(message)) => exn::bail!(ErrorKind::ToolFailed(message.clone())),
            None => Ok(Rating::Unrated),
        }
    }
}

/// Builds a minimal JPEG whose XMP packet carries `rating` (no packet at
/// all for `None`). Enough for [`XmpReader`](crate::reader::XmpReader), not
/// for an image viewer.
pub fn jpeg_with_rating(rating: Option<&str>) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    if let Some(rating) = rating {
        let mut payload = b"http://ns.adobe.com/xap/1.0/\0".to_vec();
        payload.extend_from_slice(
            format!(
                r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description xmlns:xmp="http://ns.adobe.com/xap/1.0/" xmp:Rating="{rating}"/></rdf:RDF></x:xmpmeta>"#
            )
            .as_bytes(),
        );
        out.extend_from_slice(&[0xFF, 0xE1]);
        // Infallible for any rating string short enough to be a rating.
        out.extend_from_slice(&u16::try_from(payload.len() + 2).unwrap_or(u16::MAX).to_be_bytes());
        out.extend_from_slice(&payload);
    }
    out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0x00, 0x00, 0xFF, 0xD9]);
    out
}
