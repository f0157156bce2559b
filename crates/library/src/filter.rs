use picksync_rating::Rating;
use picksync_rating::reader::RatingReader;
use picksync_storage::is_image;
use std::path::Path;

/// What the rating filter made of one candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Not a JPEG, so never rated.
    NotImage,
    Rated(Rating),
    /// The reader failed; the file counts as unrated.
    Unreadable(String),
}
impl Verdict {
    /// Only five-star files go on to be copied.
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Rated(rating) if rating.is_selected())
    }
}

/// Rates one candidate file.
///
/// Never fails: reader errors become [`Verdict::Unreadable`] so a single
/// corrupt file can't stop the shoot.
pub async fn evaluate(reader: &dyn RatingReader, path: &Path) -> Verdict {
    if !is_image(path) {
        return Verdict::NotImage;
    }
    match reader.read_rating(path).await {
        Ok(rating) => {
            tracing::trace!(path = %path.display(), %rating, "Read rating");
            Verdict::Rated(rating)
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), reader = reader.name(), error = ?e, "Failed to read rating");
            Verdict::Unreadable((*e).to_string())
        },
    }
}
