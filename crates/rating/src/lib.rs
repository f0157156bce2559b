//! Embedded star ratings for JPEG files.
//!
//! Photographers cull in Lightroom/Bridge/Capture One, which write the star
//! rating into the file's XMP packet as `xmp:Rating`. This crate reads it
//! back:
//!
//! - [`Rating`] is the parsed value; only [`Rating::is_selected`] (five
//!   stars) matters for syncing.
//! - [`reader::RatingReader`] is the seam between the sync engine and the
//!   metadata implementation, with a built-in XMP parser and an exiftool
//!   wrapper behind it.
//! - [`reader::TempCopyReader`] reads from a temporary copy so awkward
//!   file names never reach the metadata implementation.
//!
//! Enable the `mock` feature for [`reader::MockReader`] and JPEG fixtures.

pub mod error;
mod rating;
pub mod reader;
mod xmp;

pub use crate::rating::{MAX_STARS, Rating};
pub use crate::reader::{ReaderHandle, ReaderKind, reader_for};
