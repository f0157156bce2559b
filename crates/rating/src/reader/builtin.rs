//! Built-in XMP reader.

use crate::Rating;
use crate::error::{ErrorKind, Result};
use crate::reader::RatingReader;
use crate::xmp::{find_packet, find_rating};
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads `xmp:Rating` straight out of the JPEG's XMP packet.
///
/// No external tools or C libraries involved. The parsing is done on a
/// blocking thread since it uses [`std::io`] seeks.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmpReader;

impl XmpReader {
    fn read_sync(path: &Path) -> Result<Rating> {
        let file = File::open(path).map_err(ErrorKind::Io)?;
        let Some(packet) = find_packet(BufReader::new(file))? else {
            return Ok(Rating::Unrated);
        };
        match find_rating(&packet) {
            Some(raw) => raw.parse(),
            None => Ok(Rating::Unrated),
        }
    }
}

#[async_trait]
impl RatingReader for XmpReader {
    fn name(&self) -> &str {
        "builtin"
    }

    async fn read_rating(&self, path: &Path) -> Result<Rating> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::read_sync(&path)).await.or_raise(|| ErrorKind::Task)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOI: [u8; 2] = [0xFF, 0xD8];
    const SOS_EOI: [u8; 8] = [0xFF, 0xDA, 0x00, 0x02, 0x00, 0x00, 0xFF, 0xD9];

    fn jpeg_with_packet(packet: &str) -> Vec<u8> {
        let mut payload = b"http://ns.adobe.com/xap/1.0/\0".to_vec();
        payload.extend_from_slice(packet.as_bytes());
        let mut out = SOI.to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&u16::try_from(payload.len() + 2).unwrap().to_be_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&SOS_EOI);
        out
    }

    #[tokio::test]
    async fn test_reads_rating() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("a.jpg");
        std::fs::write(&path, jpeg_with_packet(r#"<rdf:Description xmp:Rating="5"/>"#)).unwrap();
        assert_eq!(XmpReader.read_rating(&path).await.unwrap(), Rating::Stars(5));
    }

    #[tokio::test]
    async fn test_missing_rating_is_unrated() {
        let temp_dir = tempfile::tempdir().unwrap();
        let with_packet = temp_dir.path().join("a.jpg");
        std::fs::write(&with_packet, jpeg_with_packet(r#"<rdf:Description xmp:Label="Red"/>"#)).unwrap();
        assert_eq!(XmpReader.read_rating(&with_packet).await.unwrap(), Rating::Unrated);
        let without_packet = temp_dir.path().join("b.jpg");
        let mut bare = SOI.to_vec();
        bare.extend_from_slice(&SOS_EOI);
        std::fs::write(&without_packet, bare).unwrap();
        assert_eq!(XmpReader.read_rating(&without_packet).await.unwrap(), Rating::Unrated);
    }

    #[tokio::test]
    async fn test_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = XmpReader.read_rating(&temp_dir.path().join("missing.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io(_)));
        let not_jpeg = temp_dir.path().join("notes.jpg");
        std::fs::write(&not_jpeg, b"shopping list").unwrap();
        let err = XmpReader.read_rating(&not_jpeg).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotJpeg));
    }
}
