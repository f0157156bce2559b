//! Just enough JPEG and XMP parsing to find a star rating.
//!
//! A JPEG is a sequence of marker segments (`FF xx` + big-endian length)
//! until the start-of-scan marker, after which comes the compressed image.
//! The XMP packet lives in an `APP1` segment that begins with the Adobe
//! namespace header. Only the segment headers are read; everything else is
//! skipped over with a seek, so a 40MB JPEG costs a few kilobytes of I/O.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use memchr::memmem;
use std::io::{Read, Seek, SeekFrom};

const MARKER_PREFIX: u8 = 0xFF;
const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const APP1: u8 = 0xE1;
const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
/// `xap` is the prefix used before XMP was renamed; old Bridge versions still write it.
const RATING_PROPERTIES: [&[u8]; 2] = [b"xmp:Rating", b"xap:Rating"];

/// Returns the standard XMP packet of a JPEG, if it has one.
///
/// Extended XMP (split across several `APP1` segments) is ignored; the
/// rating always lives in the standard packet.
pub(crate) fn find_packet<R: Read + Seek>(mut reader: R) -> Result<Option<Vec<u8>>> {
    let mut soi = [0u8; 2];
    if reader.read_exact(&mut soi).is_err() || soi != [MARKER_PREFIX, SOI] {
        exn::bail!(ErrorKind::NotJpeg);
    }
    loop {
        let marker = next_marker(&mut reader)?;
        match marker {
            SOS | EOI => return Ok(None),
            // Standalone markers carry no length.
            0x01 | 0xD0..=0xD7 => continue,
            _ => {},
        }
        let mut length = [0u8; 2];
        reader.read_exact(&mut length).or_raise(|| ErrorKind::Malformed)?;
        // The length includes its own two bytes.
        let Some(payload_len) = usize::from(u16::from_be_bytes(length)).checked_sub(2) else {
            exn::bail!(ErrorKind::Malformed);
        };
        if marker == APP1 && payload_len >= XMP_HEADER.len() {
            let mut payload = vec![0u8; payload_len];
            reader.read_exact(&mut payload).or_raise(|| ErrorKind::Malformed)?;
            if payload.starts_with(XMP_HEADER) {
                payload.drain(..XMP_HEADER.len());
                return Ok(Some(payload));
            }
            continue;
        }
        // Infallible: payload_len came from a u16.
        reader.seek(SeekFrom::Current(payload_len as i64)).or_raise(|| ErrorKind::Malformed)?;
    }
}

fn next_marker<R: Read>(reader: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte).or_raise(|| ErrorKind::Malformed)?;
    if byte[0] != MARKER_PREFIX {
        exn::bail!(ErrorKind::Malformed);
    }
    // Any number of 0xFF fill bytes may precede the marker code.
    while byte[0] == MARKER_PREFIX {
        reader.read_exact(&mut byte).or_raise(|| ErrorKind::Malformed)?;
    }
    Ok(byte[0])
}

/// Extracts the raw `xmp:Rating` value from an XMP packet.
///
/// Handles both serializations RDF allows for a simple property:
/// - attribute: `<rdf:Description xmp:Rating="5" ...>`
/// - element: `<xmp:Rating>5</xmp:Rating>`
pub(crate) fn find_rating(packet: &[u8]) -> Option<&str> {
    RATING_PROPERTIES.iter().find_map(|property| {
        memmem::find_iter(packet, property).find_map(|position| property_value(packet, position, property.len()))
    })
}

fn property_value(packet: &[u8], position: usize, name_len: usize) -> Option<&str> {
    // Reject partial names like `myxmp:Rating` or `xmp:RatingPercent`.
    let before = position.checked_sub(1).map(|i| packet[i]);
    if !matches!(before, None | Some(b'<') | Some(b' ' | b'\t' | b'\r' | b'\n')) {
        return None;
    }
    let rest = &packet[position + name_len..];
    let rest = &rest[rest.iter().position(|b| !b.is_ascii_whitespace())?..];
    let value = match rest.first()? {
        b'=' => {
            let rest = &rest[1..];
            let rest = &rest[rest.iter().position(|b| !b.is_ascii_whitespace())?..];
            let quote = *rest.first()?;
            if quote != b'"' && quote != b'\'' {
                return None;
            }
            let rest = &rest[1..];
            &rest[..memchr::memchr(quote, rest)?]
        },
        b'>' => {
            let rest = &rest[1..];
            &rest[..memchr::memchr(b'<', rest)?]
        },
        _ => return None,
    };
    std::str::from_utf8(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![MARKER_PREFIX, marker];
        out.extend_from_slice(&u16::try_from(payload.len() + 2).unwrap().to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn jpeg(segments: &[Vec<u8>]) -> Vec<u8> {
        let mut out = vec![MARKER_PREFIX, SOI];
        segments.iter().for_each(|s| out.extend_from_slice(s));
        out.extend_from_slice(&[MARKER_PREFIX, SOS, 0x00, 0x02, 0xAB, 0xCD, MARKER_PREFIX, EOI]);
        out
    }

    fn xmp_segment(packet: &str) -> Vec<u8> {
        let mut payload = XMP_HEADER.to_vec();
        payload.extend_from_slice(packet.as_bytes());
        segment(APP1, &payload)
    }

    #[test]
    fn test_finds_packet_after_exif() {
        let exif = segment(APP1, b"Exif\0\0MM\0*\0\0\0\x08");
        let data = jpeg(&[segment(0xE0, b"JFIF\0\x01\x02"), exif, xmp_segment("<x:xmpmeta/>")]);
        let packet = find_packet(Cursor::new(data)).unwrap().unwrap();
        assert_eq!(packet, b"<x:xmpmeta/>");
    }

    #[test]
    fn test_no_packet() {
        let data = jpeg(&[segment(0xE0, b"JFIF\0\x01\x02")]);
        assert_eq!(find_packet(Cursor::new(data)).unwrap(), None);
    }

    #[test]
    fn test_fill_bytes_before_marker() {
        let mut data = vec![MARKER_PREFIX, SOI, MARKER_PREFIX];
        data.extend(xmp_segment("packet"));
        assert_eq!(find_packet(Cursor::new(data)).unwrap().unwrap(), b"packet");
    }

    #[test]
    fn test_not_a_jpeg() {
        let err = find_packet(Cursor::new(b"\x89PNG\r\n\x1a\n".to_vec())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotJpeg));
        let err = find_packet(Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotJpeg));
    }

    #[test]
    fn test_truncated_segment() {
        let mut data = vec![MARKER_PREFIX, SOI, MARKER_PREFIX, APP1, 0x10, 0x00];
        data.extend_from_slice(XMP_HEADER);
        let err = find_packet(Cursor::new(data)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Malformed));
    }

    #[rstest]
    #[case(r#"<rdf:Description xmp:Rating="5" xmp:Label="Red"/>"#, Some("5"))]
    #[case(r#"<rdf:Description xmp:Rating = '3'/>"#, Some("3"))]
    #[case("<rdf:Description>\n  <xmp:Rating>4</xmp:Rating>\n</rdf:Description>", Some("4"))]
    #[case(r#"<rdf:Description xap:Rating="-1"/>"#, Some("-1"))]
    #[case(r#"<rdf:Description xmp:RatingPercent="99" xmp:Rating="2"/>"#, Some("2"))]
    #[case(r#"<rdf:Description MicrosoftPhoto:Rating="99"/>"#, None)]
    #[case(r#"<rdf:Description xmp:Label="Red"/>"#, None)]
    #[case(r#"<rdf:Description xmp:Rating="5"#, None)]
    fn test_find_rating(#[case] packet: &str, #[case] expected: Option<&str>) {
        assert_eq!(find_rating(packet.as_bytes()), expected);
    }
}
