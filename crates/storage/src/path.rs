//! Name classification for directory entries.
//!
//! Everything here works on a single path component or file name; nothing
//! touches the filesystem.

use std::ffi::OsStr;
use std::path::Path;

/// Leading byte of hidden entries (`.DS_Store`, `.git`, `._IMG_0001.jpg`).
const HIDDEN_MARKER: u8 = b'.';
/// Shoot folders with a hyphen are variants (`0001-retake`), never the shoot itself.
const VARIANT_MARKER: char = '-';
const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// Returns `true` for names starting with the hidden-file marker.
///
/// ```
/// use picksync_storage::is_hidden;
/// use std::ffi::OsStr;
/// assert!(is_hidden(OsStr::new(".DS_Store")));
/// assert!(!is_hidden(OsStr::new("IMG_0001.jpg")));
/// ```
pub fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&HIDDEN_MARKER)
}

/// Returns `true` if the path has a `.jpg`/`.jpeg` extension (any case).
///
/// ```
/// use picksync_storage::is_image;
/// use std::path::Path;
/// assert!(is_image(Path::new("0001/IMG_0001.JPG")));
/// assert!(is_image(Path::new("IMG_0001.jpeg")));
/// assert!(!is_image(Path::new("IMG_0001.ARW")));
/// ```
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|image| ext.eq_ignore_ascii_case(image)))
}

/// Returns `true` if a directory named `name` is a candidate shoot folder
/// for `identifier`: it starts with the identifier and has no hyphen.
///
/// An empty identifier never matches anything; a stray comma in the batch
/// should not pick the first folder on the drive.
pub fn is_shoot_folder(name: &OsStr, identifier: &str) -> bool {
    if identifier.is_empty() {
        return false;
    }
    let name = name.to_string_lossy();
    name.starts_with(identifier) && !name.contains(VARIANT_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(".DS_Store", true)]
    #[case(".hidden-dir", true)]
    #[case("._IMG_0001.jpg", true)]
    #[case("IMG_0001.jpg", false)]
    #[case("0001", false)]
    #[case("", false)]
    fn test_is_hidden(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_hidden(OsStr::new(name)), expected);
    }

    #[rstest]
    #[case("a.jpg", true)]
    #[case("a.JPG", true)]
    #[case("a.Jpeg", true)]
    #[case("a.jpg.xmp", false)]
    #[case("a.png", false)]
    #[case("jpg", false)]
    fn test_is_image(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_image(Path::new(name)), expected);
    }

    #[rstest]
    #[case("0001", "0001", true)]
    #[case("0001_kimura", "0001", true)]
    #[case("0001 studio", "0001", true)]
    #[case("0001-retake", "0001", false)]
    #[case("00012", "0001", true)]
    #[case("1000", "0001", false)]
    #[case("x0001", "0001", false)]
    #[case("0001", "", false)]
    fn test_is_shoot_folder(#[case] name: &str, #[case] identifier: &str, #[case] expected: bool) {
        assert_eq!(is_shoot_folder(OsStr::new(name), identifier), expected);
    }
}
