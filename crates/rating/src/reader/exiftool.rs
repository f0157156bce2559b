//! exiftool-backed reader.

use crate::Rating;
use crate::error::{ErrorKind, Result};
use crate::reader::RatingReader;
use async_trait::async_trait;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Asks an installed `exiftool` for `XMP-xmp:Rating`.
///
/// Slower than [`XmpReader`](crate::reader::XmpReader) (one process per
/// file), but it copes with every oddity cameras and editors produce.
#[derive(Debug, Clone)]
pub struct ExiftoolReader {
    executable: PathBuf,
}
impl ExiftoolReader {
    /// Finds `exiftool` on `PATH`.
    pub fn discover() -> Result<Self> {
        // TODO: Windows installs usually ship as `exiftool(-k).exe`; look for that too.
        let executables = ["exiftool", "exiftool.exe"];
        for exe in executables {
            if let Ok(executable) = which::which(exe) {
                tracing::debug!(exiftool = %executable.display(), "Discovered exiftool");
                return Ok(Self { executable });
            }
        }
        exn::bail!(ErrorKind::ToolNotFound("exiftool"));
    }

    /// Uses a specific exiftool binary.
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self { executable: executable.into() }
    }

    fn read_sync(executable: &Path, path: &Path) -> Result<Rating> {
        // -s3: value only, no tag name. Prints nothing when the tag is absent.
        let output = Command::new(executable)
            .args(["-s3", "-XMP-xmp:Rating"])
            .arg(path)
            .output()
            .map_err(ErrorKind::Io)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            exn::bail!(ErrorKind::ToolFailed(stderr));
        }
        String::from_utf8_lossy(&output.stdout).parse()
    }
}

#[async_trait]
impl RatingReader for ExiftoolReader {
    fn name(&self) -> &str {
        "exiftool"
    }

    async fn read_rating(&self, path: &Path) -> Result<Rating> {
        let executable = self.executable.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::read_sync(&executable, &path)).await.or_raise(|| ErrorKind::Task)?
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Writes a shell script standing in for exiftool.
    fn fake_exiftool(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("exiftool");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_parses_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        let reader = ExiftoolReader::with_executable(fake_exiftool(temp_dir.path(), "echo 5"));
        assert_eq!(reader.read_rating(Path::new("a.jpg")).await.unwrap(), Rating::Stars(5));
    }

    #[tokio::test]
    async fn test_empty_output_is_unrated() {
        let temp_dir = tempfile::tempdir().unwrap();
        let reader = ExiftoolReader::with_executable(fake_exiftool(temp_dir.path(), "exit 0"));
        assert_eq!(reader.read_rating(Path::new("a.jpg")).await.unwrap(), Rating::Unrated);
    }

    #[tokio::test]
    async fn test_failure_carries_stderr() {
        let temp_dir = tempfile::tempdir().unwrap();
        let script = fake_exiftool(temp_dir.path(), "echo 'Error: File not found' >&2; exit 1");
        let reader = ExiftoolReader::with_executable(script);
        let err = reader.read_rating(Path::new("a.jpg")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ToolFailed(msg) if msg == "Error: File not found"));
    }
}
