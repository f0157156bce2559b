#![allow(dead_code)]

use picksync_library::{Roots, StagingArea};
use picksync_rating::ReaderHandle;
use picksync_rating::reader::{TempCopyReader, XmpReader, jpeg_with_rating};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Select, studio, destination and staging folders in one temp dir.
pub struct Fixture {
    dir: TempDir,
}
impl Fixture {
    pub fn new() -> Self {
        let fixture = Self { dir: tempfile::tempdir().unwrap() };
        for name in ["select", "studio", "destination"] {
            fs::create_dir(fixture.path(name)).unwrap();
        }
        fixture
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn roots(&self) -> Roots {
        Roots::new(self.path("select"), self.path("studio"), self.path("destination"))
    }

    pub fn staging(&self) -> StagingArea {
        StagingArea::new(self.path("temp_copy_folder"))
    }

    /// A real JPEG with an XMP rating (or none) in the select tree.
    pub fn select(&self, relative: &str, rating: Option<&str>) -> PathBuf {
        write(&self.path("select").join(relative), &jpeg_with_rating(rating))
    }

    /// A studio file; its bytes are its own path, so copies can be told apart.
    pub fn studio(&self, relative: &str) -> PathBuf {
        let path = self.path("studio").join(relative);
        write(&path, format!("studio:{relative}").as_bytes())
    }

    pub fn destination(&self, relative: &str) -> PathBuf {
        self.path("destination").join(relative)
    }

    /// Every file below the destination, relative and sorted.
    pub fn destination_files(&self) -> Vec<String> {
        files_below(&self.path("destination"))
    }

    pub fn staged_files(&self) -> Vec<String> {
        files_below(&self.path("temp_copy_folder"))
    }
}

pub fn reader() -> ReaderHandle {
    Arc::new(TempCopyReader::new(XmpReader))
}

pub fn write(path: &Path, contents: &[u8]) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
    path.to_path_buf()
}

fn files_below(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        let Ok(entries) = fs::read_dir(dir) else { return };
        for entry in entries {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let relative = path.strip_prefix(root).unwrap();
                out.push(relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/"));
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
