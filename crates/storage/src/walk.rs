//! Recursive directory walking.
//!
//! Every listing is sorted by name so results never depend on the order the
//! filesystem happens to hand entries back in. Hidden entries are dropped
//! before anything else sees them.

use crate::error::{ErrorKind, Result};
use crate::path::{is_hidden, is_image};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    File,
    Directory,
}

#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) name: OsString,
    pub(crate) path: PathBuf,
    pub(crate) kind: EntryKind,
}
impl Entry {
    pub(crate) fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Whether an unreadable directory should fail the walk or be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnError {
    Fail,
    Skip,
}

/// Checks that `path` exists and is a directory.
pub async fn check_directory(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
    if !metadata.is_dir() {
        exn::bail!(ErrorKind::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Lists the visible children of `dir`, sorted by name.
///
/// Symlinks are followed for files only. A symlinked directory is never
/// descended into, which keeps link loops on network shares from turning
/// into infinite walks.
pub(crate) async fn read_children(dir: &Path, on_error: OnError) -> Result<Vec<Entry>> {
    let mut reader = match fs::read_dir(dir).await {
        Ok(reader) => reader,
        Err(e) if on_error == OnError::Skip => {
            tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
            return Ok(Vec::new());
        },
        Err(e) => exn::bail!(ErrorKind::from_io(e, dir)),
    };
    let mut entries = Vec::new();
    loop {
        let entry = match reader.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) if on_error == OnError::Skip => {
                tracing::warn!(path = %dir.display(), error = %e, "Directory listing ended early");
                break;
            },
            Err(e) => exn::bail!(ErrorKind::from_io(e, dir)),
        };
        if is_hidden(&entry.file_name()) {
            continue;
        }
        if let Some(kind) = classify(&entry).await {
            entries.push(Entry { name: entry.file_name(), path: entry.path(), kind });
        }
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

async fn classify(entry: &DirEntry) -> Option<EntryKind> {
    let file_type = entry.file_type().await.ok()?;
    if file_type.is_dir() {
        return Some(EntryKind::Directory);
    }
    if file_type.is_file() {
        return Some(EntryKind::File);
    }
    if file_type.is_symlink() {
        // Note: silently drop broken symlinks and links to directories.
        return match fs::metadata(entry.path()).await {
            Ok(target) if target.is_file() => Some(EntryKind::File),
            _ => None,
        };
    }
    None
}

/// Collects every visible file under `root`, recursively.
///
/// Hidden files are skipped and hidden directories are pruned. The result is
/// sorted by path. Subdirectories that cannot be read are logged and
/// skipped; only a failure to read `root` itself is an error.
///
/// ```no_run
/// # async fn example() -> picksync_storage::error::Result<()> {
/// let files = picksync_storage::enumerate_all("/mnt/select/2024/0001").await?;
/// println!("{} files to look at", files.len());
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, fields(root = %root.as_ref().display()))]
pub async fn enumerate_all(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut files = Vec::new();
    let mut stack = vec![(root.to_path_buf(), OnError::Fail)];
    while let Some((current, on_error)) = stack.pop() {
        for entry in read_children(&current, on_error).await? {
            match entry.kind {
                EntryKind::File => files.push(entry.path),
                EntryKind::Directory => stack.push((entry.path, OnError::Skip)),
            }
        }
    }
    files.sort();
    tracing::debug!(files = files.len(), "Enumerated directory tree");
    Ok(files)
}

/// Returns `true` as soon as any `.jpg`/`.jpeg` file is found under `dir`.
pub async fn contains_image(dir: impl AsRef<Path>) -> Result<bool> {
    contains_image_in(dir.as_ref(), OnError::Fail).await
}

/// [`contains_image`], with `on_error` deciding what an unreadable `dir`
/// means. When skipped, it simply holds no images.
pub(crate) async fn contains_image_in(dir: &Path, on_error: OnError) -> Result<bool> {
    let mut stack = vec![(dir.to_path_buf(), on_error)];
    while let Some((current, on_error)) = stack.pop() {
        let children = read_children(&current, on_error).await?;
        if children.iter().any(|entry| entry.kind == EntryKind::File && is_image(&entry.path)) {
            return Ok(true);
        }
        // Reversed so the stack pops subdirectories in name order.
        stack.extend(children.into_iter().rev().filter(Entry::is_dir).map(|entry| (entry.path, OnError::Skip)));
    }
    Ok(false)
}
