//! Staging area between the studio tree and the destination.
//!
//! Selects are first copied to `<staging>/<studio folder name>/`, and only
//! once a whole shoot has been gathered are they moved into the
//! destination. A shoot interrupted halfway leaves its files in staging,
//! and the next successful promotion picks them up.

use crate::error::{ErrorKind, Result};
use picksync_storage::is_hidden;
use std::ffi::{OsStr, OsString};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

/// Folders and files moved by one [`StagingArea::promote`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Promotion {
    /// Destination folders that received files, in promotion order.
    pub folders: Vec<PathBuf>,
    pub files: u64,
}

#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}
impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copies `source` into the `folder` subfolder, replacing any earlier copy.
    pub async fn stage(&self, folder: &OsStr, source: &Path) -> Result<PathBuf> {
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await.map_err(|source| ErrorKind::Stage { path: dir.clone(), source })?;
        let Some(name) = source.file_name() else {
            exn::bail!(ErrorKind::Stage {
                path: source.to_path_buf(),
                source: std::io::Error::new(IoErrorKind::InvalidInput, "source has no file name"),
            });
        };
        let staged = dir.join(name);
        tokio::fs::copy(source, &staged)
            .await
            .map_err(|e| ErrorKind::Stage { path: source.to_path_buf(), source: e })?;
        tracing::debug!(source = %source.display(), staged = %staged.display(), "Staged file");
        Ok(staged)
    }

    /// Moves every staged subfolder into `destination`, merging with folders
    /// already there and overwriting files by name. Each subfolder is removed
    /// once emptied.
    ///
    /// A staging root that doesn't exist yet has nothing to promote. Hidden
    /// entries are never promoted, and a folder still holding one is kept.
    #[tracing::instrument(skip_all, fields(staging = %self.root.display(), destination = %destination.display()))]
    pub async fn promote(&self, destination: &Path) -> Result<Promotion> {
        let mut promotion = Promotion::default();
        let folders = match sorted_entries(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(promotion),
            Err(source) => exn::bail!(ErrorKind::Promote { path: self.root.clone(), source }),
        };
        for (name, path, is_dir) in folders {
            if is_hidden(&name) {
                tracing::debug!(path = %path.display(), "Ignoring hidden entry in staging root");
                continue;
            }
            if !is_dir {
                tracing::warn!(path = %path.display(), "Ignoring stray file in staging root");
                continue;
            }
            let target = destination.join(&name);
            promotion.files += promote_folder(&path, &target).await?;
            promotion.folders.push(target);
        }
        tracing::info!(folders = promotion.folders.len(), files = promotion.files, "Promoted staging area");
        Ok(promotion)
    }
}

/// Directory entries as (name, path, is_dir), sorted by name.
async fn sorted_entries(dir: &Path) -> std::io::Result<Vec<(OsString, PathBuf, bool)>> {
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let is_dir = entry.file_type().await?.is_dir();
        entries.push((entry.file_name(), entry.path(), is_dir));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

async fn promote_folder(staged: &Path, target: &Path) -> Result<u64> {
    let promote_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ErrorKind::Promote { path, source }
    };
    tokio::fs::create_dir_all(target).await.map_err(promote_err(target))?;
    let mut moved = 0;
    let mut leftovers = false;
    for (name, path, is_dir) in sorted_entries(staged).await.map_err(promote_err(staged))? {
        if is_hidden(&name) {
            tracing::debug!(path = %path.display(), "Leaving hidden entry in staging");
            leftovers = true;
            continue;
        }
        if is_dir {
            tracing::warn!(path = %path.display(), "Leaving unexpected directory in staging");
            leftovers = true;
            continue;
        }
        move_file(&path, &target.join(&name)).await.map_err(promote_err(&path))?;
        moved += 1;
    }
    if leftovers {
        return Ok(moved);
    }
    tokio::fs::remove_dir(staged).await.map_err(promote_err(staged))?;
    tracing::debug!(staged = %staged.display(), target = %target.display(), files = moved, "Promoted folder");
    Ok(moved)
}

/// Renames `from` to `to`, falling back to [`copy_into_place`] when they are
/// on different filesystems.
async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match tokio::fs::rename(from, to).await {
        Err(e) if e.kind() == IoErrorKind::CrossesDevices => {
            tracing::debug!(from = %from.display(), to = %to.display(), "Rename crosses devices, copying instead");
            copy_into_place(from, to).await?;
            tokio::fs::remove_file(from).await
        },
        other => other,
    }
}

/// Copies `from` next to `to` under a hidden temporary name, then renames
/// it over `to`. Readers of `to` see the old file or the new one, never half
/// of either.
async fn copy_into_place(from: &Path, to: &Path) -> std::io::Result<()> {
    let mut partial_name = OsString::from(".");
    partial_name.push(to.file_name().unwrap_or(OsStr::new("file")));
    partial_name.push(".partial");
    let partial = to.with_file_name(partial_name);
    if let Err(e) = tokio::fs::copy(from, &partial).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }
    tokio::fs::rename(&partial, to).await
}
