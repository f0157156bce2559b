//! Shoot folder resolution.

use crate::error::Result;
use crate::path::is_shoot_folder;
use crate::walk::{Entry, OnError, contains_image_in, read_children};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tracing::instrument;

/// Finds the folder for shoot `identifier` somewhere under `root`.
///
/// Searches depth-first. At every level the child directories are visited in
/// name order:
///
/// 1. each child whose name starts with `identifier` and contains no hyphen
///    is checked for at least one image (at any depth); the first one that
///    has one is returned immediately;
/// 2. only when no child at this level qualifies does the search descend into
///    each child in turn, returning the first match found below it.
///
/// Returns `Ok(None)` when nothing qualifies. Only a failure to read `root`
/// itself is an error; unreadable subdirectories (think `System Volume
/// Information` on a card reader) are skipped.
///
/// When several folders would qualify, the first by name order wins.
///
/// ```no_run
/// # async fn example() -> picksync_storage::error::Result<()> {
/// use picksync_storage::resolve_shoot_subtree;
/// match resolve_shoot_subtree("/mnt/studio/2024", "0001").await? {
///     Some(folder) => println!("shoot 0001 lives in {}", folder.display()),
///     None => println!("no folder for shoot 0001"),
/// }
/// # Ok(())
/// # }
/// ```
#[instrument(skip(root), fields(root = %root.as_ref().display()))]
pub async fn resolve_shoot_subtree(root: impl AsRef<Path>, identifier: &str) -> Result<Option<PathBuf>> {
    let found = resolve_in(root.as_ref(), identifier, OnError::Fail).await?;
    match &found {
        Some(folder) => tracing::debug!(folder = %folder.display(), "Resolved shoot folder"),
        None => tracing::debug!("No shoot folder found"),
    }
    Ok(found)
}

/// Boxed so it can recurse and still be `Send`.
type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<Option<PathBuf>>> + Send + 'a>>;

fn resolve_in<'a>(dir: &'a Path, identifier: &'a str, on_error: OnError) -> ResolveFuture<'a> {
    Box::pin(async move {
        let children: Vec<Entry> = read_children(dir, on_error).await?.into_iter().filter(Entry::is_dir).collect();
        for candidate in children.iter().filter(|child| is_shoot_folder(&child.name, identifier)) {
            // An unreadable candidate doesn't qualify; its siblings still might.
            if contains_image_in(&candidate.path, OnError::Skip).await? {
                return Ok(Some(candidate.path.clone()));
            }
        }
        for child in &children {
            if let Some(found) = resolve_in(&child.path, identifier, OnError::Skip).await? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    })
}
