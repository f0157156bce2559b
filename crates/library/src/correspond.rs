use std::path::{Path, PathBuf};

/// A selected file and the studio file with the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub select: PathBuf,
    pub studio: PathBuf,
}

/// Looks for `selected`'s counterpart directly inside `studio_subtree`.
///
/// The name is used exactly as it appears in the select tree. Whether
/// `A.jpg` finds `a.jpg` is up to the filesystem.
pub async fn counterpart(studio_subtree: &Path, selected: &Path) -> Option<Pair> {
    let name = selected.file_name()?;
    let studio = studio_subtree.join(name);
    match tokio::fs::metadata(&studio).await {
        Ok(metadata) if metadata.is_file() => Some(Pair { select: selected.to_path_buf(), studio }),
        Ok(_) => None,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %studio.display(), error = %e, "Could not check for counterpart");
            }
            None
        },
    }
}
