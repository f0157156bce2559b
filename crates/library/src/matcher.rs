use crate::model::ShootId;
use picksync_storage::error::Result as StorageResult;
use picksync_storage::resolve_shoot_subtree;
use std::path::{Path, PathBuf};

/// Outcome of looking a shoot up in both source trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    /// Both trees have a shoot folder with images in it.
    Matched { select: PathBuf, studio: PathBuf },
    /// At least one tree has no such folder. Whatever was found is kept for
    /// the log.
    Unmatched { select: Option<PathBuf>, studio: Option<PathBuf> },
}

/// Resolves the shoot folder for `id` under both source roots.
///
/// Errors only when a tree can't be read; a shoot that isn't there is
/// [`Match::Unmatched`].
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn resolve_pair(id: &ShootId, select_root: &Path, studio_root: &Path) -> StorageResult<Match> {
    let select = resolve_shoot_subtree(select_root, id.as_str()).await?;
    let studio = resolve_shoot_subtree(studio_root, id.as_str()).await?;
    Ok(match (select, studio) {
        (Some(select), Some(studio)) => {
            tracing::debug!(select = %select.display(), studio = %studio.display(), "Shoot matched");
            Match::Matched { select, studio }
        },
        (select, studio) => {
            tracing::info!(found_select = select.is_some(), found_studio = studio.is_some(), "Shoot not matched");
            Match::Unmatched { select, studio }
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: PathBuf) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[tokio::test]
    async fn test_matched() {
        let select = tempfile::tempdir().unwrap();
        let studio = tempfile::tempdir().unwrap();
        touch(select.path().join("2024").join("0001").join("a.jpg"));
        touch(studio.path().join("0001_studio").join("a.jpg"));
        let result = resolve_pair(&ShootId::new("0001"), select.path(), studio.path()).await.unwrap();
        assert_eq!(
            result,
            Match::Matched {
                select: select.path().join("2024").join("0001"),
                studio: studio.path().join("0001_studio"),
            }
        );
    }

    #[tokio::test]
    async fn test_unmatched_on_either_side() {
        let select = tempfile::tempdir().unwrap();
        let studio = tempfile::tempdir().unwrap();
        touch(select.path().join("0001").join("a.jpg"));
        touch(studio.path().join("0002").join("b.jpg"));

        let result = resolve_pair(&ShootId::new("0001"), select.path(), studio.path()).await.unwrap();
        assert_eq!(result, Match::Unmatched { select: Some(select.path().join("0001")), studio: None });
        let result = resolve_pair(&ShootId::new("0002"), select.path(), studio.path()).await.unwrap();
        assert_eq!(result, Match::Unmatched { select: None, studio: Some(studio.path().join("0002")) });
        let result = resolve_pair(&ShootId::new("9999"), select.path(), studio.path()).await.unwrap();
        assert_eq!(result, Match::Unmatched { select: None, studio: None });
    }

    #[tokio::test]
    async fn test_unreadable_root() {
        let studio = tempfile::tempdir().unwrap();
        let missing = studio.path().join("unplugged");
        assert!(resolve_pair(&ShootId::new("0001"), &missing, studio.path()).await.is_err());
    }
}
