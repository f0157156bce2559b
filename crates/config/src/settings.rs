use crate::config::RootPaths;
use crate::error::{ErrorKind, Result};
use crate::project_dirs;
use std::path::{Path, PathBuf};

/// File name of the settings store inside the platform data directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Roots remembered between runs.
///
/// Stored as a JSON object keyed by role (`select`, `studio`,
/// `destination`). Config and command-line values win over anything
/// remembered here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    path: PathBuf,
    pub roots: RootPaths,
}
impl Settings {
    /// Where settings live by default.
    pub fn default_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join(SETTINGS_FILE_NAME))
    }

    /// Load from [`Settings::default_path`].
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Load from `path`. A missing file yields empty settings.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let roots = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).map_err(|e| ErrorKind::CorruptSettings(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No remembered settings");
                RootPaths::default()
            },
            Err(e) => exn::bail!(ErrorKind::Io(e)),
        };
        Ok(Self { path, roots })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remember any roots set in `roots`, keeping the others as they were.
    pub fn remember(&mut self, roots: &RootPaths) {
        self.roots = roots.clone().or(std::mem::take(&mut self.roots));
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(ErrorKind::Io)?;
        }
        let json = serde_json::to_string_pretty(&self.roots).map_err(|e| ErrorKind::CorruptSettings(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(ErrorKind::Io)?;
        tracing::info!(path = %self.path.display(), "Saved settings");
        Ok(())
    }
}
