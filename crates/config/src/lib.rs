//! picksync configuration.
//!
//! [`Config`] merges built-in defaults, a TOML/YAML/JSON file and
//! `PICKSYNC_*` environment variables with figment. [`Settings`] is the small
//! JSON store of roots remembered from earlier runs, which fills in whatever
//! the config leaves unset.

mod config;
pub mod error;
mod settings;

pub use crate::config::{CONFIG_FILE_NAME, Config, ENV_PREFIX, RatingConfig, RootPaths, STAGING_DIR_NAME};
pub use crate::settings::{SETTINGS_FILE_NAME, Settings};

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;

fn project_dirs() -> Result<ProjectDirs> {
    match ProjectDirs::from("", "", "picksync") {
        Some(dirs) => Ok(dirs),
        None => exn::bail!(ErrorKind::NoProjectDirs),
    }
}
