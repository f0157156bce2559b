use crate::error::{ErrorKind, Result};
use crate::project_dirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use picksync_rating::ReaderKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked for in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "picksync.toml";
/// Prefix for environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "PICKSYNC_";
/// Staging folder created beside the executable when none is configured.
pub const STAGING_DIR_NAME: &str = "temp_copy_folder";

/// The three folder trees, any of which may still be unset.
///
/// Field names double as the role keys in config files and the settings
/// store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootPaths {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
}
impl RootPaths {
    /// Fill every unset root from `fallback`.
    pub fn or(self, fallback: RootPaths) -> RootPaths {
        RootPaths {
            select: self.select.or(fallback.select),
            studio: self.studio.or(fallback.studio),
            destination: self.destination.or(fallback.destination),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.select.is_none() && self.studio.is_none() && self.destination.is_none()
    }

    /// Role name and path pairs, in select/studio/destination order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&Path>)> {
        [
            ("select", self.select.as_deref()),
            ("studio", self.studio.as_deref()),
            ("destination", self.destination.as_deref()),
        ]
        .into_iter()
    }

    fn validate(&self) -> Result<()> {
        for (role, path) in self.iter() {
            if let Some(path) = path {
                ensure_absolute(role_key(role), path)?;
            }
        }
        Ok(())
    }
}

fn role_key(role: &str) -> &'static str {
    match role {
        "select" => "roots.select",
        "studio" => "roots.studio",
        _ => "roots.destination",
    }
}

fn ensure_absolute(key: &'static str, path: &Path) -> Result<()> {
    if !path.is_absolute() {
        exn::bail!(ErrorKind::NotAbsolute { key, path: path.to_path_buf() });
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// `auto`, `builtin` or `exiftool`.
    #[serde(with = "reader_kind")]
    pub reader: ReaderKind,
}

mod reader_kind {
    use picksync_rating::ReaderKind;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(kind: &ReaderKind, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(kind)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ReaderKind, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|_| serde::de::Error::unknown_variant(&raw, &["auto", "builtin", "exiftool"]))
    }
}

/// Merged picksync configuration.
///
/// Sources, lowest precedence first: built-in defaults, the config file,
/// `PICKSYNC_*` environment variables (`PICKSYNC_ROOTS__SELECT=/mnt/select`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub roots: RootPaths,
    /// Where selects are gathered before promotion. See [`Config::staging_dir`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,
    pub rating: RatingConfig,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            roots: RootPaths::default(),
            staging_dir: None,
            rating: RatingConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from the platform config directory (if the file exists) and the
    /// environment.
    pub fn load() -> Result<Self> {
        let path = project_dirs()?.config_dir().join(CONFIG_FILE_NAME);
        let mut figment = Self::figment();
        if path.is_file() {
            tracing::debug!(path = %path.display(), "Loading config file");
            figment = figment.merge(Toml::file_exact(&path));
        }
        Self::extract(figment.merge(Self::env()))
    }

    /// Load from an explicit file, which must exist. The format follows the
    /// extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
        let figment = match extension.as_deref() {
            Some("toml") => Self::figment().merge(Toml::file_exact(path)),
            Some("yaml" | "yml") => Self::figment().merge(Yaml::file_exact(path)),
            Some("json") => Self::figment().merge(Json::file_exact(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        };
        tracing::debug!(path = %path.display(), "Loading config file");
        Self::extract(figment.merge(Self::env()))
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().map_err(|e| ErrorKind::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.roots.validate()?;
        if let Some(staging_dir) = &self.staging_dir {
            ensure_absolute("staging_dir", staging_dir)?;
        }
        Ok(())
    }

    /// The configured staging folder, or `temp_copy_folder` next to the
    /// running executable.
    pub fn staging_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.staging_dir {
            return Ok(dir.clone());
        }
        let exe = std::env::current_exe().map_err(ErrorKind::Io)?;
        let exe_dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(exe_dir.join(STAGING_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.roots.is_empty());
        assert_eq!(config.rating.reader, ReaderKind::Auto);
        assert_eq!(config.log_level, "info");
        let staging = config.staging_dir().unwrap();
        assert!(staging.ends_with(STAGING_DIR_NAME));
        assert!(staging.is_absolute());
    }

    #[test]
    fn test_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "picksync.toml",
                r#"
                    log_level = "debug"
                    [roots]
                    select = "/mnt/select"
                    studio = "/mnt/studio"
                    [rating]
                    reader = "builtin"
                "#,
            )?;
            jail.set_env("PICKSYNC_ROOTS__STUDIO", "/env/studio");
            jail.set_env("PICKSYNC_STAGING_DIR", "/tmp/staging");
            let config = Config::load_from(&jail.directory().join("picksync.toml")).unwrap();
            assert_eq!(config.roots.select, Some(PathBuf::from("/mnt/select")));
            assert_eq!(config.roots.studio, Some(PathBuf::from("/env/studio")));
            assert_eq!(config.roots.destination, None);
            assert_eq!(config.staging_dir().unwrap(), PathBuf::from("/tmp/staging"));
            assert_eq!(config.rating.reader, ReaderKind::Builtin);
            assert_eq!(config.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_yaml_and_json() {
        Jail::expect_with(|jail| {
            jail.create_file("picksync.yml", "roots:\n  destination: /mnt/library\n")?;
            jail.create_file("picksync.json", r#"{"rating": {"reader": "exiftool"}}"#)?;
            let yaml = Config::load_from(&jail.directory().join("picksync.yml")).unwrap();
            assert_eq!(yaml.roots.destination, Some(PathBuf::from("/mnt/library")));
            let json = Config::load_from(&jail.directory().join("picksync.json")).unwrap();
            assert_eq!(json.rating.reader, ReaderKind::Exiftool);
            Ok(())
        });
    }

    #[rstest]
    #[case("[roots]\nselect = \"relative/select\"", "roots.select")]
    #[case("[roots]\ndestination = \"library\"", "roots.destination")]
    #[case("staging_dir = \"temp_copy_folder\"", "staging_dir")]
    fn test_relative_paths_rejected(#[case] contents: &str, #[case] expected_key: &'static str) {
        Jail::expect_with(|jail| {
            jail.create_file("picksync.toml", contents)?;
            let err = Config::load_from(&jail.directory().join("picksync.toml")).unwrap_err();
            assert!(matches!(&*err, ErrorKind::NotAbsolute { key, .. } if *key == expected_key));
            Ok(())
        });
    }

    #[test]
    fn test_bad_files() {
        Jail::expect_with(|jail| {
            let err = Config::load_from(&jail.directory().join("missing.toml")).unwrap_err();
            assert!(matches!(&*err, ErrorKind::NotFound(_)));
            jail.create_file("picksync.ini", "select = /mnt/select")?;
            let err = Config::load_from(&jail.directory().join("picksync.ini")).unwrap_err();
            assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
            jail.create_file("picksync.toml", "[rating]\nreader = \"lightroom\"")?;
            let err = Config::load_from(&jail.directory().join("picksync.toml")).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(msg) if msg.contains("lightroom")));
            Ok(())
        });
    }

    #[test]
    fn test_roots_fill_from_fallback() {
        let explicit = RootPaths { select: Some("/a".into()), ..Default::default() };
        let remembered = RootPaths {
            select: Some("/old".into()),
            studio: Some("/b".into()),
            destination: None,
        };
        let merged = explicit.or(remembered);
        assert_eq!(merged.select, Some(PathBuf::from("/a")));
        assert_eq!(merged.studio, Some(PathBuf::from("/b")));
        assert_eq!(merged.destination, None);
        assert!(!merged.is_empty());
    }
}
