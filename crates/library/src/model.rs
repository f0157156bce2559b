use crate::error::{ErrorKind, Result};
use derive_more::Display;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix naming one photo shoot, e.g. `0001`.
///
/// Shoot folders are named `<id><anything without a hyphen>`, see
/// [`picksync_storage::is_shoot_folder`]. An empty identifier matches no
/// folder at all.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub struct ShootId(String);
impl ShootId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl AsRef<str> for ShootId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered shoot identifiers to process in one run.
///
/// Duplicates are kept and processed twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch(Vec<ShootId>);
impl Batch {
    /// Parses a comma-separated list. Tokens are trimmed; empty ones are kept
    /// (and will simply not match anything).
    ///
    /// ```
    /// use picksync_library::Batch;
    ///
    /// let batch = Batch::parse(" 0001, 0002,,0001");
    /// let ids: Vec<&str> = batch.iter().map(|id| id.as_str()).collect();
    /// assert_eq!(ids, ["0001", "0002", "", "0001"]);
    /// ```
    pub fn parse(input: &str) -> Self {
        Self(input.split(',').map(|token| ShootId::new(token.trim())).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShootId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl FromStr for Batch {
    type Err = Infallible;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
impl<S: Into<String>> FromIterator<S> for Batch {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(ShootId::new).collect())
    }
}
impl std::fmt::Display for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.iter().map(ShootId::as_str).collect();
        write!(f, "{}", ids.join(", "))
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootRole {
    /// Where the photographer culled and rated.
    #[display("select")]
    Select,
    /// Where the full-quality studio copies live.
    #[display("studio")]
    Studio,
    /// The main library that receives the selects.
    #[display("destination")]
    Destination,
}

/// The three folder trees of a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    pub select: PathBuf,
    pub studio: PathBuf,
    pub destination: PathBuf,
}
impl Roots {
    pub fn new(select: impl Into<PathBuf>, studio: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self { select: select.into(), studio: studio.into(), destination: destination.into() }
    }

    /// Builds roots from possibly-unset paths, naming the first missing role.
    pub fn from_parts(select: Option<PathBuf>, studio: Option<PathBuf>, destination: Option<PathBuf>) -> Result<Self> {
        let Some(select) = select else {
            exn::bail!(ErrorKind::RootUnset(RootRole::Select));
        };
        let Some(studio) = studio else {
            exn::bail!(ErrorKind::RootUnset(RootRole::Studio));
        };
        let Some(destination) = destination else {
            exn::bail!(ErrorKind::RootUnset(RootRole::Destination));
        };
        Ok(Self { select, studio, destination })
    }

    pub fn get(&self, role: RootRole) -> &Path {
        match role {
            RootRole::Select => &self.select,
            RootRole::Studio => &self.studio,
            RootRole::Destination => &self.destination,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RootRole, &Path)> {
        [RootRole::Select, RootRole::Studio, RootRole::Destination].into_iter().map(|role| (role, self.get(role)))
    }
}
