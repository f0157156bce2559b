use clap::{Args, Parser, Subcommand, ValueEnum};
use picksync_config::RootPaths;
use picksync_rating::ReaderKind;
use std::path::PathBuf;

/// Copy five-star selects from the studio tree into the main photo library.
///
/// Shoots are found by folder-name prefix in both source trees, wherever
/// they sit. Every five-star JPEG in the select tree has its same-named
/// studio file copied to `<destination>/<studio folder name>/`.
#[derive(Debug, Parser)]
#[command(name = "picksync", version, about)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON) instead of the default location.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging on stderr; repeat for more still. `RUST_LOG` wins.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync a batch of shoots.
    Sync {
        /// Comma-separated shoot identifiers, e.g. "0001, 0002".
        batch: String,
        #[command(flatten)]
        roots: RootArgs,
        /// Staging folder [default: temp_copy_folder next to the executable]
        #[arg(long)]
        staging: Option<PathBuf>,
        /// How ratings are read [default: from config, else auto]
        #[arg(long, value_enum)]
        reader: Option<ReaderArg>,
        /// Remember the given roots for next time.
        #[arg(long)]
        remember: bool,
    },
    /// Print the rating of each file.
    Rating {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// How ratings are read [default: from config, else auto]
        #[arg(long, value_enum)]
        reader: Option<ReaderArg>,
    },
    /// Show the roots a sync would use, remembering any given here.
    Roots {
        #[command(flatten)]
        roots: RootArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RootArgs {
    /// Folder tree the photographer rated in.
    #[arg(long)]
    pub select: Option<PathBuf>,
    /// Folder tree with the studio copies.
    #[arg(long)]
    pub studio: Option<PathBuf>,
    /// Main library receiving the selects.
    #[arg(long)]
    pub destination: Option<PathBuf>,
}
impl RootArgs {
    /// Flags as root paths, made absolute against the working directory.
    pub fn to_paths(&self) -> std::io::Result<RootPaths> {
        let absolute = |path: &Option<PathBuf>| path.as_deref().map(std::path::absolute).transpose();
        Ok(RootPaths {
            select: absolute(&self.select)?,
            studio: absolute(&self.studio)?,
            destination: absolute(&self.destination)?,
        })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReaderArg {
    /// exiftool if installed, else built-in.
    Auto,
    /// Built-in XMP parser.
    Builtin,
    /// exiftool on PATH.
    Exiftool,
}
impl From<ReaderArg> for ReaderKind {
    fn from(arg: ReaderArg) -> Self {
        match arg {
            ReaderArg::Auto => ReaderKind::Auto,
            ReaderArg::Builtin => ReaderKind::Builtin,
            ReaderArg::Exiftool => ReaderKind::Exiftool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sync() {
        let cli = Cli::try_parse_from([
            "picksync",
            "sync",
            "0001, 0002",
            "--select",
            "/mnt/select",
            "--reader",
            "builtin",
            "--remember",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Sync { batch, roots, staging, reader, remember } = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(batch, "0001, 0002");
        assert_eq!(roots.select, Some(PathBuf::from("/mnt/select")));
        assert_eq!(roots.studio, None);
        assert_eq!(staging, None);
        assert!(matches!(reader, Some(ReaderArg::Builtin)));
        assert!(remember);
    }

    #[rstest]
    #[case("auto", ReaderKind::Auto)]
    #[case("builtin", ReaderKind::Builtin)]
    #[case("exiftool", ReaderKind::Exiftool)]
    fn test_reader_arg(#[case] arg: &str, #[case] expected: ReaderKind) {
        let cli = Cli::try_parse_from(["picksync", "rating", "a.jpg", "--reader", arg]).unwrap();
        let Command::Rating { reader, files } = cli.command else {
            panic!("expected rating");
        };
        assert_eq!(files, [PathBuf::from("a.jpg")]);
        assert_eq!(reader.map(ReaderKind::from), Some(expected));
    }

    #[test]
    fn test_rating_needs_files() {
        assert!(Cli::try_parse_from(["picksync", "rating"]).is_err());
    }

    #[test]
    fn test_relative_root_flags_become_absolute() {
        let args = RootArgs { select: Some("photos/select".into()), studio: None, destination: None };
        let paths = args.to_paths().unwrap();
        let select = paths.select.unwrap();
        assert!(select.is_absolute());
        assert!(select.ends_with("photos/select"));
        assert_eq!(paths.studio, None);
    }
}
