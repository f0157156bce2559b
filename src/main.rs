mod cli;
mod error;

use crate::cli::{Cli, Command, RootArgs};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use picksync_config::{Config, RootPaths, Settings};
use picksync_library::{Batch, Notification, Orchestrator, Roots, RunState, StagingArea, TransferRun};
use picksync_rating::reader::RatingReader;
use picksync_rating::{ReaderKind, reader_for};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .or_raise(|| ErrorKind::Config)?;
    init_logging(&config.log_level, cli.verbose);

    match cli.command {
        Command::Sync { batch, roots, staging, reader, remember } => {
            let roots = resolve_roots(&config, &roots, remember)?;
            let staging = match staging {
                Some(staging) => std::path::absolute(staging).map_err(ErrorKind::Path)?,
                None => config.staging_dir().or_raise(|| ErrorKind::Config)?,
            };
            let reader = reader.map(ReaderKind::from).unwrap_or(config.rating.reader);
            sync(roots, Batch::parse(&batch), staging, reader)
        },
        Command::Rating { files, reader } => {
            let reader = reader.map(ReaderKind::from).unwrap_or(config.rating.reader);
            rating(files, reader)
        },
        Command::Roots { roots } => show_roots(&config, &roots),
    }
}

/// `RUST_LOG` if set, else the configured level raised by `-v`s. Logs go to
/// stderr; stdout is for notifications.
fn init_logging(level: &str, verbose: u8) {
    let level = match verbose {
        0 => level,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread().enable_all().build().map_err(ErrorKind::Runtime)?)
}

/// Command-line flags first, then config, then remembered settings.
fn effective_roots(config: &Config, flags: &RootArgs) -> Result<(RootPaths, Settings)> {
    let settings = Settings::load().or_raise(|| ErrorKind::Settings)?;
    let flags = flags.to_paths().map_err(ErrorKind::Path)?;
    let effective = flags.or(config.roots.clone()).or(settings.roots.clone());
    Ok((effective, settings))
}

fn resolve_roots(config: &Config, flags: &RootArgs, remember: bool) -> Result<Roots> {
    let (effective, mut settings) = effective_roots(config, flags)?;
    if remember {
        settings.remember(&flags.to_paths().map_err(ErrorKind::Path)?);
        settings.save().or_raise(|| ErrorKind::Settings)?;
    }
    Roots::from_parts(effective.select, effective.studio, effective.destination).or_raise(|| ErrorKind::Roots)
}

fn sync(roots: Roots, batch: Batch, staging: PathBuf, reader: ReaderKind) -> Result<ExitCode> {
    let reader = reader_for(reader).or_raise(|| ErrorKind::Reader)?;
    // Before the runtime starts any threads, so the local UTC offset can be
    // determined.
    let (orchestrator, mut notifications) = Orchestrator::new(reader, StagingArea::new(staging));
    let run = runtime()?.block_on(watch(&orchestrator, &mut notifications, roots, batch))?;
    tracing::debug!(scanned = run.scanned, rated = run.rated, copied = run.copied, state = %run.state, "Run finished");
    Ok(match run.state {
        RunState::Completed => ExitCode::SUCCESS,
        // Same as being killed by SIGINT.
        RunState::Cancelled => ExitCode::from(130),
        _ => ExitCode::FAILURE,
    })
}

/// Prints notifications until the run ends, cancelling it on Ctrl-C.
async fn watch(
    orchestrator: &Orchestrator,
    notifications: &mut UnboundedReceiver<Notification>,
    roots: Roots,
    batch: Batch,
) -> Result<TransferRun> {
    let Some(mut worker) = orchestrator.start(roots, batch) else {
        exn::bail!(ErrorKind::Worker);
    };
    let run = loop {
        tokio::select! {
            Some(notification) = notifications.recv() => println!("{notification}"),
            Ok(()) = tokio::signal::ctrl_c() => orchestrator.cancel(),
            run = &mut worker => break run.or_raise(|| ErrorKind::Worker)?,
        }
    };
    while let Ok(notification) = notifications.try_recv() {
        println!("{notification}");
    }
    Ok(run)
}

fn rating(files: Vec<PathBuf>, reader: ReaderKind) -> Result<ExitCode> {
    let reader = reader_for(reader).or_raise(|| ErrorKind::Reader)?;
    let failures = runtime()?.block_on(async {
        let mut failures = 0;
        for file in &files {
            match reader.read_rating(file).await {
                Ok(rating) => println!("{}\t{rating}", file.display()),
                Err(e) => {
                    println!("{}\terror: {}", file.display(), *e);
                    failures += 1;
                },
            }
        }
        failures
    });
    Ok(if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn show_roots(config: &Config, flags: &RootArgs) -> Result<ExitCode> {
    let (effective, mut settings) = effective_roots(config, flags)?;
    let given = flags.to_paths().map_err(ErrorKind::Path)?;
    if !given.is_empty() {
        settings.remember(&given);
        settings.save().or_raise(|| ErrorKind::Settings)?;
        println!("Saved to {}", settings.path().display());
    }
    for (role, path) in effective.iter() {
        match path {
            Some(path) => println!("{role:<12} {}", path.display()),
            None => println!("{role:<12} (not set)"),
        }
    }
    Ok(ExitCode::SUCCESS)
}
