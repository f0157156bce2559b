use crate::correspond::counterpart;
use crate::error::{ErrorKind, Result};
use crate::filter::{Verdict, evaluate};
use crate::matcher::{Match, resolve_pair};
use crate::model::{Batch, Roots, ShootId};
use crate::staging::StagingArea;
use async_stream::stream;
use derive_more::Display;
use exn::ResultExt;
use futures::Stream;
use picksync_rating::ReaderHandle;
use picksync_storage::{check_directory, enumerate_all};
use std::ffi::OsStr;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Everything one run of [`sync`] needs.
pub struct SyncJob {
    pub roots: Roots,
    pub batch: Batch,
    pub reader: ReaderHandle,
    pub staging: StagingArea,
    pub cancel: CancellationToken,
}

/// Progress events emitted by [`sync`].
///
/// For each shoot in the batch:
/// 1. [`ShootStarted`](Self::ShootStarted).
/// 2. Either [`ShootUnmatched`](Self::ShootUnmatched) or
///    [`ShootAborted`](Self::ShootAborted), and on to the next shoot, or
///    [`CandidatesDiscovered`](Self::CandidatesDiscovered).
/// 3. Per select file, [`Progress`](Self::Progress) and then possibly one of
///    [`RatingUnreadable`](Self::RatingUnreadable),
///    [`NoCounterpart`](Self::NoCounterpart) or [`Copied`](Self::Copied).
/// 4. [`ShootComplete`](Self::ShootComplete), after the shoot's files have
///    been promoted.
///
/// Then [`BatchComplete`](Self::BatchComplete). A cancelled run ends with
/// [`Cancelled`](Self::Cancelled) instead, at whatever point it was noticed.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    #[display("Processing shoot {_0}...")]
    ShootStarted(ShootId),
    #[display("Select files for shoot {id}: {total}")]
    CandidatesDiscovered { id: ShootId, total: u64 },
    #[display("Progress: {processed}/{total} - {file_name}")]
    Progress { processed: u64, total: u64, file_name: String },
    #[display("Could not read rating from {}: {message}", path.display())]
    RatingUnreadable { path: PathBuf, message: String },
    #[display("No corresponding image: {file_name}")]
    NoCounterpart { file_name: String },
    #[display("Shoot {id}: copied {file_name}")]
    Copied { id: ShootId, file_name: String },
    #[display("Warning: folder for shoot {_0} not found")]
    ShootUnmatched(ShootId),
    #[display("Shoot {id} skipped, folder could not be read: {message}")]
    ShootAborted { id: ShootId, message: String },
    #[display("Shoot {id} complete - rating 5: {rated}, copied: {copied}")]
    ShootComplete { id: ShootId, rated: u64, copied: u64 },
    #[display("Processing cancelled.")]
    Cancelled,
    #[display("All shoots processed.")]
    BatchComplete,
}

/// Streams [`SyncEvent`]s while copying every five-star select in `job`'s
/// batch from the studio tree to the destination.
///
/// Shoots and their files are processed one at a time, in order. Problems
/// with a single file or shoot become events; an `Err` item (unreachable
/// root, staging or promotion failure) ends the stream.
///
/// Cancellation is checked before every shoot and every select file. Files
/// already staged for the shoot in progress stay in the staging area.
pub fn sync(job: SyncJob) -> impl Stream<Item = Result<SyncEvent>> {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let SyncJob { roots, batch, reader, staging, cancel } = job;
        for (role, path) in roots.iter() {
            if let Err(e) = check_directory(path).await {
                tracing::error!(%role, path = %path.display(), error = ?e, "Root unavailable");
                yield Err::<SyncEvent, _>(e).or_raise(|| ErrorKind::RootUnavailable { role, path: path.to_path_buf() });
                return;
            }
        }

        for id in batch.iter() {
            if cancel.is_cancelled() {
                yield Ok(SyncEvent::Cancelled);
                return;
            }
            yield Ok(SyncEvent::ShootStarted(id.clone()));

            let (select, studio) = match resolve_pair(id, &roots.select, &roots.studio).await {
                Ok(Match::Matched { select, studio }) => (select, studio),
                Ok(Match::Unmatched { .. }) => {
                    yield Ok(SyncEvent::ShootUnmatched(id.clone()));
                    continue;
                },
                Err(e) => {
                    yield Ok(SyncEvent::ShootAborted { id: id.clone(), message: (*e).to_string() });
                    continue;
                },
            };
            let files = match enumerate_all(&select).await {
                Ok(files) => files,
                Err(e) => {
                    yield Ok(SyncEvent::ShootAborted { id: id.clone(), message: (*e).to_string() });
                    continue;
                },
            };
            // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
            let total = u64::try_from(files.len()).unwrap_or(u64::MAX);
            yield Ok(SyncEvent::CandidatesDiscovered { id: id.clone(), total });

            // Resolved subtrees always have a final component.
            let folder = studio.file_name().unwrap_or(OsStr::new(id.as_str())).to_os_string();
            let (mut processed, mut rated, mut copied) = (0, 0, 0);
            for path in files {
                if cancel.is_cancelled() {
                    tracing::info!(%id, processed, total, "Cancelled mid-shoot; staged files left for next run");
                    yield Ok(SyncEvent::Cancelled);
                    return;
                }
                processed += 1;
                let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                yield Ok(SyncEvent::Progress { processed, total, file_name: file_name.clone() });

                match evaluate(&*reader, &path).await {
                    Verdict::Unreadable(message) => {
                        yield Ok(SyncEvent::RatingUnreadable { path, message });
                        continue;
                    },
                    verdict if !verdict.is_selected() => continue,
                    _ => rated += 1,
                }
                let Some(pair) = counterpart(&studio, &path).await else {
                    yield Ok(SyncEvent::NoCounterpart { file_name });
                    continue;
                };
                if let Err(e) = staging.stage(&folder, &pair.studio).await {
                    yield Err(e);
                    return;
                }
                copied += 1;
                yield Ok(SyncEvent::Copied { id: id.clone(), file_name });
            }

            if let Err(e) = staging.promote(&roots.destination).await {
                yield Err(e);
                return;
            }
            tracing::info!(%id, rated, copied, "Shoot complete");
            yield Ok(SyncEvent::ShootComplete { id: id.clone(), rated, copied });
        }
        yield Ok(SyncEvent::BatchComplete);
    })
}
