//! Run gate, worker task and notification plumbing around [`sync`].
//!
//! At most one run is active per [`Orchestrator`]. The worker only talks to
//! the outside through two channels: every [`Notification`] goes out on an
//! unbounded mpsc channel, and the current [`RunState`] is published on a
//! watch channel.

use crate::error::{ErrorKind, Result};
use crate::model::{Batch, Roots, ShootId};
use crate::notification::{Notification, NotificationKind};
use crate::staging::StagingArea;
use crate::sync::{SyncEvent, SyncJob, sync};
use derive_more::Display;
use futures::{FutureExt, Stream, StreamExt};
use picksync_rating::ReaderHandle;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use time::UtcOffset;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}
impl RunState {
    /// Completed, cancelled or failed. A new run may start from any of these.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// What happened during one run, handed back by the worker when it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRun {
    pub batch: Batch,
    /// The shoot being (or last) processed.
    pub current: Option<ShootId>,
    /// Select files looked at.
    pub scanned: u64,
    /// Five-star selects found.
    pub rated: u64,
    /// Studio files staged for the destination.
    pub copied: u64,
    pub state: RunState,
    /// Every notification sent for this run, starting with
    /// [`NotificationKind::BatchStarted`].
    pub notifications: Vec<Notification>,
}
impl TransferRun {
    fn new(batch: Batch) -> Self {
        Self {
            batch,
            current: None,
            scanned: 0,
            rated: 0,
            copied: 0,
            state: RunState::Running,
            notifications: Vec::new(),
        }
    }

    fn record(&mut self, notification: Notification) {
        if let NotificationKind::Sync(event) = &notification.kind {
            match event {
                SyncEvent::ShootStarted(id) => self.current = Some(id.clone()),
                SyncEvent::Progress { .. } => self.scanned += 1,
                SyncEvent::NoCounterpart { .. } => self.rated += 1,
                SyncEvent::Copied { .. } => {
                    self.rated += 1;
                    self.copied += 1;
                },
                _ => {},
            }
        }
        self.notifications.push(notification);
    }
}

#[derive(Clone)]
struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
    offset: UtcOffset,
}
impl Notifier {
    fn send(&self, kind: NotificationKind) -> Notification {
        let notification = Notification::now(kind, self.offset);
        tracing::trace!(%notification, "Notify");
        if self.tx.send(notification.clone()).is_err() {
            tracing::trace!("Notification receiver dropped");
        }
        notification
    }
}

/// Starts and cancels sync runs.
///
/// ```no_run
/// use picksync_library::{Batch, Orchestrator, Roots, StagingArea};
/// use picksync_rating::{ReaderKind, reader_for};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let reader = reader_for(ReaderKind::Builtin).map_err(|e| format!("{e:?}"))?;
/// let (orchestrator, mut notifications) = Orchestrator::new(reader, StagingArea::new("/tmp/temp_copy_folder"));
/// let roots = Roots::new("/mnt/select", "/mnt/studio", "/mnt/library");
/// orchestrator.start(roots, Batch::parse("0001, 0002"));
/// while let Some(notification) = notifications.recv().await {
///     println!("{notification}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    reader: ReaderHandle,
    staging: StagingArea,
    notifier: Notifier,
    state: Arc<watch::Sender<RunState>>,
    cancel: Mutex<CancellationToken>,
}
impl Orchestrator {
    /// Returns the orchestrator and the receiving end of its notifications.
    ///
    /// Timestamps use the local offset if the platform can tell us what it
    /// is (call this before spawning threads on Unix), UTC otherwise.
    pub fn new(reader: ReaderHandle, staging: StagingArea) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        let (tx, rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            reader,
            staging,
            notifier: Notifier { tx, offset },
            state: Arc::new(watch::Sender::new(RunState::Idle)),
            cancel: Mutex::new(CancellationToken::new()),
        };
        (orchestrator, rx)
    }

    /// Stamp notifications at `offset` instead.
    pub fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
        self.notifier.offset = offset;
        self
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Watch the run state change.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Starts syncing `batch` on a new tokio task.
    ///
    /// While a run is in progress this only sends
    /// [`NotificationKind::AlreadyInProgress`] and returns `None`. Otherwise the
    /// state becomes [`RunState::Running`] before this returns. Must be called
    /// from within a tokio runtime.
    pub fn start(&self, roots: Roots, batch: Batch) -> Option<JoinHandle<TransferRun>> {
        let cancel = CancellationToken::new();
        let started = self.state.send_if_modified(|state| {
            if *state == RunState::Running {
                return false;
            }
            *state = RunState::Running;
            *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = cancel.clone();
            true
        });
        if !started {
            tracing::warn!("Sync requested while another is running");
            self.notifier.send(NotificationKind::AlreadyInProgress);
            return None;
        }

        tracing::info!(%batch, "Starting sync");
        let mut run = TransferRun::new(batch.clone());
        run.record(self.notifier.send(NotificationKind::BatchStarted(batch.clone())));
        let job = SyncJob { roots, batch, reader: self.reader.clone(), staging: self.staging.clone(), cancel };
        Some(tokio::spawn(drive(sync(job), run, self.notifier.clone(), self.state.clone())))
    }

    /// Asks the running sync to stop before its next shoot or file.
    pub fn cancel(&self) {
        // Checked and triggered under the state lock, so a `start` can't slip
        // in between and have its fresh token cancelled.
        let mut running = false;
        self.state.send_if_modified(|state| {
            if *state == RunState::Running {
                self.cancel.lock().unwrap_or_else(PoisonError::into_inner).cancel();
                running = true;
            }
            false
        });
        if !running {
            self.notifier.send(NotificationKind::NotRunning);
            return;
        }
        tracing::info!("Cancelling sync");
        self.notifier.send(NotificationKind::CancelRequested);
    }
}

/// Worker body: feeds events into `run` and the notification channel, and
/// publishes the terminal state, whatever happens.
async fn drive(
    events: impl Stream<Item = Result<SyncEvent>>,
    mut run: TransferRun,
    notifier: Notifier,
    state: Arc<watch::Sender<RunState>>,
) -> TransferRun {
    let outcome = AssertUnwindSafe(consume(events, &mut run, &notifier)).catch_unwind().await;
    let terminal = match outcome {
        Ok(Ok(terminal)) => terminal,
        Ok(Err(e)) => {
            tracing::error!(error = ?e, "Sync failed");
            run.record(notifier.send(failure(&e)));
            RunState::Failed
        },
        Err(panic) => {
            let message = ErrorKind::Worker(panic_message(panic)).to_string();
            tracing::error!(%message, "Sync worker panicked");
            run.record(notifier.send(NotificationKind::Failed { message }));
            RunState::Failed
        },
    };
    tracing::info!(state = %terminal, scanned = run.scanned, rated = run.rated, copied = run.copied, "Sync finished");
    run.state = terminal;
    state.send_replace(terminal);
    run
}

async fn consume(
    events: impl Stream<Item = Result<SyncEvent>>,
    run: &mut TransferRun,
    notifier: &Notifier,
) -> Result<RunState> {
    let mut events = std::pin::pin!(events);
    while let Some(event) = events.next().await {
        let event = event?;
        let terminal = match &event {
            SyncEvent::Cancelled => Some(RunState::Cancelled),
            SyncEvent::BatchComplete => Some(RunState::Completed),
            _ => None,
        };
        run.record(notifier.send(NotificationKind::Sync(event)));
        if let Some(terminal) = terminal {
            return Ok(terminal);
        }
    }
    exn::bail!(ErrorKind::Worker("event stream ended early".to_string()))
}

fn failure(error: &crate::error::Error) -> NotificationKind {
    match &**error {
        ErrorKind::RootUnavailable { role, path } => NotificationKind::RootUnavailable { role: *role, path: path.clone() },
        kind => NotificationKind::Failed { message: kind.to_string() },
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(message) => *message,
        Err(panic) => panic.downcast_ref::<&str>().map(|s| s.to_string()).unwrap_or_else(|| "panic".to_string()),
    }
}
