//! The picksync engine.
//!
//! For each shoot in a [`Batch`], find the shoot folder in the select and
//! studio trees ([`resolve_pair`]), rate every select file
//! ([`filter::evaluate`]), look up each five-star file's studio counterpart
//! ([`counterpart`]), stage it ([`StagingArea::stage`]) and finally promote
//! the staging area into the destination ([`StagingArea::promote`]).
//!
//! [`sync`] runs that as a stream of [`SyncEvent`]s; [`Orchestrator`] runs the
//! stream on a worker task behind a single-run gate and turns it into
//! timestamped [`Notification`]s.

mod correspond;
pub mod error;
pub mod filter;
mod matcher;
mod model;
mod notification;
mod orchestrator;
mod staging;
mod sync;

pub use crate::correspond::{Pair, counterpart};
pub use crate::matcher::{Match, resolve_pair};
pub use crate::model::{Batch, RootRole, Roots, ShootId};
pub use crate::notification::{Notification, NotificationKind};
pub use crate::orchestrator::{Orchestrator, RunState, TransferRun};
pub use crate::staging::{Promotion, StagingArea};
pub use crate::sync::{SyncEvent, SyncJob, sync};
