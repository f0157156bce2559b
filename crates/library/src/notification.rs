use crate::model::{Batch, RootRole};
use crate::sync::SyncEvent;
use derive_more::Display;
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};
use std::path::PathBuf;
use time::macros::format_description;
use time::{OffsetDateTime, Time, UtcOffset};

/// Everything an observer is told about, in order.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    #[display("Starting batch: {_0}")]
    BatchStarted(Batch),
    #[display("{_0}")]
    Sync(SyncEvent),
    #[display("A sync is already in progress.")]
    AlreadyInProgress,
    #[display("Error: cannot access {role} folder: {}", path.display())]
    RootUnavailable { role: RootRole, path: PathBuf },
    #[display("Error during copy: {message}")]
    Failed { message: String },
    #[display("Cancel requested, stopping after the current file.")]
    CancelRequested,
    #[display("No sync is running.")]
    NotRunning,
}

/// A [`NotificationKind`] stamped with the wall-clock time it was sent.
///
/// Displays as `[HH:MM:SS] message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub time: Time,
    pub kind: NotificationKind,
}
impl Notification {
    /// Stamps `kind` with the current time at `offset`.
    pub fn now(kind: NotificationKind, offset: UtcOffset) -> Self {
        Self { time: OffsetDateTime::now_utc().to_offset(offset).time(), kind }
    }
}
impl FmtDisplay for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let time = self.time.format(format_description!("[hour]:[minute]:[second]")).map_err(|_| std::fmt::Error)?;
        write!(f, "[{time}] {}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShootId;
    use rstest::rstest;
    use time::macros::time;

    #[rstest]
    #[case(NotificationKind::BatchStarted(Batch::parse("0001,0002")), "Starting batch: 0001, 0002")]
    #[case(
        NotificationKind::Sync(SyncEvent::Progress { processed: 3, total: 12, file_name: "a.jpg".to_string() }),
        "Progress: 3/12 - a.jpg"
    )]
    #[case(
        NotificationKind::Sync(SyncEvent::ShootComplete { id: ShootId::new("0001"), rated: 2, copied: 1 }),
        "Shoot 0001 complete - rating 5: 2, copied: 1"
    )]
    #[case(
        NotificationKind::Sync(SyncEvent::NoCounterpart { file_name: "c.jpg".to_string() }),
        "No corresponding image: c.jpg"
    )]
    #[case(
        NotificationKind::RootUnavailable { role: RootRole::Studio, path: PathBuf::from("/mnt/studio") },
        "Error: cannot access studio folder: /mnt/studio"
    )]
    fn test_display(#[case] kind: NotificationKind, #[case] expected: &str) {
        let notification = Notification { time: time!(09:05:07), kind };
        assert_eq!(notification.to_string(), format!("[09:05:07] {expected}"));
    }

    #[test]
    fn test_now_uses_offset() {
        let offset = UtcOffset::from_hms(9, 0, 0).unwrap();
        let before = OffsetDateTime::now_utc().to_offset(offset).time();
        let notification = Notification::now(NotificationKind::NotRunning, offset);
        let after = OffsetDateTime::now_utc().to_offset(offset).time();
        // Ignore the (unlikely) midnight wrap-around.
        if before <= after {
            assert!(before <= notification.time && notification.time <= after);
        }
    }
}
