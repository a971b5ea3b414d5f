//! Run coordination
//!
//! One invocation = at most one verification pass:
//!
//! (a) fetch the inventory snapshot
//! (b) point the log sink next to the catalog's log
//! (c) acquire the host-local exclusion lock — held elsewhere is a clean exit
//! (d) idempotency: a status record from today means nothing to do
//! (e) verify every server, collecting failures; one server never blocks another
//! (f) sort the failure list
//! (g) status 0 with the fixed success message, or 1 naming the failures
//! (h) persist the status record
//!
//! The persisted record is the durable signal; the process exits 0 for every
//! completed or cleanly short-circuited pass.

mod errors;
mod lock;
mod pipeline;
mod status;

pub use errors::{CoordinatorError, CoordinatorResult};
pub use lock::{ExclusionLock, LOCK_PATH};
pub use pipeline::{VerifyError, VerifyPipeline};
pub use status::{FileStatusStore, RunStatusRecord, StatusStore, STATUS_PATH};

use std::path::PathBuf;

use chrono::{DateTime, Local, TimeZone};

use crate::catalog::CatalogReader;
use crate::observability;

/// Fixed message persisted after a pass with an empty failure list.
pub const SUCCESS_MESSAGE: &str = "All backups are consistent. Good boy!";

/// How one invocation ended.
#[derive(Debug, PartialEq)]
pub enum RunOutcome {
    /// Another run holds the exclusion lock.
    LockHeld,
    /// A completed pass already happened today.
    AlreadyChecked,
    /// A full pass ran; the persisted status and failure list.
    Completed { status: i32, failed: Vec<String> },
}

/// The run coordinator: owns exclusion, idempotency, iteration, and the
/// status record.
pub struct Coordinator<'a> {
    pub catalog: &'a dyn CatalogReader,
    pub pipeline: VerifyPipeline<'a>,
    pub status_store: &'a dyn StatusStore,
    pub lock_path: PathBuf,
}

impl Coordinator<'_> {
    /// Execute one invocation at wall-clock time `now`.
    pub fn run(&self, now: DateTime<Local>) -> CoordinatorResult<RunOutcome> {
        let snapshot = self.catalog.fetch()?;

        if let Err(e) = observability::init_file_logger(&snapshot.global.config.log_file) {
            eprintln!("could not open log sink: {}", e);
        }

        let lock = ExclusionLock::acquire(&self.lock_path).map_err(CoordinatorError::Lock)?;
        let Some(_lock) = lock else {
            observability::warning("Another process is checking backups already. Exiting.");
            return Ok(RunOutcome::LockHeld);
        };

        if let Some(record) = self.status_store.load() {
            if checked_on_or_after_day_start(record.timestamp, &now) {
                observability::info("Backups have already been checked today. Not doing anything.");
                return Ok(RunOutcome::AlreadyChecked);
            }
        }

        let today = now.date_naive();
        let storage_root = &snapshot.global.config.barman_home;
        let mut failed = Vec::new();

        for (name, server) in &snapshot.servers {
            match self
                .pipeline
                .verify_server(storage_root, name, server, today)
            {
                Ok(()) => {}
                Err(e) => {
                    observability::error(&e.log_line(name));
                    observability::debug(&format!(
                        "{} failed verification with code {}: {}",
                        name,
                        e.failure_code(),
                        e
                    ));
                    failed.push(name.clone());
                }
            }
        }

        failed.sort();
        let (status, message) = if failed.is_empty() {
            (0, SUCCESS_MESSAGE.to_string())
        } else {
            (
                1,
                format!(
                    "Clusters with failed backups are {}. Take a look at them.",
                    failed.join(", ")
                ),
            )
        };
        observability::info(&message);

        self.status_store
            .store(&RunStatusRecord {
                timestamp: now.timestamp() as f64,
                status,
                message,
            })
            .map_err(CoordinatorError::Status)?;

        Ok(RunOutcome::Completed { status, failed })
    }
}

/// True when `timestamp` falls on or after the start of `now`'s calendar day.
fn checked_on_or_after_day_start(timestamp: f64, now: &DateTime<Local>) -> bool {
    let Some(day_start) = now.date_naive().and_hms_opt(0, 0, 0) else {
        return false;
    };
    match Local.timestamp_opt(timestamp as i64, 0) {
        chrono::LocalResult::Single(last) => last.naive_local() >= day_start,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn test_record_from_earlier_today_short_circuits() {
        let now = local(2026, 8, 7, 9, 30);
        let this_morning = local(2026, 8, 7, 1, 15);
        assert!(checked_on_or_after_day_start(
            this_morning.timestamp() as f64,
            &now
        ));
    }

    #[test]
    fn test_record_from_yesterday_does_not() {
        let now = local(2026, 8, 7, 9, 30);
        let yesterday = now - Duration::hours(24);
        assert!(!checked_on_or_after_day_start(
            yesterday.timestamp() as f64,
            &now
        ));
    }

    #[test]
    fn test_record_at_exact_day_start_counts_as_checked() {
        let now = local(2026, 8, 7, 9, 30);
        let midnight = local(2026, 8, 7, 0, 0);
        assert!(checked_on_or_after_day_start(
            midnight.timestamp() as f64,
            &now
        ));
    }
}
