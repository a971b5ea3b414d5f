//! Backup selection
//!
//! A backup qualifies for verification if its identifier embeds today's date
//! (`YYYYMMDD`) and its status is `DONE`. The scan keeps the last qualifying
//! backup it encounters; backups are held in a `BTreeMap`, so that is the
//! greatest qualifying identifier — for date-stamped identifiers, the most
//! recent one. See DESIGN.md for the history of this rule.

use chrono::NaiveDate;

use crate::catalog::{BackupRecord, BackupStatus, ServerRecord};

/// Pick the backup to verify for `server`, or `None` if no backup taken
/// today has completed.
pub fn select_todays_backup<'a>(
    server: &'a ServerRecord,
    today: NaiveDate,
) -> Option<(&'a str, &'a BackupRecord)> {
    let stamp = today.format("%Y%m%d").to_string();
    let mut last = None;
    for (id, backup) in &server.backups {
        if id.contains(&stamp) && backup.status == BackupStatus::Done {
            last = Some((id.as_str(), backup));
        }
    }
    last
}
