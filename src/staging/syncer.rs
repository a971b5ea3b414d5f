//! Base data sync
//!
//! The first staging sub-step: an archive-preserving recursive copy of the
//! backup's base data directory into the scratch path. The copy utility is an
//! external collaborator; success or failure is its exit code, nothing else.

use std::path::Path;
use std::process::Command;

use crate::observability;

use super::errors::{StagingError, StagingResult};

/// Capability: copy a base data directory into the scratch path.
pub trait DataSyncer {
    /// Copy the contents of `from` into `to`, preserving attributes.
    fn sync(&self, from: &Path, to: &Path) -> StagingResult<()>;
}

/// Production syncer shelling out to `rsync -a`.
pub struct RsyncSyncer;

impl DataSyncer for RsyncSyncer {
    fn sync(&self, from: &Path, to: &Path) -> StagingResult<()> {
        // Trailing slash: copy the directory's contents, not the directory.
        let from_arg = format!("{}/", from.display());
        observability::debug(&format!("rsync -a {} {}", from_arg, to.display()));

        let status = Command::new("rsync")
            .arg("-a")
            .arg(&from_arg)
            .arg(to)
            .status()
            .map_err(|e| StagingError::SyncFailed(e.to_string()))?;

        if !status.success() {
            return Err(StagingError::SyncFailed(status.to_string()));
        }
        Ok(())
    }
}
