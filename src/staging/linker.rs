//! WAL range reconstruction
//!
//! The second staging sub-step. The backup's window is the inclusive
//! log-file counter range `[begin_wal, end_wal]` on one timeline; for every
//! counter in that range the archived subdirectory
//! `<wals>/<timeline><counter as 8 hex>` is hard-linked, file by file, into
//! the staging WAL directory. The first failing subdirectory aborts the
//! sub-step; links already made stay in place.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::catalog::{wal_dir_name, WalSegmentId};
use crate::observability;

use super::context::StagingContext;
use super::errors::{StagingError, StagingResult};

/// Capability: hard-link every file of one archived WAL subdirectory into
/// the staging WAL directory.
pub trait WalLinker {
    fn link_dir(&self, source: &Path, dest: &Path) -> StagingResult<()>;
}

/// Drive the full range reconstruction for one backup.
///
/// An inverted range (`end_wal` counter below `begin_wal`'s) links nothing
/// and succeeds.
pub fn stage_wal_range(
    linker: &dyn WalLinker,
    ctx: &StagingContext,
    begin_wal: &WalSegmentId,
    end_wal: &WalSegmentId,
) -> StagingResult<()> {
    fs::create_dir_all(&ctx.wal_stage).map_err(|e| {
        StagingError::WalLinkFailed(format!(
            "could not create {}: {}",
            ctx.wal_stage.display(),
            e
        ))
    })?;

    let timeline = begin_wal.timeline();
    for counter in begin_wal.log_counter()..=end_wal.log_counter() {
        let source = ctx.wals_dir.join(wal_dir_name(timeline, counter));
        linker.link_dir(&source, &ctx.wal_stage)?;
    }
    Ok(())
}

/// Production linker shelling out to `cp -rl` per subdirectory, one source
/// argument per directory entry.
pub struct HardLinkWalLinker;

impl WalLinker for HardLinkWalLinker {
    fn link_dir(&self, source: &Path, dest: &Path) -> StagingResult<()> {
        let entries = fs::read_dir(source)
            .map_err(|e| StagingError::WalLinkFailed(format!("{}: {}", source.display(), e)))?;

        let mut cmd = Command::new("cp");
        cmd.arg("-rl");
        let mut any = false;
        for entry in entries {
            let entry = entry
                .map_err(|e| StagingError::WalLinkFailed(format!("{}: {}", source.display(), e)))?;
            cmd.arg(entry.path());
            any = true;
        }
        if !any {
            return Ok(());
        }
        cmd.arg(dest);

        observability::debug(&format!("cp -rl {}/* {}", source.display(), dest.display()));

        let status = cmd
            .status()
            .map_err(|e| StagingError::WalLinkFailed(e.to_string()))?;
        if !status.success() {
            return Err(StagingError::WalLinkFailed(format!(
                "{}: {}",
                source.display(),
                status
            )));
        }
        Ok(())
    }
}
