//! Staged instance lifecycle
//!
//! Starts and stops the engine against the scratch path. Stop is only ever
//! issued after a fully successful verification; it waits a short grace
//! period for the immediate-mode shutdown to settle, then removes the
//! scratch directory. Every other outcome leaves the scratch directory on
//! disk for manual inspection.

mod errors;

pub use errors::{InstanceError, InstanceResult};

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::thread;
use std::time::Duration;

use crate::observability;
use crate::staging::StagingContext;

/// Seconds between the stop command returning and scratch removal.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Capability: control the staged engine instance.
pub trait InstanceController {
    /// Boot the engine against the scratch path.
    fn start(&self, ctx: &StagingContext) -> InstanceResult<()>;

    /// Stop the instance immediately and delete the scratch directory.
    fn stop(&self, ctx: &StagingContext) -> InstanceResult<()>;
}

/// Production controller invoking the version-specific `pg_ctl`.
pub struct PgCtlController;

impl PgCtlController {
    fn pg_ctl(version: &str) -> PathBuf {
        PathBuf::from(format!("/usr/pgsql-{}/bin/pg_ctl", version))
    }
}

impl InstanceController for PgCtlController {
    fn start(&self, ctx: &StagingContext) -> InstanceResult<()> {
        let bin = Self::pg_ctl(&ctx.engine_version);
        observability::debug(&format!(
            "{} start -D {}",
            bin.display(),
            ctx.scratch.display()
        ));

        let status = Command::new(&bin)
            .arg("start")
            .arg("-D")
            .arg(&ctx.scratch)
            .status()
            .map_err(|e| InstanceError::StartFailed(e.to_string()))?;
        if !status.success() {
            return Err(InstanceError::StartFailed(status.to_string()));
        }
        Ok(())
    }

    fn stop(&self, ctx: &StagingContext) -> InstanceResult<()> {
        let bin = Self::pg_ctl(&ctx.engine_version);
        observability::debug(&format!(
            "{} stop -m immediate -D {}",
            bin.display(),
            ctx.scratch.display()
        ));

        let status = Command::new(&bin)
            .args(["stop", "-m", "immediate"])
            .arg("-D")
            .arg(&ctx.scratch)
            .status()
            .map_err(|e| InstanceError::StopFailed(e.to_string()))?;
        if !status.success() {
            return Err(InstanceError::StopFailed(status.to_string()));
        }

        thread::sleep(STOP_GRACE);

        observability::debug(&format!("rm -rf {}", ctx.scratch.display()));
        fs::remove_dir_all(&ctx.scratch)
            .map_err(|e| InstanceError::StopFailed(format!("{}: {}", ctx.scratch.display(), e)))
    }
}
