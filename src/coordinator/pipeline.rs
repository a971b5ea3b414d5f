//! Per-server verification pipeline
//!
//! One server moves through: select → sync → link → patch → start → poll →
//! stop/teardown. The pipeline is terminal on first failure, and each
//! failure carries a stable numeric code for reporting:
//!
//! 1 sync, 2 link, 3 patch, 4 start, 5 readiness timeout, 6 no backup today.
//!
//! Teardown runs if and only if the verification fully succeeded; a failed
//! server's scratch state stays on disk for inspection. A teardown failure
//! after success is logged but does not mark the server failed.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

use crate::catalog::ServerRecord;
use crate::instance::{InstanceController, InstanceError};
use crate::observability;
use crate::poll::{Pause, PollError, Poller, ReadinessProbe};
use crate::selector::select_todays_backup;
use crate::staging::{
    stage_wal_range, ConfigPatcher, DataSyncer, StagingContext, StagingError, WalLinker,
};

/// Why one server's verification did not complete.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error("no completed backup for today")]
    NoBackupToday,
}

impl VerifyError {
    /// Stable failure code identifying the transition that failed.
    pub fn failure_code(&self) -> u8 {
        match self {
            VerifyError::Staging(StagingError::SyncFailed(_)) => 1,
            VerifyError::Staging(StagingError::WalLinkFailed(_)) => 2,
            VerifyError::Staging(StagingError::ConfigPatchFailed(_)) => 3,
            VerifyError::Instance(_) => 4,
            VerifyError::Poll(PollError::NotReadyTimeout) => 5,
            VerifyError::NoBackupToday => 6,
        }
    }

    /// Log line for the failure, in terms an operator scanning the log at
    /// 9am will recognize.
    pub fn log_line(&self, server: &str) -> String {
        match self {
            VerifyError::Staging(StagingError::SyncFailed(_)) => {
                format!("Could not sync base data for {}. Skipping it.", server)
            }
            VerifyError::Staging(StagingError::WalLinkFailed(_)) => {
                format!("Could not link WAL segments for {}. Skipping it.", server)
            }
            VerifyError::Staging(StagingError::ConfigPatchFailed(_)) => {
                format!("Could not patch configs for {}. Skipping it.", server)
            }
            VerifyError::Instance(_) => {
                format!("Could not start PostgreSQL for {}. Skipping it.", server)
            }
            VerifyError::Poll(PollError::NotReadyTimeout) => format!(
                "PostgreSQL has not reached consistent state for {} within the polling budget.",
                server
            ),
            VerifyError::NoBackupToday => format!(
                "Seems that last good backup has been done not today. Skipping server {}.",
                server
            ),
        }
    }
}

/// The capability set one run verifies every server with.
pub struct VerifyPipeline<'a> {
    pub syncer: &'a dyn DataSyncer,
    pub linker: &'a dyn WalLinker,
    pub patcher: &'a dyn ConfigPatcher,
    pub controller: &'a dyn InstanceController,
    pub probe: &'a dyn ReadinessProbe,
    pub pause: &'a dyn Pause,
    /// Poll budget; `None` means the production budget.
    pub poll_budget: Option<(u32, Duration)>,
}

impl<'a> VerifyPipeline<'a> {
    /// Run the whole pipeline for one server. `Ok(())` means verified and
    /// torn down.
    pub fn verify_server(
        &self,
        storage_root: &Path,
        server_name: &str,
        server: &ServerRecord,
        today: NaiveDate,
    ) -> Result<(), VerifyError> {
        let (backup_id, backup) =
            select_todays_backup(server, today).ok_or(VerifyError::NoBackupToday)?;

        let ctx = StagingContext::for_backup(
            storage_root,
            server_name,
            backup_id,
            backup,
            &server.config.conninfo,
        );

        self.syncer.sync(&ctx.base_dir, &ctx.scratch)?;
        stage_wal_range(self.linker, &ctx, &backup.begin_wal, &backup.end_wal)?;
        self.patcher.patch(&ctx)?;
        self.controller.start(&ctx)?;

        let poller = match self.poll_budget {
            Some((attempts, interval)) => {
                Poller::with_budget(self.probe, self.pause, attempts, interval)
            }
            None => Poller::new(self.probe, self.pause),
        };
        poller.poll_until_ready(&ctx.conninfo)?;

        observability::info(&format!(
            "Backup {} for {} is OK.",
            ctx.backup_id, ctx.server
        ));

        if let Err(e) = self.controller.stop(&ctx) {
            observability::warning(&format!(
                "Could not tear down verified instance for {}: {}",
                ctx.server, e
            ));
        }
        Ok(())
    }
}
