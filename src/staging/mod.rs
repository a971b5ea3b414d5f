//! Staged-environment preparation
//!
//! Staging materializes one backup into a disposable scratch directory the
//! engine can boot against in isolation:
//!
//! 1. Base data sync: archive-preserving recursive copy of the backup's data
//!    directory into the per-server scratch path.
//! 2. WAL range reconstruction: hard-link every segment file in the backup's
//!    `[begin_wal, end_wal]` log-file counter range into a staging WAL
//!    directory inside the scratch path.
//! 3. Configuration patching: rewrite the staged configuration so the engine
//!    starts alone and recovers to immediate consistency from the staging
//!    WAL directory.
//!
//! Each sub-step fails independently; nothing staged by earlier sub-steps is
//! rolled back on failure. The scratch directory of a failed verification is
//! kept on disk for manual inspection.

mod context;
mod errors;
mod linker;
mod patcher;
mod syncer;

pub use context::StagingContext;
pub use errors::{StagingError, StagingResult};
pub use linker::{stage_wal_range, HardLinkWalLinker, WalLinker};
pub use patcher::{ConfigPatcher, PostgresConfigPatcher};
pub use syncer::{DataSyncer, RsyncSyncer};
