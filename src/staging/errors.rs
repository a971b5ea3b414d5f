//! Staging-specific error types
//!
//! One variant per sub-step. Each aborts the server's pipeline; none aborts
//! the run.

use thiserror::Error;

/// Result type for staging operations
pub type StagingResult<T> = Result<T, StagingError>;

/// Staging errors
#[derive(Debug, Error)]
pub enum StagingError {
    /// Base data copy did not complete.
    #[error("base data sync failed: {0}")]
    SyncFailed(String),

    /// A WAL segment subdirectory could not be hard-linked.
    #[error("WAL segment linking failed: {0}")]
    WalLinkFailed(String),

    /// One of the configuration patch steps did not apply.
    #[error("configuration patch failed: {0}")]
    ConfigPatchFailed(String),
}
