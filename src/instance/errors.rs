//! Instance-control error types

use thiserror::Error;

/// Result type for instance lifecycle operations
pub type InstanceResult<T> = Result<T, InstanceError>;

/// Instance lifecycle errors
#[derive(Debug, Error)]
pub enum InstanceError {
    /// The engine did not start against the scratch path.
    #[error("engine start failed: {0}")]
    StartFailed(String),

    /// Stop or scratch removal failed after a successful verification.
    #[error("engine stop failed: {0}")]
    StopFailed(String),
}
