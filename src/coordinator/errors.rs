//! Run-level error types
//!
//! Only run-fatal conditions live here. Per-server failures are not errors
//! at this level; they are collected into the failure list and surfaced in
//! the persisted status record.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Result type for the run coordinator
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Run-fatal errors
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The catalog snapshot could not be obtained; nothing to iterate.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The lock file itself could not be opened.
    #[error("could not open run lock: {0}")]
    Lock(#[source] std::io::Error),

    /// The status record could not be persisted at the end of the pass.
    #[error("could not persist status record: {0}")]
    Status(#[source] std::io::Error),
}
