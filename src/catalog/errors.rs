//! Catalog-specific error types
//!
//! Every failure mode here means the same thing to the caller: the catalog is
//! unavailable and there is nothing to iterate. No variant is retryable.

use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The diagnose command could not be spawned at all.
    #[error("could not invoke catalog command: {0}")]
    Invoke(#[source] std::io::Error),

    /// The diagnose command ran but reported failure.
    #[error("catalog command failed: {0}")]
    Failed(String),

    /// The diagnose output did not parse as an inventory snapshot.
    #[error("catalog output is not a valid snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}
