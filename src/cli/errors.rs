//! CLI-specific error types

use thiserror::Error;

use crate::coordinator::CoordinatorError;

/// Result type for CLI commands
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The verification run failed before it could complete a pass.
    #[error("verification run failed: {0}")]
    Run(#[from] CoordinatorError),
}
