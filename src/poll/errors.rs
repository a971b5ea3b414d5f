//! Polling error types

use thiserror::Error;

/// Result type for readiness polling
pub type PollResult<T> = Result<T, PollError>;

/// Polling errors
#[derive(Debug, Error)]
pub enum PollError {
    /// The staged instance never became queryable within the budget.
    #[error("instance did not reach a consistent state within the polling budget")]
    NotReadyTimeout,
}
