//! Error types for the scheduler crate.

use thiserror::Error;

use portal_store::StoreError;

/// Errors that can occur during scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Invalid cron expression
    #[error("Invalid cron expression: {0}")]
    InvalidCron(String),

    /// Empty or otherwise unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Scheduler is already running
    #[error("Scheduler is already running")]
    AlreadyRunning,

    /// Scheduler is not running
    #[error("Scheduler is not running")]
    NotRunning,

    /// Scheduler was shut down; the lifecycle is one-shot
    #[error("Scheduler has been shut down")]
    Terminated,

    /// Job store operation failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
