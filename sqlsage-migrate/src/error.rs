//! Errors for the migration planner/executor.

use thiserror::Error;

/// Failures that can occur while analyzing, planning, or executing a
/// migration task.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The source or target adapter returned `DbOutcome::Error`.
    #[error("adapter error: {0}")]
    Adapter(String),

    /// The adapter returned an outcome this handler cannot interpret (e.g.
    /// `PendingConfirmation` from a call that should always run immediately).
    #[error("unexpected adapter outcome: {0}")]
    UnexpectedOutcome(String),

    /// The requested item does not exist on the task.
    #[error("migration item not found: {0}")]
    ItemNotFound(String),

    /// The requested task does not exist.
    #[error("migration task not found: {0}")]
    TaskNotFound(String),
}

/// Result alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
