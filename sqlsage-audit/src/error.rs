//! Audit-related error types.

use thiserror::Error;

/// Errors that can occur while recording or querying the audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The underlying storage layer failed.
    #[error("audit storage error: {0}")]
    Storage(#[from] sqlsage_storage::StorageError),

    /// The requested entry does not exist.
    #[error("audit entry not found: {0}")]
    EntryNotFound(String),
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
