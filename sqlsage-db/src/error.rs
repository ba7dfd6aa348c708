//! Error types for the database adapter layer.
//!
//! Per spec §4.3, adapters never raise across the tool-dispatch boundary —
//! every operation returns a tagged [`crate::AdapterOutcome`]. This error type
//! exists for the handful of places an adapter genuinely cannot produce a
//! result at all (connection setup, pool exhaustion) and for classifying
//! transient failures for the retry policy in spec §5.

use thiserror::Error;

/// Failures that can occur while talking to a configured database engine.
#[derive(Debug, Error)]
pub enum DbError {
    /// The underlying driver reported a connection failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// A query or statement failed at the driver level.
    #[error("query error: {0}")]
    Query(String),

    /// An unsupported or unconfigured engine kind was requested.
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),

    /// The requested object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// A statement violated an adapter precondition (e.g. `create_index`
    /// called on a non-`CREATE INDEX` statement).
    #[error("invalid statement: {0}")]
    InvalidStatement(String),
}

/// Result alias for [`DbError`].
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Whether this failure is transient and worth retrying per spec §5's
    /// "connection"/"timeout"/"refused" substring-match policy.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        let msg = self.to_string().to_lowercase();
        ["connection", "timeout", "refused"]
            .iter()
            .any(|needle| msg.contains(needle))
    }
}
