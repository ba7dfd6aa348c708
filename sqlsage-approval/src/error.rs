//! Errors for the pending-operation queue.

/// Errors raised while queuing or confirming a pending operation.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// `confirm_operation(index)` was called with an index outside the
    /// current queue.
    #[error("no pending operation at index {index} (queue has {len} entries)")]
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// The queue's length at the time of the call.
        len: usize,
    },
}

/// Result type for pending-operation queue operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
