//! The per-`Agent`-instance pending-operation queue (spec §4.10).
//!
//! Confirmation is by position, not by token: `confirm_operation(index)`
//! removes and returns the entry at `index` so the caller can re-submit it
//! to the adapter with `confirmed=true`. There is no persistent allowance
//! or capability-token store — the queue's scope is exactly the lifetime of
//! one `Agent` instance.

use crate::error::{ApprovalError, ApprovalResult};
use crate::operation::PendingOperation;

/// FIFO-ordered queue of operations awaiting confirmation.
#[derive(Debug, Default)]
pub struct PendingOpsQueue {
    items: Vec<PendingOperation>,
}

impl PendingOpsQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an operation, returning its index in the queue.
    pub fn push(&mut self, op: PendingOperation) -> usize {
        self.items.push(op);
        self.items.len() - 1
    }

    /// Remove and return the operation at `index` so the caller can
    /// re-submit it with `confirmed=true` (spec §4.10 "Confirmation").
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::IndexOutOfRange`] if `index` is not
    /// currently occupied.
    pub fn confirm(&mut self, index: usize) -> ApprovalResult<PendingOperation> {
        if index >= self.items.len() {
            return Err(ApprovalError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// View every currently queued operation, in queue order.
    #[must_use]
    pub fn list(&self) -> &[PendingOperation] {
        &self.items
    }

    /// Clear the queue. Called at the start of every `chat()` turn (spec
    /// §4.10 step 1): a new turn starts with no carried-over pending ops.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether the queue currently holds any operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of operations currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::PendingReason;

    fn op(tool_call_id: &str) -> PendingOperation {
        PendingOperation::new(
            tool_call_id,
            "execute_sql",
            "DROP TABLE customers",
            PendingReason::Confirmation {
                operation: "DROP TABLE".to_string(),
            },
        )
    }

    #[test]
    fn confirm_removes_and_returns_by_index() {
        let mut queue = PendingOpsQueue::new();
        let idx_a = queue.push(op("call-a"));
        let idx_b = queue.push(op("call-b"));
        assert_eq!(idx_a, 0);
        assert_eq!(idx_b, 1);

        let confirmed = queue.confirm(0).expect("index 0 is occupied");
        assert_eq!(confirmed.tool_call_id, "call-a");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.list()[0].tool_call_id, "call-b");
    }

    #[test]
    fn confirm_out_of_range_errors() {
        let mut queue = PendingOpsQueue::new();
        queue.push(op("call-a"));
        let err = queue.confirm(5).unwrap_err();
        assert!(matches!(err, ApprovalError::IndexOutOfRange { index: 5, len: 1 }));
    }

    #[test]
    fn clear_empties_the_queue() {
        let mut queue = PendingOpsQueue::new();
        queue.push(op("call-a"));
        queue.clear();
        assert!(queue.is_empty());
    }
}
