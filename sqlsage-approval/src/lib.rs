//! Pending-operation queue and confirmation (spec §4.10, component part of
//! the Agent Conversation Engine's state).
//!
//! Gates mutating SQL and analyzer-flagged analytical queries behind an
//! explicit confirmation step. Scope is deliberately narrow: one queue per
//! `Agent` instance, confirmed by position, cleared at the start of every
//! turn. There is no persistent allowance store or capability-token system —
//! a migration task's `auto_execute_migration` flag (owned by
//! `sqlsage-engine`) is the only standing "skip confirmation" mechanism this
//! spec defines, and it is scoped to one task window, not granted here.
//!
//! ```
//! use sqlsage_approval::{PendingOperation, PendingOpsQueue, PendingReason};
//!
//! let mut queue = PendingOpsQueue::new();
//! let index = queue.push(PendingOperation::new(
//!     "call-1",
//!     "execute_sql",
//!     "DROP TABLE customers",
//!     PendingReason::Confirmation { operation: "DROP TABLE".to_string() },
//! ));
//! let confirmed = queue.confirm(index).unwrap();
//! assert_eq!(confirmed.sql, "DROP TABLE customers");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod operation;
pub mod queue;

pub use error::{ApprovalError, ApprovalResult};
pub use operation::{PendingOperation, PendingReason};
pub use queue::PendingOpsQueue;
