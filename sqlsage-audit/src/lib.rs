//! sqlsage-audit — append-only audit logging for the sqlsage agent conversation engine.
//!
//! Every SQL execution, tool call, and configuration change passes through
//! [`AuditLog`] before or after it runs. Entries are never signed or
//! chain-linked — this is a plain structured operation log, not a
//! tamper-evidence mechanism — and sensitive parameter values are masked
//! before an entry is written. See `DESIGN.md` for why the chain-linking
//! found in similar systems was deliberately left out.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlsage_audit::{AuditLog, AuditResultStatus};
//! use std::sync::Arc;
//!
//! let log = AuditLog::new(Arc::new(db));
//! log.log_sql_execution(
//!     Some(session_id),
//!     Some(connection_id),
//!     "SELECT * FROM orders",
//!     "execute_safe_query",
//!     AuditResultStatus::Success,
//!     Some(42),
//!     None,
//!     Some(8),
//!     false,
//! ).await?;
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod entry;
mod error;
mod mask;
mod storage;
mod target;

pub use entry::{AuditCategory, AuditEntry, AuditResultStatus};
pub use error::{AuditError, AuditResult};
pub use mask::mask_parameters;
pub use storage::AuditLog;
pub use target::extract_sql_target;
