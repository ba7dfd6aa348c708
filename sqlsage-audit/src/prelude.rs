//! Prelude module - commonly used items for convenient import.
//!
//! ```rust
//! use sqlsage_audit::prelude::*;
//! ```

pub use crate::{
    AuditCategory, AuditEntry, AuditError, AuditLog, AuditResult, AuditResultStatus,
    extract_sql_target, mask_parameters,
};
