//! Audit entry types.
//!
//! Every SQL execution, tool call, and configuration change the engine
//! performs is recorded as an [`AuditEntry`]. Entries are append-only and
//! never carry raw secrets — sensitive parameter values are masked before
//! the entry is built, see [`mask_parameters`](crate::mask::mask_parameters).

use serde::{Deserialize, Serialize};
use sqlsage_core::{AuditEntryId, ConnectionId, SessionId, Timestamp};

/// Broad category an audit entry falls into, per the original operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditCategory {
    /// A SQL statement was executed against a connection.
    SqlExecute,
    /// A tool (builtin, migration, external, or skill) was invoked.
    ToolCall,
    /// A connection, provider, server, or preference was changed.
    ConfigChange,
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SqlExecute => "sql_execute",
            Self::ToolCall => "tool_call",
            Self::ConfigChange => "config_change",
        };
        write!(f, "{s}")
    }
}

/// Outcome status of the audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResultStatus {
    /// The operation completed successfully.
    Success,
    /// The operation failed.
    Error,
    /// The operation is awaiting user confirmation.
    Pending,
}

impl std::fmt::Display for AuditResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Pending => "pending",
        };
        write!(f, "{s}")
    }
}

/// A single, immutable audit log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry identifier.
    pub id: AuditEntryId,
    /// Session this entry belongs to, if any (some config changes are
    /// session-independent).
    pub session_id: Option<SessionId>,
    /// Connection this entry concerns, if any.
    pub connection_id: Option<ConnectionId>,
    /// Broad category.
    pub category: AuditCategory,
    /// Specific action name, e.g. `execute_sql`, `list_tables`, `add_connection`.
    pub action: String,
    /// Kind of target object, e.g. `table`, `connection`, `provider`.
    pub target_type: Option<String>,
    /// Name of the target object.
    pub target_name: Option<String>,
    /// SQL statement executed, if this entry concerns one.
    pub sql_text: Option<String>,
    /// Operation parameters, with sensitive values already masked.
    pub parameters: Option<serde_json::Value>,
    /// Outcome status.
    pub result_status: AuditResultStatus,
    /// Short, human-readable summary (row count, truncated error, etc.).
    pub result_summary: Option<String>,
    /// Rows affected, for DML statements.
    pub affected_rows: Option<u64>,
    /// Wall-clock execution time.
    pub execution_time_ms: Option<u64>,
    /// Whether this operation went through an explicit user confirmation gate.
    pub user_confirmed: bool,
    /// When this entry was recorded.
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_display_matches_persisted_form() {
        assert_eq!(AuditCategory::SqlExecute.to_string(), "sql_execute");
        assert_eq!(AuditCategory::ToolCall.to_string(), "tool_call");
        assert_eq!(AuditCategory::ConfigChange.to_string(), "config_change");
    }

    #[test]
    fn result_status_display_matches_persisted_form() {
        assert_eq!(AuditResultStatus::Success.to_string(), "success");
        assert_eq!(AuditResultStatus::Error.to_string(), "error");
        assert_eq!(AuditResultStatus::Pending.to_string(), "pending");
    }
}
