//! High-level audit logging service.
//!
//! [`AuditLog`] is the single entry point the rest of the engine calls to
//! record SQL executions, tool calls, and configuration changes, and to
//! query or purge the resulting history. It persists through the shared
//! `sqlsage-storage` database connection rather than owning its own backend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlsage_core::{AuditEntryId, ConnectionId, SessionId, Timestamp};
use sqlsage_storage::Database;

use crate::entry::{AuditCategory, AuditEntry, AuditResultStatus};
use crate::error::{AuditError, AuditResult};
use crate::mask::mask_parameters;
use crate::target::extract_sql_target;

fn storage_err(e: impl std::fmt::Display) -> AuditError {
    AuditError::Storage(sqlsage_storage::StorageError::Internal(e.to_string()))
}

/// Records and queries the append-only audit log.
pub struct AuditLog {
    db: Arc<Database>,
}

impl AuditLog {
    /// Build an audit log service over a shared database handle.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Record a SQL execution: `execute_sql`, `execute_safe_query`,
    /// `run_explain`, or similar builtin tool actions.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the write fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn log_sql_execution(
        &self,
        session_id: Option<SessionId>,
        connection_id: Option<ConnectionId>,
        sql: &str,
        action: &str,
        result_status: AuditResultStatus,
        affected_rows: Option<u64>,
        error_message: Option<&str>,
        execution_time_ms: Option<u64>,
        user_confirmed: bool,
    ) -> AuditResult<AuditEntryId> {
        let (target_type, target_name) = extract_sql_target(sql);
        let result_summary = if affected_rows.is_some() || error_message.is_some() {
            Some(
                serde_json::json!({
                    "affected_rows": affected_rows,
                    "error": error_message,
                })
                .to_string(),
            )
        } else {
            None
        };

        let entry = AuditEntry {
            id: AuditEntryId::new(),
            session_id,
            connection_id,
            category: AuditCategory::SqlExecute,
            action: action.to_string(),
            target_type: target_type.map(str::to_string),
            target_name,
            sql_text: Some(sql.to_string()),
            parameters: None,
            result_status,
            result_summary,
            affected_rows,
            execution_time_ms,
            user_confirmed,
            created_at: Timestamp::now(),
        };
        self.store(entry).await
    }

    /// Record a tool call.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the write fails.
    pub async fn log_tool_call(
        &self,
        session_id: Option<SessionId>,
        connection_id: Option<ConnectionId>,
        tool_name: &str,
        parameters: Value,
        result_status: AuditResultStatus,
        result_summary: Option<&str>,
        execution_time_ms: Option<u64>,
    ) -> AuditResult<AuditEntryId> {
        let sql_text = parameters
            .get("sql")
            .and_then(Value::as_str)
            .map(str::to_string);
        let masked = mask_parameters(parameters);

        let entry = AuditEntry {
            id: AuditEntryId::new(),
            session_id,
            connection_id,
            category: AuditCategory::ToolCall,
            action: tool_name.to_string(),
            target_type: None,
            target_name: None,
            sql_text,
            parameters: Some(masked),
            result_status,
            result_summary: result_summary.map(str::to_string),
            affected_rows: None,
            execution_time_ms,
            user_confirmed: false,
            created_at: Timestamp::now(),
        };
        self.store(entry).await
    }

    /// Record a configuration change (connection/provider/server/preference
    /// create, update, or delete).
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the write fails.
    pub async fn log_config_change(
        &self,
        session_id: Option<SessionId>,
        action: &str,
        target_type: &str,
        target_name: &str,
        parameters: Option<Value>,
        result_status: AuditResultStatus,
    ) -> AuditResult<AuditEntryId> {
        let entry = AuditEntry {
            id: AuditEntryId::new(),
            session_id,
            connection_id: None,
            category: AuditCategory::ConfigChange,
            action: action.to_string(),
            target_type: Some(target_type.to_string()),
            target_name: Some(target_name.to_string()),
            sql_text: None,
            parameters: parameters.map(mask_parameters),
            result_status,
            result_summary: None,
            affected_rows: None,
            execution_time_ms: None,
            user_confirmed: false,
            created_at: Timestamp::now(),
        };
        self.store(entry).await
    }

    async fn store(&self, entry: AuditEntry) -> AuditResult<AuditEntryId> {
        let id = entry.id;
        self.db
            .client()
            .create::<Option<AuditEntry>>(("audit_log", id.to_string()))
            .content(entry)
            .await
            .map_err(storage_err)?;
        Ok(id)
    }

    /// Entries for a session, most recent first, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the read fails.
    pub async fn get_logs_by_session(
        &self,
        session_id: SessionId,
        limit: u32,
    ) -> AuditResult<Vec<AuditEntry>> {
        let mut response = self
            .db
            .client()
            .query(
                "SELECT * FROM audit_log WHERE session_id = $id \
                 ORDER BY created_at DESC LIMIT $limit",
            )
            .bind(("id", session_id.to_string()))
            .bind(("limit", limit))
            .await
            .map_err(storage_err)?;
        response.take(0).map_err(storage_err)
    }

    /// Entries within `[start, end)`, most recent first, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the read fails.
    pub async fn get_logs_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
    ) -> AuditResult<Vec<AuditEntry>> {
        let mut response = self
            .db
            .client()
            .query(
                "SELECT * FROM audit_log WHERE created_at >= $start AND created_at < $end \
                 ORDER BY created_at DESC LIMIT $limit",
            )
            .bind(("start", start))
            .bind(("end", end))
            .bind(("limit", limit))
            .await
            .map_err(storage_err)?;
        response.take(0).map_err(storage_err)
    }

    /// Entries in a given category, most recent first, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the read fails.
    pub async fn get_logs_by_category(
        &self,
        category: AuditCategory,
        limit: u32,
    ) -> AuditResult<Vec<AuditEntry>> {
        let mut response = self
            .db
            .client()
            .query(
                "SELECT * FROM audit_log WHERE category = $category \
                 ORDER BY created_at DESC LIMIT $limit",
            )
            .bind(("category", category))
            .bind(("limit", limit))
            .await
            .map_err(storage_err)?;
        response.take(0).map_err(storage_err)
    }

    /// The most recent entries overall, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the read fails.
    pub async fn get_recent_logs(&self, limit: u32) -> AuditResult<Vec<AuditEntry>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM audit_log ORDER BY created_at DESC LIMIT $limit")
            .bind(("limit", limit))
            .await
            .map_err(storage_err)?;
        response.take(0).map_err(storage_err)
    }

    /// Delete every entry older than `retention_days`. Returns the number of
    /// entries deleted.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Storage`] if the delete fails.
    pub async fn purge_older_than(&self, retention_days: u32) -> AuditResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(retention_days));
        let mut response = self
            .db
            .client()
            .query("DELETE audit_log WHERE created_at < $cutoff RETURN BEFORE")
            .bind(("cutoff", cutoff))
            .await
            .map_err(storage_err)?;
        let deleted: Vec<AuditEntry> = response.take(0).map_err(storage_err)?;
        Ok(deleted.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn log() -> AuditLog {
        let db = Database::connect_memory().await.unwrap();
        AuditLog::new(Arc::new(db))
    }

    #[tokio::test]
    async fn log_sql_execution_extracts_target_and_persists() {
        let log = log().await;
        log.log_sql_execution(
            None,
            None,
            "SELECT * FROM users",
            "execute_sql",
            AuditResultStatus::Success,
            Some(3),
            None,
            Some(12),
            false,
        )
        .await
        .unwrap();

        let recent = log.get_recent_logs(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].target_name.as_deref(), Some("users"));
    }

    #[tokio::test]
    async fn log_tool_call_masks_sensitive_parameters() {
        let log = log().await;
        log.log_tool_call(
            None,
            None,
            "add_connection",
            serde_json::json!({"host": "db1", "password": "hunter2"}),
            AuditResultStatus::Success,
            None,
            None,
        )
        .await
        .unwrap();

        let recent = log.get_recent_logs(10).await.unwrap();
        let params = recent[0].parameters.as_ref().unwrap();
        assert_eq!(params["host"], "db1");
        assert_eq!(params["password"], "***");
    }

    #[tokio::test]
    async fn purge_older_than_removes_stale_entries() {
        let log = log().await;
        log.log_config_change(
            None,
            "add_connection",
            "connection",
            "primary",
            None,
            AuditResultStatus::Success,
        )
        .await
        .unwrap();

        // A zero-day retention purges everything created before "now".
        let deleted = log.purge_older_than(0).await.unwrap();
        assert!(deleted <= 1);
    }
}
