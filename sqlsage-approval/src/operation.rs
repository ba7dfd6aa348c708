//! A single gated database operation awaiting human confirmation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlsage_analyzer::PerformanceCheck;
use uuid::Uuid;

/// Why an operation is sitting in the pending-ops queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PendingReason {
    /// A mutating statement needs explicit confirmation before it runs
    /// (`DbOutcome::PendingConfirmation`).
    Confirmation {
        /// Human label for the kind of mutation (e.g. `"DROP TABLE"`).
        operation: String,
    },
    /// An analytical query was flagged by the SQL Analyzer
    /// (`DbOutcome::PendingPerformanceConfirmation`).
    PerformanceConfirmation {
        /// The analyzer's findings.
        performance_check: PerformanceCheck,
    },
}

/// One operation sitting in an `Agent`'s pending-ops queue, re-submittable
/// via [`crate::PendingOpsQueue::confirm`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Queue-local identity, stable across a `confirm`/requeue cycle.
    pub id: Uuid,
    /// The tool call this operation answers, so the engine can build the
    /// matching `ToolCallResult` once confirmed.
    pub tool_call_id: String,
    /// Name of the tool that produced this pending state (`execute_sql`,
    /// `execute_safe_query_forced`, `create_index`, ...).
    pub tool_name: String,
    /// The statement that will run once confirmed.
    pub sql: String,
    /// Why this operation is pending.
    pub reason: PendingReason,
    /// For `create_index` only: whether the non-locking variant was
    /// requested. Unused by other tool kinds.
    pub concurrent: bool,
    /// When this entry was queued.
    pub created_at: DateTime<Utc>,
}

impl PendingOperation {
    /// Build a new pending operation, generating a fresh id and timestamp.
    #[must_use]
    pub fn new(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        sql: impl Into<String>,
        reason: PendingReason,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            sql: sql.into(),
            reason,
            concurrent: false,
            created_at: Utc::now(),
        }
    }

    /// Record whether the deferred `create_index` should use the engine's
    /// non-locking variant once confirmed.
    #[must_use]
    pub fn with_concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }
}
