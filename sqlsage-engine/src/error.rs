//! Errors surfaced by the Agent Conversation Engine's own plumbing.
//!
//! Per spec §7, a *tool*-level failure never raises here — it becomes a
//! `DbOutcome::Error`/`ToolCallResult::error` folded into the turn loop.
//! [`EngineError`] is reserved for failures in the engine's own supporting
//! infrastructure: persistence, the LLM transport, and malformed input that
//! has no tool-result shape to fold into.

/// Errors the engine itself can raise, distinct from tool-level failures.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The durable store could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] sqlsage_storage::StorageError),
    /// The audit log could not be written.
    #[error("audit error: {0}")]
    Audit(#[from] sqlsage_audit::AuditError),
    /// The LLM call itself failed (transport/auth/rate-limit), as opposed to
    /// returning `finish_reason = error`.
    #[error("LLM provider error: {0}")]
    Llm(#[from] sqlsage_llm::LlmError),
    /// `confirm_operation` was called with an index not currently occupied.
    #[error("no pending operation at that index")]
    Approval(#[from] sqlsage_approval::ApprovalError),
    /// No database adapter is attached to this agent.
    #[error("no active database connection")]
    NoActiveConnection,
    /// A referenced connection profile does not exist.
    #[error("unknown connection: {0}")]
    UnknownConnection(String),
    /// The adapter could not be constructed for a stored connection.
    #[error("failed to connect: {0}")]
    Connect(#[from] sqlsage_db::DbError),
}

/// Result alias for [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
