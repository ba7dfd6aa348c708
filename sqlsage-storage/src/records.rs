//! Typed records for every table the engine persists.
//!
//! Field sets mirror the original SQLite schema this engine replaces,
//! translated to `SurrealDB`'s document model: each record serializes
//! straight to/from a table row, with `sqlsage-core` newtypes standing in
//! for the original integer primary keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlsage_core::{
    ConnectionId, EngineKind, ExternalServerId, MessageId, MessageRole, MigrationItemId,
    MigrationTaskId, ProviderId, ProviderKind, SessionId,
};

/// A stored database connection profile. `password_encrypted` holds the
/// output of `sqlsage_crypto::encrypt` — never a plaintext password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Primary key.
    pub id: ConnectionId,
    /// Unique, user-chosen connection name.
    pub name: String,
    /// Engine this connection targets.
    pub db_type: EngineKind,
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Database/schema/service name, engine-dependent.
    pub database: String,
    /// Connecting username.
    pub username: String,
    /// Obfuscated password, see [`sqlsage_crypto::encrypt`].
    pub password_encrypted: String,
    /// Whether this is the session's currently active connection.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A stored LLM provider profile. `api_key_encrypted` holds the output of
/// `sqlsage_crypto::encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Primary key.
    pub id: ProviderId,
    /// Unique, user-chosen provider profile name.
    pub name: String,
    /// Which provider API this profile speaks.
    pub provider: ProviderKind,
    /// Obfuscated API key.
    pub api_key_encrypted: String,
    /// Model identifier to request (e.g. `gpt-4o`, `claude-sonnet-4-6`).
    pub model: String,
    /// Override base URL, for self-hosted or proxy deployments.
    pub base_url: Option<String>,
    /// Whether new sessions default to this provider.
    pub is_default: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A single free-form key/value preference setting, unscoped to any other
/// entity (compression threshold, UI language, etc.).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceRecord {
    /// Preference key.
    pub key: String,
    /// Preference value, stored as its string form.
    pub value: String,
}

/// A conversation session: one continuous run of the turn loop, bound to at
/// most one database connection and one LLM provider at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Primary key.
    pub id: SessionId,
    /// Display name, e.g. `Session 2026-07-28 10:30`.
    pub name: String,
    /// Connection this session is bound to, if any.
    pub connection_id: Option<ConnectionId>,
    /// Provider this session is bound to, if any.
    pub provider_id: Option<ProviderId>,
    /// Whether this is the session the CLI currently resumes into.
    pub is_current: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A single turn in a session's transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    /// Primary key.
    pub id: MessageId,
    /// Owning session.
    pub session_id: SessionId,
    /// Speaker role.
    pub role: MessageRole,
    /// Message text. `None` for assistant turns that are pure tool calls.
    pub content: Option<String>,
    /// Serialized tool calls the assistant requested, if any.
    pub tool_calls: Option<serde_json::Value>,
    /// The tool call this message answers, for `Tool`-role messages.
    pub tool_call_id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A compressed summary produced when a session's history crosses the
/// compression threshold, replacing the messages it summarizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSummaryRecord {
    /// Owning session.
    pub session_id: SessionId,
    /// The summary text itself.
    pub summary_text: String,
    /// How many messages this summary replaces.
    pub messages_summarized_count: u32,
    /// Token count of the messages before compression.
    pub original_token_count: u32,
    /// Token count of the summary after compression.
    pub compressed_token_count: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Status of a [`MigrationTaskRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationTaskStatus {
    /// Created, not yet analyzed.
    Pending,
    /// Source schema is being enumerated.
    Analyzing,
    /// Execution plan is being built.
    Planning,
    /// Plan presented to the user and accepted.
    Confirmed,
    /// Items are being executed against the target.
    Executing,
    /// All items reached a terminal state and no item failed.
    Completed,
    /// At least one item failed and the task did not recover.
    Failed,
}

/// A cross-engine migration run between two connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationTaskRecord {
    /// Primary key.
    pub id: MigrationTaskId,
    /// Display name.
    pub name: String,
    /// Source connection.
    pub source_connection_id: ConnectionId,
    /// Target connection.
    pub target_connection_id: ConnectionId,
    /// Source engine kind (denormalized for convenience/history).
    pub source_db_type: EngineKind,
    /// Target engine kind.
    pub target_db_type: EngineKind,
    /// Current status.
    pub status: MigrationTaskStatus,
    /// Total items enumerated for this task.
    pub total_items: u32,
    /// Items that reached `Completed`.
    pub completed_items: u32,
    /// Items that reached `Failed`.
    pub failed_items: u32,
    /// Items that were skipped.
    pub skipped_items: u32,
    /// Source schema name, if the engine has the concept.
    pub source_schema: Option<String>,
    /// Target schema name, if the engine has the concept.
    pub target_schema: Option<String>,
    /// Migration options (object type filters, batch size, etc.) as JSON.
    pub options: Option<serde_json::Value>,
    /// The analysis result produced during the `Analyzing` phase.
    pub analysis_result: Option<serde_json::Value>,
    /// Error message, set when `status == Failed`.
    pub error_message: Option<String>,
    /// When execution began.
    pub started_at: Option<DateTime<Utc>>,
    /// When execution finished (successfully or not).
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Kind of database object a [`MigrationItemRecord`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationObjectType {
    /// A sequence or identity generator.
    Sequence,
    /// A table.
    Table,
    /// An index.
    Index,
    /// A view.
    View,
    /// A stored function.
    Function,
    /// A stored procedure.
    Procedure,
    /// A trigger.
    Trigger,
}

/// Status of a [`MigrationItemRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationItemStatus {
    /// Not yet executed.
    Pending,
    /// Currently being applied to the target.
    Executing,
    /// Applied successfully.
    Completed,
    /// Failed and not retried successfully.
    Failed,
    /// Explicitly skipped by the user or the planner.
    Skipped,
}

/// A single database object migrated from source to target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationItemRecord {
    /// Primary key.
    pub id: MigrationItemId,
    /// Owning task.
    pub task_id: MigrationTaskId,
    /// Kind of object.
    pub object_type: MigrationObjectType,
    /// Object name.
    pub object_name: String,
    /// Schema the object lives in on the source, if applicable.
    pub schema_name: Option<String>,
    /// Position in the planner's execution order; lower runs first.
    pub execution_order: u32,
    /// Names of other items this one's DDL depends on.
    pub depends_on: Vec<String>,
    /// Current status.
    pub status: MigrationItemStatus,
    /// DDL as read from the source.
    pub source_ddl: Option<String>,
    /// DDL rewritten for the target dialect.
    pub target_ddl: Option<String>,
    /// Human-readable notes produced by the dialect converter.
    pub conversion_notes: Vec<String>,
    /// Execution result (rows affected, warnings) as JSON.
    pub execution_result: Option<serde_json::Value>,
    /// Error message, set when `status == Failed`.
    pub error_message: Option<String>,
    /// Number of times execution has been retried.
    pub retry_count: u32,
    /// When this item was last executed.
    pub executed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Configuration for one externally spawned MCP tool server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerRecord {
    /// Primary key.
    pub id: ExternalServerId,
    /// Unique, user-chosen server name; tools are prefixed with this.
    pub name: String,
    /// Executable to spawn (`npx`, `python`, `node`, a binary path, ...).
    pub command: String,
    /// Arguments passed to `command`.
    pub args: Vec<String>,
    /// Additional environment variables for the child process.
    pub env: Option<std::collections::BTreeMap<String, String>>,
    /// Whether the manager should spawn this server at startup.
    pub enabled: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}
