//! Shared result and metadata types for the [`crate::DbAdapter`] contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlsage_analyzer::PerformanceCheck;

/// The tagged result every [`crate::DbAdapter`] operation resolves to.
///
/// Per spec §4.3, adapters "never raise across the boundary" — a failed
/// query, a missing table, a driver timeout, all fold into [`DbOutcome::Error`]
/// rather than a Rust-level `Err`. The two `Pending*` variants are how the
/// mutation-confirmation and performance gates (spec §4.10, §7) surface to the
/// conversation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DbOutcome {
    /// The operation completed; `data` holds operation-specific fields.
    Success {
        /// Operation-specific payload.
        #[serde(flatten)]
        data: Value,
    },
    /// A deterministic failure (bad SQL, permission denied, driver error).
    Error {
        /// Human-readable error message.
        error: String,
    },
    /// A mutating statement is awaiting user confirmation.
    PendingConfirmation {
        /// The statement that would run once confirmed.
        sql: String,
        /// Human label for what kind of mutation this is.
        operation: String,
    },
    /// An analytical query was flagged by the SQL Analyzer and is awaiting
    /// user confirmation before it runs.
    PendingPerformanceConfirmation {
        /// The statement that would run once confirmed.
        sql: String,
        /// The analyzer's findings.
        performance_check: PerformanceCheck,
    },
}

impl DbOutcome {
    /// Build a [`DbOutcome::Success`] from any serializable payload.
    pub fn success(data: impl Serialize) -> Self {
        Self::Success {
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }

    /// Build a [`DbOutcome::Error`] from a displayable failure.
    pub fn error(err: impl std::fmt::Display) -> Self {
        Self::Error {
            error: err.to_string(),
        }
    }

    /// Whether this outcome represents a successful, terminal result.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Engine identity, version, and capability flags, returned by
/// [`crate::DbAdapter::get_db_info`] and cached at connect time (spec §4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbInfo {
    /// Machine-readable engine kind (`postgresql`, `mysql`, ...).
    pub engine: String,
    /// Short display version, e.g. `15.4`.
    pub version: String,
    /// Raw version string as reported by the engine, if richer than `version`.
    pub version_full: String,
    /// Host the adapter connected to.
    pub host: String,
    /// Database/service name.
    pub database: String,
    /// Engine-specific feature flags detected once at connect time.
    pub features: Value,
}

/// A table or view, as returned by `list_tables`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    /// Table/view name.
    pub name: String,
    /// Owning schema, if the engine has the concept.
    pub schema: Option<String>,
    /// `table`, `view`, `materialized_view`, ...
    pub object_type: String,
    /// Approximate row count, when cheaply available.
    pub estimated_rows: Option<i64>,
    /// Human-readable comment/description, if any.
    pub comment: Option<String>,
}

/// A single column, as returned by `describe_table`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Engine-native data type string.
    pub data_type: String,
    /// Whether the column accepts `NULL`.
    pub nullable: bool,
    /// Default value expression, if any.
    pub default: Option<String>,
    /// Whether the column participates in the primary key.
    pub is_primary_key: bool,
}

/// One database object discovered during migration enumeration (spec §4.3's
/// `get_all_objects`, §4.9's enumeration phase).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbObject {
    /// `table`, `view`, `index`, `sequence`, `function`, `procedure`, `trigger`.
    pub object_type: String,
    /// Object name.
    pub name: String,
    /// Owning schema.
    pub schema: Option<String>,
    /// Table the object belongs to, for indexes/triggers.
    pub table_name: Option<String>,
    /// Extra engine-specific metadata (row counts, definitions, parameters).
    pub metadata: Value,
}

/// A foreign key edge between two tables, plus the overall topological order.
///
/// Produced by `get_foreign_key_dependencies` (spec §4.3); the sort MUST
/// tolerate cycles by dropping the back-edge rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyDependencies {
    /// Raw `(referencing_table, referenced_table)` edges.
    pub edges: Vec<(String, String)>,
    /// Tables in dependency order: referents precede referrers.
    pub table_order: Vec<String>,
}

/// Result of `run_explain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResult {
    /// Raw plan lines/rows as the engine emitted them.
    pub plan: Vec<String>,
    /// Whether `ANALYZE`/real execution was requested.
    pub analyzed: bool,
}
