//! sqlsage-db — the Database Adapter contract (spec §4.3, component C3) and
//! its five engine implementations.
//!
//! [`DbAdapter`] is the uniform capability surface every supported engine
//! (`PostgreSQL`, `MySQL`, `GaussDB`, Oracle, SQL Server) exposes to the
//! conversation engine. Every method resolves to a [`DbOutcome`] — the
//! adapter boundary never raises a Rust error for a query-level failure;
//! see `types::DbOutcome` and spec §4.3/§7.
//!
//! Grounded on `SFerenczy-glance::db`'s trait-plus-factory shape; exact
//! introspection SQL and feature-flag semantics transcribed from
//! `original_source/db_agent/core/database/*.py`.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
mod factory;
mod retry;
mod types;

pub mod engines;

pub use error::{DbError, DbResult};
pub use factory::{connect, ConnectionConfig};
pub use retry::with_retry;
pub use types::{
    ColumnInfo, DbInfo, DbObject, DbOutcome, ExplainResult, ForeignKeyDependencies, TableSummary,
};

use async_trait::async_trait;
use sqlsage_core::EngineKind;

/// Uniform capability surface over one connected relational database (spec
/// §4.3). Implementors MUST resolve every operation to a [`DbOutcome`]
/// rather than returning a Rust-level error for query-level failures; the
/// adapter itself only needs to connect once at construction time.
#[async_trait]
pub trait DbAdapter: Send + Sync {
    /// Which engine this adapter talks to.
    fn engine_kind(&self) -> EngineKind;

    /// Engine identity, version, and cached feature flags.
    async fn get_db_info(&self) -> DbOutcome;

    /// List tables (and views) in `schema`, or the engine's default schema.
    async fn list_tables(&self, schema: Option<&str>) -> DbOutcome;

    /// Describe one table's columns, keys, and indexes.
    async fn describe_table(&self, table: &str, schema: Option<&str>) -> DbOutcome;

    /// Fetch up to `limit` sample rows from `table`.
    async fn get_sample_data(&self, table: &str, schema: Option<&str>, limit: u32) -> DbOutcome;

    /// List databases/catalogs visible to the connecting user.
    async fn list_databases(&self) -> DbOutcome;

    /// Execute a read-only query, auto-prepending `SELECT` to bare
    /// projection lists per spec §4.3's documented heuristic.
    async fn execute_safe_query(&self, sql: &str) -> DbOutcome;

    /// Execute any statement. Read-only statements run immediately;
    /// mutations return [`DbOutcome::PendingConfirmation`] unless `confirmed`.
    async fn execute_sql(&self, sql: &str, confirmed: bool) -> DbOutcome;

    /// Run `EXPLAIN` (and optionally execute, for `ANALYZE`-style plans).
    async fn run_explain(&self, sql: &str, analyze: bool) -> DbOutcome;

    /// Create an index, asserting the `CREATE INDEX` prefix and rewriting to
    /// the engine's non-locking variant when `concurrent` is requested.
    async fn create_index(&self, sql: &str, concurrent: bool) -> DbOutcome;

    /// Update a table's planner statistics (`ANALYZE`/`UPDATE STATISTICS`).
    async fn analyze_table(&self, table: &str, schema: Option<&str>) -> DbOutcome;

    /// Report index usage (or lack thereof) for a table.
    async fn check_index_usage(&self, table: &str, schema: Option<&str>) -> DbOutcome;

    /// Report size/row-count/bloat statistics for a table.
    async fn get_table_stats(&self, table: &str, schema: Option<&str>) -> DbOutcome;

    /// List currently executing queries.
    async fn get_running_queries(&self) -> DbOutcome;

    /// List historically slow queries above `min_ms`, capped at `limit`.
    async fn identify_slow_queries(&self, min_ms: f64, limit: u32) -> DbOutcome;

    /// Enumerate database objects for migration planning (spec §4.9).
    async fn get_all_objects(&self, schema: Option<&str>, object_types: Option<&[String]>) -> DbOutcome;

    /// Fetch the DDL for one object, plus its dependency list.
    async fn get_object_ddl(&self, object_type: &str, object_name: &str, schema: Option<&str>) -> DbOutcome;

    /// Fetch object-level (non-FK) dependencies across the schema.
    async fn get_object_dependencies(&self, schema: Option<&str>) -> DbOutcome;

    /// Fetch FK edges and a cycle-tolerant topological table order.
    async fn get_foreign_key_dependencies(&self, schema: Option<&str>) -> DbOutcome;

    /// Check whether `sql` is analytical and, if so, run `EXPLAIN` and hand
    /// the plan to the SQL Analyzer (spec §4.3's `check_query_performance`,
    /// which "delegates to the SQL Analyzer"). EXPLAIN failures are advisory
    /// — they never block execution (spec §4.4).
    async fn check_query_performance(&self, sql: &str) -> sqlsage_analyzer::PerformanceCheck {
        if !sqlsage_analyzer::is_analytical_query(sql) {
            return sqlsage_analyzer::PerformanceCheck::not_analytical();
        }
        match self.run_explain(sql, false).await {
            DbOutcome::Success { data } => {
                let plan: Vec<String> = data
                    .get("plan")
                    .and_then(|v| v.as_array())
                    .map(|arr| {
                        arr.iter()
                            .map(|v| v.as_str().unwrap_or_default().to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                sqlsage_analyzer::check_query_performance(
                    sql,
                    self.engine_kind(),
                    &plan,
                    sqlsage_analyzer::Thresholds::default(),
                )
            }
            DbOutcome::Error { error } => sqlsage_analyzer::PerformanceCheck::unavailable(error),
            _ => sqlsage_analyzer::PerformanceCheck::unavailable("explain did not complete"),
        }
    }
}
