//! `SurrealDB` connection and schema management.
//!
//! The [`Database`] struct wraps a single `SurrealDB` connection and owns
//! schema initialization for every table the engine persists to. In
//! embedded mode it uses `SurrealKV` as its storage engine; tests use the
//! in-memory engine instead so no filesystem state leaks between runs.
//!
//! # Connection strings
//!
//! | Mode | Connection | Backend |
//! |------|-----------|---------|
//! | Embedded | `surrealkv://path/to/data` | `SurrealKV` |
//! | In-memory (tests) | `mem://` | transient |
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlsage_storage::Database;
//!
//! let db = Database::connect_embedded("path/to/data").await?;
//! // or
//! let db = Database::connect_memory().await?;
//! ```

use crate::error::{StorageError, StorageResult};

/// Re-export `SurrealDB` for direct query access when the typed repositories
/// are not sufficient.
pub use surrealdb;

/// `SurrealDB` connection, namespaced to the sqlsage engine's own database.
pub struct Database {
    inner: surrealdb::Surreal<surrealdb::engine::any::Any>,
}

impl Database {
    /// Connect to an embedded `SurrealDB` with `SurrealKV` storage, persisted
    /// under `path`, and initialize the schema if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection or schema
    /// initialization fails.
    pub async fn connect_embedded(path: &str) -> StorageResult<Self> {
        let endpoint = format!("surrealkv://{path}");
        let db = Self::connect(&endpoint, "main").await?;
        db.init_schema().await?;
        Ok(db)
    }

    /// Connect to an in-memory `SurrealDB` instance. Used by tests and by
    /// `sqlsage-test` fixtures; nothing persists past process exit.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection or schema
    /// initialization fails.
    pub async fn connect_memory() -> StorageResult<Self> {
        let db = Self::connect("mem://", "test").await?;
        db.init_schema().await?;
        Ok(db)
    }

    async fn connect(endpoint: &str, database: &str) -> StorageResult<Self> {
        let inner: surrealdb::Surreal<surrealdb::engine::any::Any> = surrealdb::Surreal::init();
        inner
            .connect(endpoint)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        inner
            .use_ns("sqlsage")
            .use_db(database)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Define every table and index the engine needs. Idempotent: running it
    /// against an already-initialized database is a no-op per table thanks to
    /// `DEFINE TABLE ... IF NOT EXISTS`.
    async fn init_schema(&self) -> StorageResult<()> {
        const SCHEMA: &str = r#"
            DEFINE TABLE IF NOT EXISTS connection SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS provider SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS mcp_server SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS session SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS chat_message SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS context_summary SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS migration_task SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS migration_item SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS audit_log SCHEMALESS;
            DEFINE TABLE IF NOT EXISTS preference SCHEMALESS;

            DEFINE INDEX IF NOT EXISTS session_idx ON TABLE chat_message COLUMNS session_id;
            DEFINE INDEX IF NOT EXISTS summary_session_idx ON TABLE context_summary COLUMNS session_id;
            DEFINE INDEX IF NOT EXISTS migration_item_task_idx ON TABLE migration_item COLUMNS task_id;
            DEFINE INDEX IF NOT EXISTS audit_occurred_idx ON TABLE audit_log COLUMNS created_at;
        "#;
        self.inner
            .query(SCHEMA)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .check()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    /// Access the underlying `SurrealDB` client for direct `SurrealQL`
    /// queries when a typed repository method does not cover the need.
    #[must_use]
    pub fn client(&self) -> &surrealdb::Surreal<surrealdb::engine::any::Any> {
        &self.inner
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
