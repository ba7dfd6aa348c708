//! Repository for external MCP tool-server configurations.

use crate::db::Database;
use crate::error::{StorageError, StorageResult};
use crate::records::McpServerRecord;
use sqlsage_core::ExternalServerId;

/// Typed access to the `mcp_server` table.
pub struct McpServerRepository<'a> {
    db: &'a Database,
}

impl<'a> McpServerRepository<'a> {
    /// Build a repository over the given database handle.
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert or replace a server configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the write fails.
    pub async fn upsert(&self, record: &McpServerRecord) -> StorageResult<()> {
        self.db
            .client()
            .upsert(("mcp_server", record.id.to_string()))
            .content(record.clone())
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Fetch a server configuration by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get(&self, id: ExternalServerId) -> StorageResult<Option<McpServerRecord>> {
        self.db
            .client()
            .select(("mcp_server", id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// List every configured server, enabled or not.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn list(&self) -> StorageResult<Vec<McpServerRecord>> {
        self.db
            .client()
            .select("mcp_server")
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// List only servers with `enabled = true`, the set the manager spawns
    /// at startup.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn list_enabled(&self) -> StorageResult<Vec<McpServerRecord>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM mcp_server WHERE enabled = true")
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        response
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// Delete a server configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the delete fails.
    pub async fn delete(&self, id: ExternalServerId) -> StorageResult<()> {
        let _: Option<McpServerRecord> = self
            .db
            .client()
            .delete(("mcp_server", id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }
}
