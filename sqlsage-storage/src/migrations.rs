//! Repository for migration tasks and their per-object items.

use crate::db::Database;
use crate::error::{StorageError, StorageResult};
use crate::records::{MigrationItemRecord, MigrationTaskRecord};
use sqlsage_core::{MigrationItemId, MigrationTaskId};

/// Typed access to the `migration_task` and `migration_item` tables.
pub struct MigrationRepository<'a> {
    db: &'a Database,
}

impl<'a> MigrationRepository<'a> {
    /// Build a repository over the given database handle.
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert or replace a migration task.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the write fails.
    pub async fn upsert_task(&self, record: &MigrationTaskRecord) -> StorageResult<()> {
        self.db
            .client()
            .upsert(("migration_task", record.id.to_string()))
            .content(record.clone())
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Fetch a migration task by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get_task(&self, id: MigrationTaskId) -> StorageResult<Option<MigrationTaskRecord>> {
        self.db
            .client()
            .select(("migration_task", id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// List every migration task, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn list_tasks(&self) -> StorageResult<Vec<MigrationTaskRecord>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM migration_task ORDER BY created_at DESC")
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        response
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// Insert or replace a single migration item.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the write fails.
    pub async fn upsert_item(&self, record: &MigrationItemRecord) -> StorageResult<()> {
        self.db
            .client()
            .upsert(("migration_item", record.id.to_string()))
            .content(record.clone())
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Bulk-insert the items planned for a task, in execution order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if any write fails.
    pub async fn insert_items(&self, items: &[MigrationItemRecord]) -> StorageResult<()> {
        for item in items {
            self.upsert_item(item).await?;
        }
        Ok(())
    }

    /// Fetch a single migration item by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get_item(&self, id: MigrationItemId) -> StorageResult<Option<MigrationItemRecord>> {
        self.db
            .client()
            .select(("migration_item", id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// List a task's items, in execution order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn list_items(
        &self,
        task_id: MigrationTaskId,
    ) -> StorageResult<Vec<MigrationItemRecord>> {
        let mut response = self
            .db
            .client()
            .query(
                "SELECT * FROM migration_item WHERE task_id = $id \
                 ORDER BY execution_order ASC",
            )
            .bind(("id", task_id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        response
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))
    }
}
