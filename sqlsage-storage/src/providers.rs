//! Repository for stored LLM provider profiles.

use crate::db::Database;
use crate::error::{StorageError, StorageResult};
use crate::records::ProviderRecord;
use sqlsage_core::ProviderId;

/// Typed access to the `provider` table.
pub struct ProviderRepository<'a> {
    db: &'a Database,
}

impl<'a> ProviderRepository<'a> {
    /// Build a repository over the given database handle.
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert or replace a provider profile.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the write fails.
    pub async fn upsert(&self, record: &ProviderRecord) -> StorageResult<()> {
        self.db
            .client()
            .upsert(("provider", record.id.to_string()))
            .content(record.clone())
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Fetch a provider profile by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get(&self, id: ProviderId) -> StorageResult<Option<ProviderRecord>> {
        self.db
            .client()
            .select(("provider", id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// Fetch the provider profile marked as default, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get_default(&self) -> StorageResult<Option<ProviderRecord>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM provider WHERE is_default = true LIMIT 1")
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let mut rows: Vec<ProviderRecord> = response
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(rows.pop())
    }

    /// List every stored provider profile.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn list(&self) -> StorageResult<Vec<ProviderRecord>> {
        self.db
            .client()
            .select("provider")
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// Delete a provider profile.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the delete fails.
    pub async fn delete(&self, id: ProviderId) -> StorageResult<()> {
        let _: Option<ProviderRecord> = self
            .db
            .client()
            .delete(("provider", id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Mark `id` as the single default provider, clearing the flag on all
    /// others.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if `id` does not exist, or
    /// [`StorageError::Internal`] if the update fails.
    pub async fn set_default(&self, id: ProviderId) -> StorageResult<()> {
        if self.get(id).await?.is_none() {
            return Err(StorageError::NotFound(format!("provider {id}")));
        }
        self.db
            .client()
            .query("UPDATE provider SET is_default = false")
            .query("UPDATE provider SET is_default = true WHERE id = $id")
            .bind(("id", surrealdb::RecordId::from(("provider", id.to_string()))))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .check()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }
}
