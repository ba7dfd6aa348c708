//! Repository for free-form key/value preferences.

use crate::db::Database;
use crate::error::{StorageError, StorageResult};
use crate::records::PreferenceRecord;

/// Typed access to the `preference` table.
pub struct PreferenceRepository<'a> {
    db: &'a Database,
}

impl<'a> PreferenceRepository<'a> {
    /// Build a repository over the given database handle.
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Set a preference, overwriting any existing value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the write fails.
    pub async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let record = PreferenceRecord {
            key: key.to_string(),
            value: value.to_string(),
        };
        self.db
            .client()
            .upsert(("preference", key))
            .content(record)
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Get a preference's value, if set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let record: Option<PreferenceRecord> = self
            .db
            .client()
            .select(("preference", key))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(record.map(|r| r.value))
    }

    /// List every preference currently set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn list(&self) -> StorageResult<Vec<PreferenceRecord>> {
        self.db
            .client()
            .select("preference")
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }
}
