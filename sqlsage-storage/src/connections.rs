//! Repository for stored database connection profiles.

use crate::db::Database;
use crate::error::{StorageError, StorageResult};
use crate::records::ConnectionRecord;
use sqlsage_core::ConnectionId;

/// Typed access to the `connection` table.
pub struct ConnectionRepository<'a> {
    db: &'a Database,
}

impl<'a> ConnectionRepository<'a> {
    /// Build a repository over the given database handle.
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert or replace a connection profile.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the write fails.
    pub async fn upsert(&self, record: &ConnectionRecord) -> StorageResult<()> {
        let key = record.id.to_string();
        self.db
            .client()
            .upsert(("connection", key))
            .content(record.clone())
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Fetch a connection profile by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get(&self, id: ConnectionId) -> StorageResult<Option<ConnectionRecord>> {
        self.db
            .client()
            .select(("connection", id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// Fetch a connection profile by its unique name.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get_by_name(&self, name: &str) -> StorageResult<Option<ConnectionRecord>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM connection WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let mut rows: Vec<ConnectionRecord> = response
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(rows.pop())
    }

    /// List every stored connection profile.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn list(&self) -> StorageResult<Vec<ConnectionRecord>> {
        self.db
            .client()
            .select("connection")
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// Delete a connection profile.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the delete fails.
    pub async fn delete(&self, id: ConnectionId) -> StorageResult<()> {
        let _: Option<ConnectionRecord> = self
            .db
            .client()
            .delete(("connection", id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Mark `id` as the single active connection, clearing the flag on all
    /// others. Mirrors the original single-active-connection invariant.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the update fails, or
    /// [`StorageError::NotFound`] if `id` does not exist.
    pub async fn set_active(&self, id: ConnectionId) -> StorageResult<()> {
        if self.get(id).await?.is_none() {
            return Err(StorageError::NotFound(format!("connection {id}")));
        }
        self.db
            .client()
            .query("UPDATE connection SET is_active = false")
            .query("UPDATE connection SET is_active = true WHERE id = $id")
            .bind(("id", surrealdb::RecordId::from(("connection", id.to_string()))))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .check()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlsage_core::EngineKind;

    fn sample(name: &str) -> ConnectionRecord {
        let now = Utc::now();
        ConnectionRecord {
            id: ConnectionId::new(),
            name: name.to_string(),
            db_type: EngineKind::PostgreSql,
            host: "localhost".to_string(),
            port: 5432,
            database: "app".to_string(),
            username: "app_user".to_string(),
            password_encrypted: sqlsage_crypto::encrypt("hunter2"),
            is_active: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let db = Database::connect_memory().await.unwrap();
        let repo = ConnectionRepository::new(&db);
        let record = sample("primary");
        repo.upsert(&record).await.unwrap();

        let fetched = repo.get(record.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "primary");
        assert_eq!(fetched.host, "localhost");
    }

    #[tokio::test]
    async fn get_by_name_finds_unique_connection() {
        let db = Database::connect_memory().await.unwrap();
        let repo = ConnectionRepository::new(&db);
        repo.upsert(&sample("staging")).await.unwrap();

        let found = repo.get_by_name("staging").await.unwrap();
        assert!(found.is_some());
        assert!(repo.get_by_name("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_active_is_exclusive() {
        let db = Database::connect_memory().await.unwrap();
        let repo = ConnectionRepository::new(&db);
        let a = sample("a");
        let b = sample("b");
        repo.upsert(&a).await.unwrap();
        repo.upsert(&b).await.unwrap();

        repo.set_active(a.id).await.unwrap();
        repo.set_active(b.id).await.unwrap();

        let a_after = repo.get(a.id).await.unwrap().unwrap();
        let b_after = repo.get(b.id).await.unwrap().unwrap();
        assert!(!a_after.is_active);
        assert!(b_after.is_active);
    }

    #[tokio::test]
    async fn set_active_rejects_unknown_id() {
        let db = Database::connect_memory().await.unwrap();
        let repo = ConnectionRepository::new(&db);
        let err = repo.set_active(ConnectionId::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
