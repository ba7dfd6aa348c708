//! Repository for sessions, their message transcripts, and context summaries.

use crate::db::Database;
use crate::error::{StorageError, StorageResult};
use crate::records::{ChatMessageRecord, ContextSummaryRecord, SessionRecord};
use sqlsage_core::SessionId;

/// Typed access to the `session`, `chat_message`, and `context_summary` tables.
pub struct SessionRepository<'a> {
    db: &'a Database,
}

impl<'a> SessionRepository<'a> {
    /// Build a repository over the given database handle.
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert or replace a session record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the write fails.
    pub async fn upsert(&self, record: &SessionRecord) -> StorageResult<()> {
        self.db
            .client()
            .upsert(("session", record.id.to_string()))
            .content(record.clone())
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Fetch a session by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get(&self, id: SessionId) -> StorageResult<Option<SessionRecord>> {
        self.db
            .client()
            .select(("session", id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// Fetch the session currently marked `is_current`, if any — the one the
    /// CLI resumes into on launch.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get_current(&self) -> StorageResult<Option<SessionRecord>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM session WHERE is_current = true LIMIT 1")
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let mut rows: Vec<SessionRecord> = response
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(rows.pop())
    }

    /// List every session, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn list(&self) -> StorageResult<Vec<SessionRecord>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM session ORDER BY updated_at DESC")
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        response
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// Rename a session, bumping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if `id` does not exist, or
    /// [`StorageError::Internal`] if the update fails.
    pub async fn rename(&self, id: SessionId, name: &str) -> StorageResult<()> {
        let Some(mut record) = self.get(id).await? else {
            return Err(StorageError::NotFound(format!("session {id}")));
        };
        record.name = name.to_string();
        record.updated_at = chrono::Utc::now();
        self.upsert(&record).await
    }

    /// Mark `id` as the current session, clearing the flag on all others.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if `id` does not exist, or
    /// [`StorageError::Internal`] if the update fails.
    pub async fn set_current(&self, id: SessionId) -> StorageResult<()> {
        if self.get(id).await?.is_none() {
            return Err(StorageError::NotFound(format!("session {id}")));
        }
        self.db
            .client()
            .query("UPDATE session SET is_current = false")
            .query("UPDATE session SET is_current = true WHERE id = $id")
            .bind(("id", surrealdb::RecordId::from(("session", id.to_string()))))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .check()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Delete a session along with its messages and summaries.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the delete fails.
    pub async fn delete(&self, id: SessionId) -> StorageResult<()> {
        self.db
            .client()
            .query("DELETE chat_message WHERE session_id = $id")
            .query("DELETE context_summary WHERE session_id = $id")
            .query("DELETE session WHERE id = $rid")
            .bind(("id", id.to_string()))
            .bind(("rid", surrealdb::RecordId::from(("session", id.to_string()))))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .check()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Append a message to a session's transcript.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the write fails.
    pub async fn append_message(&self, record: &ChatMessageRecord) -> StorageResult<()> {
        self.db
            .client()
            .create::<Option<ChatMessageRecord>>(("chat_message", record.id.to_string()))
            .content(record.clone())
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Load a session's full transcript in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get_messages(&self, session_id: SessionId) -> StorageResult<Vec<ChatMessageRecord>> {
        let mut response = self
            .db
            .client()
            .query("SELECT * FROM chat_message WHERE session_id = $id ORDER BY created_at ASC")
            .bind(("id", session_id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        response
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// Delete the oldest `n` messages of a session (insertion order), used by
    /// the compressor after a summary has been saved to replace them.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read or delete fails.
    pub async fn delete_oldest_n(&self, session_id: SessionId, n: usize) -> StorageResult<()> {
        if n == 0 {
            return Ok(());
        }
        let mut response = self
            .db
            .client()
            .query(
                "SELECT id FROM chat_message WHERE session_id = $id \
                 ORDER BY created_at ASC LIMIT $n",
            )
            .bind(("id", session_id.to_string()))
            .bind(("n", n))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let rows: Vec<ChatMessageRecord> =
            response.take(0).map_err(|e| StorageError::Internal(e.to_string()))?;
        for row in rows {
            self.db
                .client()
                .delete::<Option<ChatMessageRecord>>(("chat_message", row.id.to_string()))
                .await
                .map_err(|e| StorageError::Internal(e.to_string()))?;
        }
        Ok(())
    }

    /// Delete every message in a session's transcript, keeping the session
    /// record itself (used when a user asks to start fresh without a new
    /// session id).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the delete fails.
    pub async fn clear_session_messages(&self, session_id: SessionId) -> StorageResult<()> {
        self.db
            .client()
            .query("DELETE chat_message WHERE session_id = $id")
            .bind(("id", session_id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .check()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Persist a new context summary for a session.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the write fails.
    pub async fn save_summary(&self, record: &ContextSummaryRecord) -> StorageResult<()> {
        self.db
            .client()
            .query("CREATE context_summary CONTENT $record")
            .bind(("record", record.clone()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .check()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Fetch the most recent context summary for a session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the read fails.
    pub async fn get_latest_summary(
        &self,
        session_id: SessionId,
    ) -> StorageResult<Option<ContextSummaryRecord>> {
        let mut response = self
            .db
            .client()
            .query(
                "SELECT * FROM context_summary WHERE session_id = $id \
                 ORDER BY created_at DESC LIMIT 1",
            )
            .bind(("id", session_id.to_string()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        let mut rows: Vec<ContextSummaryRecord> = response
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(rows.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlsage_core::{MessageId, MessageRole};

    async fn repo_with_session() -> (Database, SessionId) {
        let db = Database::connect_memory().await.unwrap();
        let id = SessionId::new();
        let record = SessionRecord {
            id,
            name: "test session".to_string(),
            connection_id: None,
            provider_id: None,
            is_current: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        SessionRepository::new(&db).upsert(&record).await.unwrap();
        (db, id)
    }

    fn message(session_id: SessionId, content: &str) -> ChatMessageRecord {
        ChatMessageRecord {
            id: MessageId::new(),
            session_id,
            role: MessageRole::User,
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn rename_updates_name_and_timestamp() {
        let (db, id) = repo_with_session().await;
        let repo = SessionRepository::new(&db);
        let before = repo.get(id).await.unwrap().unwrap();

        repo.rename(id, "renamed").await.unwrap();

        let after = repo.get(id).await.unwrap().unwrap();
        assert_eq!(after.name, "renamed");
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn delete_oldest_n_removes_earliest_messages_only() {
        let (db, id) = repo_with_session().await;
        let repo = SessionRepository::new(&db);
        for i in 0..5 {
            repo.append_message(&message(id, &format!("msg {i}")))
                .await
                .unwrap();
        }

        repo.delete_oldest_n(id, 2).await.unwrap();

        let remaining = repo.get_messages(id).await.unwrap();
        assert_eq!(remaining.len(), 3);
        assert_eq!(remaining[0].content.as_deref(), Some("msg 2"));
    }

    #[tokio::test]
    async fn clear_session_messages_empties_transcript_but_keeps_session() {
        let (db, id) = repo_with_session().await;
        let repo = SessionRepository::new(&db);
        repo.append_message(&message(id, "hello")).await.unwrap();

        repo.clear_session_messages(id).await.unwrap();

        assert!(repo.get_messages(id).await.unwrap().is_empty());
        assert!(repo.get(id).await.unwrap().is_some());
    }
}
