//! Out-of-band migration task creation.
//!
//! `create_migration_plan`'s LLM-facing schema only takes a `task_id` (plus
//! an optional display name) — it has no way to tell the engine which two
//! connections a brand-new task should bridge. A task therefore has to
//! exist *before* the model can reference it: the front-end collects
//! source/target connection and schema choices (typically after the model
//! raised `request_migration_setup`) and calls this directly, the same way
//! it calls [`crate::Agent::confirm_operation`] outside the LLM tool loop.

use sqlsage_core::{ConnectionId, MigrationTaskId};
use sqlsage_storage::records::{MigrationTaskRecord, MigrationTaskStatus};
use sqlsage_storage::{ConnectionRepository, MigrationRepository};

use crate::error::{EngineError, EngineResult};
use crate::state::Agent;

impl Agent {
    /// Create and persist a new migration task, resolving both connections'
    /// engine kinds from their stored profiles.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownConnection`] if either connection id
    /// does not exist, or [`EngineError::Storage`] if persistence fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_migration_task(
        &mut self,
        name: impl Into<String>,
        source_connection_id: ConnectionId,
        target_connection_id: ConnectionId,
        source_schema: Option<String>,
        target_schema: Option<String>,
        auto_execute: bool,
    ) -> EngineResult<MigrationTaskId> {
        let connections = ConnectionRepository::new(&self.storage);
        let source = connections
            .get(source_connection_id)
            .await?
            .ok_or_else(|| EngineError::UnknownConnection(source_connection_id.to_string()))?;
        let target = connections
            .get(target_connection_id)
            .await?
            .ok_or_else(|| EngineError::UnknownConnection(target_connection_id.to_string()))?;

        let task_id = MigrationTaskId::new();
        let now = chrono::Utc::now();
        let task = MigrationTaskRecord {
            id: task_id,
            name: name.into(),
            source_connection_id,
            target_connection_id,
            source_db_type: source.db_type,
            target_db_type: target.db_type,
            status: MigrationTaskStatus::Pending,
            total_items: 0,
            completed_items: 0,
            failed_items: 0,
            skipped_items: 0,
            source_schema,
            target_schema,
            options: None,
            analysis_result: None,
            error_message: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        MigrationRepository::new(&self.storage).upsert_task(&task).await?;
        self.set_auto_execute_migration(auto_execute);
        Ok(task_id)
    }
}
