//! Migration Handler orchestration (spec §4.9, component C9).

use std::collections::HashMap;

use chrono::Utc;
use sqlsage_core::{EngineKind, MigrationItemId, MigrationTaskId};
use sqlsage_db::{DbAdapter, DbObject, DbOutcome, ForeignKeyDependencies};
use sqlsage_storage::records::{
    MigrationItemRecord, MigrationItemStatus, MigrationObjectType, MigrationTaskRecord,
    MigrationTaskStatus,
};

use crate::convert::convert_ddl;
use crate::error::{MigrateError, MigrateResult};
use crate::ordering::order_tables_for_migration;

/// Everything `analyze_source_database` gathers about the source schema.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisResult {
    /// Every object discovered in the target schema.
    pub objects: Vec<DbObject>,
    /// FK edges and the resulting cycle-tolerant table order.
    pub foreign_keys: ForeignKeyDependencies,
    /// Object-level (non-FK) dependency metadata, as the adapter returned it.
    pub object_dependencies: serde_json::Value,
}

/// Enumerate the source schema: objects, FK edges, and object dependencies
/// (spec §4.9 "Enumerate").
///
/// # Errors
///
/// Returns [`MigrateError::Adapter`] if any of the three adapter calls
/// resolves to `DbOutcome::Error`.
pub async fn analyze_source_database(
    source: &dyn DbAdapter,
    schema: Option<&str>,
) -> MigrateResult<AnalysisResult> {
    let objects = match source.get_all_objects(schema, None).await {
        DbOutcome::Success { data } => {
            serde_json::from_value::<Vec<DbObject>>(data.get("objects").cloned().unwrap_or(data))
                .map_err(|e| MigrateError::UnexpectedOutcome(e.to_string()))?
        }
        DbOutcome::Error { error } => return Err(MigrateError::Adapter(error)),
        other => return Err(MigrateError::UnexpectedOutcome(format!("{other:?}"))),
    };

    let foreign_keys = match source.get_foreign_key_dependencies(schema).await {
        DbOutcome::Success { data } => serde_json::from_value::<ForeignKeyDependencies>(data)
            .map_err(|e| MigrateError::UnexpectedOutcome(e.to_string()))?,
        DbOutcome::Error { error } => return Err(MigrateError::Adapter(error)),
        other => return Err(MigrateError::UnexpectedOutcome(format!("{other:?}"))),
    };

    let object_dependencies = match source.get_object_dependencies(schema).await {
        DbOutcome::Success { data } => data,
        DbOutcome::Error { error } => return Err(MigrateError::Adapter(error)),
        other => return Err(MigrateError::UnexpectedOutcome(format!("{other:?}"))),
    };

    Ok(AnalysisResult {
        objects,
        foreign_keys,
        object_dependencies,
    })
}

async fn fetch_object_names(
    adapter: &dyn DbAdapter,
    schema: Option<&str>,
) -> MigrateResult<Vec<DbObject>> {
    match adapter.get_all_objects(schema, None).await {
        DbOutcome::Success { data } => {
            serde_json::from_value::<Vec<DbObject>>(data.get("objects").cloned().unwrap_or(data))
                .map_err(|e| MigrateError::UnexpectedOutcome(e.to_string()))
        }
        DbOutcome::Error { error } => Err(MigrateError::Adapter(error)),
        other => Err(MigrateError::UnexpectedOutcome(format!("{other:?}"))),
    }
}

/// One object present on only one side of a [`ComparisonReport`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct ObjectDiff {
    /// The object's kind, as the adapter reported it (`"table"`, `"view"`, ...).
    pub object_type: String,
    /// Object name.
    pub name: String,
    /// Schema the object lives in, if applicable.
    pub schema: Option<String>,
}

/// Schema drift between a source and target connection, independent of any
/// migration task (spec §4.9's `compare_databases` tool).
#[derive(Debug, Clone, serde::Serialize, Default)]
pub struct ComparisonReport {
    /// Objects present on the source but not the target.
    pub source_only: Vec<ObjectDiff>,
    /// Objects present on the target but not the source.
    pub target_only: Vec<ObjectDiff>,
    /// Count of objects present on both sides (by type + name).
    pub common_count: usize,
}

/// Enumerate both connections' objects and diff them by `(object_type,
/// name)`, independent of any migration task's stored plan.
///
/// # Errors
///
/// Returns [`MigrateError::Adapter`] if either adapter's enumeration fails.
pub async fn compare_databases(
    source: &dyn DbAdapter,
    target: &dyn DbAdapter,
    schema: Option<&str>,
) -> MigrateResult<ComparisonReport> {
    let source_objects = fetch_object_names(source, schema).await?;
    let target_objects = fetch_object_names(target, schema).await?;

    let key = |o: &DbObject| (o.object_type.clone(), o.name.clone());
    let target_keys: std::collections::HashSet<_> = target_objects.iter().map(key).collect();
    let source_keys: std::collections::HashSet<_> = source_objects.iter().map(key).collect();

    let source_only = source_objects
        .iter()
        .filter(|o| !target_keys.contains(&key(o)))
        .map(|o| ObjectDiff {
            object_type: o.object_type.clone(),
            name: o.name.clone(),
            schema: o.schema.clone(),
        })
        .collect();
    let target_only = target_objects
        .iter()
        .filter(|o| !source_keys.contains(&key(o)))
        .map(|o| ObjectDiff {
            object_type: o.object_type.clone(),
            name: o.name.clone(),
            schema: o.schema.clone(),
        })
        .collect();
    let common_count = source_keys.intersection(&target_keys).count();

    Ok(ComparisonReport {
        source_only,
        target_only,
        common_count,
    })
}

fn object_type_of(kind: &str) -> Option<MigrationObjectType> {
    match kind {
        "sequence" => Some(MigrationObjectType::Sequence),
        "table" => Some(MigrationObjectType::Table),
        "index" => Some(MigrationObjectType::Index),
        "view" => Some(MigrationObjectType::View),
        "function" => Some(MigrationObjectType::Function),
        "procedure" => Some(MigrationObjectType::Procedure),
        "trigger" => Some(MigrationObjectType::Trigger),
        _ => None,
    }
}

/// Build the ordered list of migration items for `task_id` from an
/// [`AnalysisResult`], fetching each object's source DDL from `source`
/// along the way (spec §4.9 "Plan").
///
/// Execution order is assigned densely, independent of anything the LLM
/// chose, across seven phases: sequences, tables (FK-topological), indexes,
/// views, functions, procedures, triggers.
///
/// # Errors
///
/// Never returns `Err` for a single object's DDL fetch failing — that
/// object's item is created with `status = Failed` instead, so one bad
/// object does not abort planning the rest of the schema.
pub async fn create_migration_plan(
    source: &dyn DbAdapter,
    task_id: MigrationTaskId,
    analysis: &AnalysisResult,
) -> MigrateResult<Vec<MigrationItemRecord>> {
    let mut by_type: HashMap<MigrationObjectType, Vec<&DbObject>> = HashMap::new();
    for obj in &analysis.objects {
        if let Some(kind) = object_type_of(&obj.object_type) {
            by_type.entry(kind).or_default().push(obj);
        }
    }

    let table_names: Vec<String> = by_type
        .get(&MigrationObjectType::Table)
        .into_iter()
        .flatten()
        .map(|o| o.name.clone())
        .collect();
    let ordered_tables = order_tables_for_migration(&table_names, &analysis.foreign_keys.edges);

    let mut ordered_objects: Vec<(MigrationObjectType, DbObject)> = Vec::new();

    for kind in [MigrationObjectType::Sequence] {
        for obj in by_type.get(&kind).into_iter().flatten() {
            ordered_objects.push((kind, (*obj).clone()));
        }
    }
    if let Some(tables) = by_type.get(&MigrationObjectType::Table) {
        let by_name: HashMap<&str, &DbObject> =
            tables.iter().map(|o| (o.name.as_str(), *o)).collect();
        for name in &ordered_tables {
            if let Some(obj) = by_name.get(name.as_str()) {
                ordered_objects.push((MigrationObjectType::Table, (*obj).clone()));
            }
        }
    }
    for kind in [
        MigrationObjectType::Index,
        MigrationObjectType::View,
        MigrationObjectType::Function,
        MigrationObjectType::Procedure,
        MigrationObjectType::Trigger,
    ] {
        for obj in by_type.get(&kind).into_iter().flatten() {
            ordered_objects.push((kind, (*obj).clone()));
        }
    }

    let mut items = Vec::with_capacity(ordered_objects.len());
    for (order, (object_type, obj)) in ordered_objects.into_iter().enumerate() {
        let type_str = match object_type {
            MigrationObjectType::Sequence => "sequence",
            MigrationObjectType::Table => "table",
            MigrationObjectType::Index => "index",
            MigrationObjectType::View => "view",
            MigrationObjectType::Function => "function",
            MigrationObjectType::Procedure => "procedure",
            MigrationObjectType::Trigger => "trigger",
        };

        let depends_on = match object_type {
            MigrationObjectType::Table => analysis
                .foreign_keys
                .edges
                .iter()
                .filter(|(referencing, _)| *referencing == obj.name)
                .map(|(_, referenced)| referenced.clone())
                .collect(),
            MigrationObjectType::Index | MigrationObjectType::Trigger => {
                obj.table_name.clone().into_iter().collect()
            }
            _ => Vec::new(),
        };

        let now = Utc::now();
        let (source_ddl, status, error_message) =
            match source.get_object_ddl(type_str, &obj.name, obj.schema.as_deref()).await {
                DbOutcome::Success { data } => {
                    let ddl = data
                        .get("ddl")
                        .and_then(|v| v.as_str())
                        .map(str::to_string);
                    (ddl, MigrationItemStatus::Pending, None)
                }
                DbOutcome::Error { error } => (None, MigrationItemStatus::Failed, Some(error)),
                other => (
                    None,
                    MigrationItemStatus::Failed,
                    Some(format!("unexpected outcome fetching DDL: {other:?}")),
                ),
            };

        items.push(MigrationItemRecord {
            id: MigrationItemId::new(),
            task_id,
            object_type,
            object_name: obj.name.clone(),
            schema_name: obj.schema.clone(),
            execution_order: u32::try_from(order).unwrap_or(u32::MAX),
            depends_on,
            status,
            source_ddl,
            target_ddl: None,
            conversion_notes: Vec::new(),
            execution_result: None,
            error_message,
            retry_count: 0,
            executed_at: None,
            created_at: now,
            updated_at: now,
        });
    }

    Ok(items)
}

/// Convert (if not already converted) and execute one migration item against
/// `target`, per spec §4.9 "Execute": always `confirmed = true` — the
/// confirm-or-auto decision for migration item execution itself was already
/// made by entering this function; it is the *other*, ad-hoc `execute_sql`
/// calls during the task window that `auto_execute_migration` governs.
pub async fn execute_migration_item(
    item: &mut MigrationItemRecord,
    source_kind: EngineKind,
    target_kind: EngineKind,
    target: &dyn DbAdapter,
) {
    item.status = MigrationItemStatus::Executing;
    item.updated_at = Utc::now();

    let Some(source_ddl) = item.source_ddl.clone() else {
        item.status = MigrationItemStatus::Failed;
        item.error_message = Some("no source DDL captured during planning".to_string());
        item.updated_at = Utc::now();
        return;
    };

    if item.target_ddl.is_none() {
        let outcome = convert_ddl(source_kind, target_kind, item.object_type, &source_ddl);
        if let Some(reason) = outcome.skip_reason {
            item.status = MigrationItemStatus::Skipped;
            item.conversion_notes.push(reason);
            item.updated_at = Utc::now();
            return;
        }
        item.target_ddl = outcome.ddl;
        item.conversion_notes.extend(outcome.notes);
    }

    let Some(ddl) = item.target_ddl.clone() else {
        item.status = MigrationItemStatus::Failed;
        item.error_message = Some("conversion produced no DDL".to_string());
        item.updated_at = Utc::now();
        return;
    };

    match target.execute_sql(&ddl, true).await {
        DbOutcome::Success { data } => {
            item.status = MigrationItemStatus::Completed;
            item.execution_result = Some(data);
            item.executed_at = Some(Utc::now());
        }
        DbOutcome::Error { error } => {
            item.status = MigrationItemStatus::Failed;
            item.error_message = Some(error);
        }
        other => {
            item.status = MigrationItemStatus::Failed;
            item.error_message = Some(format!("unexpected adapter outcome: {other:?}"));
        }
    }
    item.updated_at = Utc::now();
}

/// Outcome counters for one `execute_migration_batch` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOutcome {
    /// Items attempted this batch.
    pub attempted: u32,
    /// Items that reached `Completed`.
    pub completed: u32,
    /// Items that reached `Failed`.
    pub failed: u32,
    /// Items that reached `Skipped`.
    pub skipped: u32,
}

/// Drain up to `n` pending items (in execution order) for one task,
/// executing each against `target` (spec §4.9 "`execute_migration_batch`").
pub async fn execute_migration_batch(
    items: &mut [MigrationItemRecord],
    n: usize,
    source_kind: EngineKind,
    target_kind: EngineKind,
    target: &dyn DbAdapter,
) -> BatchOutcome {
    let mut pending_indices: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.status == MigrationItemStatus::Pending)
        .map(|(i, _)| i)
        .collect();
    pending_indices.sort_by_key(|&i| items[i].execution_order);
    pending_indices.truncate(n);

    let mut outcome = BatchOutcome::default();
    for idx in pending_indices {
        execute_migration_item(&mut items[idx], source_kind, target_kind, target).await;
        outcome.attempted += 1;
        match items[idx].status {
            MigrationItemStatus::Completed => outcome.completed += 1,
            MigrationItemStatus::Failed => outcome.failed += 1,
            MigrationItemStatus::Skipped => outcome.skipped += 1,
            MigrationItemStatus::Pending | MigrationItemStatus::Executing => {}
        }
    }
    outcome
}

/// Reset every `Failed` item in `items` back to `Pending`, incrementing its
/// retry count. Per spec §9's open-question resolution, this intentionally
/// does **not** decrement the task's `completed_items` counter — counters
/// are non-monotonic across retries, only `failed_items` goes back down
/// when [`recompute_task_counters`] is next called.
///
/// Returns the number of items reset.
pub fn retry_failed_items(items: &mut [MigrationItemRecord]) -> usize {
    let mut reset = 0;
    for item in items.iter_mut() {
        if item.status == MigrationItemStatus::Failed {
            item.status = MigrationItemStatus::Pending;
            item.retry_count += 1;
            item.error_message = None;
            item.updated_at = Utc::now();
            reset += 1;
        }
    }
    reset
}

/// Explicitly skip one item with a human-provided reason.
pub fn skip_migration_item(item: &mut MigrationItemRecord, reason: impl Into<String>) {
    item.status = MigrationItemStatus::Skipped;
    item.conversion_notes.push(reason.into());
    item.updated_at = Utc::now();
}

/// Recompute `task`'s counters and status from its current items.
///
/// Per spec §9's resolution of the legacy ambiguity: a task is `Completed`
/// only when no item remains `Pending`/`Executing` **and** `failed == 0`;
/// otherwise, once nothing is left pending, it is `Failed`. A task with
/// items still pending stays `Executing`.
pub fn recompute_task_counters(task: &mut MigrationTaskRecord, items: &[MigrationItemRecord]) {
    let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
    let completed = count_status(items, MigrationItemStatus::Completed);
    let failed = count_status(items, MigrationItemStatus::Failed);
    let skipped = count_status(items, MigrationItemStatus::Skipped);
    let still_open = items.iter().any(|i| {
        matches!(
            i.status,
            MigrationItemStatus::Pending | MigrationItemStatus::Executing
        )
    });

    task.total_items = total;
    task.completed_items = completed;
    task.failed_items = failed;
    task.skipped_items = skipped;
    task.updated_at = Utc::now();

    if still_open {
        task.status = MigrationTaskStatus::Executing;
    } else {
        task.status = if failed == 0 {
            MigrationTaskStatus::Completed
        } else {
            MigrationTaskStatus::Failed
        };
        task.completed_at = Some(Utc::now());
    }
}

fn count_status(items: &[MigrationItemRecord], status: MigrationItemStatus) -> u32 {
    u32::try_from(items.iter().filter(|i| i.status == status).count()).unwrap_or(u32::MAX)
}

/// One row of a [`MigrationReport`]'s per-object-type breakdown.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ObjectTypeBreakdown {
    /// The object type this row summarizes.
    pub object_type: MigrationObjectType,
    /// Total items of this type.
    pub total: u32,
    /// Completed items of this type.
    pub completed: u32,
    /// Failed items of this type.
    pub failed: u32,
    /// Skipped items of this type.
    pub skipped: u32,
}

/// Snapshot of one item, for a report's failed/skipped lists.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ItemSummary {
    /// The item's id.
    pub id: MigrationItemId,
    /// Object name.
    pub object_name: String,
    /// Object type.
    pub object_type: MigrationObjectType,
    /// Why it failed or was skipped, if recorded.
    pub reason: Option<String>,
}

/// A full migration report (spec §4.9 "`generate_migration_report`").
///
/// Generating a report is also the point at which the caller (the
/// Conversation Engine) resets `auto_execute_migration` back to `false` —
/// the flag's scope is the task window, and a report marks the window
/// closed (spec §4.9).
#[derive(Debug, Clone, serde::Serialize)]
pub struct MigrationReport {
    /// Overall task status at report time.
    pub status: MigrationTaskStatus,
    /// Total items.
    pub total: u32,
    /// Completed items.
    pub completed: u32,
    /// Failed items.
    pub failed: u32,
    /// Skipped items.
    pub skipped: u32,
    /// Per-object-type breakdown.
    pub by_object_type: Vec<ObjectTypeBreakdown>,
    /// Every item that ended `Failed`.
    pub failed_items: Vec<ItemSummary>,
    /// Every item that ended `Skipped`.
    pub skipped_items: Vec<ItemSummary>,
}

/// Build a [`MigrationReport`] snapshot from a task and its items.
#[must_use]
pub fn generate_migration_report(
    task: &MigrationTaskRecord,
    items: &[MigrationItemRecord],
) -> MigrationReport {
    let mut by_type: HashMap<MigrationObjectType, ObjectTypeBreakdown> = HashMap::new();
    for item in items {
        let entry = by_type
            .entry(item.object_type)
            .or_insert_with(|| ObjectTypeBreakdown {
                object_type: item.object_type,
                total: 0,
                completed: 0,
                failed: 0,
                skipped: 0,
            });
        entry.total += 1;
        match item.status {
            MigrationItemStatus::Completed => entry.completed += 1,
            MigrationItemStatus::Failed => entry.failed += 1,
            MigrationItemStatus::Skipped => entry.skipped += 1,
            MigrationItemStatus::Pending | MigrationItemStatus::Executing => {}
        }
    }
    let mut by_object_type: Vec<ObjectTypeBreakdown> = by_type.into_values().collect();
    by_object_type.sort_by_key(|b| format!("{:?}", b.object_type));

    let failed_items = items
        .iter()
        .filter(|i| i.status == MigrationItemStatus::Failed)
        .map(|i| ItemSummary {
            id: i.id,
            object_name: i.object_name.clone(),
            object_type: i.object_type,
            reason: i.error_message.clone(),
        })
        .collect();
    let skipped_items = items
        .iter()
        .filter(|i| i.status == MigrationItemStatus::Skipped)
        .map(|i| ItemSummary {
            id: i.id,
            object_name: i.object_name.clone(),
            object_type: i.object_type,
            reason: i.conversion_notes.last().cloned(),
        })
        .collect();

    MigrationReport {
        status: task.status,
        total: task.total_items,
        completed: task.completed_items,
        failed: task.failed_items,
        skipped: task.skipped_items,
        by_object_type,
        failed_items,
        skipped_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_task() -> MigrationTaskRecord {
        MigrationTaskRecord {
            id: MigrationTaskId::new(),
            name: "t".to_string(),
            source_connection_id: sqlsage_core::ConnectionId::new(),
            target_connection_id: sqlsage_core::ConnectionId::new(),
            source_db_type: EngineKind::MySql,
            target_db_type: EngineKind::PostgreSql,
            status: MigrationTaskStatus::Executing,
            total_items: 0,
            completed_items: 0,
            failed_items: 0,
            skipped_items: 0,
            source_schema: None,
            target_schema: None,
            options: None,
            analysis_result: None,
            error_message: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn blank_item(task_id: MigrationTaskId, status: MigrationItemStatus) -> MigrationItemRecord {
        MigrationItemRecord {
            id: MigrationItemId::new(),
            task_id,
            object_type: MigrationObjectType::Table,
            object_name: "t".to_string(),
            schema_name: None,
            execution_order: 0,
            depends_on: Vec::new(),
            status,
            source_ddl: Some("CREATE TABLE t (id INT)".to_string()),
            target_ddl: None,
            conversion_notes: Vec::new(),
            execution_result: None,
            error_message: None,
            retry_count: 0,
            executed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn completion_strictly_requires_zero_failures() {
        let mut task = blank_task();
        let items = vec![
            blank_item(task.id, MigrationItemStatus::Completed),
            blank_item(task.id, MigrationItemStatus::Failed),
        ];
        recompute_task_counters(&mut task, &items);
        assert_eq!(task.status, MigrationTaskStatus::Failed);

        let mut task2 = blank_task();
        let items2 = vec![blank_item(task2.id, MigrationItemStatus::Completed)];
        recompute_task_counters(&mut task2, &items2);
        assert_eq!(task2.status, MigrationTaskStatus::Completed);
    }

    #[test]
    fn retry_resets_failed_without_touching_completed() {
        let mut items = vec![
            blank_item(MigrationTaskId::new(), MigrationItemStatus::Completed),
            blank_item(MigrationTaskId::new(), MigrationItemStatus::Failed),
        ];
        let reset = retry_failed_items(&mut items);
        assert_eq!(reset, 1);
        assert_eq!(items[1].status, MigrationItemStatus::Pending);
        assert_eq!(items[1].retry_count, 1);
        assert_eq!(items[0].status, MigrationItemStatus::Completed);
    }
}
