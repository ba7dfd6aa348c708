//! Migration tool dispatch (spec §4.9/§4.6 item (ii)), routing against the
//! Migration Handler in `sqlsage-migrate` rather than a single active
//! `DbAdapter` — a migration task always spans two connections, neither of
//! which is necessarily the agent's `db` field.
//!
//! `analyze_source_database`'s LLM-facing schema carries no `task_id` (spec
//! §4.6): it only makes sense once a task already exists, so this dispatcher
//! requires exactly one task to be open (the one most recently created and
//! not yet completed/failed) and persists the analysis onto it, the same way
//! `create_migration_plan` onward address a task by id.

use serde_json::Value;
use sqlsage_core::{ConnectionId, MigrationItemId, MigrationTaskId};
use sqlsage_db::DbAdapter;
use sqlsage_llm::ToolCall;
use sqlsage_migrate::handler::{
    self, AnalysisResult, BatchOutcome, ComparisonReport, MigrationReport,
};
use sqlsage_storage::records::{MigrationTaskRecord, MigrationTaskStatus};
use sqlsage_storage::MigrationRepository;

use crate::db_dispatch::connect_with_database_override;
use crate::dispatch::Dispatched;
use crate::error::{EngineError, EngineResult};
use crate::outcome::PauseReason;
use crate::state::{Agent, MigrationProgressEvent};

const MIGRATION_TOOL_NAMES: &[&str] = &[
    "analyze_source_database",
    "create_migration_plan",
    "get_migration_plan",
    "get_migration_status",
    "execute_migration_item",
    "execute_migration_batch",
    "compare_databases",
    "generate_migration_report",
    "skip_migration_item",
    "retry_failed_items",
    "request_migration_setup",
];

/// Whether `name` is one of this module's tools.
#[must_use]
pub(crate) fn is_migration_tool(name: &str) -> bool {
    MIGRATION_TOOL_NAMES.contains(&name)
}

fn str_arg<'a>(call: &'a ToolCall, key: &str) -> Option<&'a str> {
    call.arguments.get(key).and_then(Value::as_str)
}

fn u32_arg(call: &ToolCall, key: &str, default: u32) -> u32 {
    call.arguments
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

fn parse_task_id(raw: &str) -> Option<MigrationTaskId> {
    uuid::Uuid::parse_str(raw).ok().map(MigrationTaskId::from)
}

fn parse_item_id(raw: &str) -> Option<MigrationItemId> {
    uuid::Uuid::parse_str(raw).ok().map(MigrationItemId::from)
}

async fn connect(storage: &sqlsage_storage::Database, connection_id: ConnectionId) -> EngineResult<Box<dyn DbAdapter>> {
    connect_with_database_override(storage, connection_id, None).await
}

async fn require_task(
    agent: &Agent,
    task_id: MigrationTaskId,
) -> EngineResult<MigrationTaskRecord> {
    MigrationRepository::new(&agent.storage)
        .get_task(task_id)
        .await?
        .ok_or_else(|| EngineError::UnknownConnection(format!("migration task {task_id}")))
}

/// Find the single most-recently-created task that is not yet `Completed`
/// or `Failed`, for `analyze_source_database`'s task-less schema.
async fn current_open_task(agent: &Agent) -> EngineResult<Option<MigrationTaskRecord>> {
    let mut tasks = MigrationRepository::new(&agent.storage).list_tasks().await?;
    tasks.retain(|t| !matches!(t.status, MigrationTaskStatus::Completed | MigrationTaskStatus::Failed));
    Ok(tasks.into_iter().next())
}

fn notify(agent: &Agent, task: &MigrationTaskRecord, tool_name: &str) {
    agent.notify_migration_progress(MigrationProgressEvent {
        task_id: task.id,
        tool_name: tool_name.to_string(),
        total_items: task.total_items,
        completed_items: task.completed_items,
        failed_items: task.failed_items,
        skipped_items: task.skipped_items,
    });
}

/// Dispatch one migration tool call.
pub(crate) async fn dispatch(agent: &mut Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    match call.name.as_str() {
        "analyze_source_database" => dispatch_analyze_source_database(agent, call).await,
        "create_migration_plan" => dispatch_create_migration_plan(agent, call).await,
        "get_migration_plan" => dispatch_get_migration_plan(agent, call).await,
        "get_migration_status" => dispatch_get_migration_status(agent, call).await,
        "execute_migration_item" => dispatch_execute_migration_item(agent, call).await,
        "execute_migration_batch" => dispatch_execute_migration_batch(agent, call).await,
        "compare_databases" => dispatch_compare_databases(agent, call).await,
        "generate_migration_report" => dispatch_generate_migration_report(agent, call).await,
        "skip_migration_item" => dispatch_skip_migration_item(agent, call).await,
        "retry_failed_items" => dispatch_retry_failed_items(agent, call).await,
        "request_migration_setup" => Ok(dispatch_request_migration_setup(call)),
        other => Ok(Dispatched::error(call.id.clone(), format!("unknown migration tool: {other}"))),
    }
}

async fn dispatch_analyze_source_database(agent: &mut Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let Some(task) = current_open_task(agent).await? else {
        return Ok(Dispatched::error(
            call.id.clone(),
            "no migration task is open; call request_migration_setup first",
        ));
    };
    let source = connect(&agent.storage, task.source_connection_id).await?;
    let schema = str_arg(call, "schema").or(task.source_schema.as_deref());

    let analysis = match handler::analyze_source_database(source.as_ref(), schema).await {
        Ok(analysis) => analysis,
        Err(err) => return Ok(Dispatched::error(call.id.clone(), err.to_string())),
    };

    let mut updated = task.clone();
    updated.status = MigrationTaskStatus::Analyzing;
    updated.analysis_result = serde_json::to_value(&analysis).ok();
    updated.updated_at = chrono::Utc::now();
    MigrationRepository::new(&agent.storage).upsert_task(&updated).await?;
    notify(agent, &updated, &call.name);

    Ok(Dispatched::ok(
        call.id.clone(),
        serde_json::json!({
            "task_id": updated.id,
            "object_count": analysis.objects.len(),
            "foreign_key_edges": analysis.foreign_keys.edges.len(),
        }),
    ))
}

async fn dispatch_create_migration_plan(agent: &mut Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let Some(raw_task_id) = str_arg(call, "task_id") else {
        return Ok(Dispatched::error(call.id.clone(), "create_migration_plan requires \"task_id\""));
    };
    let Some(task_id) = parse_task_id(raw_task_id) else {
        return Ok(Dispatched::error(call.id.clone(), "malformed task_id"));
    };
    let mut task = require_task(agent, task_id).await?;
    if let Some(name) = str_arg(call, "name") {
        task.name = name.to_string();
    }
    let Some(analysis_json) = task.analysis_result.clone() else {
        return Ok(Dispatched::error(call.id.clone(), "call analyze_source_database before creating a plan"));
    };
    let analysis: AnalysisResult = match serde_json::from_value(analysis_json) {
        Ok(a) => a,
        Err(err) => return Ok(Dispatched::error(call.id.clone(), err.to_string())),
    };

    let source = connect(&agent.storage, task.source_connection_id).await?;
    let items = match handler::create_migration_plan(source.as_ref(), task_id, &analysis).await {
        Ok(items) => items,
        Err(err) => return Ok(Dispatched::error(call.id.clone(), err.to_string())),
    };

    let repo = MigrationRepository::new(&agent.storage);
    repo.insert_items(&items).await?;
    task.status = MigrationTaskStatus::Confirmed;
    task.total_items = u32::try_from(items.len()).unwrap_or(u32::MAX);
    task.updated_at = chrono::Utc::now();
    repo.upsert_task(&task).await?;
    notify(agent, &task, &call.name);

    Ok(Dispatched::ok(
        call.id.clone(),
        serde_json::json!({"task_id": task_id, "item_count": items.len()}),
    ))
}

async fn dispatch_get_migration_plan(agent: &Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let Some(task_id) = str_arg(call, "task_id").and_then(parse_task_id) else {
        return Ok(Dispatched::error(call.id.clone(), "get_migration_plan requires a valid \"task_id\""));
    };
    let items = MigrationRepository::new(&agent.storage).list_items(task_id).await?;
    Ok(Dispatched::ok(call.id.clone(), serde_json::json!({"items": items})))
}

async fn dispatch_get_migration_status(agent: &Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let Some(task_id) = str_arg(call, "task_id").and_then(parse_task_id) else {
        return Ok(Dispatched::error(call.id.clone(), "get_migration_status requires a valid \"task_id\""));
    };
    let task = require_task(agent, task_id).await?;
    Ok(Dispatched::ok(call.id.clone(), serde_json::to_value(&task).unwrap_or_default()))
}

async fn dispatch_execute_migration_item(agent: &mut Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let (Some(task_id), Some(item_id)) = (
        str_arg(call, "task_id").and_then(parse_task_id),
        str_arg(call, "item_id").and_then(parse_item_id),
    ) else {
        return Ok(Dispatched::error(call.id.clone(), "execute_migration_item requires valid \"task_id\" and \"item_id\""));
    };
    let task = require_task(agent, task_id).await?;
    let repo = MigrationRepository::new(&agent.storage);
    let Some(mut item) = repo.get_item(item_id).await? else {
        return Ok(Dispatched::error(call.id.clone(), "unknown migration item"));
    };

    let target = connect(&agent.storage, task.target_connection_id).await?;
    handler::execute_migration_item(&mut item, task.source_db_type, task.target_db_type, target.as_ref()).await;
    repo.upsert_item(&item).await?;

    let items = repo.list_items(task_id).await?;
    let mut updated_task = task.clone();
    handler::recompute_task_counters(&mut updated_task, &items);
    repo.upsert_task(&updated_task).await?;
    notify(agent, &updated_task, &call.name);

    Ok(Dispatched::ok(call.id.clone(), serde_json::to_value(&item).unwrap_or_default()))
}

async fn dispatch_execute_migration_batch(agent: &mut Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let Some(task_id) = str_arg(call, "task_id").and_then(parse_task_id) else {
        return Ok(Dispatched::error(call.id.clone(), "execute_migration_batch requires a valid \"task_id\""));
    };
    let n = u32_arg(call, "n", 10) as usize;
    let task = require_task(agent, task_id).await?;
    let repo = MigrationRepository::new(&agent.storage);
    let mut items = repo.list_items(task_id).await?;

    let target = connect(&agent.storage, task.target_connection_id).await?;
    let outcome: BatchOutcome =
        handler::execute_migration_batch(&mut items, n, task.source_db_type, task.target_db_type, target.as_ref()).await;
    for item in &items {
        repo.upsert_item(item).await?;
    }

    let mut updated_task = task.clone();
    handler::recompute_task_counters(&mut updated_task, &items);
    repo.upsert_task(&updated_task).await?;
    notify(agent, &updated_task, &call.name);

    Ok(Dispatched::ok(
        call.id.clone(),
        serde_json::json!({
            "attempted": outcome.attempted,
            "completed": outcome.completed,
            "failed": outcome.failed,
            "skipped": outcome.skipped,
        }),
    ))
}

async fn dispatch_compare_databases(agent: &Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let Some(task_id) = str_arg(call, "task_id").and_then(parse_task_id) else {
        return Ok(Dispatched::error(call.id.clone(), "compare_databases requires a valid \"task_id\""));
    };
    let task = require_task(agent, task_id).await?;
    let schema = str_arg(call, "schema").or(task.source_schema.as_deref());

    let source = connect(&agent.storage, task.source_connection_id).await?;
    let target = connect(&agent.storage, task.target_connection_id).await?;
    let report: ComparisonReport = match handler::compare_databases(source.as_ref(), target.as_ref(), schema).await {
        Ok(report) => report,
        Err(err) => return Ok(Dispatched::error(call.id.clone(), err.to_string())),
    };
    Ok(Dispatched::ok(call.id.clone(), serde_json::to_value(&report).unwrap_or_default()))
}

async fn dispatch_generate_migration_report(agent: &mut Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let Some(task_id) = str_arg(call, "task_id").and_then(parse_task_id) else {
        return Ok(Dispatched::error(call.id.clone(), "generate_migration_report requires a valid \"task_id\""));
    };
    let task = require_task(agent, task_id).await?;
    let repo = MigrationRepository::new(&agent.storage);
    let items = repo.list_items(task_id).await?;
    let report: MigrationReport = handler::generate_migration_report(&task, &items);

    // A report closes the task window (spec §4.9): ad-hoc execute_sql calls
    // stop running unattended from this point on.
    agent.set_auto_execute_migration(false);

    Ok(Dispatched::ok(call.id.clone(), serde_json::to_value(&report).unwrap_or_default()))
}

async fn dispatch_skip_migration_item(agent: &mut Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let (Some(task_id), Some(item_id)) = (
        str_arg(call, "task_id").and_then(parse_task_id),
        str_arg(call, "item_id").and_then(parse_item_id),
    ) else {
        return Ok(Dispatched::error(call.id.clone(), "skip_migration_item requires valid \"task_id\" and \"item_id\""));
    };
    let Some(reason) = str_arg(call, "reason") else {
        return Ok(Dispatched::error(call.id.clone(), "skip_migration_item requires \"reason\""));
    };
    let task = require_task(agent, task_id).await?;
    let repo = MigrationRepository::new(&agent.storage);
    let Some(mut item) = repo.get_item(item_id).await? else {
        return Ok(Dispatched::error(call.id.clone(), "unknown migration item"));
    };
    handler::skip_migration_item(&mut item, reason);
    repo.upsert_item(&item).await?;

    let items = repo.list_items(task_id).await?;
    let mut updated_task = task.clone();
    handler::recompute_task_counters(&mut updated_task, &items);
    repo.upsert_task(&updated_task).await?;
    notify(agent, &updated_task, &call.name);

    Ok(Dispatched::ok(call.id.clone(), serde_json::to_value(&item).unwrap_or_default()))
}

async fn dispatch_retry_failed_items(agent: &mut Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let Some(task_id) = str_arg(call, "task_id").and_then(parse_task_id) else {
        return Ok(Dispatched::error(call.id.clone(), "retry_failed_items requires a valid \"task_id\""));
    };
    let task = require_task(agent, task_id).await?;
    let repo = MigrationRepository::new(&agent.storage);
    let mut items = repo.list_items(task_id).await?;
    let reset = handler::retry_failed_items(&mut items);
    for item in &items {
        repo.upsert_item(item).await?;
    }

    let mut updated_task = task.clone();
    handler::recompute_task_counters(&mut updated_task, &items);
    repo.upsert_task(&updated_task).await?;
    notify(agent, &updated_task, &call.name);

    Ok(Dispatched::ok(call.id.clone(), serde_json::json!({"reset_count": reset})))
}

fn dispatch_request_migration_setup(call: &ToolCall) -> Dispatched {
    let missing_fields: Vec<String> = call
        .arguments
        .get("missing_fields")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    Dispatched::paused(
        call.id.clone(),
        "migration_setup_requested",
        serde_json::json!({"missing_fields": missing_fields}),
        PauseReason::MigrationSetup { missing_fields },
    )
}
