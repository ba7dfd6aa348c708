//! Database builtin tool dispatch (spec §4.3/§4.6 item (i), routed here by
//! `dispatch.rs`'s top-level classifier).
//!
//! Every builtin except `switch_database` maps straight onto a
//! [`sqlsage_db::DbAdapter`] method; `switch_database` is a connection-manager
//! operation the adapter itself has no concept of (spec §4.6's own note on
//! the tool). `execute_sql`, `create_index`, and `execute_safe_query` are the
//! three kinds that can pause a turn for confirmation (spec §4.10 "Dispatch",
//! §3's `PendingOperation` kinds).

use serde_json::Value;
use sqlsage_approval::{PendingOperation, PendingReason};
use sqlsage_core::ConnectionId;
use sqlsage_db::{ConnectionConfig, DbOutcome};
use sqlsage_llm::ToolCall;

use crate::dispatch::Dispatched;
use crate::error::{EngineError, EngineResult};
use crate::outcome::PauseReason;
use crate::state::Agent;

const DB_TOOL_NAMES: &[&str] = &[
    "list_tables",
    "describe_table",
    "get_sample_data",
    "list_databases",
    "switch_database",
    "execute_safe_query",
    "execute_sql",
    "run_explain",
    "create_index",
    "analyze_table",
    "check_index_usage",
    "get_table_stats",
    "get_running_queries",
    "identify_slow_queries",
];

/// Whether `name` is one of this module's builtins.
#[must_use]
pub(crate) fn is_db_tool(name: &str) -> bool {
    DB_TOOL_NAMES.contains(&name)
}

fn str_arg<'a>(call: &'a ToolCall, key: &str) -> Option<&'a str> {
    call.arguments.get(key).and_then(Value::as_str)
}

fn bool_arg(call: &ToolCall, key: &str, default: bool) -> bool {
    call.arguments.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn u32_arg(call: &ToolCall, key: &str, default: u32) -> u32 {
    call.arguments
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

fn f64_arg(call: &ToolCall, key: &str, default: f64) -> f64 {
    call.arguments.get(key).and_then(Value::as_f64).unwrap_or(default)
}

/// Fold a [`DbOutcome`] into a [`Dispatched`], queuing a [`PendingOperation`]
/// when the adapter asks for confirmation.
fn from_outcome(call: &ToolCall, outcome: DbOutcome) -> Dispatched {
    match outcome {
        DbOutcome::Success { data } => Dispatched::ok(call.id.clone(), data),
        DbOutcome::Error { error } => Dispatched::error(call.id.clone(), error),
        DbOutcome::PendingConfirmation { sql, operation } => {
            let op = PendingOperation::new(
                call.id.clone(),
                call.name.clone(),
                sql.clone(),
                PendingReason::Confirmation { operation: operation.clone() },
            );
            Dispatched::paused(
                call.id.clone(),
                "pending_confirmation",
                serde_json::json!({"sql": sql, "operation": operation}),
                PauseReason::Confirmation { operation: op },
            )
        }
        DbOutcome::PendingPerformanceConfirmation { sql, performance_check } => {
            let op = PendingOperation::new(
                call.id.clone(),
                "execute_safe_query_forced",
                sql.clone(),
                PendingReason::PerformanceConfirmation { performance_check: performance_check.clone() },
            );
            Dispatched::paused(
                call.id.clone(),
                "pending_performance_confirmation",
                serde_json::json!({"sql": sql, "performance_check": performance_check}),
                PauseReason::PerformanceConfirmation { operation: op },
            )
        }
    }
}

/// Dispatch one DB builtin tool call against the active connection.
pub(crate) async fn dispatch(agent: &mut Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    if call.name == "switch_database" {
        return dispatch_switch_database(agent, call).await;
    }
    if call.name == "create_index" {
        return Ok(dispatch_create_index(call));
    }

    let Some(db) = agent.db.as_deref() else {
        return Ok(Dispatched::error(call.id.clone(), "no active database connection"));
    };

    let dispatched = match call.name.as_str() {
        "list_tables" => from_outcome(call, db.list_tables(str_arg(call, "schema")).await),
        "describe_table" => {
            let Some(table) = str_arg(call, "table") else {
                return Ok(Dispatched::error(call.id.clone(), "describe_table requires \"table\""));
            };
            from_outcome(call, db.describe_table(table, str_arg(call, "schema")).await)
        }
        "get_sample_data" => {
            let Some(table) = str_arg(call, "table") else {
                return Ok(Dispatched::error(call.id.clone(), "get_sample_data requires \"table\""));
            };
            let limit = u32_arg(call, "limit", 10);
            from_outcome(call, db.get_sample_data(table, str_arg(call, "schema"), limit).await)
        }
        "list_databases" => from_outcome(call, db.list_databases().await),
        "execute_safe_query" => {
            let Some(sql) = str_arg(call, "sql") else {
                return Ok(Dispatched::error(call.id.clone(), "execute_safe_query requires \"sql\""));
            };
            let check = db.check_query_performance(sql).await;
            if check.should_confirm {
                let op = PendingOperation::new(
                    call.id.clone(),
                    "execute_safe_query_forced",
                    sql.to_string(),
                    PendingReason::PerformanceConfirmation { performance_check: check.clone() },
                );
                Dispatched::paused(
                    call.id.clone(),
                    "pending_performance_confirmation",
                    serde_json::json!({"sql": sql, "performance_check": check}),
                    PauseReason::PerformanceConfirmation { operation: op },
                )
            } else {
                from_outcome(call, db.execute_safe_query(sql).await)
            }
        }
        "execute_sql" => {
            let Some(sql) = str_arg(call, "sql") else {
                return Ok(Dispatched::error(call.id.clone(), "execute_sql requires \"sql\""));
            };
            let confirmed = bool_arg(call, "confirmed", false) || agent.auto_execute_migration;
            from_outcome(call, db.execute_sql(sql, confirmed).await)
        }
        "run_explain" => {
            let Some(sql) = str_arg(call, "sql") else {
                return Ok(Dispatched::error(call.id.clone(), "run_explain requires \"sql\""));
            };
            from_outcome(call, db.run_explain(sql, bool_arg(call, "analyze", false)).await)
        }
        "analyze_table" => {
            let Some(table) = str_arg(call, "table") else {
                return Ok(Dispatched::error(call.id.clone(), "analyze_table requires \"table\""));
            };
            from_outcome(call, db.analyze_table(table, str_arg(call, "schema")).await)
        }
        "check_index_usage" => {
            let Some(table) = str_arg(call, "table") else {
                return Ok(Dispatched::error(call.id.clone(), "check_index_usage requires \"table\""));
            };
            from_outcome(call, db.check_index_usage(table, str_arg(call, "schema")).await)
        }
        "get_table_stats" => {
            let Some(table) = str_arg(call, "table") else {
                return Ok(Dispatched::error(call.id.clone(), "get_table_stats requires \"table\""));
            };
            from_outcome(call, db.get_table_stats(table, str_arg(call, "schema")).await)
        }
        "get_running_queries" => from_outcome(call, db.get_running_queries().await),
        "identify_slow_queries" => {
            let min_ms = f64_arg(call, "min_ms", 1000.0);
            let limit = u32_arg(call, "limit", 20);
            from_outcome(call, db.identify_slow_queries(min_ms, limit).await)
        }
        other => Dispatched::error(call.id.clone(), format!("unknown db tool: {other}")),
    };
    Ok(dispatched)
}

/// `create_index` always pends: the tool schema carries no `confirmed` flag
/// (spec §4.6), and DDL is a mutation like any other. The adapter call itself
/// happens later, from `confirm_operation`.
fn dispatch_create_index(call: &ToolCall) -> Dispatched {
    let Some(sql) = str_arg(call, "sql") else {
        return Dispatched::error(call.id.clone(), "create_index requires \"sql\"");
    };
    let concurrent = bool_arg(call, "concurrent", false);
    let op = PendingOperation::new(
        call.id.clone(),
        "create_index",
        sql.to_string(),
        PendingReason::Confirmation { operation: "CREATE INDEX".to_string() },
    )
    .with_concurrent(concurrent);
    Dispatched::paused(
        call.id.clone(),
        "pending_confirmation",
        serde_json::json!({"sql": sql, "operation": "CREATE INDEX"}),
        PauseReason::Confirmation { operation: op },
    )
}

async fn dispatch_switch_database(agent: &mut Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let Some(database) = str_arg(call, "database") else {
        return Ok(Dispatched::error(call.id.clone(), "switch_database requires \"database\""));
    };
    let Some(connection_id) = agent.connection_id else {
        return Ok(Dispatched::error(call.id.clone(), "no active database connection"));
    };

    let adapter = connect_with_database_override(&agent.storage, connection_id, Some(database)).await?;
    agent.set_connection(adapter, connection_id);
    Ok(Dispatched::ok(call.id.clone(), serde_json::json!({"database": database})))
}

/// Look up a stored connection profile, decrypt its password, and connect a
/// fresh adapter, optionally overriding the target database/schema name.
/// Shared by `switch_database` and the migration dispatcher, which both need
/// an adapter for a connection id that is not necessarily `agent.db`.
pub(crate) async fn connect_with_database_override(
    storage: &sqlsage_storage::Database,
    connection_id: ConnectionId,
    database_override: Option<&str>,
) -> EngineResult<Box<dyn sqlsage_db::DbAdapter>> {
    let connections = sqlsage_storage::ConnectionRepository::new(storage);
    let Some(record) = connections.get(connection_id).await? else {
        return Err(EngineError::UnknownConnection(connection_id.to_string()));
    };
    let config = ConnectionConfig {
        host: record.host.clone(),
        port: record.port,
        database: database_override.map_or_else(|| record.database.clone(), str::to_string),
        username: record.username.clone(),
        password: sqlsage_crypto::decrypt(&record.password_encrypted),
    };
    Ok(sqlsage_db::connect(record.db_type, &config).await?)
}

/// Re-submit a pending DB operation after confirmation (spec §4.10
/// "Confirmation"): calls the adapter directly, bypassing the gate that
/// queued it in the first place.
pub(crate) async fn confirm(agent: &mut Agent, op: &PendingOperation) -> EngineResult<DbOutcome> {
    let Some(db) = agent.db.as_deref() else {
        return Err(EngineError::NoActiveConnection);
    };
    let outcome = match op.tool_name.as_str() {
        "execute_sql" => db.execute_sql(&op.sql, true).await,
        "create_index" => db.create_index(&op.sql, op.concurrent).await,
        "execute_safe_query_forced" => db.execute_safe_query(&op.sql).await,
        other => DbOutcome::Error { error: format!("unknown pending operation kind: {other}") },
    };
    Ok(outcome)
}
