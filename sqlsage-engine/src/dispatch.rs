//! Top-level tool-call dispatch (spec §4.10 "Dispatch").
//!
//! Classifies a [`ToolCall`]'s name and routes it to the right handler.
//! Every route returns a [`ToolCallResult`] — even a pending-confirmation
//! or form-input request, whose `content` carries the pending status as
//! JSON — plus an optional [`PauseReason`] the turn loop uses to decide
//! whether to stop and hand control back to the caller (spec §4.10 step
//! f.iv lists exactly three statuses that pause: `pending_confirmation`,
//! `pending_performance_confirmation`, `form_input_requested`).

use std::time::Instant;

use serde_json::Value;
use sqlsage_audit::AuditResultStatus;
use sqlsage_llm::{ToolCall, ToolCallResult};

use crate::db_dispatch;
use crate::error::EngineResult;
use crate::migration_dispatch;
use crate::outcome::PauseReason;
use crate::state::Agent;

/// One dispatched tool call's result, plus whether it should pause the turn.
pub(crate) struct Dispatched {
    pub(crate) result: ToolCallResult,
    pub(crate) pause: Option<PauseReason>,
}

impl Dispatched {
    pub(crate) fn ok(call_id: impl Into<String>, data: Value) -> Self {
        Self {
            result: ToolCallResult::success(call_id, data.to_string()),
            pause: None,
        }
    }

    pub(crate) fn error(call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            result: ToolCallResult::error(call_id, message.into()),
            pause: None,
        }
    }

    pub(crate) fn paused(call_id: impl Into<String>, status: &str, data: Value, reason: PauseReason) -> Self {
        let mut body = data;
        if let Value::Object(map) = &mut body {
            map.insert("status".to_string(), Value::String(status.to_string()));
        }
        Self {
            result: ToolCallResult::success(call_id, body.to_string()),
            pause: Some(reason),
        }
    }
}

/// Dispatch one tool call and audit the outcome (spec §4.10: "Errors are
/// audited before being returned"; SQL-executing tools get a SQL audit
/// record with timing, everything else gets a tool-call audit record).
pub(crate) async fn dispatch_tool_call(agent: &mut Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let started = Instant::now();
    let is_sql_tool = matches!(call.name.as_str(), "execute_sql" | "execute_safe_query" | "run_explain");

    let dispatched = if sqlsage_tools::is_external_tool(&call.name) {
        dispatch_external(agent, call).await?
    } else if sqlsage_tools::is_skill_tool(&call.name) {
        dispatch_skill(agent, call).await?
    } else if db_dispatch::is_db_tool(&call.name) {
        db_dispatch::dispatch(agent, call).await?
    } else if migration_dispatch::is_migration_tool(&call.name) {
        migration_dispatch::dispatch(agent, call).await?
    } else if call.name == "request_user_input" {
        dispatch_request_user_input(call)
    } else {
        Dispatched::error(call.id.clone(), format!("unknown tool: {}", call.name))
    };

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    audit_dispatch(agent, call, &dispatched, is_sql_tool, elapsed_ms).await;
    Ok(dispatched)
}

async fn audit_dispatch(agent: &Agent, call: &ToolCall, dispatched: &Dispatched, is_sql_tool: bool, elapsed_ms: u64) {
    let session_id = Some(agent.session_id);
    let connection_id = agent.connection_id;
    let status = if dispatched.result.is_error {
        AuditResultStatus::Error
    } else if dispatched.pause.is_some() {
        AuditResultStatus::Pending
    } else {
        AuditResultStatus::Success
    };

    let outcome = if is_sql_tool {
        let sql = call
            .arguments
            .get("sql")
            .and_then(Value::as_str)
            .unwrap_or_default();
        agent
            .audit
            .log_sql_execution(
                session_id,
                connection_id,
                sql,
                &call.name,
                status,
                None,
                if dispatched.result.is_error { Some(dispatched.result.content.as_str()) } else { None },
                Some(elapsed_ms),
                call.arguments.get("confirmed").and_then(Value::as_bool).unwrap_or(false),
            )
            .await
    } else {
        agent
            .audit
            .log_tool_call(
                session_id,
                connection_id,
                &call.name,
                call.arguments.clone(),
                status,
                Some(dispatched.result.content.as_str()),
                Some(elapsed_ms),
            )
            .await
    };
    if let Err(err) = outcome {
        tracing::warn!(error = %err, tool = %call.name, "failed to write audit entry");
    }
}

async fn dispatch_external(agent: &Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let Some(mcp) = &agent.mcp else {
        return Ok(Dispatched::error(call.id.clone(), "no external tool-server manager configured"));
    };
    let Some((server, tool_name)) = call.parse_name() else {
        return Ok(Dispatched::error(call.id.clone(), format!("malformed external tool name: {}", call.name)));
    };
    match mcp.call(server, tool_name, call.arguments.clone()).await {
        Ok(result) if result.success => Ok(Dispatched::ok(
            call.id.clone(),
            serde_json::json!({"status": "success", "content": result.text_content()}),
        )),
        Ok(result) => Ok(Dispatched::error(
            call.id.clone(),
            result.error.unwrap_or_else(|| "external tool call failed".to_string()),
        )),
        Err(err) => Ok(Dispatched::error(call.id.clone(), err.to_string())),
    }
}

async fn dispatch_skill(agent: &Agent, call: &ToolCall) -> EngineResult<Dispatched> {
    let Some(registry) = &agent.skills else {
        return Ok(Dispatched::error(call.id.clone(), "no skill registry configured"));
    };
    let name = call.name.trim_start_matches(sqlsage_tools::SKILL_TOOL_PREFIX);
    let raw_arguments = call
        .arguments
        .get("arguments")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let context = sqlsage_skills::build_context(agent.session_id, std::collections::HashMap::new());
    match registry.execute(name, raw_arguments, &context).await {
        Ok(instructions) => Ok(Dispatched::ok(
            call.id.clone(),
            serde_json::json!({"status": "success", "instructions": instructions}),
        )),
        Err(err) => Ok(Dispatched::error(call.id.clone(), err.to_string())),
    }
}

fn dispatch_request_user_input(call: &ToolCall) -> Dispatched {
    let prompt = call
        .arguments
        .get("prompt")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let fields: Vec<String> = call
        .arguments
        .get("fields")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    Dispatched::paused(
        call.id.clone(),
        "form_input_requested",
        serde_json::json!({"prompt": prompt, "fields": fields}),
        PauseReason::FormInput { prompt, fields },
    )
}
