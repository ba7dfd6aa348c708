//! Migration tool definitions (spec §4.6, item (ii); dispatched against the
//! Migration Handler in `sqlsage-migrate` by `sqlsage-engine`).

use sqlsage_core::Language;
use sqlsage_llm::LlmToolDefinition;

use crate::localize::tr;

fn task_id_param() -> serde_json::Value {
    serde_json::json!({"type": "string", "description": "Migration task id"})
}

/// The migration half of the catalog.
#[must_use]
pub fn migration_tool_definitions(language: Language) -> Vec<LlmToolDefinition> {
    vec![
        LlmToolDefinition::new("analyze_source_database")
            .with_description(tr(language, "analyze_source_database_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "schema": {"type": "string", "description": "Source schema to enumerate; defaults to the connection's default"}
                }
            })),
        LlmToolDefinition::new("create_migration_plan")
            .with_description(tr(language, "create_migration_plan_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "task_id": task_id_param(),
                    "name": {"type": "string", "description": "Display name for the migration task"}
                },
                "required": ["task_id"]
            })),
        LlmToolDefinition::new("get_migration_plan")
            .with_description(tr(language, "get_migration_plan_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {"task_id": task_id_param()},
                "required": ["task_id"]
            })),
        LlmToolDefinition::new("get_migration_status")
            .with_description(tr(language, "get_migration_status_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {"task_id": task_id_param()},
                "required": ["task_id"]
            })),
        LlmToolDefinition::new("execute_migration_item")
            .with_description(tr(language, "execute_migration_item_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "task_id": task_id_param(),
                    "item_id": {"type": "string", "description": "Migration item id"}
                },
                "required": ["task_id", "item_id"]
            })),
        LlmToolDefinition::new("execute_migration_batch")
            .with_description(tr(language, "execute_migration_batch_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "task_id": task_id_param(),
                    "n": {"type": "integer", "description": "Maximum number of pending items to execute", "default": 10}
                },
                "required": ["task_id"]
            })),
        LlmToolDefinition::new("compare_databases")
            .with_description(tr(language, "compare_databases_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "task_id": task_id_param(),
                    "schema": {"type": "string", "description": "Schema to compare; defaults to the task's schema"}
                },
                "required": ["task_id"]
            })),
        LlmToolDefinition::new("generate_migration_report")
            .with_description(tr(language, "generate_migration_report_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {"task_id": task_id_param()},
                "required": ["task_id"]
            })),
        LlmToolDefinition::new("skip_migration_item")
            .with_description(tr(language, "skip_migration_item_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "task_id": task_id_param(),
                    "item_id": {"type": "string", "description": "Migration item id"},
                    "reason": {"type": "string", "description": "Why this item is being skipped"}
                },
                "required": ["task_id", "item_id", "reason"]
            })),
        LlmToolDefinition::new("retry_failed_items")
            .with_description(tr(language, "retry_failed_items_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {"task_id": task_id_param()},
                "required": ["task_id"]
            })),
        LlmToolDefinition::new("request_migration_setup")
            .with_description(tr(language, "request_migration_setup_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "missing_fields": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Configuration fields the caller must supply (e.g. target connection, auto_execute)"
                    }
                },
                "required": ["missing_fields"]
            })),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_spec_listed_migration_tool() {
        let defs = migration_tool_definitions(Language::En);
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        for expected in [
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
        ] {
            assert!(names.contains(&expected), "missing migration tool: {expected}");
        }
    }
}
