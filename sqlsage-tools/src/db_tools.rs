//! DB builtin tool definitions (spec §4.6, item (i)).
//!
//! These mirror `sqlsage_db::DbAdapter`'s method surface one-for-one, plus
//! `switch_database`, which is a connection-manager operation rather than an
//! adapter method — the engine dispatches it against the active connection
//! record, not through `DbAdapter`.

use sqlsage_core::Language;
use sqlsage_llm::LlmToolDefinition;

use crate::localize::tr;

fn schema_param() -> serde_json::Value {
    serde_json::json!({"type": "string", "description": "Schema name; defaults to the connection's default schema"})
}

/// The DB builtin half of the catalog.
#[must_use]
pub fn db_builtin_definitions(language: Language) -> Vec<LlmToolDefinition> {
    vec![
        LlmToolDefinition::new("list_tables")
            .with_description(tr(language, "list_tables_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {"schema": schema_param()}
            })),
        LlmToolDefinition::new("describe_table")
            .with_description(tr(language, "describe_table_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "table": {"type": "string", "description": "Table name"},
                    "schema": schema_param(),
                },
                "required": ["table"]
            })),
        LlmToolDefinition::new("get_sample_data")
            .with_description(tr(language, "get_sample_data_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "table": {"type": "string", "description": "Table name"},
                    "schema": schema_param(),
                    "limit": {"type": "integer", "description": "Maximum rows to return", "default": 10}
                },
                "required": ["table"]
            })),
        LlmToolDefinition::new("list_databases")
            .with_description(tr(language, "list_databases_desc"))
            .with_schema(serde_json::json!({"type": "object", "properties": {}})),
        LlmToolDefinition::new("switch_database")
            .with_description(tr(language, "switch_database_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "database": {"type": "string", "description": "Database name to switch to"}
                },
                "required": ["database"]
            })),
        LlmToolDefinition::new("execute_safe_query")
            .with_description(tr(language, "execute_safe_query_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "sql": {"type": "string", "description": "Read-only SQL statement to execute"}
                },
                "required": ["sql"]
            })),
        LlmToolDefinition::new("execute_sql")
            .with_description(tr(language, "execute_sql_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "sql": {"type": "string", "description": "SQL statement to execute"},
                    "confirmed": {"type": "boolean", "description": "Set true only after the user has confirmed this statement", "default": false}
                },
                "required": ["sql"]
            })),
        LlmToolDefinition::new("run_explain")
            .with_description(tr(language, "run_explain_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "sql": {"type": "string", "description": "SQL statement to explain"},
                    "analyze": {"type": "boolean", "description": "Run EXPLAIN ANALYZE (actually executes the statement)", "default": false}
                },
                "required": ["sql"]
            })),
        LlmToolDefinition::new("create_index")
            .with_description(tr(language, "create_index_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "sql": {"type": "string", "description": "CREATE INDEX statement"},
                    "concurrent": {"type": "boolean", "description": "Build without locking writers, where the engine supports it", "default": false}
                },
                "required": ["sql"]
            })),
        LlmToolDefinition::new("analyze_table")
            .with_description(tr(language, "analyze_table_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "table": {"type": "string", "description": "Table name"},
                    "schema": schema_param(),
                },
                "required": ["table"]
            })),
        LlmToolDefinition::new("check_index_usage")
            .with_description(tr(language, "check_index_usage_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "table": {"type": "string", "description": "Table name"},
                    "schema": schema_param(),
                },
                "required": ["table"]
            })),
        LlmToolDefinition::new("get_table_stats")
            .with_description(tr(language, "get_table_stats_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "table": {"type": "string", "description": "Table name"},
                    "schema": schema_param(),
                },
                "required": ["table"]
            })),
        LlmToolDefinition::new("get_running_queries")
            .with_description(tr(language, "get_running_queries_desc"))
            .with_schema(serde_json::json!({"type": "object", "properties": {}})),
        LlmToolDefinition::new("identify_slow_queries")
            .with_description(tr(language, "identify_slow_queries_desc"))
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": {
                    "min_ms": {"type": "number", "description": "Minimum duration in milliseconds", "default": 1000.0},
                    "limit": {"type": "integer", "description": "Maximum queries to return", "default": 20}
                }
            })),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_spec_listed_db_builtin() {
        let defs = db_builtin_definitions(Language::En);
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        for expected in [
            "list_tables",
            "describe_table",
            "get_sample_data",
            "execute_safe_query",
            "execute_sql",
            "run_explain",
            "create_index",
            "analyze_table",
            "check_index_usage",
            "get_table_stats",
            "identify_slow_queries",
            "get_running_queries",
            "list_databases",
            "switch_database",
        ] {
            assert!(names.contains(&expected), "missing builtin: {expected}");
        }
    }
}
