//! Minimal localization table for tool catalog strings (spec §4.6: "All
//! descriptions must be localized at catalog-build time").

use sqlsage_core::Language;

/// Look up `key` in `language`'s table, falling back to English and then to
/// the key itself if nothing matches.
#[must_use]
pub fn tr(language: Language, key: &str) -> &'static str {
    match (language, key) {
        (Language::Zh, "list_tables_desc") => "列出当前数据库/模式中的所有表。",
        (Language::Zh, "describe_table_desc") => "返回某张表的列、类型与约束信息。",
        (Language::Zh, "get_sample_data_desc") => "返回某张表的若干示例行。",
        (Language::Zh, "list_databases_desc") => "列出服务器上可访问的数据库。",
        (Language::Zh, "switch_database_desc") => "切换当前会话使用的数据库。",
        (Language::Zh, "execute_safe_query_desc") => {
            "执行只读查询；如查询有风险将要求用户确认。"
        }
        (Language::Zh, "execute_sql_desc") => "执行任意 SQL 语句；写操作默认要求确认。",
        (Language::Zh, "run_explain_desc") => "运行 EXPLAIN（可选 ANALYZE）并解析执行计划。",
        (Language::Zh, "create_index_desc") => "创建索引；大表上默认要求确认。",
        (Language::Zh, "analyze_table_desc") => "为某张表刷新统计信息。",
        (Language::Zh, "check_index_usage_desc") => "检查某张表的索引使用情况。",
        (Language::Zh, "get_table_stats_desc") => "返回某张表的行数与体积统计。",
        (Language::Zh, "get_running_queries_desc") => "列出当前正在运行的查询。",
        (Language::Zh, "identify_slow_queries_desc") => "按阈值查找慢查询。",
        (Language::Zh, "analyze_source_database_desc") => {
            "枚举源数据库的对象、外键与依赖关系。"
        }
        (Language::Zh, "create_migration_plan_desc") => "根据分析结果生成按依赖顺序排列的迁移计划。",
        (Language::Zh, "get_migration_plan_desc") => "获取某个迁移任务当前的计划条目。",
        (Language::Zh, "get_migration_status_desc") => "获取某个迁移任务的当前状态与计数。",
        (Language::Zh, "execute_migration_item_desc") => "转换并执行单个迁移条目。",
        (Language::Zh, "execute_migration_batch_desc") => "按顺序批量执行若干待处理迁移条目。",
        (Language::Zh, "compare_databases_desc") => "比较源库与目标库的对象差异。",
        (Language::Zh, "generate_migration_report_desc") => "生成迁移任务的汇总报告。",
        (Language::Zh, "skip_migration_item_desc") => "将某个迁移条目标记为跳过。",
        (Language::Zh, "retry_failed_items_desc") => "将失败的迁移条目重置为待处理。",
        (Language::Zh, "request_migration_setup_desc") => "向用户请求缺失的迁移配置项。",
        (Language::Zh, "request_user_input_desc") => "向用户请求补充信息后再继续。",
        (Language::Zh, "skill_arguments_desc") => "传给该技能的自由文本参数。",
        _ => default_en(key),
    }
}

fn default_en(key: &str) -> &'static str {
    match key {
        "list_tables_desc" => "List all tables in the current database/schema.",
        "describe_table_desc" => "Return a table's columns, types, and constraints.",
        "get_sample_data_desc" => "Return a handful of sample rows from a table.",
        "list_databases_desc" => "List databases accessible on the server.",
        "switch_database_desc" => "Switch the database the current session uses.",
        "execute_safe_query_desc" => {
            "Execute a read-only query; risky queries require user confirmation."
        }
        "execute_sql_desc" => "Execute an arbitrary SQL statement; writes require confirmation by default.",
        "run_explain_desc" => "Run EXPLAIN (optionally ANALYZE) and parse the resulting plan.",
        "create_index_desc" => "Create an index; large tables require confirmation by default.",
        "analyze_table_desc" => "Refresh planner statistics for a table.",
        "check_index_usage_desc" => "Check index usage for a table.",
        "get_table_stats_desc" => "Return row-count and size statistics for a table.",
        "get_running_queries_desc" => "List currently running queries.",
        "identify_slow_queries_desc" => "Find slow queries above a duration threshold.",
        "analyze_source_database_desc" => {
            "Enumerate the source database's objects, foreign keys, and dependencies."
        }
        "create_migration_plan_desc" => {
            "Build a dependency-ordered migration plan from an analysis result."
        }
        "get_migration_plan_desc" => "Fetch the current plan items for a migration task.",
        "get_migration_status_desc" => "Fetch the current status and counters for a migration task.",
        "execute_migration_item_desc" => "Convert and execute a single migration item.",
        "execute_migration_batch_desc" => "Execute up to N pending migration items in order.",
        "compare_databases_desc" => "Compare source and target databases' objects.",
        "generate_migration_report_desc" => "Generate a summary report for a migration task.",
        "skip_migration_item_desc" => "Mark a migration item as skipped.",
        "retry_failed_items_desc" => "Reset failed migration items back to pending.",
        "request_migration_setup_desc" => "Ask the user for missing migration configuration.",
        "request_user_input_desc" => "Ask the user for additional information before continuing.",
        "skill_arguments_desc" => "Free-text arguments to pass to this skill.",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english() {
        assert_eq!(
            tr(Language::En, "list_tables_desc"),
            "List all tables in the current database/schema."
        );
    }

    #[test]
    fn unknown_key_falls_back_to_itself() {
        assert_eq!(tr(Language::En, "totally_unknown_key"), "totally_unknown_key");
    }

    #[test]
    fn chinese_table_has_distinct_strings() {
        assert_ne!(
            tr(Language::Zh, "list_tables_desc"),
            tr(Language::En, "list_tables_desc")
        );
    }
}
