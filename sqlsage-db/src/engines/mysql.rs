//! `MySQL` adapter (supports 5.7 and 8.0). Queries transcribed from
//! `original_source/db_agent/core/database/mysql.py`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row, TypeInfo};

use sqlsage_core::EngineKind;

use crate::error::{DbError, DbResult};
use crate::factory::ConnectionConfig;
use crate::retry::with_retry;
use crate::types::{ColumnInfo, DbInfo, DbObject, DbOutcome, TableSummary};
use crate::DbAdapter;

pub struct MySqlAdapter {
    pool: sqlx::MySqlPool,
    host: String,
    database: String,
    version_full: String,
    has_performance_schema: bool,
}

impl MySqlAdapter {
    pub async fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        let url = format!(
            "mysql://{}:{}@{}:{}/{}",
            config.username, config.password, config.host, config.port, config.database
        );
        let pool = with_retry(|| async {
            MySqlPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(10))
                .connect(&url)
                .await
                .map_err(|e| DbError::Connection(e.to_string()))
        })
        .await?;

        let version_full: String = sqlx::query_scalar("SELECT VERSION()")
            .fetch_optional(&pool)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| "unknown".to_string());

        let has_performance_schema = sqlx::query(
            "SELECT COUNT(*) FROM performance_schema.events_statements_summary_by_digest LIMIT 1",
        )
        .fetch_optional(&pool)
        .await
        .is_ok();

        Ok(Self {
            pool,
            host: config.host.clone(),
            database: config.database.clone(),
            version_full,
            has_performance_schema,
        })
    }
}

pub(crate) fn row_to_json(row: &MySqlRow) -> Value {
    let mut obj = serde_json::Map::new();
    for column in row.columns() {
        let name = column.name().to_string();
        let type_name = column.type_info().name();
        let value = match type_name {
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "YEAR" => {
                row.try_get::<Option<i32>, _>(column.ordinal()).ok().flatten().map(Value::from)
            }
            "BIGINT" => row.try_get::<Option<i64>, _>(column.ordinal()).ok().flatten().map(Value::from),
            "FLOAT" | "DOUBLE" | "DECIMAL" => {
                row.try_get::<Option<f64>, _>(column.ordinal()).ok().flatten().map(|v| json!(v))
            }
            "TINYINT(1)" | "BOOLEAN" => row.try_get::<Option<bool>, _>(column.ordinal()).ok().flatten().map(Value::from),
            "JSON" => row.try_get::<Option<Value>, _>(column.ordinal()).ok().flatten(),
            _ => row
                .try_get::<Option<String>, _>(column.ordinal())
                .ok()
                .flatten()
                .map(Value::from),
        };
        obj.insert(name, value.unwrap_or(Value::Null));
    }
    Value::Object(obj)
}

async fn run_query(pool: &sqlx::MySqlPool, sql: &str) -> Result<Vec<Value>, sqlx::Error> {
    let rows = sqlx::query(sql).fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_json).collect())
}

#[async_trait]
impl DbAdapter for MySqlAdapter {
    fn engine_kind(&self) -> EngineKind {
        EngineKind::MySql
    }

    async fn get_db_info(&self) -> DbOutcome {
        let version = self.version_full.split('-').next().unwrap_or(&self.version_full).to_string();
        DbOutcome::success(DbInfo {
            engine: "mysql".to_string(),
            version,
            version_full: self.version_full.clone(),
            host: self.host.clone(),
            database: self.database.clone(),
            features: json!({ "has_performance_schema": self.has_performance_schema }),
        })
    }

    async fn list_tables(&self, schema: Option<&str>) -> DbOutcome {
        let schema = schema.unwrap_or(&self.database);
        let sql = r"
            SELECT table_name AS name, table_type AS kind, table_rows AS estimated_rows, table_comment AS comment
            FROM information_schema.tables
            WHERE table_schema = ?
            ORDER BY table_name";
        match sqlx::query(sql).bind(schema).fetch_all(&self.pool).await {
            Ok(rows) => {
                let tables: Vec<TableSummary> = rows
                    .iter()
                    .map(|row| TableSummary {
                        name: row.try_get("name").unwrap_or_default(),
                        schema: Some(schema.to_string()),
                        object_type: if row.try_get::<String, _>("kind").as_deref() == Ok("VIEW") {
                            "view".to_string()
                        } else {
                            "table".to_string()
                        },
                        estimated_rows: row.try_get("estimated_rows").ok(),
                        comment: row.try_get("comment").ok(),
                    })
                    .collect();
                DbOutcome::success(json!({ "tables": tables }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn describe_table(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = schema.unwrap_or(&self.database);
        let sql = r"
            SELECT column_name AS name, column_type AS data_type,
                   is_nullable = 'YES' AS nullable, column_default AS `default`,
                   column_key = 'PRI' AS is_primary_key
            FROM information_schema.columns
            WHERE table_schema = ? AND table_name = ?
            ORDER BY ordinal_position";
        match sqlx::query(sql).bind(schema).bind(table).fetch_all(&self.pool).await {
            Ok(rows) if rows.is_empty() => DbOutcome::error(format!("table not found: {schema}.{table}")),
            Ok(rows) => {
                let columns: Vec<ColumnInfo> = rows
                    .iter()
                    .map(|row| ColumnInfo {
                        name: row.try_get("name").unwrap_or_default(),
                        data_type: row.try_get("data_type").unwrap_or_default(),
                        nullable: row.try_get::<i64, _>("nullable").map(|v| v != 0).unwrap_or(true),
                        default: row.try_get("default").ok(),
                        is_primary_key: row.try_get::<i64, _>("is_primary_key").map(|v| v != 0).unwrap_or(false),
                    })
                    .collect();
                DbOutcome::success(json!({ "table": table, "schema": schema, "columns": columns }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_sample_data(&self, table: &str, schema: Option<&str>, limit: u32) -> DbOutcome {
        let schema = schema.unwrap_or(&self.database);
        let sql = format!("SELECT * FROM `{schema}`.`{table}` LIMIT {limit}");
        match run_query(&self.pool, &sql).await {
            Ok(rows) => DbOutcome::success(json!({ "rows": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn list_databases(&self) -> DbOutcome {
        match run_query(&self.pool, "SHOW DATABASES").await {
            Ok(rows) => DbOutcome::success(json!({ "databases": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn execute_safe_query(&self, sql: &str) -> DbOutcome {
        let sql = if sqlsage_analyzer::classify_statement(sql) == sqlsage_analyzer::StatementKind::ReadOnly {
            sql.to_string()
        } else {
            format!("SELECT {sql}")
        };
        if sqlsage_analyzer::classify_statement(&sql) != sqlsage_analyzer::StatementKind::ReadOnly {
            return DbOutcome::error("execute_safe_query only accepts read-only statements");
        }
        match run_query(&self.pool, &sql).await {
            Ok(rows) => DbOutcome::success(json!({ "rows": rows, "count": rows.len() })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn execute_sql(&self, sql: &str, confirmed: bool) -> DbOutcome {
        if sqlsage_analyzer::classify_statement(sql) != sqlsage_analyzer::StatementKind::ReadOnly && !confirmed {
            return DbOutcome::PendingConfirmation {
                sql: sql.to_string(),
                operation: "execute_sql".to_string(),
            };
        }
        match sqlx::query(sql).execute(&self.pool).await {
            Ok(result) => DbOutcome::success(json!({ "rows_affected": result.rows_affected() })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn run_explain(&self, sql: &str, analyze: bool) -> DbOutcome {
        let explain_sql = if analyze {
            format!("EXPLAIN ANALYZE {sql}")
        } else {
            format!("EXPLAIN FORMAT=JSON {sql}")
        };
        match run_query(&self.pool, &explain_sql).await {
            Ok(rows) => {
                let lines: Vec<String> = rows.iter().map(Value::to_string).collect();
                DbOutcome::success(json!({ "plan": lines, "analyzed": analyze, "sql": sql }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn create_index(&self, sql: &str, _concurrent: bool) -> DbOutcome {
        if !sql.trim_start().to_uppercase().starts_with("CREATE") {
            return DbOutcome::error("create_index requires a CREATE INDEX statement");
        }
        match sqlx::query(sql).execute(&self.pool).await {
            Ok(_) => DbOutcome::success(json!({ "created": true })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn analyze_table(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = schema.unwrap_or(&self.database);
        let sql = format!("ANALYZE TABLE `{schema}`.`{table}`");
        match sqlx::query(&sql).execute(&self.pool).await {
            Ok(_) => DbOutcome::success(json!({ "analyzed": table })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn check_index_usage(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = schema.unwrap_or(&self.database);
        let sql = r"
            SELECT index_name, seq_in_index, column_name, cardinality
            FROM information_schema.statistics
            WHERE table_schema = ? AND table_name = ?
            ORDER BY index_name, seq_in_index";
        match sqlx::query(sql).bind(schema).bind(table).fetch_all(&self.pool).await {
            Ok(rows) => {
                let indexes: Vec<Value> = rows.iter().map(row_to_json).collect();
                DbOutcome::success(json!({ "table": format!("{schema}.{table}"), "indexes": indexes }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_table_stats(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = schema.unwrap_or(&self.database);
        let sql = r"
            SELECT table_rows AS estimated_rows, data_length, index_length, data_free
            FROM information_schema.tables
            WHERE table_schema = ? AND table_name = ?";
        match sqlx::query(sql).bind(schema).bind(table).fetch_optional(&self.pool).await {
            Ok(Some(row)) => DbOutcome::success(row_to_json(&row)),
            Ok(None) => DbOutcome::error(format!("table not found: {schema}.{table}")),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_running_queries(&self) -> DbOutcome {
        match run_query(&self.pool, "SHOW FULL PROCESSLIST").await {
            Ok(rows) => DbOutcome::success(json!({ "count": rows.len(), "queries": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn identify_slow_queries(&self, min_ms: f64, limit: u32) -> DbOutcome {
        if !self.has_performance_schema {
            return match run_query(&self.pool, "SHOW FULL PROCESSLIST").await {
                Ok(rows) => DbOutcome::success(json!({
                    "source": "processlist",
                    "note": "performance_schema is not enabled; showing active sessions instead",
                    "count": rows.len(),
                    "queries": rows,
                })),
                Err(e) => DbOutcome::error(e),
            };
        }

        let sql = r"
            SELECT DIGEST_TEXT AS query, COUNT_STAR AS calls,
                   ROUND(SUM_TIMER_WAIT / 1000000000, 2) AS total_time_ms,
                   ROUND(AVG_TIMER_WAIT / 1000000000, 2) AS avg_time_ms,
                   ROUND(MAX_TIMER_WAIT / 1000000000, 2) AS max_time_ms,
                   SUM_ROWS_EXAMINED AS rows_examined
            FROM performance_schema.events_statements_summary_by_digest
            WHERE AVG_TIMER_WAIT / 1000000000 > ?
            ORDER BY SUM_TIMER_WAIT DESC
            LIMIT ?";
        match sqlx::query(sql).bind(min_ms).bind(i64::from(limit)).fetch_all(&self.pool).await {
            Ok(rows) => {
                let queries: Vec<Value> = rows.iter().map(row_to_json).collect();
                DbOutcome::success(json!({ "source": "performance_schema", "count": queries.len(), "queries": queries }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_all_objects(&self, schema: Option<&str>, object_types: Option<&[String]>) -> DbOutcome {
        let schema = schema.unwrap_or(&self.database);
        let wants = |kind: &str| object_types.is_none_or(|types| types.iter().any(|t| t == kind));
        let mut objects = Vec::new();

        if wants("table") {
            if let Ok(rows) = sqlx::query(
                "SELECT table_name AS name, table_rows AS estimated_rows
                 FROM information_schema.tables WHERE table_schema = ? AND table_type = 'BASE TABLE'",
            )
            .bind(schema)
            .fetch_all(&self.pool)
            .await
            {
                for row in &rows {
                    objects.push(DbObject {
                        object_type: "table".to_string(),
                        name: row.try_get("name").unwrap_or_default(),
                        schema: Some(schema.to_string()),
                        table_name: None,
                        metadata: row_to_json(row),
                    });
                }
            }
        }
        if wants("view") {
            if let Ok(rows) = sqlx::query("SELECT table_name AS name, view_definition FROM information_schema.views WHERE table_schema = ?")
                .bind(schema)
                .fetch_all(&self.pool)
                .await
            {
                for row in &rows {
                    objects.push(DbObject {
                        object_type: "view".to_string(),
                        name: row.try_get("name").unwrap_or_default(),
                        schema: Some(schema.to_string()),
                        table_name: None,
                        metadata: row_to_json(row),
                    });
                }
            }
        }
        if wants("trigger") {
            if let Ok(rows) = sqlx::query(
                "SELECT trigger_name AS name, event_object_table AS table_name, event_manipulation, action_timing
                 FROM information_schema.triggers WHERE trigger_schema = ?",
            )
            .bind(schema)
            .fetch_all(&self.pool)
            .await
            {
                for row in &rows {
                    objects.push(DbObject {
                        object_type: "trigger".to_string(),
                        name: row.try_get("name").unwrap_or_default(),
                        schema: Some(schema.to_string()),
                        table_name: row.try_get("table_name").ok(),
                        metadata: row_to_json(row),
                    });
                }
            }
        }
        DbOutcome::success(json!({ "objects": objects }))
    }

    async fn get_object_ddl(&self, object_type: &str, object_name: &str, _schema: Option<&str>) -> DbOutcome {
        let sql = match object_type {
            "table" => format!("SHOW CREATE TABLE `{object_name}`"),
            "view" => format!("SHOW CREATE VIEW `{object_name}`"),
            "procedure" => format!("SHOW CREATE PROCEDURE `{object_name}`"),
            "function" => format!("SHOW CREATE FUNCTION `{object_name}`"),
            "trigger" => format!("SHOW CREATE TRIGGER `{object_name}`"),
            other => return DbOutcome::error(format!("DDL reconstruction for object type '{other}' is not supported on this engine")),
        };
        match sqlx::query(&sql).fetch_optional(&self.pool).await {
            Ok(Some(row)) => {
                let ddl_column = row
                    .columns()
                    .iter()
                    .map(sqlx::Column::name)
                    .find(|name| name.to_lowercase().contains("create"))
                    .unwrap_or("ddl")
                    .to_string();
                let ddl: String = row.try_get(ddl_column.as_str()).unwrap_or_default();
                DbOutcome::success(json!({
                    "object_type": object_type, "object_name": object_name, "ddl": ddl, "dependencies": [],
                }))
            }
            Ok(None) => DbOutcome::error(format!("object not found: {object_name}")),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_object_dependencies(&self, schema: Option<&str>) -> DbOutcome {
        let schema = schema.unwrap_or(&self.database);
        let sql = r"
            SELECT table_name AS object_name, referenced_table_name AS depends_on_name
            FROM information_schema.key_column_usage
            WHERE table_schema = ? AND referenced_table_name IS NOT NULL";
        match sqlx::query(sql).bind(schema).fetch_all(&self.pool).await {
            Ok(rows) => {
                let dependencies: Vec<Value> = rows
                    .iter()
                    .map(|row| {
                        json!({
                            "object_type": "table",
                            "object_name": row.try_get::<String, _>("object_name").unwrap_or_default(),
                            "depends_on_type": "table",
                            "depends_on_name": row.try_get::<String, _>("depends_on_name").unwrap_or_default(),
                        })
                    })
                    .collect();
                DbOutcome::success(json!({ "dependencies": dependencies }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_foreign_key_dependencies(&self, schema: Option<&str>) -> DbOutcome {
        let schema = schema.unwrap_or(&self.database);
        let sql = r"
            SELECT constraint_name, table_name, column_name,
                   referenced_table_name AS referenced_table, referenced_column_name AS referenced_column
            FROM information_schema.key_column_usage
            WHERE table_schema = ? AND referenced_table_name IS NOT NULL";
        match sqlx::query(sql).bind(schema).fetch_all(&self.pool).await {
            Ok(rows) => {
                let mut edges = Vec::new();
                let mut tables = std::collections::BTreeSet::new();
                let foreign_keys: Vec<Value> = rows
                    .iter()
                    .map(|row| {
                        let table: String = row.try_get("table_name").unwrap_or_default();
                        let referenced: String = row.try_get("referenced_table").unwrap_or_default();
                        tables.insert(table.clone());
                        tables.insert(referenced.clone());
                        edges.push((table, referenced));
                        row_to_json(row)
                    })
                    .collect();
                let tables: Vec<String> = tables.into_iter().collect();
                let table_order = super::topo_sort_tables(&tables, &edges);
                DbOutcome::success(json!({
                    "edges": edges,
                    "table_order": table_order,
                    "foreign_keys": foreign_keys,
                }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }
}
