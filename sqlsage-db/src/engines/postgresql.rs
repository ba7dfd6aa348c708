//! `PostgreSQL` adapter. Also backs GaussDB connections (spec §2: GaussDB is
//! wire- and catalog-compatible with `PostgreSQL`), distinguished only by the
//! `engine_kind` the adapter was constructed with.
//!
//! Queries transcribed from `original_source/db_agent/core/database/postgresql.py`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, Row, TypeInfo};

use sqlsage_core::EngineKind;

use crate::error::{DbError, DbResult};
use crate::factory::ConnectionConfig;
use crate::retry::with_retry;
use crate::types::{ColumnInfo, DbInfo, DbObject, DbOutcome, ForeignKeyDependencies, TableSummary};
use crate::DbAdapter;

pub struct PostgresAdapter {
    pool: sqlx::PgPool,
    kind: EngineKind,
    host: String,
    database: String,
    version_full: String,
    version: String,
    has_pg_stat_statements: bool,
    is_distributed: bool,
}

impl PostgresAdapter {
    pub async fn connect(config: &ConnectionConfig, kind: EngineKind) -> DbResult<Self> {
        let url = format!(
            "postgres://{}:{}@{}:{}/{}",
            config.username, config.password, config.host, config.port, config.database
        );
        let pool = with_retry(|| async {
            PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(10))
                .connect(&url)
                .await
                .map_err(|e| DbError::Connection(e.to_string()))
        })
        .await?;

        let (version_full, version) = fetch_version(&pool).await;
        let has_pg_stat_statements = sqlx::query("SELECT total_exec_time FROM pg_stat_statements LIMIT 1")
            .fetch_optional(&pool)
            .await
            .is_ok();
        // GaussDB reports its coordinator/datanode topology through
        // `pgxc_node`, which plain PostgreSQL has no such table; the
        // query simply fails there and `is_distributed` stays false.
        let is_distributed = sqlx::query_scalar::<_, i64>(
            "SELECT count(*) FROM pgxc_node WHERE node_type IN ('C', 'D')",
        )
        .fetch_optional(&pool)
        .await
        .ok()
        .flatten()
        .is_some_and(|count| count > 1);

        Ok(Self {
            pool,
            kind,
            host: config.host.clone(),
            database: config.database.clone(),
            version_full,
            version,
            has_pg_stat_statements,
            is_distributed,
        })
    }

    fn schema_or_default<'a>(&self, schema: Option<&'a str>) -> &'a str {
        schema.unwrap_or("public")
    }
}

async fn fetch_version(pool: &sqlx::PgPool) -> (String, String) {
    let full: Option<(String,)> = sqlx::query_as("SELECT version()").fetch_optional(pool).await.ok().flatten();
    let short: Option<(String,)> = sqlx::query_as("SHOW server_version").fetch_optional(pool).await.ok().flatten();
    (
        full.map(|(v,)| v).unwrap_or_else(|| "unknown".to_string()),
        short.map(|(v,)| v).unwrap_or_else(|| "unknown".to_string()),
    )
}

/// Convert one row into a JSON object, dispatching on the column's reported
/// Postgres type name. Falls back to a string for anything not explicitly
/// handled; `NULL` always maps to `Value::Null`.
pub(crate) fn row_to_json(row: &PgRow) -> Value {
    let mut obj = serde_json::Map::new();
    for column in row.columns() {
        let name = column.name().to_string();
        let type_name = column.type_info().name();
        let value = match type_name {
            "INT2" => row.try_get::<Option<i16>, _>(column.ordinal()).ok().flatten().map(Value::from),
            "INT4" => row.try_get::<Option<i32>, _>(column.ordinal()).ok().flatten().map(Value::from),
            "INT8" => row.try_get::<Option<i64>, _>(column.ordinal()).ok().flatten().map(Value::from),
            "FLOAT4" => row.try_get::<Option<f32>, _>(column.ordinal()).ok().flatten().map(|v| json!(v)),
            "FLOAT8" | "NUMERIC" => row.try_get::<Option<f64>, _>(column.ordinal()).ok().flatten().map(|v| json!(v)),
            "BOOL" => row.try_get::<Option<bool>, _>(column.ordinal()).ok().flatten().map(Value::from),
            "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(column.ordinal()).ok().flatten(),
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

async fn run_query(pool: &sqlx::PgPool, sql: &str) -> Result<Vec<Value>, sqlx::Error> {
    let rows = sqlx::query(sql).fetch_all(pool).await?;
    Ok(rows.iter().map(row_to_json).collect())
}

#[async_trait]
impl DbAdapter for PostgresAdapter {
    fn engine_kind(&self) -> EngineKind {
        self.kind
    }

    async fn get_db_info(&self) -> DbOutcome {
        DbOutcome::success(DbInfo {
            engine: self.kind.as_str().to_string(),
            version: self.version.clone(),
            version_full: self.version_full.clone(),
            host: self.host.clone(),
            database: self.database.clone(),
            features: json!({
                "has_pg_stat_statements": self.has_pg_stat_statements,
                "is_distributed": self.is_distributed,
            }),
        })
    }

    async fn list_tables(&self, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = r"
            SELECT c.relname AS name, c.relkind AS kind,
                   c.reltuples::bigint AS estimated_rows,
                   obj_description(c.oid) AS comment
            FROM pg_class c
            JOIN pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = $1 AND c.relkind IN ('r', 'v', 'm')
            ORDER BY c.relname";
        match sqlx::query(sql).bind(schema).fetch_all(&self.pool).await {
            Ok(rows) => {
                let tables: Vec<TableSummary> = rows
                    .iter()
                    .map(|row| TableSummary {
                        name: row.try_get("name").unwrap_or_default(),
                        schema: Some(schema.to_string()),
                        object_type: match row.try_get::<String, _>("kind").as_deref() {
                            Ok("v") => "view".to_string(),
                            Ok("m") => "materialized_view".to_string(),
                            _ => "table".to_string(),
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
        let schema = self.schema_or_default(schema);
        let sql = r"
            SELECT a.attname AS name, format_type(a.atttypid, a.atttypmod) AS data_type,
                   NOT a.attnotnull AS nullable,
                   pg_get_expr(d.adbin, d.adrelid) AS default,
                   COALESCE(pk.is_pk, false) AS is_primary_key
            FROM pg_attribute a
            JOIN pg_class c ON c.oid = a.attrelid
            JOIN pg_namespace n ON n.oid = c.relnamespace
            LEFT JOIN pg_attrdef d ON d.adrelid = a.attrelid AND d.adnum = a.attnum
            LEFT JOIN (
                SELECT ci.attrelid, ci.attnum, true AS is_pk
                FROM pg_index i
                JOIN pg_attribute ci ON ci.attrelid = i.indrelid AND ci.attnum = ANY(i.indkey)
                WHERE i.indisprimary
            ) pk ON pk.attrelid = a.attrelid AND pk.attnum = a.attnum
            WHERE n.nspname = $1 AND c.relname = $2 AND a.attnum > 0 AND NOT a.attisdropped
            ORDER BY a.attnum";
        match sqlx::query(sql).bind(schema).bind(table).fetch_all(&self.pool).await {
            Ok(rows) if rows.is_empty() => DbOutcome::error(format!("table not found: {schema}.{table}")),
            Ok(rows) => {
                let columns: Vec<ColumnInfo> = rows
                    .iter()
                    .map(|row| ColumnInfo {
                        name: row.try_get("name").unwrap_or_default(),
                        data_type: row.try_get("data_type").unwrap_or_default(),
                        nullable: row.try_get("nullable").unwrap_or(true),
                        default: row.try_get("default").ok(),
                        is_primary_key: row.try_get("is_primary_key").unwrap_or(false),
                    })
                    .collect();
                DbOutcome::success(json!({ "table": table, "schema": schema, "columns": columns }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_sample_data(&self, table: &str, schema: Option<&str>, limit: u32) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = format!("SELECT * FROM \"{schema}\".\"{table}\" LIMIT {limit}");
        match run_query(&self.pool, &sql).await {
            Ok(rows) => DbOutcome::success(json!({ "rows": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn list_databases(&self) -> DbOutcome {
        match run_query(&self.pool, "SELECT datname AS name FROM pg_database WHERE datistemplate = false").await {
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
            format!("EXPLAIN (ANALYZE, BUFFERS, FORMAT JSON) {sql}")
        } else {
            format!("EXPLAIN (FORMAT JSON) {sql}")
        };
        match sqlx::query_scalar::<_, Value>(&explain_sql).fetch_one(&self.pool).await {
            Ok(plan) => {
                let lines: Vec<String> = match &plan {
                    Value::Array(items) => items.iter().map(|v| v.to_string()).collect(),
                    other => vec![other.to_string()],
                };
                DbOutcome::success(json!({ "plan": lines, "analyzed": analyze, "sql": sql }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn create_index(&self, sql: &str, concurrent: bool) -> DbOutcome {
        if sqlsage_analyzer::classify_statement(sql) == sqlsage_analyzer::StatementKind::ReadOnly
            || !sql.trim_start().to_uppercase().starts_with("CREATE")
        {
            return DbOutcome::error("create_index requires a CREATE INDEX statement");
        }
        let sql = if concurrent && !sql.to_uppercase().contains("CONCURRENTLY") {
            sql.replacen("CREATE INDEX", "CREATE INDEX CONCURRENTLY", 1)
                .replacen("create index", "CREATE INDEX CONCURRENTLY", 1)
        } else {
            sql.to_string()
        };
        match sqlx::query(&sql).execute(&self.pool).await {
            Ok(_) => DbOutcome::success(json!({ "created": true })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn analyze_table(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = format!("ANALYZE \"{schema}\".\"{table}\"");
        match sqlx::query(&sql).execute(&self.pool).await {
            Ok(_) => DbOutcome::success(json!({ "analyzed": table })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn check_index_usage(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = r"
            SELECT i.indexname, i.indexdef, COALESCE(s.idx_scan, 0) AS idx_scan,
                   pg_relation_size(i.schemaname || '.' || i.indexname) AS index_size_bytes
            FROM pg_indexes i
            LEFT JOIN pg_stat_user_indexes s
                ON i.schemaname = s.schemaname AND i.indexname = s.indexrelname
            WHERE i.schemaname = $1 AND i.tablename = $2
            ORDER BY idx_scan DESC";
        match sqlx::query(sql).bind(schema).bind(table).fetch_all(&self.pool).await {
            Ok(rows) => {
                let indexes: Vec<Value> = rows.iter().map(row_to_json).collect();
                let unused = indexes
                    .iter()
                    .filter(|i| i.get("idx_scan").and_then(Value::as_i64).unwrap_or(0) == 0)
                    .count();
                DbOutcome::success(json!({
                    "table": format!("{schema}.{table}"),
                    "total_indexes": indexes.len(),
                    "unused_count": unused,
                    "indexes": indexes,
                }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_table_stats(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = r"
            SELECT pg_relation_size($1::regclass) AS table_size_bytes,
                   pg_total_relation_size($1::regclass) AS total_size_bytes,
                   (SELECT reltuples::bigint FROM pg_class WHERE oid = $1::regclass) AS estimated_rows";
        let qualified = format!("{schema}.{table}");
        match sqlx::query(sql).bind(&qualified).fetch_one(&self.pool).await {
            Ok(row) => DbOutcome::success(row_to_json(&row)),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_running_queries(&self) -> DbOutcome {
        let sql = r"
            SELECT pid, usename AS user, datname AS database, state,
                   EXTRACT(EPOCH FROM (now() - query_start)) AS duration_seconds,
                   wait_event_type, wait_event, LEFT(query, 500) AS query
            FROM pg_stat_activity
            WHERE state = 'active' AND pid != pg_backend_pid()
            ORDER BY query_start ASC NULLS LAST";
        match run_query(&self.pool, sql).await {
            Ok(rows) => DbOutcome::success(json!({ "count": rows.len(), "queries": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn identify_slow_queries(&self, min_ms: f64, limit: u32) -> DbOutcome {
        let probe = sqlx::query("SELECT total_exec_time, mean_exec_time FROM pg_stat_statements LIMIT 1")
            .fetch_optional(&self.pool)
            .await;
        let (available, new_cols) = match probe {
            Ok(_) => (true, true),
            Err(_) => {
                let old_probe = sqlx::query("SELECT total_time, mean_time FROM pg_stat_statements LIMIT 1")
                    .fetch_optional(&self.pool)
                    .await;
                (old_probe.is_ok(), false)
            }
        };

        if !available {
            let sql = r"
                SELECT pid, usename AS user, datname AS database, state,
                       EXTRACT(EPOCH FROM (now() - query_start)) AS duration_seconds,
                       wait_event_type, wait_event, LEFT(query, 500) AS query
                FROM pg_stat_activity
                WHERE state IS NOT NULL AND state != 'idle' AND pid != pg_backend_pid()
                ORDER BY query_start ASC NULLS LAST
                LIMIT $1";
            return match sqlx::query(sql).bind(i64::from(limit)).fetch_all(&self.pool).await {
                Ok(rows) => {
                    let queries: Vec<Value> = rows.iter().map(row_to_json).collect();
                    DbOutcome::success(json!({
                        "source": "pg_stat_activity",
                        "note": "pg_stat_statements is not enabled; showing active sessions instead",
                        "count": queries.len(),
                        "queries": queries,
                    }))
                }
                Err(e) => DbOutcome::error(e),
            };
        }

        let sql = if new_cols {
            r"SELECT query, calls, total_exec_time AS total_time_ms, mean_exec_time AS avg_time_ms,
                      max_exec_time AS max_time_ms, rows
               FROM pg_stat_statements WHERE mean_exec_time > $1 ORDER BY total_exec_time DESC LIMIT $2"
        } else {
            r"SELECT query, calls, total_time AS total_time_ms, mean_time AS avg_time_ms,
                      max_time AS max_time_ms, rows
               FROM pg_stat_statements WHERE mean_time > $1 ORDER BY total_time DESC LIMIT $2"
        };
        match sqlx::query(sql).bind(min_ms).bind(i64::from(limit)).fetch_all(&self.pool).await {
            Ok(rows) => {
                let queries: Vec<Value> = rows.iter().map(row_to_json).collect();
                DbOutcome::success(json!({ "source": "pg_stat_statements", "count": queries.len(), "queries": queries }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_all_objects(&self, schema: Option<&str>, object_types: Option<&[String]>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let wants = |kind: &str| object_types.is_none_or(|types| types.iter().any(|t| t == kind));
        let mut objects = Vec::new();

        if wants("table") {
            if let Ok(rows) = sqlx::query(
                "SELECT c.relname AS name, c.reltuples::bigint AS estimated_rows
                 FROM pg_class c JOIN pg_namespace n ON n.oid = c.relnamespace
                 WHERE n.nspname = $1 AND c.relkind = 'r'",
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
            if let Ok(rows) = sqlx::query(
                "SELECT viewname AS name, definition FROM pg_views WHERE schemaname = $1",
            )
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
        if wants("sequence") {
            if let Ok(rows) = sqlx::query("SELECT sequencename AS name FROM pg_sequences WHERE schemaname = $1")
                .bind(schema)
                .fetch_all(&self.pool)
                .await
            {
                for row in &rows {
                    objects.push(DbObject {
                        object_type: "sequence".to_string(),
                        name: row.try_get("name").unwrap_or_default(),
                        schema: Some(schema.to_string()),
                        table_name: None,
                        metadata: Value::Null,
                    });
                }
            }
        }
        if wants("index") {
            if let Ok(rows) = sqlx::query("SELECT indexname AS name, tablename AS table_name, indexdef FROM pg_indexes WHERE schemaname = $1")
                .bind(schema)
                .fetch_all(&self.pool)
                .await
            {
                for row in &rows {
                    objects.push(DbObject {
                        object_type: "index".to_string(),
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

    async fn get_object_ddl(&self, object_type: &str, object_name: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        match object_type {
            "index" => {
                let sql = "SELECT indexdef FROM pg_indexes WHERE schemaname = $1 AND indexname = $2";
                match sqlx::query_scalar::<_, String>(sql).bind(schema).bind(object_name).fetch_optional(&self.pool).await {
                    Ok(Some(ddl)) => DbOutcome::success(json!({
                        "object_type": object_type, "object_name": object_name, "schema": schema,
                        "ddl": ddl, "dependencies": [],
                    })),
                    Ok(None) => DbOutcome::error(format!("object not found: {schema}.{object_name}")),
                    Err(e) => DbOutcome::error(e),
                }
            }
            "view" => {
                let sql = "SELECT definition FROM pg_views WHERE schemaname = $1 AND viewname = $2";
                match sqlx::query_scalar::<_, String>(sql).bind(schema).bind(object_name).fetch_optional(&self.pool).await {
                    Ok(Some(def)) => DbOutcome::success(json!({
                        "object_type": object_type, "object_name": object_name, "schema": schema,
                        "ddl": format!("CREATE VIEW {object_name} AS {def}"), "dependencies": [],
                    })),
                    Ok(None) => DbOutcome::error(format!("object not found: {schema}.{object_name}")),
                    Err(e) => DbOutcome::error(e),
                }
            }
            _ => DbOutcome::error(format!(
                "DDL reconstruction for object type '{object_type}' is not supported on this engine"
            )),
        }
    }

    async fn get_object_dependencies(&self, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = r"
            SELECT dependent_view.relname AS object_name, source_table.relname AS depends_on_name
            FROM pg_depend
            JOIN pg_rewrite ON pg_depend.objid = pg_rewrite.oid
            JOIN pg_class AS dependent_view ON pg_rewrite.ev_class = dependent_view.oid
            JOIN pg_class AS source_table ON pg_depend.refobjid = source_table.oid
            JOIN pg_namespace n ON n.oid = dependent_view.relnamespace
            WHERE n.nspname = $1 AND dependent_view.oid != source_table.oid";
        match sqlx::query(sql).bind(schema).fetch_all(&self.pool).await {
            Ok(rows) => {
                let dependencies: Vec<Value> = rows
                    .iter()
                    .map(|row| {
                        json!({
                            "object_type": "view",
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
        let schema = self.schema_or_default(schema);
        let sql = r"
            SELECT tc.constraint_name, tc.table_name, kcu.column_name,
                   ccu.table_name AS referenced_table, ccu.column_name AS referenced_column
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema
            JOIN information_schema.constraint_column_usage ccu
                ON tc.constraint_name = ccu.constraint_name AND tc.table_schema = ccu.table_schema
            WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = $1";
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
                        edges.push((table.clone(), referenced.clone()));
                        row_to_json(row)
                    })
                    .collect();
                let tables: Vec<String> = tables.into_iter().collect();
                let table_order = super::topo_sort_tables(&tables, &edges);
                let deps = ForeignKeyDependencies { edges, table_order };
                DbOutcome::success(json!({
                    "edges": deps.edges,
                    "table_order": deps.table_order,
                    "foreign_keys": foreign_keys,
                }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }
}
