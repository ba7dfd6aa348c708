//! Oracle adapter. The `oracle` crate wraps OCI synchronously, so every
//! call is dispatched through `tokio::task::spawn_blocking`.
//!
//! Feature-detects `DBA_*` views, falling back to `ALL_*`/`USER_*`, and
//! `V$SQL`/`V$SQL_MONITOR` availability, mirroring
//! `original_source/db_agent/core/database/oracle.py`'s `_check_features`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use sqlsage_core::EngineKind;

use crate::error::{DbError, DbResult};
use crate::factory::ConnectionConfig;
use crate::retry::with_retry;
use crate::types::{ColumnInfo, DbInfo, DbObject, DbOutcome, TableSummary};
use crate::DbAdapter;

pub struct OracleAdapter {
    conn: Arc<oracle::Connection>,
    host: String,
    database: String,
    version_full: String,
    has_dba_views: bool,
}

impl OracleAdapter {
    pub async fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        let connect_string = format!("//{}:{}/{}", config.host, config.port, config.database);
        let username = config.username.clone();
        let password = config.password.clone();

        let conn = with_retry(|| {
            let connect_string = connect_string.clone();
            let username = username.clone();
            let password = password.clone();
            async move {
                tokio::task::spawn_blocking(move || oracle::Connection::connect(&username, &password, &connect_string))
                    .await
                    .map_err(|e| DbError::Connection(e.to_string()))?
                    .map_err(|e| DbError::Connection(e.to_string()))
            }
        })
        .await?;
        let conn = Arc::new(conn);

        let version_full = query_scalar_string(&conn, "SELECT banner FROM v$version WHERE ROWNUM = 1")
            .await
            .unwrap_or_else(|| "unknown".to_string());
        let has_dba_views = can_access(&conn, "DBA_TABLES").await;

        Ok(Self {
            conn,
            host: config.host.clone(),
            database: config.database.clone(),
            version_full,
            has_dba_views,
        })
    }

    fn schema_or_default<'a>(&'a self, schema: Option<&'a str>) -> &'a str {
        schema.unwrap_or(&self.database)
    }

    fn table_view(&self) -> &'static str {
        if self.has_dba_views {
            "DBA_TABLES"
        } else {
            "ALL_TABLES"
        }
    }
}

async fn can_access(conn: &Arc<oracle::Connection>, view: &str) -> bool {
    let sql = format!("SELECT 1 FROM {view} WHERE ROWNUM = 1");
    run_blocking_rows(conn, &sql, Vec::new()).await.is_ok()
}

async fn query_scalar_string(conn: &Arc<oracle::Connection>, sql: &str) -> Option<String> {
    let rows = run_blocking_rows(conn, sql, Vec::new()).await.ok()?;
    rows.first()?.as_array()?.first()?.as_str().map(str::to_string)
}

/// Run `sql` on the blocking Oracle connection and collect every row as a
/// JSON array of column values (column names are not reliably available
/// through the synchronous row API without a described statement, so the
/// caller zips its own labels on).
async fn run_blocking_rows(conn: &Arc<oracle::Connection>, sql: &str, binds: Vec<String>) -> Result<Vec<Value>, DbError> {
    let conn = Arc::clone(conn);
    let sql = sql.to_string();
    tokio::task::spawn_blocking(move || {
        let bind_refs: Vec<&dyn oracle::sql_type::ToSql> = binds.iter().map(|b| b as &dyn oracle::sql_type::ToSql).collect();
        let rows = conn.query(&sql, &bind_refs).map_err(|e| DbError::Query(e.to_string()))?;
        let mut out = Vec::new();
        for row_result in rows {
            let row = row_result.map_err(|e| DbError::Query(e.to_string()))?;
            let column_count = row.column_info().len();
            let mut cols = Vec::new();
            for idx in 0..column_count {
                let value: String = row.get(idx).unwrap_or_default();
                cols.push(Value::from(value));
            }
            out.push(Value::Array(cols));
        }
        Ok(out)
    })
    .await
    .map_err(|e| DbError::Query(e.to_string()))?
}

async fn run_blocking_exec(conn: &Arc<oracle::Connection>, sql: &str) -> Result<u64, DbError> {
    let conn = Arc::clone(conn);
    let sql = sql.to_string();
    tokio::task::spawn_blocking(move || {
        conn.execute(&sql, &[]).map_err(|e| DbError::Query(e.to_string()))?;
        conn.commit().map_err(|e| DbError::Query(e.to_string()))?;
        Ok(1)
    })
    .await
    .map_err(|e| DbError::Query(e.to_string()))?
}

#[async_trait]
impl DbAdapter for OracleAdapter {
    fn engine_kind(&self) -> EngineKind {
        EngineKind::Oracle
    }

    async fn get_db_info(&self) -> DbOutcome {
        DbOutcome::success(DbInfo {
            engine: "oracle".to_string(),
            version: self.version_full.clone(),
            version_full: self.version_full.clone(),
            host: self.host.clone(),
            database: self.database.clone(),
            features: json!({ "has_dba_views": self.has_dba_views }),
        })
    }

    async fn list_tables(&self, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema).to_uppercase();
        let view = self.table_view();
        let sql = format!("SELECT table_name, num_rows FROM {view} WHERE owner = '{schema}' ORDER BY table_name");
        match run_blocking_rows(&self.conn, &sql, Vec::new()).await {
            Ok(rows) => {
                let tables: Vec<TableSummary> = rows
                    .iter()
                    .filter_map(Value::as_array)
                    .map(|cols| TableSummary {
                        name: cols.first().and_then(Value::as_str).unwrap_or_default().to_string(),
                        schema: Some(schema.clone()),
                        object_type: "table".to_string(),
                        estimated_rows: cols.get(1).and_then(Value::as_str).and_then(|s| s.parse().ok()),
                        comment: None,
                    })
                    .collect();
                DbOutcome::success(json!({ "tables": tables }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn describe_table(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema).to_uppercase();
        let table_upper = table.to_uppercase();
        let sql = format!(
            "SELECT column_name, data_type, nullable, data_default FROM all_tab_columns \
             WHERE owner = '{schema}' AND table_name = '{table_upper}' ORDER BY column_id"
        );
        let pk_sql = format!(
            "SELECT cols.column_name FROM all_constraints cons, all_cons_columns cols \
             WHERE cons.constraint_type = 'P' AND cons.owner = '{schema}' AND cons.table_name = '{table_upper}' \
             AND cons.constraint_name = cols.constraint_name AND cons.owner = cols.owner"
        );
        let pk_columns: Vec<String> = run_blocking_rows(&self.conn, &pk_sql, Vec::new())
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_array)
            .filter_map(|cols| cols.first().and_then(Value::as_str).map(str::to_string))
            .collect();

        match run_blocking_rows(&self.conn, &sql, Vec::new()).await {
            Ok(rows) if rows.is_empty() => DbOutcome::error(format!("table not found: {schema}.{table}")),
            Ok(rows) => {
                let columns: Vec<ColumnInfo> = rows
                    .iter()
                    .filter_map(Value::as_array)
                    .map(|cols| {
                        let name = cols.first().and_then(Value::as_str).unwrap_or_default().to_string();
                        ColumnInfo {
                            is_primary_key: pk_columns.iter().any(|p| p == &name),
                            name,
                            data_type: cols.get(1).and_then(Value::as_str).unwrap_or_default().to_string(),
                            nullable: cols.get(2).and_then(Value::as_str).map(|s| s == "Y").unwrap_or(true),
                            default: cols.get(3).and_then(Value::as_str).map(str::to_string),
                        }
                    })
                    .collect();
                DbOutcome::success(json!({ "table": table, "schema": schema, "columns": columns }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_sample_data(&self, table: &str, schema: Option<&str>, limit: u32) -> DbOutcome {
        let schema = self.schema_or_default(schema).to_uppercase();
        let sql = format!("SELECT * FROM \"{schema}\".\"{}\" WHERE ROWNUM <= {limit}", table.to_uppercase());
        match run_blocking_rows(&self.conn, &sql, Vec::new()).await {
            Ok(rows) => DbOutcome::success(json!({ "rows": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn list_databases(&self) -> DbOutcome {
        match run_blocking_rows(&self.conn, "SELECT name FROM v$database", Vec::new()).await {
            Ok(rows) => DbOutcome::success(json!({ "databases": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn execute_safe_query(&self, sql: &str) -> DbOutcome {
        let statement = if sqlsage_analyzer::classify_statement(sql) == sqlsage_analyzer::StatementKind::ReadOnly {
            sql.to_string()
        } else {
            format!("SELECT {sql}")
        };
        if sqlsage_analyzer::classify_statement(&statement) != sqlsage_analyzer::StatementKind::ReadOnly {
            return DbOutcome::error("execute_safe_query only accepts read-only statements");
        }
        match run_blocking_rows(&self.conn, &statement, Vec::new()).await {
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
        match run_blocking_exec(&self.conn, sql).await {
            Ok(n) => DbOutcome::success(json!({ "rows_affected": n })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn run_explain(&self, sql: &str, analyze: bool) -> DbOutcome {
        let plan_sql = format!("EXPLAIN PLAN FOR {sql}");
        if let Err(e) = run_blocking_exec(&self.conn, &plan_sql).await {
            return DbOutcome::error(e);
        }
        let fetch_sql = "SELECT plan_table_output FROM table(dbms_xplan.display())";
        match run_blocking_rows(&self.conn, fetch_sql, Vec::new()).await {
            Ok(rows) => {
                let lines: Vec<String> = rows
                    .iter()
                    .filter_map(Value::as_array)
                    .filter_map(|cols| cols.first().and_then(Value::as_str).map(str::to_string))
                    .collect();
                DbOutcome::success(json!({ "plan": lines, "analyzed": analyze, "sql": sql }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn create_index(&self, sql: &str, _concurrent: bool) -> DbOutcome {
        if !sql.trim_start().to_uppercase().starts_with("CREATE") {
            return DbOutcome::error("create_index requires a CREATE INDEX statement");
        }
        match run_blocking_exec(&self.conn, sql).await {
            Ok(_) => DbOutcome::success(json!({ "created": true })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn analyze_table(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema).to_uppercase();
        let sql = format!(
            "BEGIN dbms_stats.gather_table_stats('{schema}', '{}'); END;",
            table.to_uppercase()
        );
        match run_blocking_exec(&self.conn, &sql).await {
            Ok(_) => DbOutcome::success(json!({ "analyzed": table })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn check_index_usage(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema).to_uppercase();
        let idx_view = if self.has_dba_views { "DBA_INDEXES" } else { "ALL_INDEXES" };
        let sql = format!(
            "SELECT index_name, uniqueness FROM {idx_view} WHERE owner = '{schema}' AND table_name = '{}'",
            table.to_uppercase()
        );
        match run_blocking_rows(&self.conn, &sql, Vec::new()).await {
            Ok(rows) => DbOutcome::success(json!({ "table": format!("{schema}.{table}"), "indexes": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_table_stats(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema).to_uppercase();
        let view = self.table_view();
        let sql = format!(
            "SELECT num_rows, blocks, avg_row_len FROM {view} WHERE owner = '{schema}' AND table_name = '{}'",
            table.to_uppercase()
        );
        match run_blocking_rows(&self.conn, &sql, Vec::new()).await {
            Ok(rows) if rows.is_empty() => DbOutcome::error(format!("table not found: {schema}.{table}")),
            Ok(rows) => DbOutcome::success(json!({ "stats": rows.first() })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_running_queries(&self) -> DbOutcome {
        let sql = "SELECT s.sid, s.username, s.status, s.sql_id, q.sql_text \
                    FROM v$session s LEFT JOIN v$sql q ON s.sql_id = q.sql_id \
                    WHERE s.status = 'ACTIVE' AND s.username IS NOT NULL";
        match run_blocking_rows(&self.conn, sql, Vec::new()).await {
            Ok(rows) => DbOutcome::success(json!({ "count": rows.len(), "queries": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn identify_slow_queries(&self, min_ms: f64, limit: u32) -> DbOutcome {
        let available = can_access(&self.conn, "V$SQL").await;
        if !available {
            return self.get_running_queries().await;
        }
        let sql = format!(
            "SELECT sql_text, executions, elapsed_time / 1000 AS total_time_ms, \
                    (elapsed_time / NULLIF(executions, 0)) / 1000 AS avg_time_ms \
             FROM v$sql WHERE executions > 0 AND (elapsed_time / NULLIF(executions, 0)) / 1000 > {min_ms} \
             ORDER BY elapsed_time DESC FETCH FIRST {limit} ROWS ONLY"
        );
        match run_blocking_rows(&self.conn, &sql, Vec::new()).await {
            Ok(rows) => DbOutcome::success(json!({ "source": "v$sql", "count": rows.len(), "queries": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_all_objects(&self, schema: Option<&str>, object_types: Option<&[String]>) -> DbOutcome {
        let schema = self.schema_or_default(schema).to_uppercase();
        let wants = |kind: &str| object_types.is_none_or(|types| types.iter().any(|t| t == kind));
        let mut objects = Vec::new();

        if wants("table") {
            let view = self.table_view();
            let sql = format!("SELECT table_name, num_rows FROM {view} WHERE owner = '{schema}'");
            if let Ok(rows) = run_blocking_rows(&self.conn, &sql, Vec::new()).await {
                for cols in rows.iter().filter_map(Value::as_array) {
                    objects.push(DbObject {
                        object_type: "table".to_string(),
                        name: cols.first().and_then(Value::as_str).unwrap_or_default().to_string(),
                        schema: Some(schema.clone()),
                        table_name: None,
                        metadata: Value::Array(cols.clone()),
                    });
                }
            }
        }
        if wants("sequence") {
            let view = if self.has_dba_views { "DBA_SEQUENCES" } else { "ALL_SEQUENCES" };
            let sql = format!("SELECT sequence_name FROM {view} WHERE sequence_owner = '{schema}'");
            if let Ok(rows) = run_blocking_rows(&self.conn, &sql, Vec::new()).await {
                for cols in rows.iter().filter_map(Value::as_array) {
                    objects.push(DbObject {
                        object_type: "sequence".to_string(),
                        name: cols.first().and_then(Value::as_str).unwrap_or_default().to_string(),
                        schema: Some(schema.clone()),
                        table_name: None,
                        metadata: Value::Null,
                    });
                }
            }
        }
        DbOutcome::success(json!({ "objects": objects }))
    }

    async fn get_object_ddl(&self, object_type: &str, object_name: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema).to_uppercase();
        let sql = format!(
            "SELECT dbms_metadata.get_ddl('{}', '{}', '{schema}') FROM dual",
            object_type.to_uppercase(),
            object_name.to_uppercase()
        );
        match query_scalar_string(&self.conn, &sql).await {
            Some(ddl) => DbOutcome::success(json!({
                "object_type": object_type, "object_name": object_name, "schema": schema,
                "ddl": ddl, "dependencies": [],
            })),
            None => DbOutcome::error(format!("could not reconstruct DDL for {schema}.{object_name}")),
        }
    }

    async fn get_object_dependencies(&self, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema).to_uppercase();
        let sql = format!(
            "SELECT name, referenced_name FROM all_dependencies WHERE owner = '{schema}' AND referenced_owner = '{schema}'"
        );
        match run_blocking_rows(&self.conn, &sql, Vec::new()).await {
            Ok(rows) => {
                let dependencies: Vec<Value> = rows
                    .iter()
                    .filter_map(Value::as_array)
                    .map(|cols| {
                        json!({
                            "object_name": cols.first().and_then(Value::as_str).unwrap_or_default(),
                            "depends_on_name": cols.get(1).and_then(Value::as_str).unwrap_or_default(),
                        })
                    })
                    .collect();
                DbOutcome::success(json!({ "dependencies": dependencies }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_foreign_key_dependencies(&self, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema).to_uppercase();
        let sql = format!(
            "SELECT a.table_name, c.table_name AS referenced_table \
             FROM all_constraints a JOIN all_constraints c ON a.r_constraint_name = c.constraint_name AND a.r_owner = c.owner \
             WHERE a.constraint_type = 'R' AND a.owner = '{schema}'"
        );
        match run_blocking_rows(&self.conn, &sql, Vec::new()).await {
            Ok(rows) => {
                let mut edges = Vec::new();
                let mut tables = std::collections::BTreeSet::new();
                let foreign_keys: Vec<Value> = rows
                    .iter()
                    .filter_map(Value::as_array)
                    .map(|cols| {
                        let table = cols.first().and_then(Value::as_str).unwrap_or_default().to_string();
                        let referenced = cols.get(1).and_then(Value::as_str).unwrap_or_default().to_string();
                        tables.insert(table.clone());
                        tables.insert(referenced.clone());
                        edges.push((table.clone(), referenced.clone()));
                        json!({ "table": table, "referenced_table": referenced })
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
