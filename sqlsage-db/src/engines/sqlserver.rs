//! SQL Server adapter built on `tiberius`, grounded on
//! `original_source/db_agent/core/database/sqlserver.py`'s `sys.*` catalog
//! view queries and its `dm_exec_query_stats`/`dm_exec_requests` feature
//! detection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use sqlsage_core::EngineKind;

use crate::error::{DbError, DbResult};
use crate::factory::ConnectionConfig;
use crate::retry::with_retry;
use crate::types::{ColumnInfo, DbInfo, DbOutcome, TableSummary};
use crate::DbAdapter;

type TiberiusClient = Client<Compat<TcpStream>>;

pub struct SqlServerAdapter {
    client: Arc<Mutex<TiberiusClient>>,
    host: String,
    database: String,
    version_full: String,
    has_query_stats: bool,
}

impl SqlServerAdapter {
    pub async fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        let mut tb_config = Config::new();
        tb_config.host(&config.host);
        tb_config.port(config.port);
        tb_config.database(&config.database);
        tb_config.authentication(AuthMethod::sql_server(&config.username, &config.password));
        tb_config.trust_cert();

        let addr = format!("{}:{}", config.host, config.port);
        let client = with_retry(|| {
            let tb_config = tb_config.clone();
            let addr = addr.clone();
            async move {
                let tcp = tokio::time::timeout(Duration::from_secs(10), TcpStream::connect(&addr))
                    .await
                    .map_err(|_| DbError::Connection("connection timed out".to_string()))?
                    .map_err(|e| DbError::Connection(e.to_string()))?;
                tcp.set_nodelay(true).ok();
                Client::connect(tb_config, tcp.compat_write())
                    .await
                    .map_err(|e| DbError::Connection(e.to_string()))
            }
        })
        .await?;
        let client = Arc::new(Mutex::new(client));

        let version_full = query_scalar_string(&client, "SELECT @@VERSION").await.unwrap_or_else(|| "unknown".to_string());
        let has_query_stats = can_access(&client, "SELECT TOP 1 1 FROM sys.dm_exec_query_stats").await;

        Ok(Self {
            client,
            host: config.host.clone(),
            database: config.database.clone(),
            version_full,
            has_query_stats,
        })
    }

    fn schema_or_default<'a>(&'a self, schema: Option<&'a str>) -> &'a str {
        schema.unwrap_or("dbo")
    }
}

async fn can_access(client: &Arc<Mutex<TiberiusClient>>, probe_sql: &str) -> bool {
    run_rows(client, probe_sql).await.is_ok()
}

async fn query_scalar_string(client: &Arc<Mutex<TiberiusClient>>, sql: &str) -> Option<String> {
    let rows = run_rows(client, sql).await.ok()?;
    rows.first()?
        .as_array()?
        .first()?
        .as_str()
        .map(str::to_string)
}

async fn run_rows(client: &Arc<Mutex<TiberiusClient>>, sql: &str) -> Result<Vec<Value>, DbError> {
    let mut guard = client.lock().await;
    let stream = guard.simple_query(sql).await.map_err(|e| DbError::Query(e.to_string()))?;
    let rows = stream.into_first_result().await.map_err(|e| DbError::Query(e.to_string()))?;
    Ok(rows
        .iter()
        .map(|row| {
            let cols: Vec<Value> = (0..row.len())
                .map(|i| {
                    row.get::<&str, usize>(i)
                        .map(|s| Value::from(s.to_string()))
                        .unwrap_or(Value::Null)
                })
                .collect();
            Value::Array(cols)
        })
        .collect())
}

async fn run_exec(client: &Arc<Mutex<TiberiusClient>>, sql: &str) -> Result<u64, DbError> {
    let mut guard = client.lock().await;
    let result = guard.execute(sql, &[]).await.map_err(|e| DbError::Query(e.to_string()))?;
    Ok(result.rows_affected().iter().sum())
}

#[async_trait]
impl DbAdapter for SqlServerAdapter {
    fn engine_kind(&self) -> EngineKind {
        EngineKind::SqlServer
    }

    async fn get_db_info(&self) -> DbOutcome {
        DbOutcome::success(DbInfo {
            engine: "sqlserver".to_string(),
            version: self.version_full.clone(),
            version_full: self.version_full.clone(),
            host: self.host.clone(),
            database: self.database.clone(),
            features: json!({ "has_dm_exec_query_stats": self.has_query_stats }),
        })
    }

    async fn list_tables(&self, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = format!(
            "SELECT t.name, p.rows FROM sys.tables t \
             INNER JOIN sys.schemas s ON t.schema_id = s.schema_id \
             INNER JOIN sys.partitions p ON t.object_id = p.object_id AND p.index_id IN (0, 1) \
             WHERE s.name = '{schema}' ORDER BY t.name"
        );
        match run_rows(&self.client, &sql).await {
            Ok(rows) => {
                let tables: Vec<TableSummary> = rows
                    .iter()
                    .filter_map(Value::as_array)
                    .map(|cols| TableSummary {
                        name: cols.first().and_then(Value::as_str).unwrap_or_default().to_string(),
                        schema: Some(schema.to_string()),
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
        let schema = self.schema_or_default(schema);
        let sql = format!(
            "SELECT c.name, t.name AS data_type, c.is_nullable, dc.definition \
             FROM sys.columns c \
             INNER JOIN sys.types t ON c.user_type_id = t.user_type_id \
             INNER JOIN sys.tables tb ON c.object_id = tb.object_id \
             INNER JOIN sys.schemas s ON tb.schema_id = s.schema_id \
             LEFT JOIN sys.default_constraints dc ON c.default_object_id = dc.object_id \
             WHERE s.name = '{schema}' AND tb.name = '{table}' ORDER BY c.column_id"
        );
        match run_rows(&self.client, &sql).await {
            Ok(rows) if rows.is_empty() => DbOutcome::error(format!("table not found: {schema}.{table}")),
            Ok(rows) => {
                let columns: Vec<ColumnInfo> = rows
                    .iter()
                    .filter_map(Value::as_array)
                    .map(|cols| ColumnInfo {
                        name: cols.first().and_then(Value::as_str).unwrap_or_default().to_string(),
                        data_type: cols.get(1).and_then(Value::as_str).unwrap_or_default().to_string(),
                        nullable: cols.get(2).and_then(Value::as_str).map(|s| s == "1" || s == "true").unwrap_or(true),
                        default: cols.get(3).and_then(Value::as_str).map(str::to_string),
                        is_primary_key: false,
                    })
                    .collect();
                DbOutcome::success(json!({ "table": table, "schema": schema, "columns": columns }))
            }
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_sample_data(&self, table: &str, schema: Option<&str>, limit: u32) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = format!("SELECT TOP {limit} * FROM [{schema}].[{table}]");
        match run_rows(&self.client, &sql).await {
            Ok(rows) => DbOutcome::success(json!({ "rows": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn list_databases(&self) -> DbOutcome {
        match run_rows(&self.client, "SELECT name FROM sys.databases").await {
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
        match run_rows(&self.client, &statement).await {
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
        match run_exec(&self.client, sql).await {
            Ok(n) => DbOutcome::success(json!({ "rows_affected": n })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn run_explain(&self, sql: &str, analyze: bool) -> DbOutcome {
        let mut guard = self.client.lock().await;
        if let Err(e) = guard.simple_query("SET SHOWPLAN_XML ON").await {
            return DbOutcome::error(e);
        }
        let result = guard.simple_query(sql).await;
        let plan = match result {
            Ok(stream) => stream.into_first_result().await,
            Err(e) => return DbOutcome::error(e),
        };
        let _ = guard.simple_query("SET SHOWPLAN_XML OFF").await;
        match plan {
            Ok(rows) => {
                let lines: Vec<String> = rows
                    .iter()
                    .filter_map(|row| row.get::<&str, usize>(0))
                    .map(str::to_string)
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
        match run_exec(&self.client, sql).await {
            Ok(_) => DbOutcome::success(json!({ "created": true })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn analyze_table(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = format!("UPDATE STATISTICS [{schema}].[{table}]");
        match run_exec(&self.client, &sql).await {
            Ok(_) => DbOutcome::success(json!({ "analyzed": table })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn check_index_usage(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = format!(
            "SELECT i.name, COALESCE(ius.user_seeks, 0) + COALESCE(ius.user_scans, 0) AS usage_count \
             FROM sys.indexes i \
             INNER JOIN sys.tables t ON i.object_id = t.object_id \
             INNER JOIN sys.schemas s ON t.schema_id = s.schema_id \
             LEFT JOIN sys.dm_db_index_usage_stats ius ON i.object_id = ius.object_id AND i.index_id = ius.index_id \
             WHERE s.name = '{schema}' AND t.name = '{table}'"
        );
        match run_rows(&self.client, &sql).await {
            Ok(rows) => DbOutcome::success(json!({ "table": format!("{schema}.{table}"), "indexes": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_table_stats(&self, table: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = format!(
            "SELECT p.rows, SUM(a.used_pages) * 8 AS used_kb \
             FROM sys.tables t \
             INNER JOIN sys.schemas s ON t.schema_id = s.schema_id \
             INNER JOIN sys.partitions p ON t.object_id = p.object_id AND p.index_id IN (0, 1) \
             INNER JOIN sys.allocation_units a ON p.partition_id = a.container_id \
             WHERE s.name = '{schema}' AND t.name = '{table}' GROUP BY p.rows"
        );
        match run_rows(&self.client, &sql).await {
            Ok(rows) if rows.is_empty() => DbOutcome::error(format!("table not found: {schema}.{table}")),
            Ok(rows) => DbOutcome::success(json!({ "stats": rows.first() })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_running_queries(&self) -> DbOutcome {
        let sql = "SELECT r.session_id, s.login_name, r.status, qt.text \
                    FROM sys.dm_exec_requests r \
                    INNER JOIN sys.dm_exec_sessions s ON r.session_id = s.session_id \
                    CROSS APPLY sys.dm_exec_sql_text(r.sql_handle) qt \
                    WHERE r.status = 'running'";
        match run_rows(&self.client, sql).await {
            Ok(rows) => DbOutcome::success(json!({ "count": rows.len(), "queries": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn identify_slow_queries(&self, min_ms: f64, limit: u32) -> DbOutcome {
        if !self.has_query_stats {
            return self.get_running_queries().await;
        }
        let sql = format!(
            "SELECT TOP {limit} qt.text, qs.execution_count, \
                    qs.total_elapsed_time / 1000 AS total_time_ms, \
                    (qs.total_elapsed_time / NULLIF(qs.execution_count, 0)) / 1000 AS avg_time_ms \
             FROM sys.dm_exec_query_stats qs \
             CROSS APPLY sys.dm_exec_sql_text(qs.sql_handle) qt \
             WHERE (qs.total_elapsed_time / NULLIF(qs.execution_count, 0)) / 1000 > {min_ms} \
             ORDER BY qs.total_elapsed_time DESC"
        );
        match run_rows(&self.client, &sql).await {
            Ok(rows) => DbOutcome::success(json!({ "source": "dm_exec_query_stats", "count": rows.len(), "queries": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_all_objects(&self, schema: Option<&str>, object_types: Option<&[String]>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let wants = |kind: &str| object_types.is_none_or(|types| types.iter().any(|t| t == kind));
        let mut objects = Vec::new();

        if wants("table") {
            let sql = format!(
                "SELECT t.name FROM sys.tables t INNER JOIN sys.schemas s ON t.schema_id = s.schema_id WHERE s.name = '{schema}'"
            );
            if let Ok(rows) = run_rows(&self.client, &sql).await {
                for cols in rows.iter().filter_map(Value::as_array) {
                    objects.push(crate::types::DbObject {
                        object_type: "table".to_string(),
                        name: cols.first().and_then(Value::as_str).unwrap_or_default().to_string(),
                        schema: Some(schema.to_string()),
                        table_name: None,
                        metadata: Value::Null,
                    });
                }
            }
        }
        if wants("view") {
            let sql = format!(
                "SELECT v.name FROM sys.views v INNER JOIN sys.schemas s ON v.schema_id = s.schema_id WHERE s.name = '{schema}'"
            );
            if let Ok(rows) = run_rows(&self.client, &sql).await {
                for cols in rows.iter().filter_map(Value::as_array) {
                    objects.push(crate::types::DbObject {
                        object_type: "view".to_string(),
                        name: cols.first().and_then(Value::as_str).unwrap_or_default().to_string(),
                        schema: Some(schema.to_string()),
                        table_name: None,
                        metadata: Value::Null,
                    });
                }
            }
        }
        DbOutcome::success(json!({ "objects": objects }))
    }

    async fn get_object_ddl(&self, object_type: &str, object_name: &str, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = format!("EXEC sp_helptext '{schema}.{object_name}'");
        match run_rows(&self.client, &sql).await {
            Ok(rows) if !rows.is_empty() => {
                let ddl: String = rows
                    .iter()
                    .filter_map(Value::as_array)
                    .filter_map(|cols| cols.first().and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("\n");
                DbOutcome::success(json!({
                    "object_type": object_type, "object_name": object_name, "schema": schema,
                    "ddl": ddl, "dependencies": [],
                }))
            }
            Ok(_) => DbOutcome::error(format!("object not found or has no text: {schema}.{object_name}")),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_object_dependencies(&self, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = format!(
            "SELECT referencing_entity_name, referenced_entity_name \
             FROM sys.dm_sql_referencing_entities('{schema}.*', 'OBJECT')"
        );
        match run_rows(&self.client, &sql).await {
            Ok(rows) => DbOutcome::success(json!({ "dependencies": rows })),
            Err(e) => DbOutcome::error(e),
        }
    }

    async fn get_foreign_key_dependencies(&self, schema: Option<&str>) -> DbOutcome {
        let schema = self.schema_or_default(schema);
        let sql = format!(
            "SELECT tp.name AS referencing_table, tr.name AS referenced_table \
             FROM sys.foreign_keys fk \
             INNER JOIN sys.tables tp ON fk.parent_object_id = tp.object_id \
             INNER JOIN sys.tables tr ON fk.referenced_object_id = tr.object_id \
             INNER JOIN sys.schemas s ON tp.schema_id = s.schema_id \
             WHERE s.name = '{schema}'"
        );
        match run_rows(&self.client, &sql).await {
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
