//! EXPLAIN-plan issue detection (spec §4.4(b)), one parser per engine family,
//! transcribed from `original_source/db_agent/core/sql_analyzer.py`'s
//! `_parse_postgresql_plan` / `_parse_mysql_plan` / `_parse_oracle_plan`.

use regex::Regex;
use std::sync::LazyLock;

use crate::{Issue, IssueLevel, PerformanceCheck, PerformanceSummary, Thresholds};
use sqlsage_core::EngineKind;

static COST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"cost=[\d.]+\.\.([\d.]+)").unwrap());
static SEQ_SCAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Seq Scan on (\w+).*?rows=(\d+)").unwrap());
static ROWS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"rows=(\d+)").unwrap());
static NESTED_LOOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Nested Loop.*?rows=(\d+)").unwrap());

static ORACLE_COST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Cost\s*\(%CPU\):\s*(\d+)").unwrap());
static ORACLE_FULL_SCAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)TABLE ACCESS FULL\s*\|\s*(\w+)").unwrap());
static ORACLE_INDEX_FULL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)INDEX FULL SCAN\s*\|\s*(\w+)").unwrap());
static ORACLE_ROWS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Rows:\s*(\d+)").unwrap());
static ORACLE_SORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SORT (ORDER BY|GROUP BY|UNIQUE)").unwrap());

/// Parse an engine-native EXPLAIN plan (as raw text lines) into a
/// [`PerformanceCheck`].
#[must_use]
pub fn parse_explain(engine: EngineKind, plan_lines: &[String], t: Thresholds) -> PerformanceCheck {
    if plan_lines.is_empty() {
        return PerformanceCheck::from_issues(Vec::new(), PerformanceSummary::default());
    }
    let (issues, summary) = match engine {
        EngineKind::PostgreSql | EngineKind::GaussDb => parse_postgres_plan(plan_lines, t),
        EngineKind::MySql => parse_mysql_plan(plan_lines, t),
        EngineKind::Oracle => parse_oracle_plan(plan_lines, t),
        EngineKind::SqlServer => parse_sqlserver_plan(plan_lines, t),
    };
    PerformanceCheck::from_issues(issues, summary)
}

fn parse_postgres_plan(lines: &[String], t: Thresholds) -> (Vec<Issue>, PerformanceSummary) {
    let text = lines.join("\n");
    let mut issues = Vec::new();
    let mut summary = PerformanceSummary::default();

    if let Some(cap) = COST_RE.captures(&text) {
        let cost: f64 = cap[1].parse().unwrap_or(0.0);
        summary.total_cost = Some(cost);
        if cost > t.high_cost {
            issues.push(Issue {
                level: IssueLevel::Warning,
                kind: "high_cost".into(),
                message: format!("plan cost is high: {cost:.0}"),
                suggestion: Some("consider adding an index or narrowing the filter".into()),
                object: None,
            });
        }
    }

    let mut found_full_scan = false;
    for cap in SEQ_SCAN_RE.captures_iter(&text) {
        let table = cap[1].to_string();
        let rows: i64 = cap[2].parse().unwrap_or(0);
        summary.scan_types.push(format!("Seq Scan on {table}"));
        if rows > t.full_scan_rows {
            found_full_scan = true;
            issues.push(Issue {
                level: IssueLevel::Critical,
                kind: "full_table_scan".into(),
                message: format!("table {table} is fully scanned, estimated {rows} rows"),
                suggestion: Some("add an index on the filter columns".into()),
                object: Some(table),
            });
        }
    }

    let max_rows = ROWS_RE
        .captures_iter(&text)
        .filter_map(|c| c[1].parse::<i64>().ok())
        .max()
        .unwrap_or(0);
    summary.estimated_rows = Some(max_rows);
    if max_rows > t.large_result_rows && !found_full_scan {
        issues.push(Issue {
            level: IssueLevel::Warning,
            kind: "large_result_set".into(),
            message: format!("estimated result set is large: {max_rows} rows"),
            suggestion: Some("add more filter conditions or a LIMIT".into()),
            object: None,
        });
    }

    for cap in NESTED_LOOP_RE.captures_iter(&text) {
        let rows: i64 = cap[1].parse().unwrap_or(0);
        if rows > t.nested_loop_rows {
            issues.push(Issue {
                level: IssueLevel::Warning,
                kind: "nested_loop".into(),
                message: format!("nested loop outer side is large: {rows} rows"),
                suggestion: Some("consider a hash or merge join, or index the join columns".into()),
                object: None,
            });
        }
    }

    (issues, summary)
}

fn parse_mysql_plan(lines: &[String], t: Thresholds) -> (Vec<Issue>, PerformanceSummary) {
    let mut issues = Vec::new();
    let mut summary = PerformanceSummary::default();
    let mut total_rows: i64 = 0;
    let mut found_full_scan = false;

    for line in lines {
        // Each line is expected in "table|type|rows|Extra" form (one row of
        // MySQL's EXPLAIN tabular output, pre-flattened by the adapter).
        let parts: Vec<&str> = line.splitn(4, '|').collect();
        if parts.len() < 3 {
            continue;
        }
        let table = parts[0].trim();
        let access_type = parts[1].trim().to_uppercase();
        let rows: i64 = parts[2].trim().parse().unwrap_or(0);
        let extra = parts.get(3).copied().unwrap_or("");

        total_rows = total_rows.saturating_add(rows);
        summary.scan_types.push(format!("{access_type} on {table}"));

        if access_type == "ALL" && rows > t.full_scan_rows {
            found_full_scan = true;
            issues.push(Issue {
                level: IssueLevel::Critical,
                kind: "full_table_scan".into(),
                message: format!("table {table} is fully scanned (type=ALL), estimated {rows} rows"),
                suggestion: Some("add an index on the filter columns".into()),
                object: Some(table.to_string()),
            });
        } else if access_type == "INDEX" && rows > t.full_scan_rows {
            issues.push(Issue {
                level: IssueLevel::Warning,
                kind: "index_scan".into(),
                message: format!("table {table} is fully index-scanned, {rows} rows"),
                suggestion: Some("use a more selective index lookup".into()),
                object: Some(table.to_string()),
            });
        }

        if extra.contains("Using filesort") && rows > t.nested_loop_rows {
            issues.push(Issue {
                level: IssueLevel::Warning,
                kind: "filesort".into(),
                message: format!("table {table} uses filesort over {rows} rows"),
                suggestion: Some("add an index covering the ORDER BY columns".into()),
                object: Some(table.to_string()),
            });
        }
        if extra.contains("Using temporary") {
            issues.push(Issue {
                level: IssueLevel::Warning,
                kind: "temporary_table".into(),
                message: format!("table {table} requires a temporary table"),
                suggestion: Some("review the GROUP BY / DISTINCT clause".into()),
                object: Some(table.to_string()),
            });
        }
    }

    summary.estimated_rows = Some(total_rows);
    if total_rows > t.large_result_rows && !found_full_scan {
        issues.push(Issue {
            level: IssueLevel::Warning,
            kind: "large_result_set".into(),
            message: format!("estimated rows processed is large: {total_rows}"),
            suggestion: Some("add more filter conditions or a LIMIT".into()),
            object: None,
        });
    }

    (issues, summary)
}

fn parse_oracle_plan(lines: &[String], t: Thresholds) -> (Vec<Issue>, PerformanceSummary) {
    let text = lines.join("\n");
    let mut issues = Vec::new();
    let mut summary = PerformanceSummary::default();

    if let Some(cap) = ORACLE_COST_RE.captures(&text) {
        let cost: f64 = cap[1].parse().unwrap_or(0.0);
        summary.total_cost = Some(cost);
        if cost > t.high_cost {
            issues.push(Issue {
                level: IssueLevel::Warning,
                kind: "high_cost".into(),
                message: format!("plan cost is high: {cost:.0}"),
                suggestion: Some("consider adding an index or narrowing the filter".into()),
                object: None,
            });
        }
    }

    for cap in ORACLE_FULL_SCAN_RE.captures_iter(&text) {
        let table = cap[1].to_string();
        summary.scan_types.push(format!("TABLE ACCESS FULL on {table}"));
        let rows = Regex::new(&format!(r"(?is){table}.*?Rows:\s*(\d+)"))
            .ok()
            .and_then(|re| re.captures(&text))
            .and_then(|c| c[1].parse::<i64>().ok())
            .unwrap_or(0);
        if rows > t.full_scan_rows {
            issues.push(Issue {
                level: IssueLevel::Critical,
                kind: "full_table_scan".into(),
                message: format!(
                    "table {table} is fully scanned (TABLE ACCESS FULL), estimated {rows} rows"
                ),
                suggestion: Some("add an index on the filter columns".into()),
                object: Some(table),
            });
        } else if rows == 0 {
            issues.push(Issue {
                level: IssueLevel::Warning,
                kind: "full_table_scan".into(),
                message: format!("table {table} is fully scanned (TABLE ACCESS FULL)"),
                suggestion: Some("add an index on the filter columns".into()),
                object: Some(table),
            });
        }
    }

    for cap in ORACLE_INDEX_FULL_RE.captures_iter(&text) {
        let index = cap[1].to_string();
        summary.scan_types.push(format!("INDEX FULL SCAN on {index}"));
        issues.push(Issue {
            level: IssueLevel::Warning,
            kind: "index_full_scan".into(),
            message: format!("index full scan on {index}"),
            suggestion: Some("use a more selective index lookup".into()),
            object: Some(index),
        });
    }

    if text.to_uppercase().contains("NESTED LOOPS") {
        let max_rows = ORACLE_ROWS_RE
            .captures_iter(&text)
            .filter_map(|c| c[1].parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        if max_rows > t.nested_loop_rows {
            issues.push(Issue {
                level: IssueLevel::Warning,
                kind: "nested_loop".into(),
                message: format!("nested loop join outer side is large: {max_rows} rows"),
                suggestion: Some("consider a hash join or index the join columns".into()),
                object: None,
            });
        }
    }

    for cap in ORACLE_SORT_RE.captures_iter(&text) {
        issues.push(Issue {
            level: IssueLevel::Info,
            kind: "sort_operation".into(),
            message: format!("plan performs a SORT {}", &cap[1]),
            suggestion: None,
            object: None,
        });
    }

    (issues, summary)
}

fn parse_sqlserver_plan(lines: &[String], t: Thresholds) -> (Vec<Issue>, PerformanceSummary) {
    // SQL Server's showplan XML is not modeled here; the adapter instead
    // flattens it to "operator|object|rows" lines, the same shape MySQL's
    // plan rows use, so the MySQL-family heuristics apply directly.
    parse_mysql_plan(lines, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_full_scan_is_critical() {
        let lines = vec!["Seq Scan on orders  (cost=0.00..123456.00 rows=500000 width=40)".to_string()];
        let check = parse_explain(EngineKind::PostgreSql, &lines, Thresholds::default());
        assert!(check.should_confirm);
        assert!(
            check
                .issues
                .iter()
                .any(|i| i.kind == "full_table_scan" && i.level == IssueLevel::Critical)
        );
    }

    #[test]
    fn mysql_all_scan_is_critical() {
        let lines = vec!["orders|ALL|50000|Using filesort".to_string()];
        let check = parse_explain(EngineKind::MySql, &lines, Thresholds::default());
        assert!(check.should_confirm);
    }

    #[test]
    fn oracle_sort_is_info_only() {
        let lines = vec!["SORT ORDER BY | orders |".to_string()];
        let check = parse_explain(EngineKind::Oracle, &lines, Thresholds::default());
        assert!(!check.should_confirm);
        assert!(check.issues.iter().any(|i| i.level == IssueLevel::Info));
    }
}
