//! Analytical-query classification (spec §4.4(a)).

use regex::Regex;
use std::sync::LazyLock;

/// Keyword/construct patterns that mark a `SELECT` as analytical, transcribed
/// from `original_source/db_agent/core/sql_analyzer.py`'s `ANALYTICAL_PATTERNS`.
static ANALYTICAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bJOIN\b",
        r"\bGROUP\s+BY\b",
        r"\bORDER\s+BY\b",
        r"\bDISTINCT\b",
        r"\bUNION\b",
        r"\bINTERSECT\b",
        r"\bEXCEPT\b",
        r"\bWITH\s+\w+\s+AS\b",
        r"\bOVER\s*\(",
        r"\bROW_NUMBER\s*\(",
        r"\bRANK\s*\(",
        r"\bDENSE_RANK\s*\(",
        r"\bLAG\s*\(",
        r"\bLEAD\s*\(",
        r"\bSUM\s*\(",
        r"\bCOUNT\s*\(",
        r"\bAVG\s*\(",
        r"\bMIN\s*\(",
        r"\bMAX\s*\(",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("static pattern is valid regex"))
    .collect()
});

static WHERE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bWHERE\b").unwrap());
static LIMIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bLIMIT\b").unwrap());
static TOP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bTOP\s+\d+\b").unwrap());
static QUOTED_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'[^']*'").unwrap());
static QUOTED_DOUBLE: LazyLock<Regex> = LazyLock::new(|| Regex::new("\"[^\"]*\"").unwrap());
static SELECT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bSELECT\b").unwrap());

/// Whether `sql` is an "analytical" `SELECT` eligible for the performance
/// gate: it touches multiple tables, aggregates/sorts/windows, contains a
/// subquery, or is an unbounded full scan.
///
/// Mirrors `SQLAnalyzer.is_analytical_query` in the Python original verbatim,
/// including the conservative "no WHERE and no LIMIT/TOP" full-scan rule.
#[must_use]
pub fn is_analytical_query(sql: &str) -> bool {
    let trimmed = sql.trim();
    if !trimmed.to_uppercase().starts_with("SELECT") {
        return false;
    }

    if ANALYTICAL_PATTERNS.iter().any(|re| re.is_match(sql)) {
        return true;
    }

    if has_subquery(sql) {
        return true;
    }

    is_full_table_scan_without_filter(sql)
}

fn has_subquery(sql: &str) -> bool {
    let cleaned = QUOTED_SINGLE.replace_all(sql, "''");
    let cleaned = QUOTED_DOUBLE.replace_all(&cleaned, "\"\"");
    SELECT_RE.find_iter(&cleaned).count() > 1
}

fn is_full_table_scan_without_filter(sql: &str) -> bool {
    !WHERE_RE.is_match(sql) && !LIMIT_RE.is_match(sql) && !TOP_RE.is_match(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_select_with_where_is_not_analytical() {
        assert!(!is_analytical_query("SELECT * FROM users WHERE id = 1"));
    }

    #[test]
    fn join_is_analytical() {
        assert!(is_analytical_query(
            "SELECT * FROM orders JOIN line_items USING(order_id)"
        ));
    }

    #[test]
    fn unbounded_scan_is_analytical() {
        assert!(is_analytical_query("SELECT * FROM orders"));
    }

    #[test]
    fn limited_scan_is_not_analytical() {
        assert!(!is_analytical_query("SELECT * FROM orders LIMIT 10"));
    }

    #[test]
    fn subquery_is_analytical() {
        assert!(is_analytical_query(
            "SELECT * FROM orders WHERE customer_id IN (SELECT id FROM customers WHERE vip)"
        ));
    }

    #[test]
    fn non_select_is_never_analytical() {
        assert!(!is_analytical_query("UPDATE orders SET status = 'shipped'"));
    }
}
