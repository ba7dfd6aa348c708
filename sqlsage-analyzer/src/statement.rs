//! Read/write statement classification, used by `sqlsage-db` to decide
//! whether `execute_sql` can run immediately or must enqueue a confirmation
//! (spec §4.3), and by `execute_safe_query` to reject non-read-only text.
//!
//! Grounded on the teacher's `safety::parser` prefix-driven classification
//! shape, simplified to the two buckets the spec actually needs: read-only
//! vs. everything else. A full AST-based classifier (sqlparser) would still
//! mis-handle some engine-specific DDL dialects the spec's five engines use,
//! so — like the Python original — this stays a prefix classifier, with
//! `sqlparser` reserved for statements the analyzer genuinely parses.

/// Coarse statement classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `SELECT`, `WITH`, `SHOW`, `EXPLAIN`, `DESCRIBE` — safe to run without
    /// confirmation.
    ReadOnly,
    /// Everything else: DML/DDL/DCL, which mutates state.
    Mutating,
}

const READ_ONLY_PREFIXES: &[&str] = &["SELECT", "WITH", "SHOW", "EXPLAIN", "DESCRIBE", "DESC"];

/// Classify a SQL statement's leading keyword as read-only or mutating.
#[must_use]
pub fn classify_statement(sql: &str) -> StatementKind {
    let upper = sql.trim_start().to_uppercase();
    if READ_ONLY_PREFIXES
        .iter()
        .any(|prefix| upper.starts_with(prefix))
    {
        StatementKind::ReadOnly
    } else {
        StatementKind::Mutating
    }
}

/// Statements that cannot run inside a transaction on most engines and must
/// be executed in autocommit mode (spec §4.3: "DDL/DCL statements that cannot
/// run inside a transaction").
const AUTOCOMMIT_ONLY_PREFIXES: &[&str] = &[
    "CREATE DATABASE",
    "DROP DATABASE",
    "VACUUM",
    "CREATE INDEX CONCURRENTLY",
    "DROP INDEX CONCURRENTLY",
    "ALTER DATABASE",
    "REINDEX",
];

/// Whether `sql` must run in autocommit mode rather than inside the adapter's
/// usual single-transaction-with-rollback wrapper.
#[must_use]
pub fn requires_autocommit(sql: &str) -> bool {
    let upper = sql.trim_start().to_uppercase();
    AUTOCOMMIT_ONLY_PREFIXES
        .iter()
        .any(|prefix| upper.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_is_read_only() {
        assert_eq!(classify_statement("  select 1"), StatementKind::ReadOnly);
    }

    #[test]
    fn update_is_mutating() {
        assert_eq!(
            classify_statement("UPDATE users SET active = false"),
            StatementKind::Mutating
        );
    }

    #[test]
    fn create_database_needs_autocommit() {
        assert!(requires_autocommit("CREATE DATABASE foo"));
        assert!(!requires_autocommit("CREATE TABLE foo (id int)"));
    }
}
