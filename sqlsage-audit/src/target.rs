//! Best-effort extraction of the object a SQL statement targets, for the
//! audit log's `target_type`/`target_name` columns. Transcribed from the
//! original operation log's keyword-offset heuristics: it does not parse
//! SQL, it looks at the tokens immediately following a handful of keywords.

/// Guess the target type (`table`, `index`, `query`) and name a SQL
/// statement operates on. Returns `(None, None)` for anything unrecognized.
#[must_use]
pub fn extract_sql_target(sql: &str) -> (Option<&'static str>, Option<String>) {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return (None, None);
    }
    let upper = trimmed.to_uppercase();
    let parts: Vec<&str> = trimmed.split_whitespace().collect();

    if upper.starts_with("SELECT") {
        return match upper.find("FROM") {
            Some(idx) => (
                Some("table"),
                first_word_after(trimmed, idx + "FROM".len()),
            ),
            None => (Some("query"), None),
        };
    }

    if upper.starts_with("INSERT") {
        return match upper.find("INTO") {
            Some(idx) => (
                Some("table"),
                first_word_after(trimmed, idx + "INTO".len()).map(|s| trim_paren(&s)),
            ),
            None => (Some("table"), None),
        };
    }

    if upper.starts_with("UPDATE") {
        return match parts.get(1) {
            Some(name) => (Some("table"), Some(trim_punct(name))),
            None => (Some("table"), None),
        };
    }

    if upper.starts_with("DELETE") {
        return match upper.find("FROM") {
            Some(idx) => (
                Some("table"),
                first_word_after(trimmed, idx + "FROM".len()),
            ),
            None => (Some("table"), None),
        };
    }

    if upper.starts_with("CREATE TABLE") {
        let mut offset = 2;
        if parts.get(offset).is_some_and(|w| w.eq_ignore_ascii_case("if")) {
            offset = 5;
        }
        return (
            Some("table"),
            parts.get(offset).map(|w| trim_paren(&trim_punct(w))),
        );
    }

    if upper.starts_with("CREATE INDEX") || upper.starts_with("CREATE UNIQUE INDEX") {
        let mut offset = if upper.contains("UNIQUE") { 3 } else { 2 };
        if parts.get(offset).is_some_and(|w| w.eq_ignore_ascii_case("if")) {
            offset += 3;
        }
        return (
            Some("index"),
            parts.get(offset).map(|w| trim_paren(&trim_punct(w))),
        );
    }

    if upper.starts_with("DROP TABLE") {
        let mut offset = 2;
        if parts.get(offset).is_some_and(|w| w.eq_ignore_ascii_case("if")) {
            offset = 4;
        }
        return (Some("table"), parts.get(offset).map(|w| trim_punct(w)));
    }

    if upper.starts_with("ALTER TABLE") {
        return (Some("table"), parts.get(2).map(|w| trim_punct(w)));
    }

    if upper.starts_with("EXPLAIN") {
        return (Some("query"), None);
    }

    (None, None)
}

fn first_word_after(sql: &str, byte_offset: usize) -> Option<String> {
    sql.get(byte_offset..)?
        .split_whitespace()
        .next()
        .map(|w| trim_punct(w))
}

fn trim_punct(word: &str) -> String {
    word.trim_matches(|c: char| c == ',' || c == ';').to_string()
}

fn trim_paren(word: &str) -> String {
    word.trim_matches(|c: char| c == ',' || c == ';' || c == '(').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_extracts_table_name() {
        assert_eq!(
            extract_sql_target("SELECT * FROM users WHERE id = 1"),
            (Some("table"), Some("users".to_string()))
        );
    }

    #[test]
    fn select_without_from_is_query() {
        assert_eq!(extract_sql_target("SELECT 1"), (Some("query"), None));
    }

    #[test]
    fn insert_into_extracts_table_name() {
        assert_eq!(
            extract_sql_target("INSERT INTO orders (id) VALUES (1)"),
            (Some("table"), Some("orders".to_string()))
        );
    }

    #[test]
    fn create_table_if_not_exists_extracts_table_name() {
        assert_eq!(
            extract_sql_target("CREATE TABLE IF NOT EXISTS widgets (id INT)"),
            (Some("table"), Some("widgets".to_string()))
        );
    }

    #[test]
    fn drop_table_extracts_table_name() {
        assert_eq!(
            extract_sql_target("DROP TABLE widgets"),
            (Some("table"), Some("widgets".to_string()))
        );
    }

    #[test]
    fn unrecognized_statement_returns_none() {
        assert_eq!(extract_sql_target("VACUUM"), (None, None));
    }
}
