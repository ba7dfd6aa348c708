//! Rule-based DDL dialect conversion (spec §4.9 "Convert").
//!
//! Each documented pack is an ordered list of regex substitutions, applied
//! in sequence, each optionally attaching a human-readable note. A rule can
//! instead mark the whole object unconvertible (`skip_reason`), e.g. a
//! MySQL `FULLTEXT` index has no PostgreSQL equivalent.

use std::sync::LazyLock;

use regex::Regex;
use sqlsage_core::EngineKind;
use sqlsage_storage::records::MigrationObjectType;

/// Result of converting one object's DDL from the source dialect to the
/// target dialect.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// The converted DDL, or `None` if the object could not be converted.
    pub ddl: Option<String>,
    /// Human-readable notes recorded for each rule that fired.
    pub notes: Vec<String>,
    /// Set when `ddl` is `None`: why the object was skipped.
    pub skip_reason: Option<String>,
}

impl ConversionOutcome {
    fn unchanged(ddl: &str) -> Self {
        Self {
            ddl: Some(ddl.to_string()),
            notes: Vec::new(),
            skip_reason: None,
        }
    }

    fn skip(reason: impl Into<String>) -> Self {
        Self {
            ddl: None,
            notes: Vec::new(),
            skip_reason: Some(reason.into()),
        }
    }
}

struct Rule {
    pattern: &'static Regex,
    replacement: &'static str,
    note: Option<&'static str>,
}

macro_rules! rules {
    ($($pat:expr => $rep:expr $(, note: $note:expr)? ;)*) => {{
        vec![
            $(
                Rule {
                    pattern: {
                        static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new($pat).unwrap());
                        &*RE
                    },
                    replacement: $rep,
                    note: rules!(@note $($note)?),
                },
            )*
        ]
    }};
    (@note) => { None };
    (@note $note:expr) => { Some($note) };
}

fn apply_rules(mut ddl: String, rules: Vec<Rule>, notes: &mut Vec<String>) -> String {
    for rule in rules {
        if rule.pattern.is_match(&ddl) {
            ddl = rule.pattern.replace_all(&ddl, rule.replacement).into_owned();
            if let Some(note) = rule.note {
                notes.push(note.to_string());
            }
        }
    }
    ddl
}

/// MySQL → PostgreSQL conversion pack.
fn mysql_to_postgres(ddl: &str, object_type: MigrationObjectType) -> ConversionOutcome {
    if object_type == MigrationObjectType::Index
        && Regex::new(r"(?i)\bFULLTEXT\b").unwrap().is_match(ddl)
    {
        return ConversionOutcome::skip("FULLTEXT index not supported in PostgreSQL");
    }

    let mut notes = Vec::new();
    let mut out = ddl.to_string();

    // Order matters: BIGINT/SMALLINT before the bare INT rule.
    out = apply_rules(
        out,
        rules![
            r"(?i)\bBIGINT\b(\s*\(\s*\d+\s*\))?\s+AUTO_INCREMENT" => "BIGSERIAL", note: "BIGINT AUTO_INCREMENT -> BIGSERIAL";
            r"(?i)\bSMALLINT\b(\s*\(\s*\d+\s*\))?\s+AUTO_INCREMENT" => "SMALLSERIAL", note: "SMALLINT AUTO_INCREMENT -> SMALLSERIAL";
            r"(?i)\bINT\b(\s*\(\s*\d+\s*\))?\s+AUTO_INCREMENT" => "SERIAL", note: "INT AUTO_INCREMENT -> SERIAL";
            r"(?i)TINYINT\s*\(\s*1\s*\)" => "BOOLEAN", note: "TINYINT(1) -> BOOLEAN";
            r"(?i)\bDATETIME\b" => "TIMESTAMP", note: "DATETIME -> TIMESTAMP";
            r"(?i)\b(LONG|MEDIUM|TINY)TEXT\b" => "TEXT", note: "LONG/MEDIUM/TINYTEXT -> TEXT";
            r"(?i)\b(TINY|MEDIUM|LONG)?BLOB\b" => "BYTEA", note: "BLOB family -> BYTEA";
            r"(?i)\bJSON\b" => "JSONB", note: "JSON -> JSONB";
        ],
        &mut notes,
    );

    if let Ok(enum_re) = Regex::new(r"(?i)ENUM\s*\([^)]*\)") {
        if enum_re.is_match(&out) {
            out = enum_re.replace_all(&out, "VARCHAR(50)").into_owned();
            notes.push("ENUM(...) -> VARCHAR(50), original enum values not enforced".to_string());
        }
    }

    out = apply_rules(
        out,
        rules![
            r"(?i)\bENGINE\s*=\s*\w+" => "", note: "stripped ENGINE=";
            r"(?i)\bDEFAULT\s+CHARSET\s*=\s*\w+" => "", note: "stripped CHARSET=";
            r"(?i)\bCHARSET\s*=\s*\w+" => "", note: "stripped CHARSET=";
            r"(?i)\bCOLLATE\s*=\s*\w+" => "", note: "stripped COLLATE=";
            r"(?i)\bROW_FORMAT\s*=\s*\w+" => "", note: "stripped ROW_FORMAT=";
            r"(?i)\bAUTO_INCREMENT\s*=\s*\d+" => "", note: "stripped AUTO_INCREMENT= table option";
            r"(?i)\bUNSIGNED\b" => "", note: "stripped UNSIGNED (no PostgreSQL equivalent)";
            r"(?i)\bZEROFILL\b" => "", note: "stripped ZEROFILL";
            r"(?i)\bCOMMENT\s+'[^']*'" => "", note: "stripped inline COMMENT";
        ],
        &mut notes,
    );

    ConversionOutcome {
        ddl: Some(out),
        notes,
        skip_reason: None,
    }
}

/// Oracle → PostgreSQL conversion pack.
fn oracle_to_postgres(ddl: &str, _object_type: MigrationObjectType) -> ConversionOutcome {
    let mut notes = Vec::new();
    let mut out = ddl.to_string();

    out = apply_rules(
        out,
        rules![
            r"(?i)NUMBER\s*\(\s*19\s*\)" => "BIGINT", note: "NUMBER(19) -> BIGINT";
            r"(?i)NUMBER\s*\(\s*10\s*\)" => "INTEGER", note: "NUMBER(10) -> INTEGER";
            r"(?i)NUMBER\s*\(\s*(\d+)\s*,\s*(\d+)\s*\)" => "NUMERIC($1,$2)", note: "NUMBER(p,s) -> NUMERIC(p,s)";
            r"(?i)\bNUMBER\b" => "NUMERIC", note: "bare NUMBER -> NUMERIC";
            r"(?i)\bVARCHAR2\b" => "VARCHAR", note: "VARCHAR2 -> VARCHAR";
            r"(?i)\bN?CLOB\b" => "TEXT", note: "CLOB/NCLOB -> TEXT";
            r"(?i)\bRAW\s*\(\s*\d+\s*\)" => "BYTEA", note: "RAW(n) -> BYTEA";
            r"(?i)\bBLOB\b" => "BYTEA", note: "BLOB -> BYTEA";
            r"(?i)\bSYSTIMESTAMP\b" => "CURRENT_TIMESTAMP", note: "SYSTIMESTAMP -> CURRENT_TIMESTAMP";
            r"(?i)\bSYSDATE\b" => "CURRENT_TIMESTAMP", note: "SYSDATE -> CURRENT_TIMESTAMP";
        ],
        &mut notes,
    );

    ConversionOutcome {
        ddl: Some(out),
        notes,
        skip_reason: None,
    }
}

/// Oracle → `GaussDB` conversion pack: the Oracle→PostgreSQL pack, plus
/// advanced-package renames `GaussDB`'s Oracle-compatibility mode expects.
fn oracle_to_gaussdb(ddl: &str, object_type: MigrationObjectType) -> ConversionOutcome {
    let base = oracle_to_postgres(ddl, object_type);
    let Some(base_ddl) = base.ddl else {
        return base;
    };
    let mut notes = base.notes;
    let mut out = base_ddl;

    out = apply_rules(
        out,
        rules![
            r"(?i)\bDBMS_LOB\b" => "DBE_LOB", note: "DBMS_LOB -> DBE_LOB";
            r"(?i)\bDBMS_OUTPUT\b" => "DBE_OUTPUT", note: "DBMS_OUTPUT -> DBE_OUTPUT";
            r"(?i)DBMS_RANDOM\s*\.\s*VALUE" => "DBE_RANDOM.GET_RANDOM", note: "DBMS_RANDOM.VALUE -> DBE_RANDOM.GET_RANDOM";
            r"(?i)DBMS_RANDOM\s*\.\s*SEED" => "DBE_RANDOM.SEED", note: "DBMS_RANDOM.SEED -> DBE_RANDOM.SEED";
            r"(?i)\bDBMS_RANDOM\b" => "DBE_RANDOM", note: "DBMS_RANDOM -> DBE_RANDOM";
            r"(?i)\bUTL_RAW\b" => "DBE_RAW", note: "UTL_RAW -> DBE_RAW";
            r"(?i)\bDBMS_SQL\b" => "DBE_SQL", note: "DBMS_SQL -> DBE_SQL";
            r"!\s+=" => "!=", note: "normalized '! =' to '!='";
        ],
        &mut notes,
    );

    if Regex::new(r"(?i)CONNECT\s+BY").unwrap().is_match(&out) {
        notes.push("CONNECT BY detected; rewrite manually as WITH RECURSIVE".to_string());
    }

    ConversionOutcome {
        ddl: Some(out),
        notes,
        skip_reason: None,
    }
}

/// Convert `ddl` (an object of `object_type`) from `source` to `target`.
///
/// Same-engine "conversion" is a no-op. Unsupported pairs return a
/// `skip_reason` rather than guessing.
#[must_use]
pub fn convert_ddl(
    source: EngineKind,
    target: EngineKind,
    object_type: MigrationObjectType,
    ddl: &str,
) -> ConversionOutcome {
    if source == target {
        return ConversionOutcome::unchanged(ddl);
    }
    match (source, target) {
        (EngineKind::MySql, EngineKind::PostgreSql) => mysql_to_postgres(ddl, object_type),
        // "MySQL→GaussDB: apply the MySQL→PostgreSQL pack" (spec §4.9).
        (EngineKind::MySql, EngineKind::GaussDb) => mysql_to_postgres(ddl, object_type),
        (EngineKind::Oracle, EngineKind::PostgreSql) => oracle_to_postgres(ddl, object_type),
        (EngineKind::Oracle, EngineKind::GaussDb) => oracle_to_gaussdb(ddl, object_type),
        _ => ConversionOutcome::skip(format!(
            "no conversion pack registered for {source} -> {target}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_auto_increment_becomes_serial() {
        let out = convert_ddl(
            EngineKind::MySql,
            EngineKind::PostgreSql,
            MigrationObjectType::Table,
            "CREATE TABLE t (id INT AUTO_INCREMENT PRIMARY KEY, active TINYINT(1)) ENGINE=InnoDB CHARSET=utf8mb4",
        );
        let ddl = out.ddl.unwrap();
        assert!(ddl.contains("SERIAL"));
        assert!(ddl.contains("BOOLEAN"));
        assert!(!ddl.contains("ENGINE"));
        assert!(!out.notes.is_empty());
    }

    #[test]
    fn mysql_fulltext_index_is_skipped() {
        let out = convert_ddl(
            EngineKind::MySql,
            EngineKind::PostgreSql,
            MigrationObjectType::Index,
            "CREATE FULLTEXT INDEX idx_body ON a (body)",
        );
        assert!(out.ddl.is_none());
        assert_eq!(
            out.skip_reason.as_deref(),
            Some("FULLTEXT index not supported in PostgreSQL")
        );
    }

    #[test]
    fn oracle_number_precision_scale_maps_to_numeric() {
        let out = convert_ddl(
            EngineKind::Oracle,
            EngineKind::PostgreSql,
            MigrationObjectType::Table,
            "CREATE TABLE t (amount NUMBER(10,2), id NUMBER(19), flag NUMBER)",
        );
        let ddl = out.ddl.unwrap();
        assert!(ddl.contains("NUMERIC(10,2)"));
        assert!(ddl.contains("BIGINT"));
        assert!(ddl.contains("NUMERIC") && !ddl.contains("NUMBER"));
    }

    #[test]
    fn oracle_to_gaussdb_renames_packages_and_flags_connect_by() {
        let out = convert_ddl(
            EngineKind::Oracle,
            EngineKind::GaussDb,
            MigrationObjectType::Procedure,
            "BEGIN DBMS_OUTPUT.PUT_LINE('hi'); SELECT * FROM t START WITH id=1 CONNECT BY PRIOR id = parent_id; END;",
        );
        let ddl = out.ddl.unwrap();
        assert!(ddl.contains("DBE_OUTPUT"));
        assert!(out.notes.iter().any(|n| n.contains("CONNECT BY")));
    }

    #[test]
    fn unsupported_pair_is_skipped_not_guessed() {
        let out = convert_ddl(
            EngineKind::SqlServer,
            EngineKind::Oracle,
            MigrationObjectType::Table,
            "CREATE TABLE t (id INT)",
        );
        assert!(out.ddl.is_none());
        assert!(out.skip_reason.is_some());
    }
}
