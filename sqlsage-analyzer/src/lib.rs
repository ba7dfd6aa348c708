//! sqlsage-analyzer — SQL Analyzer (spec §4.4, component C4).
//!
//! Two responsibilities, mirroring the teacher's `safety::parser` module
//! shape but generalized from read/write classification to the spec's
//! analytical-query detection and EXPLAIN-plan issue parsing:
//!
//! 1. [`is_analytical_query`] classifies a `SELECT` as analytical (joins,
//!    aggregation, sorting, windowing, subqueries, or an unbounded full scan).
//! 2. [`parse_explain`] turns an engine-native EXPLAIN plan into a list of
//!    [`Issue`]s at `critical`/`warning`/`info` severity, deciding whether the
//!    analyzer recommends confirmation before the query runs.
//!
//! This crate is advisory only: a failed or unparsable EXPLAIN never blocks
//! execution (spec §4.4, §7) — see [`PerformanceCheck::unavailable`].

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod classify;
mod explain;
mod statement;

pub use classify::is_analytical_query;
pub use explain::parse_explain;
pub use statement::{StatementKind, classify_statement};

use serde::{Deserialize, Serialize};
use sqlsage_core::EngineKind;

/// Severity of one performance [`Issue`] detected in an EXPLAIN plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueLevel {
    /// Informational only; never triggers confirmation.
    Info,
    /// Worth surfacing to the user, does not block execution.
    Warning,
    /// Triggers [`PerformanceCheck::should_confirm`].
    Critical,
}

/// One performance finding from an EXPLAIN plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Severity.
    pub level: IssueLevel,
    /// Short machine-readable kind, e.g. `full_table_scan`, `high_cost`.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// Suggested remediation, when one applies.
    pub suggestion: Option<String>,
    /// Table or index the issue is about, if applicable.
    pub object: Option<String>,
}

/// Configurable thresholds for [`parse_explain`], defaults per spec §4.4.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Full scan row estimate above which a [`IssueLevel::Critical`] fires.
    pub full_scan_rows: i64,
    /// Result-set row estimate above which a [`IssueLevel::Warning`] fires.
    pub large_result_rows: i64,
    /// Total plan cost above which a [`IssueLevel::Warning`] fires.
    pub high_cost: f64,
    /// Nested-loop outer-side row estimate above which a warning fires.
    pub nested_loop_rows: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            full_scan_rows: 10_000,
            large_result_rows: 100_000,
            high_cost: 10_000.0,
            nested_loop_rows: 1_000,
        }
    }
}

/// A rolled-up summary of what the plan showed, surfaced to the user
/// alongside the individual [`Issue`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Scan/access-method descriptions encountered (`Seq Scan on orders`, ...).
    pub scan_types: Vec<String>,
    /// Total estimated plan cost, when the engine reports one.
    pub total_cost: Option<f64>,
    /// Largest row estimate seen anywhere in the plan.
    pub estimated_rows: Option<i64>,
    /// Set when EXPLAIN itself failed; the check remains advisory-only.
    pub error: Option<String>,
}

/// The full result of [`crate::check_query_performance`]-style analysis,
/// matching spec §4.4's `{should_confirm, issues, performance_summary}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceCheck {
    /// Whether `sql` is an analytical query at all.
    pub is_analytical: bool,
    /// Whether a critical issue was found — gates `execute_safe_query` per §7.
    pub should_confirm: bool,
    /// Individual findings.
    pub issues: Vec<Issue>,
    /// Rolled-up summary.
    pub performance_summary: PerformanceSummary,
}

impl PerformanceCheck {
    /// A non-analytical query: nothing to check, never confirms.
    #[must_use]
    pub fn not_analytical() -> Self {
        Self {
            is_analytical: false,
            should_confirm: false,
            issues: Vec::new(),
            performance_summary: PerformanceSummary::default(),
        }
    }

    /// EXPLAIN failed or was unavailable. Per spec §4.4 this MUST NOT block
    /// execution — `should_confirm` is always `false` here.
    #[must_use]
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            is_analytical: true,
            should_confirm: false,
            issues: Vec::new(),
            performance_summary: PerformanceSummary {
                error: Some(error.into()),
                ..Default::default()
            },
        }
    }

    /// Build from a parsed plan's issues.
    #[must_use]
    pub fn from_issues(issues: Vec<Issue>, performance_summary: PerformanceSummary) -> Self {
        let should_confirm = issues.iter().any(|i| i.level == IssueLevel::Critical);
        Self {
            is_analytical: true,
            should_confirm,
            issues,
            performance_summary,
        }
    }
}

/// Full pipeline: classify, then (if analytical) parse the supplied EXPLAIN
/// plan lines for the given engine. Callers that could not run EXPLAIN at all
/// should use [`PerformanceCheck::unavailable`] directly instead.
#[must_use]
pub fn check_query_performance(
    sql: &str,
    engine: EngineKind,
    plan_lines: &[String],
    thresholds: Thresholds,
) -> PerformanceCheck {
    if !is_analytical_query(sql) {
        return PerformanceCheck::not_analytical();
    }
    parse_explain(engine, plan_lines, thresholds)
}
