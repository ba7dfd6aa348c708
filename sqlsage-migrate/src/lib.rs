//! sqlsage-migrate — the heterogeneous Migration Handler (spec §4.9,
//! component C9).
//!
//! Walks a source schema (`analyze_source_database`), orders its objects
//! into a dependency-respecting execution plan independent of anything the
//! LLM chose (`create_migration_plan`), rewrites DDL between dialects with
//! an ordered-regex rule engine (`convert_ddl`), and drives confirm-or-auto
//! execution against the target adapter (`execute_migration_item`,
//! `execute_migration_batch`). Everything here takes `sqlsage-db` adapters
//! and `sqlsage-storage` records directly — the Agent Conversation Engine in
//! `sqlsage-engine` owns persistence and tool-name routing; this crate is
//! the planning/conversion/execution logic underneath that routing.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod convert;
pub mod error;
pub mod handler;
pub mod ordering;

pub use convert::{convert_ddl, ConversionOutcome};
pub use error::{MigrateError, MigrateResult};
pub use handler::{
    analyze_source_database, compare_databases, create_migration_plan, execute_migration_batch,
    execute_migration_item, generate_migration_report, recompute_task_counters,
    retry_failed_items, skip_migration_item, AnalysisResult, BatchOutcome, ComparisonReport,
    ItemSummary, MigrationReport, ObjectDiff, ObjectTypeBreakdown,
};
pub use ordering::order_tables_for_migration;
