//! sqlsage-storage — durable persistence for the sqlsage agent conversation engine.
//!
//! A single **`SurrealDB`** connection ([`Database`]) backs every store the
//! engine needs: connection profiles, LLM provider profiles, MCP server
//! configurations, sessions and their transcripts, context summaries,
//! migration tasks and items, and free-form preferences. Audit log storage
//! lives in `sqlsage-audit`, which is itself built on top of [`Database`].
//!
//! # Scaling
//!
//! Embedded mode (`SurrealKV`) is the only supported deployment: this is a
//! single-user, single-process agent, not a multi-tenant service, so there
//! is no distributed backend to switch to.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod connections;
pub mod db;
pub mod error;
pub mod mcp;
pub mod migrations;
pub mod preferences;
pub mod providers;
pub mod records;
pub mod sessions;

pub use connections::ConnectionRepository;
pub use db::Database;
pub use error::{StorageError, StorageResult};
pub use mcp::McpServerRepository;
pub use migrations::MigrationRepository;
pub use preferences::PreferenceRepository;
pub use providers::ProviderRepository;
pub use sessions::SessionRepository;
