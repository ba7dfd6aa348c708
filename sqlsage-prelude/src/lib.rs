//! Unified prelude for the sqlsage database agent workspace.
//!
//! This crate provides a single import to bring in the commonly used types
//! from across sqlsage without managing individual imports per crate.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqlsage_prelude::*;
//!
//! // Now you have access to types from:
//! // - sqlsage-core (ids, EngineKind, ProviderKind, Language)
//! // - sqlsage-crypto (encrypt/decrypt, mask_secret)
//! // - sqlsage-audit (AuditLog, AuditEntry, AuditResultStatus)
//! // - sqlsage-llm (LlmProvider, ClaudeProvider, OpenAiCompatProvider, Message)
//! // - sqlsage-db (DbAdapter, DbOutcome, connect)
//! // - sqlsage-mcp (ToolServerManager, ServersConfig)
//! // - sqlsage-engine (Agent, ChatOutcome)
//! // - sqlsage-telemetry (LogConfig, setup_logging)
//! ```
//!
//! # Per-crate preludes
//!
//! If you only need types from one crate, use its own prelude:
//!
//! ```rust,ignore
//! use sqlsage_core::prelude::*;
//! use sqlsage_llm::prelude::*;
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlsage_prelude::*;
//!
//! # async fn example() -> EngineResult<()> {
//! let provider = ClaudeProvider::new(ProviderConfig::new("api-key", "claude-sonnet-4-20250514"));
//! let storage = sqlsage_storage::Database::connect_memory().await.unwrap();
//! let audit = AuditLog::new(storage.clone());
//! let agent = Agent::new(Box::new(provider), SessionId::new(), storage, audit);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

// Re-export per-crate preludes where they exist.
pub use sqlsage_audit::prelude::*;
pub use sqlsage_core::prelude::*;
pub use sqlsage_crypto::prelude::*;
pub use sqlsage_llm::prelude::*;
pub use sqlsage_telemetry::prelude::*;

// These crates have no prelude submodule of their own; re-export their
// public surface directly.
pub use sqlsage_db::{DbAdapter, DbOutcome, connect};
pub use sqlsage_engine::{Agent, ChatOutcome, EngineError, EngineResult, PauseReason};
pub use sqlsage_mcp::{ServerConfig, ServersConfig, ToolServerManager};
