//! sqlsage-core — shared domain types for the sqlsage agent conversation engine.
//!
//! This crate holds only what every other `sqlsage` crate needs to agree on:
//! newtype identifiers, timestamps, the engine/provider kind enums, and the
//! small cross-cutting error type. Everything else — storage, crypto,
//! adapters, the turn loop — lives in its own crate and depends on this one.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod prelude;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use types::{
    AuditEntryId, ConnectionId, EngineKind, ExternalServerId, Language, MessageId, MessageRole,
    MigrationItemId, MigrationTaskId, ProviderId, ProviderKind, SessionId, Timestamp,
};
