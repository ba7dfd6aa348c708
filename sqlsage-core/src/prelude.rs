//! Prelude module - commonly used types for convenient import.
//!
//! ```rust
//! use sqlsage_core::prelude::*;
//! ```

pub use crate::{
    AuditEntryId, ConnectionId, CoreError, CoreResult, EngineKind, ExternalServerId, Language,
    MessageId, MessageRole, MigrationItemId, MigrationTaskId, ProviderId, ProviderKind, SessionId,
    Timestamp,
};
