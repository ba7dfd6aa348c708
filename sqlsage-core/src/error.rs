//! Error conventions shared by the `sqlsage` crates.
//!
//! Individual crates define their own `thiserror` enums; this one exists
//! for the handful of failures that cut across crate boundaries (mostly at
//! the tool-dispatch and adapter boundary, where a tagged result — never a
//! raised error — is what crosses into the conversation engine; see spec §4.3
//! and §7).

use thiserror::Error;

/// Errors that do not belong to a single crate's domain.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value failed to parse into one of the shared enums (`EngineKind`,
    /// `ProviderKind`, ...).
    #[error("invalid {kind}: {value}")]
    InvalidEnumValue {
        /// The enum that failed to parse.
        kind: &'static str,
        /// The offending string.
        value: String,
    },

    /// An operation was attempted on a record that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A precondition invariant (spec §3) was violated.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),
}

/// Result alias for [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
