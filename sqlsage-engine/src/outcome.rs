//! The result of one `chat()` call (spec §4.10 turn loop, §7 error handling).

use sqlsage_approval::PendingOperation;

/// Why a turn stopped before the model reached a final answer.
#[derive(Debug, Clone)]
pub enum PauseReason {
    /// A mutating statement is awaiting confirmation via `confirm_operation`.
    Confirmation {
        /// The queued operation, for the front-end to render.
        operation: PendingOperation,
    },
    /// An analytical query was flagged by the SQL Analyzer.
    PerformanceConfirmation {
        /// The queued operation, for the front-end to render.
        operation: PendingOperation,
    },
    /// The model invoked `request_user_input`; no pending op is queued for
    /// this one, there is nothing to confirm, only to answer.
    FormInput {
        /// What to ask the user.
        prompt: String,
        /// Named fields the front-end should collect, if structured.
        fields: Vec<String>,
    },
    /// The model invoked `request_migration_setup`.
    MigrationSetup {
        /// Configuration fields the caller must supply.
        missing_fields: Vec<String>,
    },
}

/// Result of one `chat()` call.
#[derive(Debug, Clone)]
pub enum ChatOutcome {
    /// The turn reached a natural end (`finish_reason = stop`). Carries the
    /// assistant's final text.
    Done(String),
    /// The LLM call itself failed (transport/auth/rate-limit) or the
    /// provider reported `finish_reason = error`. Per spec §7 this is
    /// returned as plain content, never raised, and is not persisted to
    /// history since it is not genuine model output.
    Error(String),
    /// The turn stopped to collect confirmation or input from a human.
    /// `content` carries any assistant text that preceded the triggering
    /// tool call, if the model produced any.
    Paused {
        /// Assistant text emitted before the tool call that paused the turn.
        content: Option<String>,
        /// Why the turn paused.
        reason: PauseReason,
    },
    /// `request_interrupt()` was observed at a checkpoint; the turn was
    /// snapshotted into `interrupted_state` and stopped. The spec's sentinel
    /// `None` return, made explicit.
    Interrupted,
}
