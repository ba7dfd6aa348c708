//! sqlsage-engine — the Agent Conversation Engine (spec §4.10, component
//! C10): the turn loop binding an LLM provider, a database adapter, the
//! pending-operation queue, and every tool dispatcher into one `Agent`.
//!
//! Grounded on the teacher's `AgentRuntime::run_turn_streaming` state
//! machine, generalized from its single-provider/single-tool-surface shape
//! to this spec's multi-provider, multi-dispatcher catalog.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod catalog;
mod db_dispatch;
mod dispatch;
pub mod error;
mod localize;
mod message;
mod migration_dispatch;
mod migration_tasks;
mod outcome;
mod state;

pub use error::{EngineError, EngineResult};
pub use outcome::{ChatOutcome, PauseReason};
pub use state::{
    Agent, InterruptFlag, InterruptedState, MigrationObserver, MigrationProgressEvent,
    DEFAULT_MAX_ITERATIONS,
};

use sqlsage_approval::PendingOperation;
use sqlsage_llm::{Message, StopReason};

/// Result of confirming one pending operation (spec §4.10 "Confirmation").
/// The front-end folds this into an execution-feedback message and resumes
/// the turn by calling [`Agent::chat`] again; it is never appended to
/// history on its own, since the original tool call already has its one
/// `ToolCallResult` recorded (the pending-status entry created when the turn
/// paused).
#[derive(Debug, Clone)]
pub struct ConfirmationOutcome {
    /// The operation that was confirmed.
    pub operation: PendingOperation,
    /// What the adapter did once re-submitted with `confirmed = true`.
    pub outcome: sqlsage_db::DbOutcome,
}

impl Agent {
    /// Run one turn of the conversation (spec §4.10 turn loop).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for a failure in the engine's own plumbing
    /// (persistence, LLM transport). A tool-level failure is folded into
    /// [`ChatOutcome::Done`]/[`ChatOutcome::Paused`] instead, never raised.
    pub async fn chat(&mut self, user_message: impl Into<String>) -> EngineResult<ChatOutcome> {
        self.interrupt.clear();
        self.pending_ops.clear();

        let original_message = user_message.into();
        let mut text = original_message.clone();
        if self.interrupted_state.take().is_some() {
            text = format!("{}{}", localize::resumption_hint(self.language), text);
        }

        self.persist_and_push(Message::user(text)).await?;

        let max_iterations = self.max_iterations;
        let mut iteration = 0u32;
        while iteration < max_iterations || self.auto_execute_migration {
            if self.interrupt.is_requested() {
                self.interrupted_state = Some(InterruptedState {
                    iteration,
                    original_message: original_message.clone(),
                });
                return Ok(ChatOutcome::Interrupted);
            }

            let system_prompt = self.build_system_prompt();
            let limit = self.llm.max_context_length();
            let threshold = sqlsage_context::threshold(limit, 0.8);
            if self.compressor.needs_compression(&system_prompt, &self.history, threshold) {
                let compression = self
                    .compressor
                    .compress(self.llm.as_ref(), &self.history, self.language)
                    .await;
                if compression.messages_replaced > 0 {
                    self.persist_compression(&compression).await?;
                    let mut history = vec![Message::assistant(compression.summary.clone())];
                    history.extend(compression.retained.clone());
                    self.history = history;
                }
            }

            let catalog = self.build_catalog().await;
            let response = match self.llm.complete(&self.history, &catalog, &system_prompt).await {
                Ok(response) => response,
                Err(err) => return Ok(ChatOutcome::Error(llm_error_message(&err))),
            };

            match response.stop_reason {
                StopReason::ToolUse if response.has_tool_calls => {
                    let pre_tool_content = response.message.tool_call_content().map(str::to_string);
                    self.persist_and_push(response.message.clone()).await?;
                    let Some(calls) = response.message.tool_calls().map(<[_]>::to_vec) else {
                        return Ok(ChatOutcome::Done(response.message.text().unwrap_or_default().to_string()));
                    };

                    for call in &calls {
                        if self.interrupt.is_requested() {
                            self.interrupted_state = Some(InterruptedState {
                                iteration,
                                original_message: original_message.clone(),
                            });
                            return Ok(ChatOutcome::Interrupted);
                        }

                        let dispatched = dispatch::dispatch_tool_call(self, call).await?;
                        self.persist_and_push(Message::tool_result(dispatched.result.clone()))
                            .await?;

                        if let Some(reason) = dispatched.pause {
                            if let PauseReason::Confirmation { ref operation }
                            | PauseReason::PerformanceConfirmation { ref operation } = reason
                            {
                                self.pending_ops.push(operation.clone());
                            }
                            return Ok(ChatOutcome::Paused { content: pre_tool_content, reason });
                        }
                    }
                }
                _ => {
                    let text = response.message.text().unwrap_or_default().to_string();
                    self.persist_and_push(Message::assistant(text.clone())).await?;
                    return Ok(ChatOutcome::Done(text));
                }
            }

            iteration += 1;
        }

        Ok(ChatOutcome::Error(format!(
            "turn exceeded the iteration cap ({max_iterations}) without reaching a final answer"
        )))
    }

    /// Confirm the pending operation at `index`, executing it against the
    /// active adapter with `confirmed = true` (spec §4.10 "Confirmation").
    ///
    /// The caller (front-end) must then resume the turn with a new `chat()`
    /// call carrying an execution-feedback message describing what happened
    /// — this method does not itself touch conversation history, since the
    /// original tool call's one `ToolCallResult` was already recorded, with
    /// its pending status, when the turn paused.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Approval`] if `index` is not currently
    /// occupied, or [`EngineError::NoActiveConnection`] if no adapter is
    /// attached.
    pub async fn confirm_operation(&mut self, index: usize) -> EngineResult<ConfirmationOutcome> {
        let operation = self.pending_ops.confirm(index)?;
        let outcome = db_dispatch::confirm(self, &operation).await?;

        let status = match &outcome {
            sqlsage_db::DbOutcome::Success { .. } => sqlsage_audit::AuditResultStatus::Success,
            sqlsage_db::DbOutcome::Error { .. } => sqlsage_audit::AuditResultStatus::Error,
            _ => sqlsage_audit::AuditResultStatus::Pending,
        };
        let error_message = match &outcome {
            sqlsage_db::DbOutcome::Error { error } => Some(error.as_str()),
            _ => None,
        };
        let _ = self
            .audit
            .log_sql_execution(
                Some(self.session_id),
                self.connection_id,
                &operation.sql,
                &operation.tool_name,
                status,
                None,
                error_message,
                None,
                true,
            )
            .await;

        Ok(ConfirmationOutcome { operation, outcome })
    }
}

fn llm_error_message(err: &sqlsage_llm::LlmError) -> String {
    err.to_string()
}
