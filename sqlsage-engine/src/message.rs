//! Conversion between the in-memory [`Message`] history and the durable
//! [`ChatMessageRecord`] shape, plus the append-and-persist helper every turn
//! step uses (spec §8 "Conversation round-trip").
//!
//! System messages are never persisted or carried in `Agent.history`: the
//! system prompt is rebuilt fresh every turn and passed to `LlmProvider`
//! directly, never stored as a [`Message`] (spec §4.10's state list does not
//! mention a system message in history, only "durable and in-memory
//! conversation history").

use chrono::Utc;
use sqlsage_context::CompressionOutcome;
use sqlsage_core::MessageId;
use sqlsage_llm::{Message, MessageContent, ToolCall, ToolCallResult};
use sqlsage_storage::records::{ChatMessageRecord, ContextSummaryRecord};
use sqlsage_storage::SessionRepository;

use crate::error::EngineResult;
use crate::state::Agent;

/// Turn a persisted row back into an in-memory [`Message`]. Returns `None`
/// for a row this conversion cannot represent (there are none today; kept
/// as a `Result`-free `Option` so a future record variant degrades instead
/// of panicking).
#[must_use]
pub fn message_from_record(record: &ChatMessageRecord) -> Message {
    match record.role {
        sqlsage_core::MessageRole::User => Message::user(record.content.clone().unwrap_or_default()),
        sqlsage_core::MessageRole::Assistant => {
            if let Some(raw) = &record.tool_calls {
                let calls: Vec<ToolCall> = serde_json::from_value(raw.clone()).unwrap_or_default();
                match &record.content {
                    Some(text) if !text.is_empty() => {
                        Message::assistant_with_tools_and_content(text.clone(), calls)
                    }
                    _ => Message::assistant_with_tools(calls),
                }
            } else {
                Message::assistant(record.content.clone().unwrap_or_default())
            }
        }
        sqlsage_core::MessageRole::Tool => Message::tool_result(ToolCallResult::success(
            record.tool_call_id.clone().unwrap_or_default(),
            record.content.clone().unwrap_or_default(),
        )),
    }
}

/// Turn an in-memory [`Message`] into the row `sqlsage-storage` persists.
///
/// # Panics
///
/// Never panics; a `System` message or `MultiPart` content (neither of
/// which the engine ever produces) is represented as an empty `User` row
/// rather than rejected, since this is an internal helper with no untrusted
/// input.
#[must_use]
pub fn message_to_record(
    session_id: sqlsage_core::SessionId,
    message: &Message,
) -> ChatMessageRecord {
    let role = match message.role {
        sqlsage_llm::MessageRole::User => sqlsage_core::MessageRole::User,
        sqlsage_llm::MessageRole::Assistant => sqlsage_core::MessageRole::Assistant,
        sqlsage_llm::MessageRole::Tool => sqlsage_core::MessageRole::Tool,
        sqlsage_llm::MessageRole::System => sqlsage_core::MessageRole::User,
    };
    let (content, tool_calls, tool_call_id) = match &message.content {
        MessageContent::Text(text) => (Some(text.clone()), None, None),
        MessageContent::ToolCalls { content, calls } => {
            (content.clone(), serde_json::to_value(calls).ok(), None)
        }
        MessageContent::ToolResult(result) => {
            (Some(result.content.clone()), None, Some(result.call_id.clone()))
        }
        MessageContent::MultiPart(_) => (None, None, None),
    };
    ChatMessageRecord {
        id: MessageId::new(),
        session_id,
        role,
        content,
        tool_calls,
        tool_call_id,
        created_at: Utc::now(),
    }
}

impl Agent {
    /// Rebuild an `Agent` bound to an existing session, replaying its
    /// persisted transcript back into `history` (spec §8 "Conversation
    /// round-trip").
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EngineError::Storage`] if the transcript
    /// cannot be read.
    pub async fn resume(
        llm: Box<dyn sqlsage_llm::LlmProvider>,
        session_id: sqlsage_core::SessionId,
        storage: std::sync::Arc<sqlsage_storage::Database>,
        audit: std::sync::Arc<sqlsage_audit::AuditLog>,
    ) -> EngineResult<Self> {
        let mut agent = Self::new(llm, session_id, storage.clone(), audit);
        let repo = SessionRepository::new(&storage);
        let summary = repo.get_latest_summary(session_id).await?;
        let records = repo.get_messages(session_id).await?;
        agent.history = summary
            .into_iter()
            .map(|s| Message::assistant(s.summary_text))
            .chain(records.iter().map(message_from_record))
            .collect();
        Ok(agent)
    }

    /// Persist a compression pass (spec §4.5 "Summary is persisted and
    /// oldest messages deleted"): write the summary to `context_summary` and
    /// delete the `messages_replaced` oldest chat messages of this session,
    /// so a reload never sees a message that is both summarized and present
    /// (spec §3).
    pub(crate) async fn persist_compression(&self, compression: &CompressionOutcome) -> EngineResult<()> {
        if compression.messages_replaced == 0 {
            return Ok(());
        }
        let repo = SessionRepository::new(&self.storage);
        let record = ContextSummaryRecord {
            session_id: self.session_id,
            summary_text: compression.summary.clone(),
            messages_summarized_count: compression.messages_replaced as u32,
            original_token_count: compression.tokens_before as u32,
            compressed_token_count: compression.tokens_after as u32,
            created_at: Utc::now(),
        };
        repo.save_summary(&record).await?;
        repo.delete_oldest_n(self.session_id, compression.messages_replaced).await?;
        Ok(())
    }

    /// Append `message` to in-memory history and persist it, in that order
    /// so a durable-write failure never leaves `history` ahead of storage.
    pub(crate) async fn persist_and_push(&mut self, message: Message) -> EngineResult<()> {
        let record = message_to_record(self.session_id, &message);
        SessionRepository::new(&self.storage).append_message(&record).await?;
        self.history.push(message);
        Ok(())
    }
}
