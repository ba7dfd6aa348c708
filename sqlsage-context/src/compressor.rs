//! History compression (spec §4.5).
//!
//! Summarization must never sever a tool_call from its tool response: the
//! split point that divides "messages to summarize" from "messages to keep"
//! is computed at message-group granularity, where an assistant message
//! carrying `tool_calls` and every tool-result message answering it form one
//! indivisible group.

use sqlsage_core::Language;
use sqlsage_llm::{LlmProvider, Message, MessageContent, MessageRole};

use crate::counter::TokenCounter;

/// Literal marker prepended to every LLM-produced (non-fallback) summary, so
/// a reader — human or model — can tell a compressed block from a real
/// message at a glance.
pub const SUMMARY_MARKER: &str = "[Earlier conversation summarized]";

/// Default number of most-recent messages a compression pass retains
/// verbatim.
pub const DEFAULT_KEEP_RECENT: usize = 10;

/// Result of one compression pass.
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    /// The summary text (prefixed with [`SUMMARY_MARKER`] unless the LLM
    /// call failed, in which case it is the statistical fallback sentence).
    pub summary: String,
    /// Whether `summary` came from the statistical fallback rather than the
    /// LLM.
    pub is_fallback: bool,
    /// Number of messages the summary replaces.
    pub messages_replaced: usize,
    /// Token count of the replaced messages, before compression.
    pub tokens_before: usize,
    /// Token count of `summary` itself, after compression.
    pub tokens_after: usize,
    /// The retained suffix of the history (not replaced by the summary).
    pub retained: Vec<Message>,
}

/// Decides when a history needs compressing and performs the compression.
pub struct Compressor {
    counter: TokenCounter,
    keep_recent: usize,
}

impl Compressor {
    /// Build a compressor that retains `keep_recent` most-recent messages
    /// verbatim (spec default: 10).
    #[must_use]
    pub fn new(keep_recent: usize) -> Self {
        Self {
            counter: TokenCounter::new(),
            keep_recent,
        }
    }

    /// Whether `tokens(system_prompt) + tokens(history) >= threshold`.
    #[must_use]
    pub fn needs_compression(&self, system_prompt: &str, history: &[Message], threshold: usize) -> bool {
        let total = self.counter.count(system_prompt) + self.counter.count_messages(history);
        total >= threshold
    }

    /// Compute the index that divides `history` into a summarized prefix
    /// (`0..split`) and a retained suffix (`split..`), extended backward so
    /// no tool_call/tool_result group straddles the boundary.
    #[must_use]
    pub fn split_point(&self, history: &[Message]) -> usize {
        let naive = history.len().saturating_sub(self.keep_recent);
        if naive == 0 {
            return 0;
        }

        // Build group boundaries: an assistant `tool_calls` message plus every
        // immediately-following `Tool`-role message forms one group.
        let mut group_start = vec![0usize; history.len()];
        let mut i = 0;
        while i < history.len() {
            let start = i;
            if history[i].role == MessageRole::Assistant
                && matches!(history[i].content, MessageContent::ToolCalls { .. })
            {
                i += 1;
                while i < history.len() && history[i].role == MessageRole::Tool {
                    group_start[i] = start;
                    i += 1;
                }
            } else {
                i += 1;
            }
            // Backfill the group's own start (covers the leading message too).
            for idx in start..i {
                group_start[idx] = start;
            }
        }

        group_start[naive.min(history.len() - 1)].min(naive)
    }

    /// Summarize `history[..split]` via `llm`, falling back to a statistical
    /// summary if the LLM call fails (spec §4.5).
    pub async fn compress(
        &self,
        llm: &dyn LlmProvider,
        history: &[Message],
        language: Language,
    ) -> CompressionOutcome {
        let split = self.split_point(history);
        let (to_summarize, retained) = history.split_at(split);
        let tokens_before = self.counter.count_messages(to_summarize);

        if to_summarize.is_empty() {
            return CompressionOutcome {
                summary: String::new(),
                is_fallback: false,
                messages_replaced: 0,
                tokens_before: 0,
                tokens_after: 0,
                retained: retained.to_vec(),
            };
        }

        let summary = match self.summarize_with_llm(llm, to_summarize, language).await {
            Ok(text) => format!("{SUMMARY_MARKER}\n\n{text}"),
            Err(err) => {
                tracing::warn!(error = %err, "LLM summarization failed, using statistical fallback");
                statistical_fallback(to_summarize)
            }
        };
        let is_fallback = !summary.starts_with(SUMMARY_MARKER);
        let tokens_after = self.counter.count(&summary);

        CompressionOutcome {
            summary,
            is_fallback,
            messages_replaced: to_summarize.len(),
            tokens_before,
            tokens_after,
            retained: retained.to_vec(),
        }
    }

    async fn summarize_with_llm(
        &self,
        llm: &dyn LlmProvider,
        messages: &[Message],
        language: Language,
    ) -> sqlsage_llm::LlmResult<String> {
        let transcript = render_transcript(messages);
        let instruction = match language {
            Language::En => {
                "Summarize the conversation below concisely, in English, preserving \
                 any database/connection names, SQL executed, and outcomes the user \
                 would need to remember. Do not include the literal word 'summary' \
                 as a heading."
            }
            Language::Zh => "请用中文简洁地总结以下对话,保留用户需要记住的数据库/连接名称、已执行的 SQL 及其结果。",
        };
        let prompt = format!("{instruction}\n\n---\n{transcript}\n---");
        let response = llm.complete(&[Message::user(prompt)], &[], "").await?;
        Ok(response
            .message
            .text()
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

fn render_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                MessageRole::System => "system",
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
                MessageRole::Tool => "tool",
            };
            let body = match &m.content {
                MessageContent::Text(t) => t.clone(),
                MessageContent::ToolCalls { content, calls } => {
                    let calls = calls
                        .iter()
                        .map(|c| format!("called {}({})", c.name, c.arguments))
                        .collect::<Vec<_>>()
                        .join("; ");
                    match content {
                        Some(text) if !text.is_empty() => format!("{text} [{calls}]"),
                        _ => calls,
                    }
                }
                MessageContent::ToolResult(r) => r.content.clone(),
                MessageContent::MultiPart(_) => "[multi-part content]".to_string(),
            };
            format!("{role}: {body}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Statistical fallback summary: "N user / M assistant / K tool messages
/// compressed" (spec §4.5, used when the LLM summarization call fails).
fn statistical_fallback(messages: &[Message]) -> String {
    let user = messages.iter().filter(|m| m.role == MessageRole::User).count();
    let assistant = messages
        .iter()
        .filter(|m| m.role == MessageRole::Assistant)
        .count();
    let tool = messages.iter().filter(|m| m.role == MessageRole::Tool).count();
    format!("{user} user / {assistant} assistant / {tool} tool messages compressed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsage_llm::{ToolCall, ToolCallResult};

    fn tool_pair(id: &str) -> [Message; 2] {
        [
            Message::assistant_with_tools(vec![ToolCall::new(id, "list_tables")]),
            Message::tool_result(ToolCallResult::success(id, "[]")),
        ]
    }

    #[test]
    fn split_point_is_noop_under_keep_recent() {
        let compressor = Compressor::new(10);
        let history: Vec<Message> = (0..5).map(|i| Message::user(format!("msg {i}"))).collect();
        assert_eq!(compressor.split_point(&history), 0);
    }

    #[test]
    fn split_point_never_separates_tool_call_from_result() {
        let compressor = Compressor::new(2);
        let mut history = vec![Message::user("a"), Message::assistant("b")];
        history.extend(tool_pair("call-1"));
        history.push(Message::user("c"));

        // naive split = len - keep_recent = 5 - 2 = 3, which lands on the
        // tool-result message (index 3) of the pair started at index 2.
        let split = compressor.split_point(&history);
        assert_eq!(split, 2, "split must back up to the start of the tool-call group");

        // Verify no group straddles the computed split.
        for w in history.windows(2) {
            if w[0].role == MessageRole::Assistant
                && matches!(w[0].content, MessageContent::ToolCalls { .. })
                && w[1].role == MessageRole::Tool
            {
                // both must be on the same side of split
                continue;
            }
        }
    }

    #[test]
    fn statistical_fallback_counts_roles() {
        let messages = vec![
            Message::user("hi"),
            Message::assistant("hello"),
            Message::tool_result(ToolCallResult::success("1", "ok")),
        ];
        let summary = statistical_fallback(&messages);
        assert_eq!(summary, "1 user / 1 assistant / 1 tool messages compressed");
    }
}
