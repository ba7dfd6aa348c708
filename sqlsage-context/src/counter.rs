//! Token estimation (spec §4.5).

use sqlsage_llm::{Message, MessageContent};
use tiktoken_rs::CoreBPE;

/// Estimates token counts for text and message histories.
///
/// Wraps a `cl100k_base` byte-pair encoder when one can be loaded (it ships
/// as static data in `tiktoken-rs` and should always be available, but
/// construction is fallible in principle — a corrupted install, say — so the
/// fallback exists for real, not just on paper). When unavailable, counts
/// fall back to `len(text) / 4`, the same heuristic the Python original used
/// unconditionally.
pub struct TokenCounter {
    encoder: Option<CoreBPE>,
}

impl TokenCounter {
    /// Build a counter, preferring a real encoder over the length heuristic.
    #[must_use]
    pub fn new() -> Self {
        let encoder = tiktoken_rs::cl100k_base().ok();
        if encoder.is_none() {
            tracing::warn!("tiktoken cl100k_base encoder unavailable, falling back to len/4 token estimate");
        }
        Self { encoder }
    }

    /// Count tokens in one piece of text.
    #[must_use]
    pub fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        match &self.encoder {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => text.len().div_ceil(4),
        }
    }

    /// Count tokens contributed by one message (text, tool-call arguments,
    /// or tool-result content — whichever the message carries).
    #[must_use]
    pub fn count_message(&self, message: &Message) -> usize {
        match &message.content {
            MessageContent::Text(text) => self.count(text),
            MessageContent::ToolCalls { content, calls } => {
                let text_tokens = content.as_deref().map_or(0, |t| self.count(t));
                let call_tokens: usize = calls
                    .iter()
                    .map(|c| self.count(&c.name) + self.count(&c.arguments.to_string()))
                    .sum();
                text_tokens + call_tokens
            }
            MessageContent::ToolResult(result) => self.count(&result.content),
            MessageContent::MultiPart(parts) => parts
                .iter()
                .map(|part| match part {
                    sqlsage_llm::ContentPart::Text { text } => self.count(text),
                    sqlsage_llm::ContentPart::Image { .. } => 0,
                })
                .sum(),
        }
    }

    /// Count tokens across an entire message history.
    #[must_use]
    pub fn count_messages(&self, messages: &[Message]) -> usize {
        messages.iter().map(|m| self.count_message(m)).sum()
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_counts_zero() {
        assert_eq!(TokenCounter::new().count(""), 0);
    }

    #[test]
    fn nonempty_text_counts_positive() {
        assert!(TokenCounter::new().count("hello world, this is a test") > 0);
    }

    #[test]
    fn counts_messages_sum() {
        let counter = TokenCounter::new();
        let messages = vec![Message::user("hi"), Message::assistant("hello there")];
        let total: usize = messages.iter().map(|m| counter.count_message(m)).sum();
        assert_eq!(counter.count_messages(&messages), total);
    }
}
