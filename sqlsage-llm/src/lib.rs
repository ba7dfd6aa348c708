//! sqlsage-llm — the LLM provider abstraction (spec §6, "LLM client contract").
//!
//! [`LlmProvider`] is the collaborator interface the Agent Conversation
//! Engine (`sqlsage-engine`) calls against: `complete(messages, tools) ->
//! {stop_reason, message, usage}`. Tool-call arguments round-trip as parsed
//! JSON; Gemini's `thought_signature` and similar provider-specific blobs
//! ride along on [`ToolCall`] as an opaque passthrough field that the engine
//! never inspects, only persists and re-sends.
//!
//! Two concrete providers ship here: [`ClaudeProvider`] (Anthropic's native
//! API) and [`OpenAiCompatProvider`], which covers `OpenAI`, `DeepSeek`,
//! Qwen, Gemini (via its `OpenAI`-compatible endpoint), and local Ollama —
//! all five of the non-Claude provider kinds in `sqlsage_core::ProviderKind`
//! speak the same wire shape, so one client suffices for all of them.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod claude;
mod error;
mod openai_compat;
pub mod prelude;
mod provider;
mod types;

pub use claude::ClaudeProvider;
pub use error::{LlmError, LlmResult};
pub use openai_compat::OpenAiCompatProvider;
pub use provider::{LlmProvider, ProviderConfig, StreamBox};
pub use types::{
    ContentPart, LlmResponse, LlmToolDefinition, Message, MessageContent, MessageRole, StopReason,
    StreamEvent, ToolCall, ToolCallResult, Usage,
};

use sqlsage_core::ProviderKind;

/// Build a provider for `kind` against the given API key, model, and
/// optional custom base URL (spec §3, "LLM Provider").
#[must_use]
pub fn build_provider(
    kind: ProviderKind,
    api_key: &str,
    model: &str,
    base_url: Option<&str>,
) -> Box<dyn LlmProvider> {
    match kind {
        ProviderKind::Claude => {
            let mut config = ProviderConfig::new(api_key, model);
            if let Some(url) = base_url {
                config = config.base_url(url);
            }
            Box::new(ClaudeProvider::new(config))
        }
        ProviderKind::OpenAi => Box::new(match base_url {
            Some(url) => OpenAiCompatProvider::custom(url, Some(api_key), model),
            None => OpenAiCompatProvider::openai(api_key, model),
        }),
        ProviderKind::DeepSeek => Box::new(OpenAiCompatProvider::deepseek(api_key, model)),
        ProviderKind::Qwen => Box::new(OpenAiCompatProvider::qwen(api_key, model)),
        ProviderKind::Gemini => Box::new(OpenAiCompatProvider::gemini(api_key, model)),
        ProviderKind::Ollama => Box::new(OpenAiCompatProvider::ollama(model)),
    }
}

/// Context-window size table keyed by provider family (spec §4.5,
/// "`context_limit()`"). Falls back to 8k for unrecognized models.
#[must_use]
pub fn context_limit_for(kind: ProviderKind, model: &str) -> usize {
    match kind {
        ProviderKind::Claude => 200_000,
        ProviderKind::OpenAi => {
            if model.contains("gpt-4o") || model.contains("gpt-4-turbo") {
                128_000
            } else if model.contains("gpt-4") {
                8_192
            } else {
                16_385
            }
        }
        ProviderKind::DeepSeek => 64_000,
        ProviderKind::Gemini => 1_000_000,
        ProviderKind::Qwen => 32_000,
        ProviderKind::Ollama => 8_000,
    }
}
