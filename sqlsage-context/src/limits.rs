//! Per-model context-window table and compression threshold (spec §4.5).

use sqlsage_core::ProviderKind;

/// Context-window size, in tokens, for `model` under provider family `kind`.
///
/// Delegates to `sqlsage_llm::context_limit_for`, which carries the same
/// provider-family defaults the spec's `context_limit()` table names: Claude
/// 200k, GPT-4o 128k, `DeepSeek` 64k, Gemini-1.5 1M, Qwen 32k, generic 8k.
#[must_use]
pub fn context_limit(kind: ProviderKind, model: &str) -> usize {
    sqlsage_llm::context_limit_for(kind, model)
}

/// The token count at which compression should trigger: `limit * fraction`.
///
/// `fraction` defaults to `0.8` per spec §4.5.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn threshold(limit: usize, fraction: f64) -> usize {
    ((limit as f64) * fraction.clamp(0.0, 1.0)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_is_eighty_percent() {
        assert_eq!(threshold(200_000, 0.8), 160_000);
    }

    #[test]
    fn claude_limit_is_200k() {
        assert_eq!(context_limit(ProviderKind::Claude, "claude-sonnet-4"), 200_000);
    }
}
