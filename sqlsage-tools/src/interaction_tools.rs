//! Interaction tool definitions (spec §4.6, item (iii)).
//!
//! `request_user_input` is never executed internally: the engine returns it
//! verbatim with its status tag so the front-end can drive a form (spec
//! §4.10 "Dispatch").

use sqlsage_core::Language;
use sqlsage_llm::LlmToolDefinition;

use crate::localize::tr;

/// The interaction half of the catalog.
#[must_use]
pub fn interaction_tool_definitions(language: Language) -> Vec<LlmToolDefinition> {
    vec![LlmToolDefinition::new("request_user_input")
        .with_description(tr(language, "request_user_input_desc"))
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": {"type": "string", "description": "What to ask the user"},
                "fields": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Named fields the front-end should collect, if this is a structured request"
                }
            },
            "required": ["prompt"]
        }))]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_user_input_is_present() {
        let defs = interaction_tool_definitions(Language::En);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "request_user_input");
    }
}
