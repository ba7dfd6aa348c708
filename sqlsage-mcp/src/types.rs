//! MCP types for tools and tool-call results (spec §4.7).
//!
//! The spec's External Tool-Server Manager is a plain request/response tool
//! caller — resources, prompts, sampling, elicitation, and roots (the
//! Nov-2025 MCP capability extras) have no counterpart here.

use rmcp::model::{self as rmcp_model, RawContent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Definition of a tool exposed by one external server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name, as the server calls it (unprefixed).
    pub name: String,
    /// Server this tool belongs to.
    pub server: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// JSON Schema for input parameters.
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create from an rmcp `Tool` and the server it came from.
    #[must_use]
    pub fn from_rmcp(tool: &rmcp_model::Tool, server: &str) -> Self {
        Self {
            name: tool.name.to_string(),
            server: server.to_string(),
            description: tool.description.as_deref().map(String::from),
            input_schema: serde_json::to_value(&*tool.input_schema)
                .unwrap_or_else(|_| serde_json::json!({"type": "object"})),
        }
    }

    /// The `server:tool` name the catalog exposes to the LLM (spec §4.6).
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.server, self.name)
    }
}

/// Result of calling a tool on an external server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the call succeeded.
    pub success: bool,
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Error message, if the call failed.
    pub error: Option<String>,
}

impl ToolResult {
    /// Flatten all text-content parts into one string, joined by newlines.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                ToolContent::Text { text } => Some(text.as_str()),
                ToolContent::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<rmcp_model::CallToolResult> for ToolResult {
    fn from(result: rmcp_model::CallToolResult) -> Self {
        let is_error = result.is_error.unwrap_or(false);
        let content: Vec<ToolContent> = result.content.iter().map(ToolContent::from_rmcp).collect();

        let error = if is_error {
            let text = content
                .iter()
                .filter_map(|c| match c {
                    ToolContent::Text { text } => Some(text.as_str()),
                    ToolContent::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n");
            Some(if text.is_empty() { "unknown error".to_string() } else { text })
        } else {
            None
        };

        Self {
            success: !is_error,
            content,
            error,
        }
    }
}

/// Content returned by a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Image content (flattened to a placeholder by [`ToolResult::text_content`]).
    Image {
        /// Base64-encoded image data.
        data: String,
        /// MIME type.
        mime_type: String,
    },
}

impl ToolContent {
    fn from_rmcp(content: &rmcp_model::Content) -> Self {
        match &**content {
            RawContent::Image(image) => Self::Image {
                data: image.data.clone(),
                mime_type: image.mime_type.clone(),
            },
            RawContent::Text(text) => Self::Text {
                text: text.text.clone(),
            },
            RawContent::Audio(_) => Self::Text {
                text: "[audio content]".to_string(),
            },
            RawContent::Resource(embedded) => {
                let text = match &embedded.resource {
                    rmcp_model::ResourceContents::TextResourceContents { text, .. } => text.clone(),
                    rmcp_model::ResourceContents::BlobResourceContents { uri, .. } => {
                        format!("[resource: {uri}]")
                    }
                };
                Self::Text { text }
            }
            RawContent::ResourceLink(resource) => Self::Text {
                text: format!("[resource: {}]", resource.uri),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_prefixes_with_server() {
        let tool = ToolDefinition {
            name: "read_file".to_string(),
            server: "filesystem".to_string(),
            description: None,
            input_schema: serde_json::json!({"type": "object"}),
        };
        assert_eq!(tool.full_name(), "filesystem:read_file");
    }

    #[test]
    fn text_content_joins_text_parts() {
        let result = ToolResult {
            success: true,
            content: vec![
                ToolContent::Text { text: "a".to_string() },
                ToolContent::Text { text: "b".to_string() },
            ],
            error: None,
        };
        assert_eq!(result.text_content(), "a\nb");
    }
}
