//! Prelude module — commonly used types for convenient import.
//!
//! ```rust,no_run
//! use sqlsage_llm::prelude::*;
//!
//! # async fn example() -> LlmResult<()> {
//! let config = ProviderConfig::new("your-api-key", "claude-sonnet-4-20250514");
//! let provider = ClaudeProvider::new(config);
//! let response = provider.complete_simple("What is 2+2?").await?;
//! println!("Response: {response}");
//! # Ok(())
//! # }
//! ```

pub use crate::{LlmError, LlmResult};

pub use crate::{LlmProvider, ProviderConfig, StreamBox};

pub use crate::ClaudeProvider;
pub use crate::OpenAiCompatProvider;

pub use crate::{ContentPart, Message, MessageContent, MessageRole};

pub use crate::{LlmResponse, StopReason, StreamEvent, Usage};

pub use crate::{LlmToolDefinition, ToolCall, ToolCallResult};

pub use crate::{build_provider, context_limit_for};
