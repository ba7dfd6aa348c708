//! sqlsage-mcp — the External Tool-Server Manager (spec §4.7, component C7).
//!
//! Spawns external tool servers as subprocesses speaking MCP's JSON-RPC
//! over stdio, caches each server's tool catalog, and exposes a single
//! `add_server`/`remove_server`/`list_tools`/`is_known_tool`/`call` surface
//! to the conversation engine. Every server connects within a 5-second
//! handshake timeout; every call is bounded (30 seconds by default). When a
//! server's process exits, its tools are withdrawn and subscribers are
//! notified so the engine can rebuild its system prompt.
//!
//! Resources, prompts, sampling, elicitation, and roots — the wider MCP
//! surface — have no counterpart in this spec; only tool calling is in
//! scope.
//!
//! ```rust,no_run
//! use sqlsage_mcp::{ServerConfig, ToolServerManager};
//!
//! # async fn example() -> Result<(), sqlsage_mcp::McpError> {
//! let manager = ToolServerManager::new();
//! manager.add_server(
//!     ServerConfig::new("filesystem", "npx")
//!         .with_args(["-y", "@modelcontextprotocol/server-filesystem", "/tmp"])
//! ).await?;
//!
//! let tools = manager.list_tools().await;
//! for tool in tools {
//!     println!("tool: {}", tool.full_name());
//! }
//!
//! let result = manager
//!     .call("filesystem", "read_file", serde_json::json!({"path": "/tmp/test.txt"}))
//!     .await?;
//! println!("{}", result.text_content());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod config;
mod error;
mod manager;
mod server;
mod types;

pub use config::{ServerConfig, ServersConfig};
pub use error::{McpError, McpResult};
pub use manager::{ManagerEvent, ToolServerManager};
pub use server::{CONNECT_TIMEOUT, DEFAULT_CALL_TIMEOUT};
pub use types::{ToolContent, ToolDefinition, ToolResult};
