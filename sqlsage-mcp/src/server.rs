//! One spawned external tool-server process (spec §4.7).
//!
//! The MCP handshake hands back a [`RunningService`] that owns the
//! background transport task; its [`Peer`] handle is cheaply cloneable and
//! is what calls/list-tools actually go through. Keeping the service itself
//! behind a `Mutex<Option<_>>` lets [`ServerHandle::shutdown`] take it back
//! out and cancel it while the handle is still shared (via `Arc`) with the
//! manager's exit-watcher task.

use std::time::Duration;

use rmcp::model::CallToolRequestParam;
use rmcp::service::{Peer, RunningService};
use rmcp::transport::TokioChildProcess;
use rmcp::{RoleClient, ServiceExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{McpError, McpResult};
use crate::types::{ToolDefinition, ToolResult};

/// Connection handshake must complete within this long (spec §4.7).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A single tool call must complete within this long, unless the server
/// config overrides it (spec §4.7).
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit polling interval for [`ServerHandle::wait_for_exit`].
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A running MCP server process plus its cached tool catalog.
pub struct ServerHandle {
    name: String,
    peer: Peer<RoleClient>,
    service: Mutex<Option<RunningService<RoleClient, ()>>>,
    tools: tokio::sync::RwLock<Vec<ToolDefinition>>,
}

impl ServerHandle {
    /// Spawn `config`'s command and perform the MCP initialize handshake,
    /// bounded by [`CONNECT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`McpError::StartFailed`] if the process cannot be spawned,
    /// [`McpError::ConnectTimeout`] if the handshake does not complete in
    /// time, or [`McpError::Rmcp`] if the handshake itself fails.
    pub async fn spawn(config: &ServerConfig) -> McpResult<Self> {
        let mut command = Command::new(&config.command);
        command.args(&config.args);
        for (key, value) in &config.env {
            command.env(key, value);
        }
        if let Some(cwd) = &config.cwd {
            command.current_dir(cwd);
        }

        let transport = TokioChildProcess::new(command).map_err(|e| McpError::StartFailed {
            name: config.name.clone(),
            reason: e.to_string(),
        })?;

        let service = tokio::time::timeout(CONNECT_TIMEOUT, ().serve(transport))
            .await
            .map_err(|_elapsed| McpError::ConnectTimeout {
                name: config.name.clone(),
            })?
            .map_err(|e| McpError::Rmcp(e.to_string()))?;

        let peer = service.peer().clone();
        let handle = Self {
            name: config.name.clone(),
            peer,
            service: Mutex::new(Some(service)),
            tools: tokio::sync::RwLock::new(Vec::new()),
        };
        handle.refresh_tools().await?;
        info!(
            server = %handle.name,
            tools = handle.tools.read().await.len(),
            "external tool server connected"
        );
        Ok(handle)
    }

    /// Re-list tools from the server and replace the cached catalog.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::Rmcp`] if the server rejects the `tools/list` call.
    pub async fn refresh_tools(&self) -> McpResult<()> {
        let tools = self
            .peer
            .list_all_tools()
            .await
            .map_err(|e| McpError::Rmcp(e.to_string()))?;
        let defs = tools
            .iter()
            .map(|t| ToolDefinition::from_rmcp(t, &self.name))
            .collect();
        *self.tools.write().await = defs;
        Ok(())
    }

    /// This server's cached tool catalog.
    pub async fn tools(&self) -> Vec<ToolDefinition> {
        self.tools.read().await.clone()
    }

    /// Whether `tool_name` is among this server's known tools.
    pub async fn has_tool(&self, tool_name: &str) -> bool {
        self.tools.read().await.iter().any(|t| t.name == tool_name)
    }

    /// Call `tool_name` with `arguments`, bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::CallTimeout`] if the call exceeds `timeout`, or
    /// [`McpError::ToolCallFailed`] if the server returns a protocol error.
    pub async fn call(
        &self,
        tool_name: &str,
        arguments: serde_json::Value,
        timeout: Duration,
    ) -> McpResult<ToolResult> {
        let arguments = match arguments {
            serde_json::Value::Object(map) => Some(map),
            serde_json::Value::Null => None,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("value".to_string(), other);
                Some(map)
            }
        };

        let params = CallToolRequestParam {
            name: tool_name.to_string().into(),
            arguments,
        };

        let result = tokio::time::timeout(timeout, self.peer.call_tool(params))
            .await
            .map_err(|_elapsed| McpError::CallTimeout {
                server: self.name.clone(),
                tool: tool_name.to_string(),
            })?
            .map_err(|e| McpError::ToolCallFailed {
                server: self.name.clone(),
                tool: tool_name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(ToolResult::from(result))
    }

    /// Resolves when the underlying connection ends (child process exit or
    /// transport error), for the manager's exit-watcher task. Polls rather
    /// than subscribing to a close notification because [`Peer`] only
    /// exposes a point-in-time liveness check.
    pub async fn wait_for_exit(&self) {
        loop {
            if self.peer.is_transport_closed() {
                return;
            }
            tokio::time::sleep(EXIT_POLL_INTERVAL).await;
        }
    }

    /// Gracefully shut down the server connection.
    pub async fn shutdown(&self) {
        if let Some(service) = self.service.lock().await.take() {
            if let Err(e) = service.cancel().await {
                warn!(server = %self.name, error = %e, "error shutting down external tool server");
            }
        }
    }
}
