//! The External Tool-Server Manager (spec §4.7, component C7).
//!
//! Owns a set of subprocess MCP servers, each speaking JSON-RPC over stdio.
//! Tool calls are demuxed per server by rmcp's own request-id plumbing; this
//! manager's job is the lifecycle around that: connect with a bounded
//! handshake timeout, cache each server's catalog, bound every call with a
//! per-call timeout, and withdraw a server's tools (notifying subscribers so
//! the engine can refresh its system prompt) when its process exits.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{McpError, McpResult};
use crate::server::{ServerHandle, DEFAULT_CALL_TIMEOUT};
use crate::types::{ToolDefinition, ToolResult};

/// Emitted when the manager's tool catalog changes, so the conversation
/// engine knows to rebuild its system prompt (spec §4.6, §4.7).
#[derive(Debug, Clone)]
pub enum ManagerEvent {
    /// A server connected or refreshed its tool list.
    ToolsUpdated {
        /// The server whose tools changed.
        server: String,
    },
    /// A server's process exited; its tools are withdrawn from the catalog.
    ServerWithdrawn {
        /// The server that exited.
        server: String,
    },
}

struct Server {
    handle: Arc<ServerHandle>,
    call_timeout: Duration,
}

/// Manages the set of connected external tool servers.
pub struct ToolServerManager {
    servers: Arc<RwLock<HashMap<String, Server>>>,
    events_tx: broadcast::Sender<ManagerEvent>,
}

impl Default for ToolServerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolServerManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        let (events_tx, _rx) = broadcast::channel(64);
        Self {
            servers: Arc::new(RwLock::new(HashMap::new())),
            events_tx,
        }
    }

    /// Subscribe to tool-catalog change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ManagerEvent> {
        self.events_tx.subscribe()
    }

    /// Spawn `config`'s process, connect, and cache its tool catalog.
    ///
    /// A watcher task is spawned that withdraws the server's tools and
    /// emits [`ManagerEvent::ServerWithdrawn`] when the connection ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or the MCP
    /// handshake does not complete within [`crate::server::CONNECT_TIMEOUT`].
    pub async fn add_server(&self, config: ServerConfig) -> McpResult<()> {
        let name = config.name.clone();
        let handle = Arc::new(ServerHandle::spawn(&config).await?);

        {
            let mut servers = self.servers.write().await;
            servers.insert(
                name.clone(),
                Server {
                    handle: Arc::clone(&handle),
                    call_timeout: DEFAULT_CALL_TIMEOUT,
                },
            );
        }
        let _ = self.events_tx.send(ManagerEvent::ToolsUpdated { server: name.clone() });
        self.spawn_exit_watcher(name, handle);
        Ok(())
    }

    /// Watches one server's connection independent of the map lock: the
    /// watcher holds its own `Arc<ServerHandle>` clone, so waiting for
    /// process exit never blocks `add_server`/`remove_server` calls for
    /// other servers.
    fn spawn_exit_watcher(&self, name: String, handle: Arc<ServerHandle>) {
        let servers = Arc::clone(&self.servers);
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            handle.wait_for_exit().await;
            let mut guard = servers.write().await;
            if guard.remove(&name).is_some() {
                warn!(server = %name, "external tool server process exited");
                let _ = events_tx.send(ManagerEvent::ServerWithdrawn { server: name.clone() });
            }
        });
    }

    /// Remove and shut down a server, withdrawing its tools.
    pub async fn remove_server(&self, name: &str) {
        let removed = {
            let mut servers = self.servers.write().await;
            servers.remove(name)
        };
        if let Some(server) = removed {
            server.handle.shutdown().await;
            let _ = self
                .events_tx
                .send(ManagerEvent::ServerWithdrawn { server: name.to_string() });
            info!(server = name, "external tool server removed");
        }
    }

    /// Override the per-call timeout for one already-connected server.
    pub async fn set_call_timeout(&self, name: &str, timeout: Duration) {
        if let Some(server) = self.servers.write().await.get_mut(name) {
            server.call_timeout = timeout;
        }
    }

    /// The combined tool catalog across every connected server.
    pub async fn list_tools(&self) -> Vec<ToolDefinition> {
        let handles: Vec<Arc<ServerHandle>> =
            self.servers.read().await.values().map(|s| Arc::clone(&s.handle)).collect();
        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.tools().await);
        }
        all
    }

    /// Whether `server:tool_name` names a tool a connected server currently
    /// exposes (spec §4.6's `is_known_tool`).
    pub async fn is_known_tool(&self, server: &str, tool_name: &str) -> bool {
        let handle = self.servers.read().await.get(server).map(|s| Arc::clone(&s.handle));
        match handle {
            Some(handle) => handle.has_tool(tool_name).await,
            None => false,
        }
    }

    /// Call `tool_name` on `server` with `arguments`.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::UnknownServer`] if `server` is not connected, or
    /// whatever [`ServerHandle::call`] returns otherwise.
    pub async fn call(&self, server: &str, tool_name: &str, arguments: Value) -> McpResult<ToolResult> {
        let (handle, timeout) = {
            let servers = self.servers.read().await;
            let Some(s) = servers.get(server) else {
                return Err(McpError::UnknownServer(server.to_string()));
            };
            (Arc::clone(&s.handle), s.call_timeout)
        };
        if !handle.has_tool(tool_name).await {
            return Err(McpError::ToolCallFailed {
                server: server.to_string(),
                tool: tool_name.to_string(),
                reason: "tool not in server's advertised catalog".to_string(),
            });
        }
        handle.call(tool_name, arguments, timeout).await
    }

    /// Connect every `config`'s auto-start servers, logging (not failing on)
    /// individual connection errors.
    ///
    /// Returns the number of servers successfully connected.
    pub async fn connect_auto_servers(&self, configs: &crate::config::ServersConfig) -> usize {
        let mut connected = 0;
        for config in configs.auto_start_servers() {
            match self.add_server(config.clone()).await {
                Ok(()) => connected += 1,
                Err(e) => warn!(server = %config.name, error = %e, "failed to auto-connect tool server"),
            }
        }
        connected
    }

    /// Shut down every connected server.
    pub async fn shutdown_all(&self) {
        let names: Vec<String> = self.servers.read().await.keys().cloned().collect();
        for name in names {
            self.remove_server(&name).await;
        }
    }
}

impl std::fmt::Debug for ToolServerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolServerManager").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_manager_has_no_tools() {
        let manager = ToolServerManager::new();
        assert!(manager.list_tools().await.is_empty());
        assert!(!manager.is_known_tool("missing", "tool").await);
    }

    #[tokio::test]
    async fn call_against_unknown_server_errors() {
        let manager = ToolServerManager::new();
        let result = manager.call("missing", "tool", serde_json::json!({})).await;
        assert!(matches!(result, Err(McpError::UnknownServer(_))));
    }
}
