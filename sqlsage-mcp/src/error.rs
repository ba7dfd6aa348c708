//! Errors for the external tool-server manager.

/// Errors the MCP layer can raise.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Server referenced by name is not configured.
    #[error("no server configured named {0}")]
    UnknownServer(String),
    /// Server is not currently running/connected.
    #[error("server {name} is not running")]
    ServerNotRunning {
        /// Server name.
        name: String,
    },
    /// Server process failed to spawn or the MCP handshake failed.
    #[error("failed to start server {name}: {reason}")]
    StartFailed {
        /// Server name.
        name: String,
        /// Underlying failure.
        reason: String,
    },
    /// The initial handshake did not complete within the connect timeout.
    #[error("server {name} did not respond within the connect timeout")]
    ConnectTimeout {
        /// Server name.
        name: String,
    },
    /// A tool call did not complete within the per-call timeout.
    #[error("tool call {server}:{tool} timed out")]
    CallTimeout {
        /// Server name.
        server: String,
        /// Tool name.
        tool: String,
    },
    /// A tool call failed.
    #[error("tool call {server}:{tool} failed: {reason}")]
    ToolCallFailed {
        /// Server name.
        server: String,
        /// Tool name.
        tool: String,
        /// Underlying failure.
        reason: String,
    },
    /// Invalid server configuration.
    #[error("invalid server configuration: {0}")]
    Config(String),
    /// I/O failure spawning or talking to a server process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Underlying rmcp transport/protocol error.
    #[error("MCP protocol error: {0}")]
    Rmcp(String),
}

/// Convenience alias for results from this crate.
pub type McpResult<T> = Result<T, McpError>;
