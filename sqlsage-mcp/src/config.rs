//! External tool-server configuration (spec §4.7).
//!
//! Servers are plain subprocesses speaking MCP over stdio — no SSE/HTTP
//! transport, no binary-hash verification, no restart policy. Loaded from
//! `servers.toml` under the user's config directory by `sqlsage-config`;
//! this module only owns the shape.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for a single external tool server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server name (unique identifier), filled in from the TOML table key.
    #[serde(skip)]
    pub name: String,
    /// Command to spawn.
    pub command: String,
    /// Arguments for the command.
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment variables.
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Working directory.
    pub cwd: Option<PathBuf>,
    /// Whether to auto-start on engine startup.
    #[serde(default)]
    pub auto_start: bool,
    /// Description for users.
    pub description: Option<String>,
}

impl ServerConfig {
    /// Create a server config for `command`.
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
            auto_start: false,
            description: None,
        }
    }

    /// Add arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add an environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Mark this server for auto-start.
    #[must_use]
    pub fn auto_start(mut self) -> Self {
        self.auto_start = true;
        self
    }

    /// Set a description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

/// The full set of configured external tool servers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServersConfig {
    /// Server configurations, keyed by name.
    #[serde(default)]
    pub servers: HashMap<String, ServerConfig>,
}

impl ServersConfig {
    /// Parse from TOML text, filling each server's `name` from its table key.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not valid TOML or does not match the
    /// expected shape.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(text)?;
        for (name, server) in &mut config.servers {
            server.name.clone_from(name);
        }
        Ok(config)
    }

    /// Get a server config by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.get(name)
    }

    /// Add (or replace) a server config.
    pub fn add(&mut self, config: ServerConfig) {
        self.servers.insert(config.name.clone(), config);
    }

    /// Remove a server config.
    pub fn remove(&mut self, name: &str) -> Option<ServerConfig> {
        self.servers.remove(name)
    }

    /// List all configured server names.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.servers.keys().map(String::as_str).collect()
    }

    /// Servers configured for auto-start.
    #[must_use]
    pub fn auto_start_servers(&self) -> Vec<&ServerConfig> {
        self.servers.values().filter(|s| s.auto_start).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_builder() {
        let config = ServerConfig::new("filesystem", "npx")
            .with_args(["-y", "@modelcontextprotocol/server-filesystem", "/tmp"])
            .with_env("DEBUG", "true")
            .auto_start();

        assert_eq!(config.name, "filesystem");
        assert!(config.auto_start);
        assert_eq!(config.env.get("DEBUG"), Some(&"true".to_string()));
    }

    #[test]
    fn parse_fills_names_from_table_keys() {
        let toml = r#"
[servers.filesystem]
command = "npx"
args = ["-y", "@modelcontextprotocol/server-filesystem", "/home/user"]
auto_start = true

[servers.memory]
command = "npx"
args = ["-y", "@modelcontextprotocol/server-memory"]
"#;
        let config = ServersConfig::parse(toml).unwrap();
        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.servers["filesystem"].name, "filesystem");
        assert!(config.servers["filesystem"].auto_start);
        assert!(!config.servers["memory"].auto_start);
    }

    #[test]
    fn auto_start_servers_filters() {
        let mut config = ServersConfig::default();
        config.add(ServerConfig::new("a", "cmd1").auto_start());
        config.add(ServerConfig::new("b", "cmd2"));
        let auto = config.auto_start_servers();
        assert_eq!(auto.len(), 1);
        assert_eq!(auto[0].name, "a");
    }
}
