use std::collections::HashMap;

/// Which configuration layer a value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Compiled-in defaults (`defaults.toml`).
    Defaults,
    /// System-wide configuration (`/etc/sqlsage/config.toml`).
    System,
    /// User-level configuration (`~/.sqlsage/config.toml`).
    User,
    /// Workspace-level configuration (`{workspace}/.sqlsage/config.toml`).
    Workspace,
    /// Environment variable fallback.
    Environment,
}

impl std::fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::System => write!(f, "system (/etc/sqlsage/config.toml)"),
            Self::User => write!(f, "user (~/.sqlsage/config.toml)"),
            Self::Workspace => write!(f, "workspace (.sqlsage/config.toml)"),
            Self::Environment => write!(f, "environment variable"),
        }
    }
}

/// Tracks which layer set each field's value.
pub type FieldSources = HashMap<String, ConfigLayer>;
