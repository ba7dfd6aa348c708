//! Shared identifiers and small value types used across every `sqlsage` crate.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident, $prefix:literal) => {
        #[doc = concat!("Unique identifier for a ", $prefix, ".")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(ConnectionId, "database connection");
uuid_id!(ProviderId, "LLM provider");
uuid_id!(ExternalServerId, "external tool-server configuration");
uuid_id!(SessionId, "chat session");
uuid_id!(MessageId, "chat message");
uuid_id!(MigrationTaskId, "migration task");
uuid_id!(MigrationItemId, "migration item");
uuid_id!(AuditEntryId, "audit log entry");

/// Wall-clock timestamp, serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub chrono::DateTime<chrono::Utc>);

impl Timestamp {
    /// Capture the current instant.
    #[must_use]
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Relational database engine kind, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// PostgreSQL.
    PostgreSql,
    /// MySQL / MariaDB.
    MySql,
    /// Huawei `GaussDB` (PostgreSQL wire-compatible, distributed variants exist).
    GaussDb,
    /// Oracle Database.
    Oracle,
    /// Microsoft SQL Server.
    SqlServer,
}

impl EngineKind {
    /// Short machine-readable name, as persisted and as used in tool arguments.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PostgreSql => "postgresql",
            Self::MySql => "mysql",
            Self::GaussDb => "gaussdb",
            Self::Oracle => "oracle",
            Self::SqlServer => "sqlserver",
        }
    }

    /// Parse from the persisted/arguments string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Some(Self::PostgreSql),
            "mysql" => Some(Self::MySql),
            "gaussdb" | "opengauss" => Some(Self::GaussDb),
            "oracle" => Some(Self::Oracle),
            "sqlserver" | "mssql" => Some(Self::SqlServer),
            _ => None,
        }
    }

    /// Whether this engine's wire protocol is PostgreSQL-compatible, which lets
    /// `sqlsage-db` reuse the PostgreSQL adapter's SQL and introspection queries.
    #[must_use]
    pub fn is_postgres_wire_compatible(self) -> bool {
        matches!(self, Self::PostgreSql | Self::GaussDb)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// LLM provider family, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// DeepSeek.
    DeepSeek,
    /// OpenAI (and OpenAI-API-compatible endpoints).
    OpenAi,
    /// Anthropic Claude.
    Claude,
    /// Google Gemini.
    Gemini,
    /// Alibaba Qwen.
    Qwen,
    /// Local `Ollama` server.
    Ollama,
}

impl ProviderKind {
    /// Machine-readable name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::OpenAi => "openai",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Qwen => "qwen",
            Self::Ollama => "ollama",
        }
    }

    /// Parse from the persisted/config string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deepseek" => Some(Self::DeepSeek),
            "openai" => Some(Self::OpenAi),
            "claude" | "anthropic" => Some(Self::Claude),
            "gemini" | "google" => Some(Self::Gemini),
            "qwen" => Some(Self::Qwen),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Active UI language for localized tool descriptions and template strings
/// (spec §4.6, §4.10). Not a full i18n framework — see `SPEC_FULL.md`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// English (default/fallback).
    #[default]
    En,
    /// Simplified Chinese.
    Zh,
}

/// A chat message role, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// A message authored by the human operator.
    User,
    /// A message authored by the LLM.
    Assistant,
    /// A tool execution result fed back to the LLM.
    Tool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_kind_round_trips() {
        for kind in [
            EngineKind::PostgreSql,
            EngineKind::MySql,
            EngineKind::GaussDb,
            EngineKind::Oracle,
            EngineKind::SqlServer,
        ] {
            assert_eq!(EngineKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn gaussdb_is_postgres_wire_compatible() {
        assert!(EngineKind::GaussDb.is_postgres_wire_compatible());
        assert!(!EngineKind::MySql.is_postgres_wire_compatible());
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
