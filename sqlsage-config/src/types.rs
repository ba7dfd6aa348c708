//! Configuration types for the sqlsage agent.
//!
//! Every section implements [`Default`] with sensible production values so
//! that a bare `[section]` header in TOML (or an entirely missing file)
//! still produces a working configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration for the sqlsage agent front-end.
///
/// Loaded from layered TOML files (defaults, system, user, workspace) with
/// environment variable fallbacks, per spec §6 "External Interfaces" and
/// component C (ambient config, not itself numbered in the spec's table).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default LLM provider settings, used when creating a new provider
    /// profile without explicit overrides (spec §3 "LLM Provider").
    pub llm: LlmDefaults,
    /// Token counting / compression behaviour (spec §4.5).
    pub context: ContextSection,
    /// SQL Analyzer thresholds (spec §4.4, "thresholds configurable").
    pub analyzer: AnalyzerSection,
    /// Audit log retention (spec §3 "Audit Log", §6).
    pub audit: AuditSection,
    /// Migration task defaults (spec §3 "Migration Task", §4.9).
    pub migration: MigrationSection,
    /// External tool-server definitions (spec §4.7), keyed by server name.
    pub mcp: sqlsage_mcp::ServersConfig,
    /// Skill discovery locations (spec §4.8).
    pub skills: SkillsSection,
    /// Transient-failure retry policy for database adapters (spec §5).
    pub retry: RetrySection,
    /// Timeout budgets for external collaborators (spec §4.7, §4.8).
    pub timeouts: TimeoutsSection,
    /// Turn-loop and session limits (spec §4.10).
    pub sessions: SessionsSection,
    /// Logging configuration, handed to `sqlsage-telemetry` verbatim.
    pub logging: sqlsage_telemetry::LogConfig,
    /// Active UI/content language (spec §4.6, §4.10).
    pub language: sqlsage_core::Language,
}

// ---------------------------------------------------------------------------
// LlmDefaults
// ---------------------------------------------------------------------------

/// Default LLM provider selection and sampling parameters.
///
/// Mirrors `sqlsage_llm::ProviderConfig`; kept as a separate, serializable
/// type here since the config crate has no dependency on `sqlsage-llm` (a
/// provider client pulls in `reqwest`/`tokio`, which this crate does not
/// need).
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LlmDefaults {
    /// Provider kind, e.g. `"claude"`, `"openai"`, `"deepseek"`.
    pub provider: String,
    /// Model id sent to the provider API.
    pub model: String,
    /// API key. Prefer environment variables (`ASQL_LLM_API_KEY`,
    /// `ANTHROPIC_API_KEY`, ...) over storing this in a file.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL override, e.g. for a self-hosted proxy or `Ollama`.
    #[serde(skip_serializing)]
    pub base_url: Option<String>,
    /// Maximum tokens requested per completion.
    pub max_tokens: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// Context window override; `None` uses the per-model table in
    /// `sqlsage-context` (spec §4.5).
    pub context_window: Option<usize>,
}

impl std::fmt::Debug for LlmDefaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmDefaults")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("has_base_url", &self.base_url.is_some())
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("context_window", &self.context_window)
            .finish()
    }
}

impl Serialize for LlmDefaults {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("LlmDefaults", 5)?;
        state.serialize_field("provider", &self.provider)?;
        state.serialize_field("model", &self.model)?;
        // api_key and base_url are intentionally omitted.
        state.serialize_field("max_tokens", &self.max_tokens)?;
        state.serialize_field("temperature", &self.temperature)?;
        state.serialize_field("context_window", &self.context_window)?;
        state.end()
    }
}

impl Default for LlmDefaults {
    fn default() -> Self {
        Self {
            provider: "claude".to_owned(),
            model: "claude-sonnet-4-20250514".to_owned(),
            api_key: None,
            base_url: None,
            max_tokens: 4096,
            temperature: 0.7,
            context_window: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ContextSection
// ---------------------------------------------------------------------------

/// Token counting and context-compression behaviour (spec §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSection {
    /// Fraction of the model's context window at which compression kicks in.
    pub compression_threshold: f64,
    /// Number of most-recent messages always kept verbatim.
    pub keep_recent: usize,
    /// System prompt prepended to every conversation; empty uses the
    /// engine's built-in default.
    pub system_prompt: String,
}

impl Default for ContextSection {
    fn default() -> Self {
        Self {
            compression_threshold: 0.8,
            keep_recent: 10,
            system_prompt: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// AnalyzerSection
// ---------------------------------------------------------------------------

/// SQL Analyzer detection thresholds (spec §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSection {
    /// Estimated row count above which a full scan is `critical`.
    pub full_scan_critical_rows: i64,
    /// Estimated result size above which a query is `warning` (absent a
    /// critical finding already).
    pub large_result_warning_rows: i64,
    /// Nested-loop outer-side row count above which it is `warning`.
    pub nested_loop_warning_rows: i64,
    /// Total planner cost above which a query is `warning`.
    pub total_cost_warning: f64,
}

impl Default for AnalyzerSection {
    fn default() -> Self {
        Self {
            full_scan_critical_rows: 10_000,
            large_result_warning_rows: 100_000,
            nested_loop_warning_rows: 1_000,
            total_cost_warning: 10_000.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AuditSection
// ---------------------------------------------------------------------------

/// Audit log retention (spec §3 "Audit Log" invariant, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    /// Entries older than this many days are eligible for `cleanup`.
    pub retention_days: u32,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self { retention_days: 30 }
    }
}

// ---------------------------------------------------------------------------
// MigrationSection
// ---------------------------------------------------------------------------

/// Default options for newly created migration tasks (spec §3 "Migration
/// Task", §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationSection {
    /// Default value of a new task's `auto_execute` option.
    pub default_auto_execute: bool,
    /// Default batch size for `execute_migration_batch` when the tool call
    /// omits `n`.
    pub default_batch_size: u32,
}

impl Default for MigrationSection {
    fn default() -> Self {
        Self {
            default_auto_execute: false,
            default_batch_size: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// SkillsSection
// ---------------------------------------------------------------------------

/// Skill discovery locations (spec §4.8: "personal overrides project").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsSection {
    /// Personal skill directory override. Defaults to `~/.claude/skills`.
    pub personal_dir: Option<std::path::PathBuf>,
    /// Project skill directory override. Defaults to `./.claude/skills`.
    pub project_dir: Option<std::path::PathBuf>,
    /// Whether skill discovery runs at all.
    pub enabled: bool,
}

impl Default for SkillsSection {
    fn default() -> Self {
        Self {
            personal_dir: None,
            project_dir: None,
            enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// RetrySection
// ---------------------------------------------------------------------------

/// Transient-failure retry policy for database adapters (spec §5: "small
/// retry (default 3, exponential backoff 0.5·n seconds)").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    /// Maximum attempts before giving up.
    pub db_max_attempts: u32,
    /// Backoff base, in seconds; attempt `n` waits `base * n`.
    pub db_backoff_base_secs: f64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            db_max_attempts: 3,
            db_backoff_base_secs: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// TimeoutsSection
// ---------------------------------------------------------------------------

/// Timeout budgets for out-of-process collaborators (spec §4.7 "Timeouts",
/// §4.8 "Dynamic command execution").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsSection {
    /// External tool-server handshake timeout, in seconds.
    pub mcp_connect_secs: u64,
    /// External tool-server per-call timeout, in seconds.
    pub mcp_call_secs: u64,
    /// Skill `` !`cmd` `` dynamic command timeout, in seconds.
    pub skill_command_secs: u64,
}

impl Default for TimeoutsSection {
    fn default() -> Self {
        Self {
            mcp_connect_secs: 5,
            mcp_call_secs: 30,
            skill_command_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionsSection
// ---------------------------------------------------------------------------

/// Turn-loop iteration cap (spec §4.10 step 3: "default 30").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsSection {
    /// Maximum turn-loop iterations before the engine gives up.
    pub max_iterations: u32,
}

impl Default for SessionsSection {
    fn default() -> Self {
        Self { max_iterations: 30 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.llm.provider, config.llm.provider);
        assert_eq!(parsed.context.keep_recent, config.context.keep_recent);
    }

    #[test]
    fn llm_defaults_debug_redacts_api_key() {
        let mut cfg = LlmDefaults::default();
        cfg.api_key = Some("sk-secret-12345".to_owned());
        cfg.base_url = Some("https://my-proxy.example.com".to_owned());

        let debug_str = format!("{cfg:?}");
        assert!(!debug_str.contains("sk-secret-12345"));
        assert!(!debug_str.contains("my-proxy.example.com"));
        assert!(debug_str.contains("has_api_key: true"));
    }

    #[test]
    fn llm_defaults_serialize_omits_api_key() {
        let mut cfg = LlmDefaults::default();
        cfg.api_key = Some("sk-secret-12345".to_owned());

        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("sk-secret-12345"));
        assert!(!json.contains("api_key"));
    }
}
