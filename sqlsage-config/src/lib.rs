#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for the sqlsage database agent.
//!
//! A single [`Config`] type consolidates the LLM defaults, context
//! compression, analyzer thresholds, audit retention, migration defaults,
//! MCP tool-server table, skill discovery, retry policy, timeout budgets,
//! session limits, logging, and language settings that the rest of the
//! workspace needs at startup.
//!
//! # Usage
//!
//! ```rust,no_run
//! use sqlsage_config::Config;
//!
//! let resolved = Config::load(Some(std::path::Path::new("."))).unwrap();
//! let config = resolved.config;
//! println!("using model: {}", config.llm.model);
//! ```
//!
//! # Configuration precedence
//!
//! From lowest to highest priority:
//!
//! 1. **Embedded defaults** (`defaults.toml`, compiled into the binary)
//! 2. **System** (`/etc/sqlsage/config.toml`)
//! 3. **User** (`~/.sqlsage/config.toml`, or `$ASQL_HOME/config.toml`)
//! 4. **Workspace** (`{workspace}/.sqlsage/config.toml`)
//! 5. **Environment variables** (`ASQL_*`, plus per-provider API key
//!    variables such as `ANTHROPIC_API_KEY`) — fallback only, applied to
//!    fields still unset after the file layers merge
//!
//! # Design
//!
//! This crate depends on `sqlsage-core` (for [`Language`](sqlsage_core::Language)),
//! `sqlsage-mcp` (for the tool-server table shape), and `sqlsage-telemetry`
//! (for the logging config shape) — reusing their types rather than
//! redefining the same shape twice. It otherwise only depends on `serde`,
//! `toml`, `thiserror`, `tracing`, and `directories`.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging with per-field layer tracking.
pub mod merge;
/// Resolved configuration display and serialization.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the
    /// final configuration fails validation.
    pub fn load(workspace_root: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, None)
    }

    /// Load configuration with an explicit home directory override, bypassing
    /// `~/.sqlsage` and `ASQL_HOME` discovery. Mainly useful for tests.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the
    /// final configuration fails validation.
    pub fn load_with_home(
        workspace_root: Option<&std::path::Path>,
        home_dir: &std::path::Path,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, Some(home_dir))
    }

    /// Load configuration from a single file, with no layering.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or
    /// fails validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
