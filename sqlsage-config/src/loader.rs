//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `/etc/sqlsage/config.toml` (system)
//! 3. Merge `~/.sqlsage/config.toml` (user)
//! 4. Merge `{workspace}/.sqlsage/config.toml` (workspace)
//! 5. Apply env var fallbacks for unset fields
//! 6. Resolve `${VAR}` references
//! 7. Deserialize merged tree → `Config`
//! 8. Validate
//! 9. Return `ResolvedConfig`

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars, resolve_env_references};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Load the unified configuration with layered file precedence.
///
/// `workspace_root` is the root of the current project (e.g. the git
/// repo root or `cwd`). If `None`, the workspace layer is skipped.
///
/// `home_override` provides an alternate home directory for user-level
/// config discovery, bypassing the default search logic and `ASQL_HOME`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, or if the
/// final merged configuration fails validation.
pub fn load(workspace_root: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let env_vars = collect_env_vars();
    let home_dir = if let Some(h) = home_override {
        h.to_path_buf()
    } else {
        home_directory()?
    };

    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();

    record_defaults(&merged, "", &mut field_sources);

    let system_path = PathBuf::from("/etc/sqlsage/config.toml");
    if let Some(overlay) = try_load_file(&system_path)? {
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::System,
            &mut field_sources,
        );
        loaded_files.push(system_path);
        info!(path = "/etc/sqlsage/config.toml", "loaded system config");
    }

    let user_config = if let Some(h) = home_override {
        let path = h.join("config.toml");
        try_load_file(&path)?.map(|overlay| (overlay, path))
    } else {
        let user_path = home_dir.join(".sqlsage").join("config.toml");
        if let Some(overlay) = try_load_file(&user_path)? {
            Some((overlay, user_path))
        } else if let Some(sqlsage_home) = env_vars.get("ASQL_HOME") {
            let path = PathBuf::from(sqlsage_home).join("config.toml");
            try_load_file(&path)?.map(|overlay| (overlay, path))
        } else {
            None
        }
    };

    if let Some((overlay, path)) = user_config {
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::User,
            &mut field_sources,
        );
        loaded_files.push(path.clone());
        info!(path = %path.display(), "loaded user config");
    }

    if let Some(ws_root) = workspace_root {
        let ws_path = ws_root.join(".sqlsage").join("config.toml");
        if let Some(overlay) = try_load_file(&ws_path)? {
            deep_merge_tracking(
                &mut merged,
                &overlay,
                "",
                &ConfigLayer::Workspace,
                &mut field_sources,
            );
            loaded_files.push(ws_path.clone());
            info!(path = %ws_path.display(), "loaded workspace config");
        }
    }

    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, &env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    resolve_env_references(&mut merged, &env_vars);
    let config: Config = merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: "<merged config>".to_owned(),
            source: e,
        })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let metadata = std::fs::metadata(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                metadata.len()
            ),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Try to load a file, returning `None` if the file doesn't exist.
///
/// Uses a single read operation to avoid TOCTOU races (no separate
/// exists/metadata checks before reading).
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}

/// Mark all leaf values in the defaults tree with the `Defaults` layer.
fn record_defaults(val: &toml::Value, prefix: &str, sources: &mut FieldSources) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            record_defaults(child, &path, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), ConfigLayer::Defaults);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_and_deserialize() {
        let val: toml::Value = toml::from_str(DEFAULTS_TOML).unwrap();
        assert!(val.as_table().unwrap().contains_key("llm"));

        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config.llm.provider, "claude");
        assert_eq!(config.sessions.max_iterations, 30);
    }

    #[test]
    fn load_without_files_succeeds_on_defaults() {
        let config = Config::default();
        assert!(validate::validate(&config).is_ok());
    }

    #[test]
    fn load_file_nonexistent_is_read_error() {
        let result = load_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn try_load_file_missing_returns_none() {
        let result = try_load_file(Path::new("/nonexistent/config.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn record_defaults_marks_every_leaf() {
        let val: toml::Value = toml::from_str(
            r#"
            [llm]
            provider = "claude"
            max_tokens = 4096
            "#,
        )
        .unwrap();

        let mut sources = FieldSources::new();
        record_defaults(&val, "", &mut sources);

        assert_eq!(sources.get("llm.provider"), Some(&ConfigLayer::Defaults));
        assert_eq!(sources.get("llm.max_tokens"), Some(&ConfigLayer::Defaults));
    }

    #[test]
    fn oversized_config_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("huge.toml");
        let data = "x = \"".to_owned() + &"a".repeat(1_100_000) + "\"";
        std::fs::write(&file_path, data).unwrap();

        let result = try_load_file(&file_path);
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn load_with_home_merges_user_layer() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[llm]\nmodel = \"claude-opus-4\"\n",
        )
        .unwrap();

        let resolved = load(None, Some(dir.path())).unwrap();
        assert_eq!(resolved.config.llm.model, "claude-opus-4");
        assert_eq!(
            resolved.field_sources.get("llm.model"),
            Some(&ConfigLayer::User)
        );
        assert_eq!(resolved.loaded_files.len(), 1);
    }
}
