//! Post-merge configuration validation.
//!
//! Validates that a deserialized [`Config`](crate::Config) is within
//! acceptable ranges and that cross-field invariants hold.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_llm(config)?;
    validate_context(config)?;
    validate_analyzer(config)?;
    validate_retry(config)?;
    validate_timeouts(config)?;
    validate_sessions(config)?;
    validate_logging(config)?;
    Ok(())
}

/// Maximum allowed `max_tokens` value (16 million).
const MAX_TOKENS_UPPER_BOUND: usize = 16_000_000;

fn validate_llm(config: &Config) -> ConfigResult<()> {
    let llm = &config.llm;

    if !matches!(
        llm.provider.as_str(),
        "claude" | "openai" | "deepseek" | "gemini" | "qwen"
    ) {
        return Err(ConfigError::ValidationError {
            field: "llm.provider".to_owned(),
            message: format!(
                "unsupported provider '{}'; expected one of: claude, openai, deepseek, gemini, qwen",
                llm.provider
            ),
        });
    }

    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::ValidationError {
            field: "llm.temperature".to_owned(),
            message: format!(
                "temperature {} is out of range; must be between 0.0 and 2.0",
                llm.temperature
            ),
        });
    }

    if llm.max_tokens == 0 || llm.max_tokens > MAX_TOKENS_UPPER_BOUND {
        return Err(ConfigError::ValidationError {
            field: "llm.max_tokens".to_owned(),
            message: format!("max_tokens must be between 1 and {MAX_TOKENS_UPPER_BOUND}"),
        });
    }

    Ok(())
}

fn validate_context(config: &Config) -> ConfigResult<()> {
    let ctx = &config.context;

    if !(0.0..=1.0).contains(&ctx.compression_threshold) {
        return Err(ConfigError::ValidationError {
            field: "context.compression_threshold".to_owned(),
            message: format!(
                "compression_threshold {} is out of range; must be between 0.0 and 1.0",
                ctx.compression_threshold
            ),
        });
    }

    Ok(())
}

fn validate_analyzer(config: &Config) -> ConfigResult<()> {
    let a = &config.analyzer;

    if a.full_scan_critical_rows <= 0 {
        return Err(ConfigError::ValidationError {
            field: "analyzer.full_scan_critical_rows".to_owned(),
            message: "full_scan_critical_rows must be positive".to_owned(),
        });
    }

    if !a.total_cost_warning.is_finite() || a.total_cost_warning <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "analyzer.total_cost_warning".to_owned(),
            message: "total_cost_warning must be a finite positive number".to_owned(),
        });
    }

    Ok(())
}

fn validate_retry(config: &Config) -> ConfigResult<()> {
    let r = &config.retry;

    if r.db_max_attempts == 0 {
        return Err(ConfigError::ValidationError {
            field: "retry.db_max_attempts".to_owned(),
            message: "db_max_attempts must be greater than 0".to_owned(),
        });
    }

    if !r.db_backoff_base_secs.is_finite() || r.db_backoff_base_secs < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "retry.db_backoff_base_secs".to_owned(),
            message: "db_backoff_base_secs must be a finite non-negative number".to_owned(),
        });
    }

    Ok(())
}

fn validate_timeouts(config: &Config) -> ConfigResult<()> {
    let t = &config.timeouts;

    if t.mcp_connect_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "timeouts.mcp_connect_secs".to_owned(),
            message: "mcp_connect_secs must be greater than 0".to_owned(),
        });
    }

    if t.mcp_call_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "timeouts.mcp_call_secs".to_owned(),
            message: "mcp_call_secs must be greater than 0".to_owned(),
        });
    }

    if t.skill_command_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "timeouts.skill_command_secs".to_owned(),
            message: "skill_command_secs must be greater than 0".to_owned(),
        });
    }

    Ok(())
}

fn validate_sessions(config: &Config) -> ConfigResult<()> {
    if config.sessions.max_iterations == 0 {
        return Err(ConfigError::ValidationError {
            field: "sessions.max_iterations".to_owned(),
            message: "max_iterations must be greater than 0".to_owned(),
        });
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn rejects_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "grok".to_owned();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 3.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_zero_max_tokens() {
        let mut config = Config::default();
        config.llm.max_tokens = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_out_of_range_compression_threshold() {
        let mut config = Config::default();
        config.context.compression_threshold = 1.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_zero_retry_attempts() {
        let mut config = Config::default();
        config.retry.db_max_attempts = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = Config::default();
        config.timeouts.mcp_connect_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_zero_max_iterations() {
        let mut config = Config::default();
        config.sessions.max_iterations = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_nan_total_cost_warning() {
        let mut config = Config::default();
        config.analyzer.total_cost_warning = f64::NAN;
        assert!(validate(&config).is_err());
    }
}
