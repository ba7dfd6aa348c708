//! Resolved configuration display, for a future `sqlsage config show` command.

use std::path::PathBuf;

use serde::Serialize;

use crate::merge::FieldSources;
use crate::types::Config;

/// A fully loaded and validated configuration, plus the provenance of each
/// field and the files that contributed to it.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The merged, validated configuration.
    pub config: Config,
    /// Dotted field path → the layer that last set it.
    pub field_sources: FieldSources,
    /// Config files that were found and merged, in precedence order
    /// (lowest first).
    pub loaded_files: Vec<PathBuf>,
}

/// Output format for displaying a [`ResolvedConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// Human-readable, one `field = value  (source)` line per leaf.
    Text,
    /// Pretty-printed TOML of the merged configuration only (no sources).
    Toml,
    /// JSON object `{"config": ..., "field_sources": ..., "loaded_files": ...}`.
    Json,
}

#[derive(Serialize)]
struct JsonView<'a> {
    config: &'a Config,
    field_sources: std::collections::BTreeMap<String, String>,
    loaded_files: Vec<String>,
}

impl ResolvedConfig {
    /// Render this configuration in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error message if serialization fails (`Toml`/`Json` only;
    /// `Text` cannot fail).
    pub fn render(&self, format: ShowFormat) -> Result<String, String> {
        match format {
            ShowFormat::Text => Ok(self.render_text()),
            ShowFormat::Toml => toml::to_string_pretty(&self.config).map_err(|e| e.to_string()),
            ShowFormat::Json => {
                let view = JsonView {
                    config: &self.config,
                    field_sources: self
                        .field_sources
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_string()))
                        .collect(),
                    loaded_files: self
                        .loaded_files
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect(),
                };
                serde_json::to_string_pretty(&view).map_err(|e| e.to_string())
            },
        }
    }

    fn render_text(&self) -> String {
        let mut lines = Vec::new();
        let value = toml::Value::try_from(&self.config).unwrap_or(toml::Value::Table(toml::map::Map::new()));
        flatten(&value, "", &mut lines);
        lines.sort();
        lines
            .into_iter()
            .map(|(path, rendered)| {
                let source = self
                    .field_sources
                    .get(&path)
                    .map_or_else(|| "defaults".to_owned(), ToString::to_string);
                format!("{path} = {rendered}  ({source})")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn flatten(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(child, &path, out);
            }
        },
        other => out.push((prefix.to_owned(), other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_text_lists_every_leaf_with_a_source() {
        let resolved = ResolvedConfig {
            config: Config::default(),
            field_sources: FieldSources::new(),
            loaded_files: Vec::new(),
        };

        let text = resolved.render(ShowFormat::Text).unwrap();
        assert!(text.contains("llm.provider"));
        assert!(text.contains("(defaults)"));
    }

    #[test]
    fn render_json_round_trips() {
        let resolved = ResolvedConfig {
            config: Config::default(),
            field_sources: FieldSources::new(),
            loaded_files: vec![PathBuf::from("/etc/sqlsage/config.toml")],
        };

        let json = resolved.render(ShowFormat::Json).unwrap();
        assert!(json.contains("loaded_files"));
        assert!(json.contains("/etc/sqlsage/config.toml"));
    }
}
