//! Environment variable fallback resolution (spec §6, "on-disk compatibility
//! ... is not required"; ambient concern only: `ASQL_*` plus the common
//! provider-specific API key variables).

use std::collections::HashMap;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

/// Provider-specific API key variables checked when `llm.api_key` is unset,
/// in order, keyed by the `llm.provider` value that selects them.
const PROVIDER_API_KEY_VARS: &[(&str, &str)] = &[
    ("claude", "ANTHROPIC_API_KEY"),
    ("openai", "OPENAI_API_KEY"),
    ("deepseek", "DEEPSEEK_API_KEY"),
    ("gemini", "GOOGLE_API_KEY"),
    ("qwen", "DASHSCOPE_API_KEY"),
];

/// Snapshot every environment variable once, so the loader never calls
/// `std::env::var` piecemeal (keeps the algorithm testable without mutating
/// the real process environment).
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Fill unset leaf fields from `ASQL_*` and provider-specific environment
/// variables. Returns the number of fields filled this way.
///
/// Only fields that are entirely absent from the merged tree (not merely
/// empty strings) are eligible — an explicit `api_key = ""` in a config
/// file is left alone.
pub fn apply_env_fallbacks(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String>,
) -> usize {
    let mut count = 0;

    if let Some(provider) = get_str(merged, &["llm", "provider"]) {
        if get_str(merged, &["llm", "api_key"]).is_none() {
            let var = PROVIDER_API_KEY_VARS
                .iter()
                .find(|(p, _)| *p == provider)
                .map(|(_, var)| *var)
                .unwrap_or("ASQL_LLM_API_KEY");
            if let Some(value) = env_vars
                .get(var)
                .or_else(|| env_vars.get("ASQL_LLM_API_KEY"))
            {
                set_str(merged, &["llm", "api_key"], value.clone());
                sources.insert("llm.api_key".to_owned(), ConfigLayer::Environment);
                count += 1;
                debug!(var, "filled llm.api_key from environment");
            }
        }
    }

    if get_str(merged, &["llm", "base_url"]).is_none() {
        if let Some(value) = env_vars.get("ASQL_LLM_BASE_URL") {
            set_str(merged, &["llm", "base_url"], value.clone());
            sources.insert("llm.base_url".to_owned(), ConfigLayer::Environment);
            count += 1;
        }
    }

    if let Some(value) = env_vars.get("ASQL_LLM_MODEL") {
        set_str(merged, &["llm", "model"], value.clone());
        sources.insert("llm.model".to_owned(), ConfigLayer::Environment);
        count += 1;
    }

    if let Some(value) = env_vars.get("ASQL_LOG_LEVEL") {
        set_str(merged, &["logging", "level"], value.clone());
        sources.insert("logging.level".to_owned(), ConfigLayer::Environment);
        count += 1;
    }

    count
}

/// Replace `${VAR}` placeholders in every string value with the matching
/// environment variable, left verbatim when unresolved.
pub fn resolve_env_references(value: &mut toml::Value, env_vars: &HashMap<String, String>) {
    match value {
        toml::Value::String(s) => {
            if let Some(resolved) = expand(s, env_vars) {
                *s = resolved;
            }
        },
        toml::Value::Table(table) => {
            for child in table.values_mut() {
                resolve_env_references(child, env_vars);
            }
        },
        toml::Value::Array(items) => {
            for item in items {
                resolve_env_references(item, env_vars);
            }
        },
        _ => {},
    }
}

fn expand(input: &str, env_vars: &HashMap<String, String>) -> Option<String> {
    if !input.contains("${") {
        return None;
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    let mut changed = false;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let name = &after[..end];
        if let Some(value) = env_vars.get(name) {
            out.push_str(value);
            changed = true;
        } else {
            out.push_str("${");
            out.push_str(name);
            out.push('}');
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    changed.then_some(out)
}

fn get_str<'a>(val: &'a toml::Value, path: &[&str]) -> Option<&'a str> {
    let mut current = val;
    for segment in path {
        current = current.as_table()?.get(*segment)?;
    }
    current.as_str()
}

fn set_str(val: &mut toml::Value, path: &[&str], new_val: String) {
    let Some((leaf, parents)) = path.split_last() else {
        return;
    };
    let mut current = val;
    for segment in parents {
        current = current
            .as_table_mut()
            .expect("config tree must be tables along a dotted path")
            .entry((*segment).to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    if let Some(table) = current.as_table_mut() {
        table.insert((*leaf).to_owned(), toml::Value::String(new_val));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_resolves_known_var() {
        let mut vars = HashMap::new();
        vars.insert("FOO".to_owned(), "bar".to_owned());
        assert_eq!(expand("prefix-${FOO}-suffix", &vars), Some("prefix-bar-suffix".to_owned()));
    }

    #[test]
    fn expand_leaves_unknown_var_verbatim() {
        let vars = HashMap::new();
        assert_eq!(expand("${UNKNOWN}", &vars), Some("${UNKNOWN}".to_owned()));
    }

    #[test]
    fn expand_no_placeholder_returns_none() {
        let vars = HashMap::new();
        assert_eq!(expand("plain text", &vars), None);
    }

    #[test]
    fn apply_env_fallbacks_fills_provider_api_key() {
        let mut merged: toml::Value = toml::from_str("[llm]\nprovider = \"claude\"\n").unwrap();
        let mut sources = FieldSources::new();
        let mut vars = HashMap::new();
        vars.insert("ANTHROPIC_API_KEY".to_owned(), "sk-test".to_owned());

        let count = apply_env_fallbacks(&mut merged, &mut sources, &vars);
        assert_eq!(count, 1);
        assert_eq!(get_str(&merged, &["llm", "api_key"]), Some("sk-test"));
    }

    #[test]
    fn apply_env_fallbacks_does_not_override_explicit_value() {
        let mut merged: toml::Value =
            toml::from_str("[llm]\nprovider = \"claude\"\napi_key = \"explicit\"\n").unwrap();
        let mut sources = FieldSources::new();
        let mut vars = HashMap::new();
        vars.insert("ANTHROPIC_API_KEY".to_owned(), "sk-test".to_owned());

        apply_env_fallbacks(&mut merged, &mut sources, &vars);
        assert_eq!(get_str(&merged, &["llm", "api_key"]), Some("explicit"));
    }
}
