//! Masking of sensitive values before they reach the audit log.

use serde_json::Value;

/// Parameter keys whose values are replaced with a fixed placeholder rather
/// than recorded verbatim. Matched case-insensitively against object keys at
/// any depth.
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "password_encrypted",
    "api_key",
    "api_key_encrypted",
    "secret",
    "token",
    "credential",
];

const REDACTED: &str = "***";

/// Recursively mask sensitive keys in a parameters value before it is
/// written to the audit log. Non-object/array values and unmatched keys pass
/// through unchanged.
#[must_use]
pub fn mask_parameters(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    if is_sensitive_key(&k) {
                        (k, Value::String(REDACTED.to_string()))
                    } else {
                        (k, mask_parameters(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(mask_parameters).collect()),
        other => other,
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEYS.iter().any(|s| lower.contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_top_level_sensitive_key() {
        let input = json!({"username": "alice", "password": "hunter2"});
        let masked = mask_parameters(input);
        assert_eq!(masked["username"], "alice");
        assert_eq!(masked["password"], REDACTED);
    }

    #[test]
    fn masks_nested_sensitive_key() {
        let input = json!({"connection": {"host": "db1", "api_key": "sk-abc"}});
        let masked = mask_parameters(input);
        assert_eq!(masked["connection"]["host"], "db1");
        assert_eq!(masked["connection"]["api_key"], REDACTED);
    }

    #[test]
    fn leaves_non_sensitive_values_untouched() {
        let input = json!({"query": "SELECT 1", "limit": 10});
        let masked = mask_parameters(input.clone());
        assert_eq!(masked, input);
    }
}
