//! Deep merge of TOML values with per-field layer tracking.
//!
//! The merge operates on raw [`toml::Value`] trees rather than deserialized
//! structs. This correctly handles "absent vs default" — a missing key in a
//! TOML table will not override the base layer.

mod deep;
mod types;

pub use deep::{deep_merge, deep_merge_tracking};
pub use types::{ConfigLayer, FieldSources};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_merge_overlays_scalars_and_keeps_untouched_fields() {
        let mut base: toml::Value = toml::from_str(
            "[llm]\nprovider = \"claude\"\nmodel = \"claude-sonnet-4-20250514\"\n",
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[llm]\nmodel = \"claude-opus-4\"\n").unwrap();

        deep_merge(&mut base, &overlay);

        assert_eq!(base["llm"]["provider"].as_str(), Some("claude"));
        assert_eq!(base["llm"]["model"].as_str(), Some("claude-opus-4"));
    }

    #[test]
    fn deep_merge_tracking_records_layer_per_leaf() {
        let mut base: toml::Value = toml::from_str("[context]\nkeep_recent = 10\n").unwrap();
        let overlay: toml::Value = toml::from_str("[context]\nkeep_recent = 20\n").unwrap();
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::User, &mut sources);

        assert_eq!(sources.get("context.keep_recent"), Some(&ConfigLayer::User));
    }
}
