#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Tool Registry — catalog assembly for the Agent Conversation Engine
//! (component C6).
//!
//! This crate does not execute anything. It produces the
//! [`sqlsage_llm::LlmToolDefinition`] list sent to the LLM on every turn:
//! the union of DB builtins, migration tools, interaction tools, each
//! enabled external tool-server's exposed tools (prefixed by server
//! identity), and each user-invocable skill (exposed as `skill_<name>`).
//! Dispatch — actually calling an adapter, the Migration Handler, a skill,
//! or an external server — is `sqlsage-engine`'s job; this crate only knows
//! names, descriptions, and JSON schemas.

mod db_tools;
mod interaction_tools;
mod localize;
mod migration_tools;

pub use db_tools::db_builtin_definitions;
pub use interaction_tools::interaction_tool_definitions;
pub use localize::tr;
pub use migration_tools::migration_tool_definitions;

use sqlsage_core::Language;
use sqlsage_llm::LlmToolDefinition;

/// One externally-spawned tool server's exposed tools, ready for prefixing.
#[derive(Debug, Clone)]
pub struct ExternalServerTools {
    /// Server identity, used as the catalog prefix.
    pub server_name: String,
    /// Tool schemas the server advertised at handshake time.
    pub tools: Vec<LlmToolDefinition>,
}

/// Separator between an external server's identity and its tool name in the
/// catalog, e.g. `postgres_helper:explain_plan`.
pub const EXTERNAL_TOOL_SEPARATOR: char = ':';

/// One user-invocable skill, as summarized by the Skill Registry.
#[derive(Debug, Clone)]
pub struct SkillSummary {
    /// Skill name (from `SKILL.md` frontmatter).
    pub name: String,
    /// Skill description (from `SKILL.md` frontmatter).
    pub description: String,
}

/// Prefix applied to a skill's name to form its catalog tool name.
pub const SKILL_TOOL_PREFIX: &str = "skill_";

/// Assemble the full tool catalog for one turn (spec §4.6): DB builtins,
/// migration tools, interaction tools, every enabled external server's
/// tools (prefixed `server:tool`), and every user-invocable skill (exposed
/// as `skill_<name>`). Descriptions are localized to `language` at
/// build time.
#[must_use]
pub fn build_catalog(
    language: Language,
    external_servers: &[ExternalServerTools],
    skills: &[SkillSummary],
) -> Vec<LlmToolDefinition> {
    let mut catalog = Vec::new();
    catalog.extend(db_builtin_definitions(language));
    catalog.extend(migration_tool_definitions(language));
    catalog.extend(interaction_tool_definitions(language));

    for server in external_servers {
        for tool in &server.tools {
            let prefixed_name = format!(
                "{}{EXTERNAL_TOOL_SEPARATOR}{}",
                server.server_name, tool.name
            );
            catalog.push(
                LlmToolDefinition::new(prefixed_name)
                    .with_description(
                        tool.description
                            .clone()
                            .unwrap_or_else(|| tool.name.clone()),
                    )
                    .with_schema(tool.input_schema.clone()),
            );
        }
    }

    for skill in skills {
        let name = format!("{SKILL_TOOL_PREFIX}{}", skill.name);
        catalog.push(
            LlmToolDefinition::new(name)
                .with_description(skill.description.clone())
                .with_schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "arguments": {
                            "type": "string",
                            "description": tr(language, "skill_arguments_desc"),
                        }
                    }
                })),
        );
    }

    catalog
}

/// Tool name is owned by the External Tool-Server Manager, not a builtin.
#[must_use]
pub fn is_external_tool(name: &str) -> bool {
    name.contains(EXTERNAL_TOOL_SEPARATOR)
}

/// Tool name is a skill invocation (`skill_<name>`).
#[must_use]
pub fn is_skill_tool(name: &str) -> bool {
    name.starts_with(SKILL_TOOL_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_prefix_collision_free() {
        let external = vec![ExternalServerTools {
            server_name: "postgres_helper".to_string(),
            tools: vec![LlmToolDefinition::new("explain_plan")],
        }];
        let skills = vec![SkillSummary {
            name: "release-notes".to_string(),
            description: "draft release notes".to_string(),
        }];
        let catalog = build_catalog(Language::En, &external, &skills);

        let names: Vec<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"list_tables"));
        assert!(names.contains(&"analyze_source_database"));
        assert!(names.contains(&"request_user_input"));
        assert!(names.contains(&"postgres_helper:explain_plan"));
        assert!(names.contains(&"skill_release-notes"));

        let mut seen = std::collections::HashSet::new();
        for name in &names {
            assert!(seen.insert(*name), "duplicate tool name: {name}");
        }
    }

    #[test]
    fn classification_helpers_agree_with_catalog() {
        assert!(is_external_tool("postgres_helper:explain_plan"));
        assert!(!is_external_tool("list_tables"));
        assert!(is_skill_tool("skill_release-notes"));
        assert!(!is_skill_tool("list_tables"));
    }
}
