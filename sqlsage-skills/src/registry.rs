//! Looks up discovered skills by name and drives their substitution
//! (spec §4.8). Skills never execute directly: invoking one produces a
//! processed instruction string the caller injects as a new conversation
//! message, it does not run anything itself beyond the dynamic-command
//! stage of substitution.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{json, Value};

use sqlsage_core::SessionId;

use crate::discovery::discover_skills;
use crate::error::{SkillError, SkillResult};
use crate::executor::substitute;
use crate::model::Skill;

/// Build the variable-substitution context for one skill invocation: the
/// current session id (exposed to instructions as `${SESSION_ID}`) plus
/// whatever caller-supplied variables the engine wants to expose.
#[must_use]
pub fn build_context(
    session_id: SessionId,
    extra: HashMap<String, String>,
) -> HashMap<String, String> {
    let mut context = extra;
    context.insert("session_id".to_string(), session_id.to_string());
    context
}

/// A `skill_<name>` tool definition advertised to the LLM, independent of
/// any particular LLM-client crate's tool-definition type.
#[derive(Debug, Clone)]
pub struct SkillToolDefinition {
    /// Tool name, e.g. `skill_review_migration`.
    pub name: String,
    /// Tool description shown to the LLM.
    pub description: String,
    /// JSON schema for the tool's single `arguments` string parameter.
    pub input_schema: Value,
}

/// The name of the `skill_<name>` tool for a skill called `name`.
#[must_use]
pub fn tool_name(skill_name: &str) -> String {
    format!("skill_{skill_name}")
}

/// Holds every skill discovered at startup, keyed by name.
pub struct SkillRegistry {
    skills: HashMap<String, Skill>,
}

impl SkillRegistry {
    /// Discover every skill visible from `project_root`, with personal
    /// skills (under `home_dir`) overriding project skills of the same
    /// name.
    ///
    /// # Errors
    ///
    /// Returns an error if a skill directory exists but cannot be read, or
    /// a `SKILL.md` exists but fails to parse.
    pub fn discover(project_root: &Path, home_dir: Option<&Path>) -> SkillResult<Self> {
        let skills = discover_skills(project_root, home_dir)?
            .into_iter()
            .map(|s| (s.name().to_string(), s))
            .collect();
        Ok(Self { skills })
    }

    /// Look up a skill by name.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::NotFound`] if no skill by that name is
    /// registered.
    pub fn get(&self, name: &str) -> SkillResult<&Skill> {
        self.skills.get(name).ok_or_else(|| SkillError::NotFound(name.to_string()))
    }

    /// Every registered skill.
    pub fn list(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    /// Tool definitions for skills the LLM may invoke on its own (those
    /// with `disable_model_invocation: false`).
    #[must_use]
    pub fn model_invocable_tool_definitions(&self) -> Vec<SkillToolDefinition> {
        self.skills
            .values()
            .filter(|s| s.is_model_invocable())
            .map(|s| SkillToolDefinition {
                name: tool_name(s.name()),
                description: if s.config.description.is_empty() {
                    format!("Execute skill: {}", s.name())
                } else {
                    s.config.description.clone()
                },
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "arguments": {
                            "type": "string",
                            "description": "Arguments passed to the skill, substituted into its instructions."
                        }
                    },
                    "required": ["arguments"]
                }),
            })
            .collect()
    }

    /// Run the named skill's instructions through substitution and return
    /// the resulting text, for the caller to inject as a new user message.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::NotFound`] if no skill by that name is
    /// registered.
    pub async fn execute(
        &self,
        name: &str,
        raw_arguments: &str,
        context: &HashMap<String, String>,
    ) -> SkillResult<String> {
        let skill = self.get(name)?;
        Ok(substitute(&skill.instructions, raw_arguments, context).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_skill(dir: &Path, name: &str, body: &str) {
        let skill_dir = dir.join(".claude/skills").join(name);
        fs::create_dir_all(&skill_dir).unwrap();
        fs::write(skill_dir.join("SKILL.md"), body).unwrap();
    }

    #[tokio::test]
    async fn executes_skill_with_substitution() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(
            tmp.path(),
            "greet",
            "---\nname: greet\ndescription: Greets someone\n---\nHello, $ARGUMENTS!\n",
        );
        let registry = SkillRegistry::discover(tmp.path(), None).unwrap();
        let output = registry.execute("greet", "world", &HashMap::new()).await.unwrap();
        assert_eq!(output, "Hello, world!");
    }

    #[test]
    fn unknown_skill_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = SkillRegistry::discover(tmp.path(), None).unwrap();
        assert!(matches!(registry.get("nope"), Err(SkillError::NotFound(_))));
    }

    #[test]
    fn model_invocable_tools_skip_disabled_skills() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(
            tmp.path(),
            "hidden",
            "---\nname: hidden\ndescription: not for the model\ndisable-model-invocation: true\n---\nbody\n",
        );
        write_skill(tmp.path(), "visible", "---\nname: visible\ndescription: for the model\n---\nbody\n");
        let registry = SkillRegistry::discover(tmp.path(), None).unwrap();
        let tools = registry.model_invocable_tool_definitions();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "skill_visible");
    }
}
