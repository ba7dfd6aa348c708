//! A discovered skill: its YAML-frontmatter configuration plus the markdown
//! instructions that follow it (spec §4.8).

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

/// Which of the two search locations a skill was discovered in.
///
/// Personal skills (`~/.claude/skills/<name>/SKILL.md`) override project
/// skills (`./.claude/skills/<name>/SKILL.md`) of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillSource {
    /// Found under the user's home directory.
    Personal,
    /// Found under the current project's `.claude/skills/`.
    Project,
}

/// Configuration parsed from a `SKILL.md`'s YAML frontmatter.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillConfig {
    /// Skill name; defaults to the containing directory's name if absent
    /// from the frontmatter.
    #[serde(default)]
    pub name: String,
    /// One-line description shown in the tool catalog.
    #[serde(default)]
    pub description: String,
    /// Whether the LLM may invoke this skill on its own (spec §4.8); when
    /// `true`, the skill is still user-invocable but absent from the tool
    /// catalog the LLM sees.
    #[serde(default, rename = "disable-model-invocation", alias = "disable_model_invocation")]
    pub disable_model_invocation: bool,
    /// Whether a human operator can invoke this skill directly.
    #[serde(default = "default_true", rename = "user-invocable", alias = "user_invocable")]
    pub user_invocable: bool,
    /// Tool names this skill's injected instructions are allowed to use.
    #[serde(
        default,
        rename = "allowed-tools",
        alias = "allowed_tools",
        deserialize_with = "deserialize_string_or_list"
    )]
    pub allowed_tools: Vec<String>,
    /// Execution context: `"main"` (default) or `"fork"`.
    #[serde(default = "default_context")]
    pub context: String,
}

fn default_true() -> bool {
    true
}

fn default_context() -> String {
    "main".to_string()
}

fn deserialize_string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        Single(String),
        List(Vec<String>),
    }

    Ok(match Option::<StringOrList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrList::List(list)) => list,
        Some(StringOrList::Single(s)) => {
            s.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect()
        }
    })
}

/// A skill discovered on disk: its config plus the markdown body that
/// follows the frontmatter.
#[derive(Debug, Clone)]
pub struct Skill {
    /// Parsed frontmatter.
    pub config: SkillConfig,
    /// Markdown instructions, before substitution.
    pub instructions: String,
    /// Which search location this skill came from.
    pub source: SkillSource,
    /// Path to the `SKILL.md` file.
    pub path: PathBuf,
}

impl Skill {
    /// The skill's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Whether the LLM may invoke this skill on its own.
    #[must_use]
    pub fn is_model_invocable(&self) -> bool {
        !self.config.disable_model_invocation
    }

    /// Whether a human operator can invoke this skill directly.
    #[must_use]
    pub fn is_user_invocable(&self) -> bool {
        self.config.user_invocable
    }
}
