//! Scans the two skill search locations and parses each `SKILL.md` found.
//!
//! Personal skills (`~/.claude/skills/<name>/SKILL.md`) take priority over
//! project skills (`./.claude/skills/<name>/SKILL.md`) of the same name —
//! a personal skill shadows a project skill, it does not merge with it.

use std::path::{Path, PathBuf};

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{SkillError, SkillResult};
use crate::model::{Skill, SkillConfig, SkillSource};

/// `---\n<frontmatter>\n---\n<body>`, frontmatter captured non-greedily so a
/// closing `---` inside the body never gets swallowed.
static FRONTMATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^---\s*\n(.*?)\n---\s*\n(.*)$").expect("valid regex"));

/// Project-relative skill directory, relative to the current working
/// directory (spec §4.8).
pub const PROJECT_SKILLS_DIR: &str = ".claude/skills";

/// Parse one `SKILL.md` file's contents into its frontmatter config and
/// instruction body.
///
/// # Errors
///
/// Returns [`SkillError::FrontmatterInvalid`] if the file has no
/// `---`-delimited frontmatter block or the block is not valid YAML.
pub fn parse_skill_md(path: &Path, contents: &str, source: SkillSource) -> SkillResult<Skill> {
    let Some(captures) = FRONTMATTER.captures(contents) else {
        return Err(SkillError::FrontmatterInvalid {
            path: path.to_path_buf(),
            message: "missing --- delimited YAML frontmatter".to_string(),
        });
    };
    let frontmatter = &captures[1];
    let body = captures[2].to_string();

    let mut config: SkillConfig =
        serde_yaml::from_str(frontmatter).map_err(|e| SkillError::FrontmatterInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if config.name.is_empty() {
        config.name = path
            .parent()
            .and_then(|dir| dir.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
    }

    Ok(Skill { config, instructions: body.trim().to_string(), source, path: path.to_path_buf() })
}

fn scan_dir(dir: &Path, source: SkillSource) -> SkillResult<Vec<Skill>> {
    let mut skills = Vec::new();
    if !dir.is_dir() {
        return Ok(skills);
    }
    let entries = std::fs::read_dir(dir).map_err(|e| SkillError::DirectoryReadFailed {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| SkillError::DirectoryReadFailed {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let skill_md = entry.path().join("SKILL.md");
        if !skill_md.is_file() {
            continue;
        }
        let contents = std::fs::read_to_string(&skill_md).map_err(|e| SkillError::FileReadFailed {
            path: skill_md.clone(),
            message: e.to_string(),
        })?;
        skills.push(parse_skill_md(&skill_md, &contents, source)?);
    }
    Ok(skills)
}

/// Discover every skill visible from `project_root`, personal skills already
/// overriding same-named project skills.
///
/// # Errors
///
/// Returns an error if a skill directory exists but cannot be read, or a
/// `SKILL.md` exists but fails to parse.
pub fn discover_skills(project_root: &Path, home_dir: Option<&Path>) -> SkillResult<Vec<Skill>> {
    let mut by_name = std::collections::HashMap::new();

    for skill in scan_dir(&project_root.join(PROJECT_SKILLS_DIR), SkillSource::Project)? {
        by_name.insert(skill.name().to_string(), skill);
    }
    if let Some(home) = home_dir {
        for skill in scan_dir(&home.join(".claude/skills"), SkillSource::Personal)? {
            by_name.insert(skill.name().to_string(), skill);
        }
    }

    Ok(by_name.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_skill(dir: &Path, name: &str, body: &str) {
        let skill_dir = dir.join(name);
        fs::create_dir_all(&skill_dir).unwrap();
        fs::write(skill_dir.join("SKILL.md"), body).unwrap();
    }

    #[test]
    fn parses_minimal_frontmatter() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(
            tmp.path(),
            "review",
            "---\nname: review\ndescription: Review SQL before executing\n---\nDo the thing: $ARGUMENTS\n",
        );
        let skills = scan_dir(tmp.path(), SkillSource::Project).unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name(), "review");
        assert_eq!(skills[0].config.description, "Review SQL before executing");
        assert_eq!(skills[0].instructions, "Do the thing: $ARGUMENTS");
    }

    #[test]
    fn missing_name_falls_back_to_directory_name() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "my-skill", "---\ndescription: no name given\n---\nBody\n");
        let skills = scan_dir(tmp.path(), SkillSource::Project).unwrap();
        assert_eq!(skills[0].name(), "my-skill");
    }

    #[test]
    fn missing_frontmatter_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "broken", "no frontmatter here\n");
        let err = scan_dir(tmp.path(), SkillSource::Project).unwrap_err();
        assert!(matches!(err, SkillError::FrontmatterInvalid { .. }));
    }

    #[test]
    fn personal_overrides_project() {
        let project = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        write_skill(project.path(), "review", "---\nname: review\ndescription: project version\n---\nbody\n");
        write_skill(&home.path().join(".claude/skills"), "review", "---\nname: review\ndescription: personal version\n---\nbody\n");

        let skills = discover_skills(project.path(), Some(home.path())).unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].config.description, "personal version");
        assert_eq!(skills[0].source, SkillSource::Personal);
    }
}
