//! sqlsage-skills — the Skill Registry & Executor (spec §4.8, component C8).
//!
//! Discovers `SKILL.md` files from two locations — personal
//! (`~/.claude/skills/<name>/SKILL.md`) overriding project
//! (`./.claude/skills/<name>/SKILL.md`) — parses each file's YAML
//! frontmatter and markdown body, and runs a skill's instructions through
//! three-stage textual substitution when invoked.
//!
//! A skill never executes on its own: running one produces processed
//! instruction text that the conversation engine injects as a new user
//! message, continuing the turn loop from there (spec §4.8, §4.10).
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::path::Path;
//! use sqlsage_skills::SkillRegistry;
//!
//! # async fn example() -> Result<(), sqlsage_skills::SkillError> {
//! let registry = SkillRegistry::discover(Path::new("."), dirs_home())?;
//! let instructions = registry.execute("review-migration", "task-42", &HashMap::new()).await?;
//! println!("{instructions}");
//! # Ok(())
//! # }
//! # fn dirs_home() -> Option<std::path::PathBuf> { None }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod discovery;
mod error;
mod executor;
mod model;
mod registry;

pub use discovery::{discover_skills, parse_skill_md, PROJECT_SKILLS_DIR};
pub use error::{SkillError, SkillResult};
pub use executor::substitute;
pub use model::{Skill, SkillConfig, SkillSource};
pub use registry::{build_context, tool_name, SkillRegistry, SkillToolDefinition};
