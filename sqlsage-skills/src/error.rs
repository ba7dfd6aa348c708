//! Errors for skill discovery and execution.

use std::path::PathBuf;

/// Errors the skill layer can raise.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    /// A skill directory could not be read.
    #[error("failed to read skill directory {path}: {message}")]
    DirectoryReadFailed {
        /// The directory that failed.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// A `SKILL.md` file could not be read.
    #[error("failed to read {path}: {message}")]
    FileReadFailed {
        /// The file that failed.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// A `SKILL.md`'s YAML frontmatter could not be parsed.
    #[error("failed to parse frontmatter in {path}: {message}")]
    FrontmatterInvalid {
        /// The file that failed.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// `skill_<name>` was requested but no such skill is registered.
    #[error("no skill named {0}")]
    NotFound(String),
}

/// Convenience alias for results from this crate.
pub type SkillResult<T> = Result<T, SkillError>;
