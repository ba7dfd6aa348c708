//! Resolves the on-disk home directory this front-end stores its database
//! and logs under.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Where sqlsage keeps its embedded database and log file.
pub(crate) struct Home {
    dir: PathBuf,
}

impl Home {
    /// Resolve the platform-appropriate data directory, creating it if
    /// necessary.
    pub(crate) fn resolve() -> Result<Self> {
        let dir = match ProjectDirs::from("", "", "sqlsage") {
            Some(dirs) => dirs.data_dir().to_path_buf(),
            None => std::env::current_dir()?.join(".sqlsage"),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Directory the embedded database lives under.
    pub(crate) fn db_path(&self) -> String {
        self.dir.join("store").display().to_string()
    }

    /// Log file path.
    pub(crate) fn log_path(&self) -> PathBuf {
        self.dir.join("sqlsage.log")
    }
}
