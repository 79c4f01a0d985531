//! Shell configuration resolved from the environment.
//!
//! Blank or missing variables fall back to defaults relative to the working
//! directory.

use std::path::{Path, PathBuf};
use taskrank_core::default_log_level;

pub const DB_PATH_VAR: &str = "TASKRANK_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "TASKRANK_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "TASKRANK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "taskrank.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl ShellConfig {
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir());
        Self::resolve(&cwd, |key| std::env::var(key).ok())
    }

    fn resolve(cwd: &Path, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let db_path = value(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.join(DEFAULT_DB_FILE_NAME));
        let log_level = value(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string());
        // Relative overrides are passed through; init_logging rejects them.
        let log_dir = value(LOG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.join(DEFAULT_LOG_DIR_NAME));

        Self {
            db_path,
            log_level,
            log_dir,
        }
    }
}
