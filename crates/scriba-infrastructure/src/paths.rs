//! Unified path management for scriba configuration files.
//!
//! ```text
//! ~/.config/scriba/            # Config directory
//! ├── secret.json              # API keys (read-only, plaintext JSON)
//! └── summaries/               # Finalized summaries (JsonSummarySink)
//!     └── <meeting_id>.json
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for scriba.
pub struct ScribaPaths;

impl ScribaPaths {
    /// Returns the scriba configuration directory (`~/.config/scriba/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeDirNotFound)?;
        Ok(home.join(".config").join("scriba"))
    }

    /// Returns the path to `secret.json`.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Returns the default directory for persisted summaries.
    pub fn summaries_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("summaries"))
    }
}
