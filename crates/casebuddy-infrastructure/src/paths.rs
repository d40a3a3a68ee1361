//! Unified path management for casebuddy files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/casebuddy/          # Config directory (platform config dir)
//! ├── config.toml               # Client configuration
//! ├── client_state.toml         # Persisted session / case identity
//! └── logs/                     # Application logs
//!     └── casebuddy.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;
use thiserror::Error;

const APP_DIR_NAME: &str = "casebuddy";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Platform config directory could not be determined.
    #[error("Cannot find config directory")]
    ConfigDirNotFound,
}

impl From<PathError> for casebuddy_core::CaseBuddyError {
    fn from(err: PathError) -> Self {
        Self::config(err.to_string())
    }
}

/// Path resolver rooted at the platform config directory, or at an explicit
/// base directory (tests, `--config-dir`).
#[derive(Debug, Clone, Default)]
pub struct CaseBuddyPaths {
    base_dir: Option<PathBuf>,
}

impl CaseBuddyPaths {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the casebuddy configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn state_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("client_state.toml"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
