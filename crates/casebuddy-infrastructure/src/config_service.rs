//! Configuration service.
//!
//! Loads `ClientConfig` from `config.toml`, writing a default file the first
//! time, then layers environment overrides on top.

use crate::paths::CaseBuddyPaths;
use crate::storage::AtomicTomlFile;
use casebuddy_core::config::ClientConfig;
use casebuddy_core::error::Result;
use std::path::PathBuf;

pub const ENV_BACKEND_URL: &str = "CASEBUDDY_BACKEND_URL";
pub const ENV_TIMEOUT_SECS: &str = "CASEBUDDY_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicTomlFile<ClientConfig>,
}

impl ConfigService {
    pub fn new(paths: &CaseBuddyPaths) -> Result<Self> {
        Ok(Self::at(paths.config_file()?))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Reads the file as written, creating it with defaults if missing.
    pub fn load_file(&self) -> Result<ClientConfig> {
        if let Some(config) = self.file.load()? {
            return Ok(config);
        }

        let config = ClientConfig::default();
        self.file.save(&config)?;
        tracing::info!("Created default config at {}", self.file.path().display());
        Ok(config)
    }

    /// Reads the file and applies process environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        let config = self.load_file()?;
        Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
    }
}

/// Applies `CASEBUDDY_*` overrides read through `lookup`.
///
/// Blank values are ignored. An unparseable timeout is logged and ignored.
pub fn apply_env_overrides<F>(mut config: ClientConfig, lookup: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(url) = lookup(ENV_BACKEND_URL) {
        config.backend_url = url.trim().to_string();
    }

    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        match raw.trim().parse::<u64>() {
            Ok(secs) => config.request_timeout_secs = secs,
            Err(e) => tracing::warn!("Ignoring {}={:?}: {}", ENV_TIMEOUT_SECS, raw, e),
        }
    }

    config
}
