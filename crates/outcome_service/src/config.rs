//! Service configuration
//!
//! Resolution order: defaults, then an optional TOML file, then environment
//! overrides. Command-line flags are applied last by the binary.

use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Overrides the artifact directory
pub const ENV_ARTIFACT_DIR: &str = "BOXOFFICE_ARTIFACT_DIR";
/// Overrides the log level
pub const ENV_LOG_LEVEL: &str = "BOXOFFICE_LOG_LEVEL";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Prediction service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory holding the artifact bundle
    pub artifact_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Load artifacts at startup instead of on the first request
    pub eager_load: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("artifacts"),
            log_level: "info".to_string(),
            eager_load: true,
        }
    }
}

impl ServiceConfig {
    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self, ServiceError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// File values plus environment overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config: ServiceConfig = toml::from_str(&content).map_err(|e| {
            ServiceError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.apply_env_overrides();
        config.validate()?;

        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_ARTIFACT_DIR).filter(|v| !v.trim().is_empty()) {
            self.artifact_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            let level = level.trim().to_lowercase();
            if LOG_LEVELS.contains(&level.as_str()) {
                self.log_level = level;
            } else {
                warn!("Ignoring invalid {}: {}", ENV_LOG_LEVEL, level);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.artifact_dir.as_os_str().is_empty() {
            return Err(ServiceError::Config("artifact_dir must not be empty".into()));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ServiceError::Config(format!(
                "log_level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.log_level
            )));
        }
        Ok(())
    }
}
