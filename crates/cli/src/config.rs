use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokens_projector::ProjectorConfig;
use tokens_sync::SyncConfig;

/// Environment variable naming the config file when `--config` is absent
pub const CONFIG_ENV: &str = "DESIGN_TOKENS_CONFIG";

/// Whole-tool configuration file
///
/// ```toml
/// [sync]
/// excluded_collections = ["Documentation"]
///
/// [projector]
/// dart = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sync: SyncConfig,
    pub projector: ProjectorConfig,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Failed to parse configuration")?;
        config.sync.validate()?;
        Ok(config)
    }

    /// `--config`, then `DESIGN_TOKENS_CONFIG`, then built-in defaults
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
        let Some(path) = path else {
            log::debug!("No configuration file, using defaults");
            return Ok(Self::default());
        };
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }
}
