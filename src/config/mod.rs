use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::models::RESUME_HISTORY_CAP;
use crate::persistence::DEFAULT_SAVE_DEBOUNCE;

const DEFAULT_CONFIG: &str = include_str!("defaults.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    pub data_dir: Option<PathBuf>,
    pub save_debounce_ms: u64,
    pub resume_history_cap: usize,
    pub log_filter: Option<String>,
    pub shell: Option<String>,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE.as_millis() as u64,
            resume_history_cap: RESUME_HISTORY_CAP,
            log_filter: None,
            shell: None,
        }
    }
}

impl WorkbenchConfig {
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// Configured data directory, else the platform data dir
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("paneweave")
        })
    }
}

pub fn parse_config(content: &str) -> Result<WorkbenchConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

pub fn load_config_from(path: &Path) -> Result<WorkbenchConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Load the user config, writing the commented defaults on first run.
/// Any failure falls back to defaults.
pub fn load_config() -> WorkbenchConfig {
    let path = config_path();

    if !path.exists() {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = std::fs::write(&path, DEFAULT_CONFIG);
        return WorkbenchConfig::default();
    }

    match load_config_from(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}; using defaults", e);
            WorkbenchConfig::default()
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("paneweave")
        .join("config.toml")
}
