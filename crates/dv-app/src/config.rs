//! Application configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dv_data::ApiConfig;
use serde::{Deserialize, Serialize};

/// Environment variable naming a JSON config file
pub const CONFIG_ENV: &str = "DATAVIS_CONFIG";

/// Settings for the shell and its backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the backend API
    pub api_base_url: String,

    /// File holding the persisted session
    pub session_file: PathBuf,

    /// Directory reports are downloaded into
    pub download_dir: PathBuf,

    /// Filter used when `RUST_LOG` is not set
    pub log_filter: String,

    /// Timeout of a single HTTP request in seconds; 0 disables it
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let session_file = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datavis")
            .join("session.json");
        let download_dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            session_file,
            download_dir,
            log_filter: "info".to_string(),
            request_timeout_secs: 0,
        }
    }
}

impl AppConfig {
    /// Load from `DATAVIS_CONFIG` (or defaults), then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a JSON config file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    /// Apply `DATAVIS_*` overrides looked up through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATAVIS_API_URL") {
            self.api_base_url = url;
        }
        if let Some(path) = lookup("DATAVIS_SESSION_FILE") {
            self.session_file = PathBuf::from(path);
        }
        if let Some(dir) = lookup("DATAVIS_DOWNLOAD_DIR") {
            self.download_dir = PathBuf::from(dir);
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_base_url.clone(),
            download_dir: self.download_dir.clone(),
            timeout: (self.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.request_timeout_secs)),
        }
    }
}
