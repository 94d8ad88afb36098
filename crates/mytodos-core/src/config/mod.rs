//! Client configuration.
//!
//! Provides `AppConfig`, the persisted settings every host uses to reach the
//! Graph API and to locate the local store. Values are read from a JSON file
//! and may be overridden through `MYTODOS_*` environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

const CONFIG_FILE_NAME: &str = "config.json";
const DATABASE_FILE_NAME: &str = "mytodos.db";
const APP_DIR_NAME: &str = "mytodos";

pub const DEFAULT_GRAPH_API_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_GRAPH_API_VERSION: &str = "v19.0";

pub const ENV_GRAPH_API_URL: &str = "MYTODOS_GRAPH_API_URL";
pub const ENV_GRAPH_API_VERSION: &str = "MYTODOS_GRAPH_API_VERSION";
pub const ENV_DB_PATH: &str = "MYTODOS_DB_PATH";
pub const ENV_ACCESS_TOKEN: &str = "MYTODOS_ACCESS_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub graph_api_url: Option<String>,
    #[serde(default)]
    pub graph_api_version: Option<String>,
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Default config file location, e.g. `~/.config/mytodos/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Default local store location, e.g. `~/.local/share/mytodos/mytodos.db`.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(DATABASE_FILE_NAME)
}

impl AppConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|error| {
            Error::Config(format!(
                "Failed to read config at {}: {}",
                path.display(),
                error
            ))
        })?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            Error::Config(format!(
                "Failed to parse config at {}: {}",
                path.display(),
                error
            ))
        })?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Apply `MYTODOS_*` overrides looked up through `lookup`.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = normalize_text_option(lookup(ENV_GRAPH_API_URL)) {
            self.graph_api_url = Some(url);
        }
        if let Some(version) = normalize_text_option(lookup(ENV_GRAPH_API_VERSION)) {
            self.graph_api_version = Some(version);
        }
        if let Some(path) = normalize_text_option(lookup(ENV_DB_PATH)) {
            self.db_path = Some(PathBuf::from(path));
        }
        self
    }

    /// Apply overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn graph_api_url(&self) -> String {
        normalize_text_option(self.graph_api_url.clone())
            .unwrap_or_else(|| DEFAULT_GRAPH_API_URL.to_string())
    }

    pub fn graph_api_version(&self) -> String {
        normalize_text_option(self.graph_api_version.clone())
            .unwrap_or_else(|| DEFAULT_GRAPH_API_VERSION.to_string())
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(default_db_path)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_http_url(&self.graph_api_url()) {
            return Err(Error::Config(
                "graph_api_url must include http:// or https://".to_string(),
            ));
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.graph_api_url = normalize_text_option(self.graph_api_url.take())
            .map(|url| url.trim_end_matches('/').to_string());
        self.graph_api_version = normalize_text_option(self.graph_api_version.take());
    }
}
