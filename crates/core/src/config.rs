//! Environment configuration.
//!
//! Settings come from the process environment, after loading a `.env` file
//! from the working directory if one exists.

use std::env;
use std::path::PathBuf;

use crate::client::{ClientConfig, DEFAULT_BASE_URL};
use crate::store::PersistMode;
use crate::{Result, UrlsumError};

pub const BASE_URL_VAR: &str = "URLSUM_BASE_URL";
pub const DATA_DIR_VAR: &str = "URLSUM_DATA_DIR";
pub const TIMEOUT_VAR: &str = "URLSUM_TIMEOUT";
pub const PERSIST_VAR: &str = "URLSUM_PERSIST";

/// Runtime settings shared by every entry point.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub data_dir: PathBuf,
    pub timeout: Option<u64>,
    pub persist: PersistMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: default_data_dir(),
            timeout: None,
            persist: PersistMode::OnWrite,
        }
    }
}

impl Settings {
    /// Loads `.env` (if present) and reads settings from the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset or blank keys use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Settings::default();

        if let Some(base_url) = get(BASE_URL_VAR) {
            settings.base_url = base_url;
        }

        if let Some(dir) = get(DATA_DIR_VAR) {
            settings.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = get(TIMEOUT_VAR) {
            let secs = raw
                .parse::<u64>()
                .map_err(|_| UrlsumError::ConfigError(format!("{} must be a whole number of seconds", TIMEOUT_VAR)))?;
            settings.timeout = Some(secs);
        }

        if let Some(raw) = get(PERSIST_VAR) {
            settings.persist = match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => PersistMode::OnWrite,
                "0" | "false" | "no" | "off" => PersistMode::ReadOnly,
                _ => return Err(UrlsumError::ConfigError(format!("{} must be true or false", PERSIST_VAR))),
            };
        }

        Ok(settings)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig { base_url: self.base_url.clone(), timeout: self.timeout, ..Default::default() }
    }
}

/// Platform data directory for history, e.g. `~/.local/share/urlsum`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("urlsum"))
        .or_else(|| dirs::home_dir().map(|h| h.join(".urlsum")))
        .unwrap_or_else(|| PathBuf::from(".urlsum"))
}
