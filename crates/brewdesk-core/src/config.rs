//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend URL, request timeout and last used email.
//!
//! Configuration is stored at `~/.config/brewdesk/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{GatewayConfig, DEFAULT_TIMEOUT_SECS};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "brewdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable naming the backend base URL
pub const API_URL_ENV: &str = "BREWDESK_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Pick the backend URL: explicit override, then the environment, then
    /// the config file. There is no built-in default.
    pub fn resolve_api_url(&self, override_url: Option<&str>) -> Result<String> {
        let env_url = std::env::var(API_URL_ENV).ok();
        Self::pick_api_url(override_url, env_url.as_deref(), self.api_url.as_deref())
    }

    fn pick_api_url(
        override_url: Option<&str>,
        env_url: Option<&str>,
        file_url: Option<&str>,
    ) -> Result<String> {
        [override_url, env_url, file_url]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No backend URL configured. Set {} or run `brewdesk config --api-url <URL>`",
                    API_URL_ENV
                )
            })
    }

    pub fn gateway_config(&self, override_url: Option<&str>) -> Result<GatewayConfig> {
        let base_url = self.resolve_api_url(override_url)?;
        Ok(GatewayConfig::new(base_url).with_timeout(self.request_timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_api_url_precedence() {
        assert_eq!(
            Config::pick_api_url(Some("http://cli"), Some("http://env"), Some("http://file")).unwrap(),
            "http://cli"
        );
        assert_eq!(
            Config::pick_api_url(None, Some("http://env"), Some("http://file")).unwrap(),
            "http://env"
        );
        assert_eq!(
            Config::pick_api_url(None, Some("  "), Some("http://file")).unwrap(),
            "http://file"
        );
    }

    #[test]
    fn test_pick_api_url_requires_a_value() {
        let err = Config::pick_api_url(None, None, None).unwrap_err();
        assert!(err.to_string().contains(API_URL_ENV));
    }

    #[test]
    fn test_request_timeout_defaults() {
        assert_eq!(Config::default().request_timeout(), Duration::from_secs(30));
        let config = Config {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        let config = Config {
            request_timeout_secs: Some(5),
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = Config {
            api_url: Some("https://api.example.com".to_string()),
            request_timeout_secs: None,
            last_email: Some("admin@x.com".to_string()),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), config);
        // Older files without newer fields still load
        assert_eq!(serde_json::from_str::<Config>("{}").unwrap(), Config::default());
    }
}
