//! Application configuration management.
//!
//! This module handles loading and saving the console configuration, which
//! includes the backend address, an optional request timeout, and the last
//! username used to sign in.
//!
//! Configuration is stored at `~/.config/shopsphere-admin/config.json`. The
//! backend address can be overridden per run by the caller, or with the
//! `SHOPSPHERE_API_BASE_URL` environment variable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "shopsphere-admin";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// File holding persistent-scope session keys
const STORAGE_FILE: &str = "storage.json";

/// Deployment override for the backend address
pub const BASE_URL_ENV: &str = "SHOPSPHERE_API_BASE_URL";

/// Backend used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "https://final-shopsphere-2-jeoy.onrender.com";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME))
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Where the persistent session scope is kept on disk.
    pub fn storage_path(&self) -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(STORAGE_FILE))
    }

    /// Backend address: environment override, then config file, then the
    /// built-in default. Trailing slashes are dropped.
    pub fn base_url(&self) -> String {
        self.base_url_with(None)
    }

    /// Like `base_url`, with a per-run override (e.g. a command-line flag)
    /// that wins over everything else. The override is never written back
    /// to the config.
    pub fn base_url_with(&self, override_url: Option<&str>) -> String {
        Self::resolve_base_url(
            override_url,
            std::env::var(BASE_URL_ENV).ok().as_deref(),
            self.api_base_url.as_deref(),
        )
    }

    fn resolve_base_url(
        override_url: Option<&str>,
        env_value: Option<&str>,
        configured: Option<&str>,
    ) -> String {
        fn non_blank(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }
        let chosen = non_blank(override_url)
            .or_else(|| non_blank(env_value))
            .or_else(|| non_blank(configured))
            .unwrap_or(DEFAULT_BASE_URL);
        chosen.trim_end_matches('/').to_string()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAG: &str = "http://127.0.0.1:9000";
    const ENV: &str = "https://staging.example.com";
    const FILE: &str = "http://localhost:8000";

    #[test]
    fn test_base_url_precedence() {
        assert_eq!(Config::resolve_base_url(None, None, None), DEFAULT_BASE_URL);
        assert_eq!(
            Config::resolve_base_url(None, None, Some("http://localhost:8000/")),
            FILE
        );
        assert_eq!(Config::resolve_base_url(None, Some(ENV), Some(FILE)), ENV);
        assert_eq!(Config::resolve_base_url(Some(FLAG), Some(ENV), Some(FILE)), FLAG);
        assert_eq!(Config::resolve_base_url(Some("http://127.0.0.1:9000/"), None, None), FLAG);
        // Blank values fall through
        assert_eq!(Config::resolve_base_url(Some(" "), Some("  "), Some(FILE)), FILE);
        assert_eq!(Config::resolve_base_url(Some(""), Some(ENV), None), ENV);
    }

    #[test]
    fn test_base_url_override_is_not_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config {
            api_base_url: Some(FILE.into()),
            ..Config::default()
        };
        assert_eq!(config.base_url_with(Some(FLAG)), FLAG);
        if std::env::var(BASE_URL_ENV).is_err() {
            assert_eq!(config.base_url_with(None), FILE);
        }

        config.last_username = Some("alice".into());
        config.save_to(&path).expect("save");
        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.api_base_url.as_deref(), Some(FILE));
    }

    #[test]
    fn test_request_timeout() {
        let mut config = Config::default();
        assert_eq!(config.request_timeout(), None);
        config.request_timeout_secs = Some(0);
        assert_eq!(config.request_timeout(), None);
        config.request_timeout_secs = Some(15);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shopsphere-admin").join(CONFIG_FILE);

        let config = Config {
            api_base_url: Some("http://localhost:8000".into()),
            request_timeout_secs: Some(30),
            last_username: Some("alice".into()),
        };
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.api_base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(loaded.last_username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = Config::load_from(&dir.path().join("absent.json")).expect("load");
        assert!(loaded.api_base_url.is_none());
        assert!(loaded.last_username.is_none());
    }
}
