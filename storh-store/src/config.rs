//! Configuration management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use storh_core::DisplayConfig;
use storh_fetch::{Endpoints, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

use crate::error::StoreError;
use crate::persistence::{default_config_path, load_json, save_json};

/// Log levels accepted in `log_level`.
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Placeholder shown instead of a configured password.
const REDACTED: &str = "********";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote service settings.
    pub service: ServiceConfig,
    /// Account used to log in.
    pub account: AccountConfig,
    /// Rendering options.
    pub display: DisplayConfig,
    /// Default log level, overridden by `RUST_LOG` and CLI flags.
    pub log_level: String,
}

/// Remote service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// API base URL, including the version segment.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Login credentials as written in the config file.
///
/// Either field may be left out and supplied by the environment or the
/// system keychain instead.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Account email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    /// Builds endpoints for the configured base URL.
    pub fn endpoints(&self) -> Result<Endpoints, StoreError> {
        Endpoints::new(&self.base_url)
            .map_err(|e| StoreError::Config(format!("service.base_url: {e}")))
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            account: AccountConfig::default(),
            display: DisplayConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub async fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path()).await
    }

    /// Loads and validates configuration from `path`.
    ///
    /// A missing file yields the defaults.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !tokio::fs::try_exists(path).await? {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let config: Config = load_json(path).await?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to `path` with owner-only permissions.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        self.validate()?;
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks every section for values the feed cannot run with.
    pub fn validate(&self) -> Result<(), StoreError> {
        self.service.endpoints()?;
        if self.service.request_timeout_secs == 0 {
            return Err(StoreError::Config(
                "service.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(StoreError::Config(format!(
                "log_level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                self.log_level
            )));
        }
        self.display.validate()?;
        Ok(())
    }

    /// Returns a copy safe to print, with the password masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.account.password.is_some() {
            copy.account.password = Some(REDACTED.to_string());
        }
        copy
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.service.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.display.max_items, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let json = r#"{"account": {"email": "a@b.no"}, "display": {"maxItems": 5, "fade": true}}"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.account.email.as_deref(), Some("a@b.no"));
        assert!(config.account.password.is_none());
        assert_eq!(config.display.max_items, 5);
        assert!(config.display.fade);
        assert!(config.display.show_header);
        assert_eq!(config.service, ServiceConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.service.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(StoreError::Config(_))));

        let mut config = Config::default();
        config.service.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.display.fade_point = f64::NAN;
        assert!(matches!(config.validate(), Err(StoreError::Core(_))));
    }

    #[test]
    fn test_redacted_masks_password_only() {
        let mut config = Config::default();
        config.account.email = Some("a@b.no".to_string());
        config.account.password = Some("hunter2".to_string());

        let shown = config.redacted();
        assert_eq!(shown.account.email.as_deref(), Some("a@b.no"));
        assert_eq!(shown.account.password.as_deref(), Some(REDACTED));
        assert!(!format!("{:?}", config.account).contains("hunter2"));
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json"))
            .await
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storh").join("config.json");

        let mut config = Config::default();
        config.account.email = Some("a@b.no".to_string());
        config.display.max_items = 3;
        config.save_to(&path).await.unwrap();

        let loaded = Config::load_from(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, r#"{"log_level": "chatty"}"#)
            .await
            .unwrap();

        assert!(matches!(
            Config::load_from(&path).await,
            Err(StoreError::Config(_))
        ));
    }
}
