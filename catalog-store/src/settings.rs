//! Application settings.
//!
//! Settings are persisted as JSON next to the cart and can be overridden
//! per process through environment variables.

use catalog_fetch::{DEFAULT_BASE_URL, RestProductClient, RetryStrategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};

/// Environment variable overriding [`Settings::api_base_url`].
pub const ENV_API_URL: &str = "CATALOG_API_URL";

/// Environment variable overriding [`Settings::api_token`].
pub const ENV_API_TOKEN: &str = "CATALOG_API_TOKEN";

/// Keys accepted by [`Settings::set_value`].
pub const SETTING_KEYS: [&str; 6] = [
    "api_base_url",
    "timeout_secs",
    "max_retries",
    "cache_ttl_secs",
    "api_token",
    "log_level",
];

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the products API.
    pub api_base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Read cache lifetime. Zero disables the cache.
    pub cache_ttl_secs: u64,
    /// Bearer token sent with every request. Its presence means signed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Default log level when no flag is given.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 2,
            cache_ttl_secs: 300,
            api_token: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Applies [`ENV_API_URL`] and [`ENV_API_TOKEN`] from the process
    /// environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            debug!(url = %url, "API URL overridden from environment");
            self.api_base_url = url;
        }
        if let Some(token) = get(ENV_API_TOKEN) {
            debug!("API token overridden from environment");
            self.api_token = Some(token);
        }
    }

    /// Sets one setting from its textual form.
    ///
    /// An empty value for `api_token` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] for an unknown key or an unparsable
    /// value.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, StoreError> {
            value
                .trim()
                .parse()
                .map_err(|_| StoreError::Config(format!("invalid value for {key}: {value}")))
        }

        match key {
            "api_base_url" => {
                let url = value.trim();
                if url.is_empty() {
                    return Err(StoreError::Config("api_base_url cannot be empty".to_string()));
                }
                self.api_base_url = url.to_string();
            }
            "timeout_secs" => self.timeout_secs = parse(key, value)?,
            "max_retries" => self.max_retries = parse(key, value)?,
            "cache_ttl_secs" => self.cache_ttl_secs = parse(key, value)?,
            "api_token" => {
                self.api_token = Some(value.trim().to_string()).filter(|t| !t.is_empty());
            }
            "log_level" => self.log_level = parse(key, value)?,
            other => {
                return Err(StoreError::Config(format!(
                    "unknown setting: {other} (expected one of {})",
                    SETTING_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Returns true if an API token is configured.
    pub fn has_token(&self) -> bool {
        self.api_token.is_some()
    }

    /// Builds a REST client from these settings.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be
    /// created.
    pub fn build_client(&self) -> Result<RestProductClient, StoreError> {
        let client = RestProductClient::builder()
            .base_url(self.api_base_url.clone())
            .timeout(Duration::from_secs(self.timeout_secs.max(1)))
            .retry_strategy(RetryStrategy::new(self.max_retries.saturating_add(1)))
            .cache_ttl(Duration::from_secs(self.cache_ttl_secs))
            .bearer_token(self.api_token.clone())
            .build()?;
        Ok(client)
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Persistent settings store with change notifications.
#[derive(Debug)]
pub struct SettingsStore {
    settings: RwLock<Settings>,
    path: PathBuf,
    notify: watch::Sender<u64>,
}

impl SettingsStore {
    /// Creates a store with default settings that saves to `path`.
    pub fn new(path: PathBuf) -> Self {
        Self::with_settings(Settings::default(), path)
    }

    fn with_settings(settings: Settings, path: PathBuf) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            settings: RwLock::new(settings),
            path,
            notify,
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from `path`.
    ///
    /// A missing or unreadable file yields defaults.
    pub async fn load(path: PathBuf) -> Self {
        let settings = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        Self::with_settings(settings, path)
    }

    /// Path the store saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Gets the settings with environment overrides applied.
    ///
    /// Overrides are never written back to disk.
    pub async fn effective(&self) -> Settings {
        let mut settings = self.get().await;
        settings.apply_env_overrides();
        settings
    }

    /// Updates settings and notifies subscribers.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        {
            let mut settings = self.settings.write().await;
            f(&mut settings);
        }
        self.notify_change();
    }

    /// Sets one setting by key and notifies subscribers.
    ///
    /// # Errors
    ///
    /// Returns error for an unknown key or invalid value; settings are left
    /// untouched in that case.
    pub async fn set_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.settings.write().await.set_value(key, value)?;
        self.notify_change();
        Ok(())
    }

    /// Restores defaults.
    pub async fn reset(&self) {
        self.update(|s| *s = Settings::default()).await;
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    fn notify_change(&self) {
        self.notify.send_modify(|version| *version += 1);
    }
}
