//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::args::CliArgs;
use crate::domain::entities::AccessToken;
use crate::infrastructure::cache::{DEFAULT_DISK_CAPACITY, DEFAULT_MEMORY_CAPACITY};
use crate::infrastructure::unsplash::{DEFAULT_MAX_ATTEMPTS, FetchClientConfig, UNSPLASH_API_BASE};

const APP_NAME: &str = "unsplash-feed";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, loaded from TOML and overridden by CLI flags.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Listing API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Response cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Network policy configuration.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Notification configuration.
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Listing API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Records per listing page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Access key. Usually supplied through `UNSPLASH_ACCESS_KEY` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            per_page: default_per_page(),
            access_key: None,
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Memory tier capacity in bytes.
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Disk tier capacity in bytes.
    #[serde(default = "default_disk_capacity")]
    pub disk_capacity: u64,

    /// Keep a disk tier at all.
    #[serde(default = "default_true")]
    pub disk_enabled: bool,

    /// Disk tier directory; platform cache dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_capacity: default_memory_capacity(),
            disk_capacity: default_disk_capacity(),
            disk_enabled: true,
            disk_dir: None,
        }
    }
}

/// Network policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Image download deadline in seconds.
    #[serde(default = "default_image_timeout")]
    pub image_timeout_secs: u64,

    /// Attempts per logical request.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Maximum concurrent image downloads.
    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            image_timeout_secs: default_image_timeout(),
            max_attempts: default_max_attempts(),
            max_concurrent_downloads: default_max_concurrent_downloads(),
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// How long a failure notification stays visible, in seconds.
    #[serde(default = "default_notification_duration")]
    pub duration_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_notification_duration(),
        }
    }
}

fn default_base_url() -> String {
    UNSPLASH_API_BASE.to_string()
}

const fn default_per_page() -> u32 {
    10
}

const fn default_memory_capacity() -> usize {
    DEFAULT_MEMORY_CAPACITY
}

const fn default_disk_capacity() -> u64 {
    DEFAULT_DISK_CAPACITY
}

const fn default_image_timeout() -> u64 {
    10
}

const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

const fn default_max_concurrent_downloads() -> usize {
    4
}

const fn default_notification_duration() -> u64 {
    5
}

const fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(access_key) = args.access_key {
            self.api.access_key = Some(access_key);
        }
        if let Some(base_url) = args.base_url {
            self.api.base_url = base_url;
        }
        if let Some(per_page) = args.per_page {
            self.api.per_page = per_page;
        }
        if let Some(cache_dir) = args.cache_dir {
            self.cache.disk_dir = Some(cache_dir);
        }
        if args.no_disk_cache {
            self.cache.disk_enabled = false;
        }
    }

    /// Returns the configured access token, if one is present and well formed.
    #[must_use]
    pub fn access_token(&self) -> Option<AccessToken> {
        self.api.access_key.as_deref().and_then(AccessToken::new)
    }

    /// Builds the fetch client settings.
    #[must_use]
    pub fn fetch_client_config(&self) -> FetchClientConfig {
        FetchClientConfig {
            base_url: self.api.base_url.clone(),
            per_page: self.api.per_page,
            image_timeout: Duration::from_secs(self.network.image_timeout_secs),
            max_attempts: self.network.max_attempts,
            max_concurrent_downloads: self.network.max_concurrent_downloads,
        }
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("unsplash-feed.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
            log_level = "debug"

            [api]
            per_page = 30

            [cache]
            memory_capacity = 1024
            disk_enabled = false

            [network]
            image_timeout_secs = 3
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.api.per_page, 30);
        assert_eq!(config.api.base_url, UNSPLASH_API_BASE);
        assert_eq!(config.cache.memory_capacity, 1024);
        assert_eq!(config.cache.disk_capacity, DEFAULT_DISK_CAPACITY);
        assert!(!config.cache.disk_enabled);

        let fetch = config.fetch_client_config();
        assert_eq!(fetch.image_timeout, Duration::from_secs(3));
        assert_eq!(fetch.max_attempts, 3);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.api.per_page, 10);
        assert_eq!(config.cache.memory_capacity, 6 * 1024 * 1024);
        assert_eq!(config.cache.disk_capacity, 40 * 1024 * 1024);
        assert_eq!(config.network.image_timeout_secs, 10);
        assert!(config.access_token().is_none());
    }

    #[test]
    fn test_merge_with_args() {
        let args = CliArgs::parse_from([
            "unsplash-feed",
            "--access-key",
            "abc123",
            "--per-page",
            "20",
            "--no-disk-cache",
        ]);
        let mut config = AppConfig::default();

        config.merge_with_args(args);

        assert_eq!(config.access_token().unwrap().as_str(), "abc123");
        assert_eq!(config.api.per_page, 20);
        assert!(!config.cache.disk_enabled);
    }
}
