//! Configuration management for the VISA portal.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/visa-portal/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the dataset is read from
    pub source: SourceConfig,
    /// Network fetch behavior
    pub fetch: FetchConfig,
    /// Search engine limits
    pub search: SearchConfig,
    /// Presentation behavior
    pub portal: PortalConfig,
    /// Page guard (allow-list and session limits)
    pub guard: GuardConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `VISA_BASE_URL`: Override the dataset base URL
    /// - `VISA_DATA_DIR`: Read the dataset from a local mirror instead
    /// - `VISA_FETCH_TIMEOUT_SECS`: Override the fetch timeout
    /// - `VISA_MAX_RESULTS`: Override the search result cap
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup function.
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("VISA_BASE_URL") {
            tracing::debug!("Override source.base_url from env: {}", url);
            self.source.base_url = Some(url);
        }

        if let Some(dir) = lookup("VISA_DATA_DIR") {
            tracing::debug!("Override source.data_dir from env: {}", dir);
            self.source.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(val) = lookup("VISA_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.fetch.timeout_secs = secs;
                tracing::debug!("Override fetch.timeout_secs from env: {}", secs);
            }
        }

        if let Some(val) = lookup("VISA_MAX_RESULTS") {
            if let Ok(max) = val.parse() {
                self.search.max_results = max;
                tracing::debug!("Override search.max_results from env: {}", max);
            }
        }
    }

    /// Check values that would make the portal unusable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.search.max_results == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.max_results".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.guard.idle_max_minutes > self.guard.session_max_minutes {
            return Err(ConfigError::InvalidValue {
                field: "guard.idle_max_minutes".to_string(),
                reason: "cannot exceed guard.session_max_minutes".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/visa-portal/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("br", "visa", "visa-portal").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Dataset location.
///
/// `data_dir` wins over `base_url` when both are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the static host (the `data/` tree lives below it)
    pub base_url: Option<String>,
    /// Local mirror of the static host
    pub data_dir: Option<PathBuf>,
    /// Append a cache-busting query parameter to every HTTP request
    pub cache_bust: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            data_dir: None,
            cache_bust: true,
        }
    }
}

/// Network fetch behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: concat!("visa-portal/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Search engine limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum normalized query length, in characters
    pub min_query_chars: usize,
    /// Maximum number of results returned
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_chars: 2,
            max_results: 100,
        }
    }
}

/// Presentation behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Quiet period before a typed query runs, in milliseconds
    pub debounce_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self { debounce_ms: 150 }
    }
}

/// Page guard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Page users are sent to when not allowed in
    pub login_url: String,
    /// Absolute session lifetime in minutes
    pub session_max_minutes: u64,
    /// Inactivity limit in minutes
    pub idle_max_minutes: u64,
    /// How often the expiry watcher checks the session, in seconds
    pub check_interval_secs: u64,
    /// E-mail addresses allowed past the guard
    pub authorized_emails: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_url: "index.html".to_string(),
            session_max_minutes: 8 * 60,
            idle_max_minutes: 20,
            check_interval_secs: 10,
            authorized_emails: Vec::new(),
        }
    }
}
