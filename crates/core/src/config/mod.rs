//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (OFFCACHE_*)
//! 2. TOML config file (if OFFCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (OFFCACHE_*)
/// 2. TOML config file (if OFFCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache store.
    ///
    /// Set via OFFCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Label of the current cache generation.
    ///
    /// One label per deployed build; bump it to invalidate everything
    /// cached by prior builds. Set via OFFCACHE_GENERATION.
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Origin that site-relative resource identifiers resolve against.
    ///
    /// Set via OFFCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Resource identifiers precached at install time.
    ///
    /// Set via OFFCACHE_PRECACHE environment variable (comma-separated).
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Identifier served when a navigation request fails offline.
    ///
    /// Must be listed in `precache`. Set via OFFCACHE_OFFLINE_FALLBACK.
    #[serde(default = "default_offline_fallback")]
    pub offline_fallback: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via OFFCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via OFFCACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via OFFCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offcache.sqlite")
}

fn default_generation() -> String {
    "site-cache-v1".into()
}

fn default_origin() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_precache() -> Vec<String> {
    ["/", "/index.html", "/styles.css", "/script.js", "/favicon.svg", "/offline.html"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_offline_fallback() -> String {
    "/offline.html".into()
}

fn default_user_agent() -> String {
    "offcache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            generation: default_generation(),
            origin: default_origin(),
            precache: default_precache(),
            offline_fallback: default_offline_fallback(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OFFCACHE_`
    /// 2. TOML file from `OFFCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OFFCACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
