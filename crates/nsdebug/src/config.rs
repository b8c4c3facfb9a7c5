//! Startup configuration.
//!
//! Read from the `DEBUG*` environment variables, or from an `nsdebug.toml`
//! file for applications that prefer one.

use std::path::Path;

use serde::Deserialize;

use crate::cache::DEFAULT_CACHE_MINUTES;
use crate::error::DebugError;

/// Enable pattern, e.g. `DEBUG=app:*,-app:noisy`
pub const ENABLE_VAR: &str = "DEBUG";
/// Namespace cache lifetime in minutes
pub const CACHE_MINUTES_VAR: &str = "DEBUG_CACHE_MINUTES";
/// Any non-empty value turns colors off
pub const COLOR_OFF_VAR: &str = "DEBUG_COLOR_OFF";
/// Any non-empty value turns timestamps and deltas off
pub const TIME_OFF_VAR: &str = "DEBUG_TIME_OFF";

/// The config file name
pub const CONFIG_FILE_NAME: &str = "nsdebug.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Enable pattern; `None` or empty leaves output disabled
    #[serde(rename = "enable")]
    pub pattern: Option<String>,
    /// Namespace cache lifetime; zero or less never expires
    pub cache_minutes: i64,
    #[serde(rename = "color")]
    pub colors: bool,
    pub time: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pattern: None,
            cache_minutes: DEFAULT_CACHE_MINUTES,
            colors: true,
            time: true,
        }
    }
}

impl Config {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, DebugError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, treating `None` like an unset
    /// variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DebugError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        let pattern = Some(var(ENABLE_VAR)).filter(|p| !p.is_empty());

        Ok(Self {
            pattern,
            cache_minutes: parse_cache_minutes(&var(CACHE_MINUTES_VAR))?,
            colors: var(COLOR_OFF_VAR).is_empty(),
            time: var(TIME_OFF_VAR).is_empty(),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, DebugError> {
        let content = std::fs::read_to_string(path).map_err(|source| DebugError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content).map_err(|source| DebugError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Parse a cache lifetime in minutes; empty means the default.
pub fn parse_cache_minutes(value: &str) -> Result<i64, DebugError> {
    if value.is_empty() {
        return Ok(DEFAULT_CACHE_MINUTES);
    }

    value
        .parse()
        .map_err(|source| DebugError::InvalidCacheMinutes {
            value: value.to_string(),
            source,
        })
}
