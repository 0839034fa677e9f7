//! Loader configuration.
//!
//! Configuration can be built in code or read from an INI file:
//!
//! ```ini
//! [loader]
//! allow_separate_alpha = true
//! max_concurrent_transcodes = 4
//! fetch_timeout_secs = 30
//! ```
//!
//! Missing keys keep their defaults and unknown keys are ignored.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::worker::DEFAULT_MAX_CONCURRENT_TRANSCODES;

/// Default timeout for fetching a container.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// INI section holding loader settings.
pub const LOADER_SECTION: &str = "loader";

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
}

/// Settings for a [`TextureLoader`](crate::TextureLoader).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Return alpha as a second texture when that yields a better format.
    pub allow_separate_alpha: bool,

    /// Upper bound on transcodes running at the same time.
    pub max_concurrent_transcodes: usize,

    /// Timeout applied to each fetch.
    pub fetch_timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            allow_separate_alpha: false,
            max_concurrent_transcodes: DEFAULT_MAX_CONCURRENT_TRANSCODES,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl LoaderConfig {
    pub fn with_allow_separate_alpha(mut self, allow: bool) -> Self {
        self.allow_separate_alpha = allow;
        self
    }

    pub fn with_max_concurrent_transcodes(mut self, max: usize) -> Self {
        self.max_concurrent_transcodes = max;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Loads configuration from an INI file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        Self::from_ini(&ini)
    }

    /// Parses configuration from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let Some(section) = ini.section(Some(LOADER_SECTION)) else {
            return Ok(config);
        };

        if let Some(value) = section.get("allow_separate_alpha") {
            config.allow_separate_alpha = parse_bool("allow_separate_alpha", value)?;
        }
        if let Some(value) = section.get("max_concurrent_transcodes") {
            let max: usize = parse_value("max_concurrent_transcodes", value)?;
            if max == 0 {
                return Err(invalid("max_concurrent_transcodes", value));
            }
            config.max_concurrent_transcodes = max;
        }
        if let Some(value) = section.get("fetch_timeout_secs") {
            let secs: u64 = parse_value("fetch_timeout_secs", value)?;
            if secs == 0 {
                return Err(invalid("fetch_timeout_secs", value));
            }
            config.fetch_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}
