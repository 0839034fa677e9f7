//! Logging setup.
//!
//! Installs a `tracing-subscriber` fmt layer filtered by `RUST_LOG`, falling
//! back to the configured directive when the variable is unset.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Default filter directive.
pub const DEFAULT_LOG_DIRECTIVE: &str = "gputex=info";

/// Logging configuration.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub default_directive: String,
    /// Include the event target in each line.
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_directive: DEFAULT_LOG_DIRECTIVE.to_string(),
            with_target: false,
        }
    }
}

impl LogConfig {
    /// Debug-level logging for this crate.
    pub fn verbose() -> Self {
        Self {
            default_directive: "gputex=debug".to_string(),
            with_target: true,
        }
    }
}

/// Error returned when a global subscriber is already installed.
#[derive(Debug, thiserror::Error)]
#[error("Failed to initialize logging: {0}")]
pub struct LoggingError(String);

/// Installs the global subscriber.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_directive))
        .map_err(|e| LoggingError(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(config.with_target))
        .try_init()
        .map_err(|e| LoggingError(e.to_string()))
}
