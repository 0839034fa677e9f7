//! CLI error type.

use std::fmt;

use gputex::logging::LoggingError;
use gputex::TranscodeError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Invalid combination of arguments.
    Usage(String),
    /// Format selection failed.
    Select(TranscodeError),
    /// Output could not be serialized.
    Output(String),
    /// Logging could not be initialized.
    Logging(LoggingError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Select(e) => write!(f, "Format selection failed: {}", e),
            CliError::Output(msg) => write!(f, "Failed to write output: {}", msg),
            CliError::Logging(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Select(e) => Some(e),
            CliError::Logging(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TranscodeError> for CliError {
    fn from(e: TranscodeError) -> Self {
        CliError::Select(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            _ => 1,
        }
    }
}
