//! Error taxonomy shared by the worker and the requesting side.
//!
//! Worker-side failures are [`LoadError`]s. Before crossing back to the
//! requester they are flattened into a [`RequestError`]: a machine-checkable
//! [`ErrorCode`] plus the display message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transcode::TranscodeError;
use crate::worker::FetchError;

/// Stable tag for every failure a request can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MalformedContainer,
    TranscodeStartFailed,
    InvalidContainerData,
    LevelTranscodeFailed,
    AlphaLevelTranscodeFailed,
    NoSupportedFormat,
    FetchFailed,
    UnknownRequestId,
    MissingSource,
    TranscoderInitFailed,
    WorkerUnavailable,
}

impl From<&TranscodeError> for ErrorCode {
    fn from(err: &TranscodeError) -> Self {
        match err {
            TranscodeError::MalformedContainer(_) => ErrorCode::MalformedContainer,
            TranscodeError::TranscodeStartFailed => ErrorCode::TranscodeStartFailed,
            TranscodeError::InvalidContainerData { .. } => ErrorCode::InvalidContainerData,
            TranscodeError::LevelTranscodeFailed { .. } => ErrorCode::LevelTranscodeFailed,
            TranscodeError::AlphaLevelTranscodeFailed { .. } => {
                ErrorCode::AlphaLevelTranscodeFailed
            }
            TranscodeError::NoSupportedFormat => ErrorCode::NoSupportedFormat,
            TranscodeError::InitializationFailed(_) => ErrorCode::TranscoderInitFailed,
        }
    }
}

/// Anything that can fail a request inside the worker.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Neither a URL nor a buffer was supplied.
    #[error("No url or buffer specified")]
    MissingSource,

    /// The worker stopped or its channel closed.
    #[error("Transcode worker unavailable: {0}")]
    WorkerUnavailable(String),
}

impl LoadError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LoadError::Transcode(e) => ErrorCode::from(e),
            LoadError::Fetch(_) => ErrorCode::FetchFailed,
            LoadError::MissingSource => ErrorCode::MissingSource,
            LoadError::WorkerUnavailable(_) => ErrorCode::WorkerUnavailable,
        }
    }
}

/// Failure delivered to the requester of a texture.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct RequestError {
    pub code: ErrorCode,
    pub message: String,
}

impl RequestError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<LoadError> for RequestError {
    fn from(err: LoadError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_codes() {
        assert_eq!(LoadError::MissingSource.code(), ErrorCode::MissingSource);
        assert_eq!(
            LoadError::from(TranscodeError::TranscodeStartFailed).code(),
            ErrorCode::TranscodeStartFailed
        );
        assert_eq!(
            LoadError::from(TranscodeError::LevelTranscodeFailed { level: 2 }).code(),
            ErrorCode::LevelTranscodeFailed
        );
        assert_eq!(
            LoadError::from(FetchError::Status {
                status: 404,
                reason: "Not Found".to_string()
            })
            .code(),
            ErrorCode::FetchFailed
        );
        assert_eq!(
            LoadError::from(TranscodeError::InitializationFailed("x".to_string())).code(),
            ErrorCode::TranscoderInitFailed
        );
    }

    #[test]
    fn test_request_error_keeps_message() {
        let err: RequestError = LoadError::MissingSource.into();
        assert_eq!(err.code, ErrorCode::MissingSource);
        assert_eq!(err.message, "No url or buffer specified");
        assert_eq!(err.to_string(), "No url or buffer specified");
    }

    #[test]
    fn test_request_error_transparent_transcode_message() {
        let err: RequestError = LoadError::from(TranscodeError::TranscodeStartFailed).into();
        assert_eq!(err.message, "startTranscoding failed");
    }

    #[test]
    fn test_error_code_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorCode::AlphaLevelTranscodeFailed).unwrap();
        assert_eq!(json, "\"alpha_level_transcode_failed\"");
    }
}
