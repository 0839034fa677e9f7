//! Error types for the transcode path.

use thiserror::Error;

/// Errors raised while opening, planning or transcoding a container.
///
/// Every variant aborts the whole request. The container is closed before
/// the error leaves the executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscodeError {
    /// The container could not be parsed or reports no images or levels.
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// The container's start-transcoding handshake failed.
    #[error("startTranscoding failed")]
    TranscodeStartFailed,

    /// A level query returned an invalid size or dimension.
    #[error("Invalid container data at level {level}: {reason}")]
    InvalidContainerData { level: u32, reason: String },

    /// Transcoding the color data of a level failed.
    #[error("Transcode of level {level} failed")]
    LevelTranscodeFailed { level: u32 },

    /// Transcoding the alpha data of a level failed.
    #[error("Alpha transcode of level {level} failed")]
    AlphaLevelTranscodeFailed { level: u32 },

    /// No target format could be chosen.
    #[error("No supported transcode formats")]
    NoSupportedFormat,

    /// The native transcoder failed to initialize.
    #[error("Transcoder initialization failed: {0}")]
    InitializationFailed(String),
}
