//! Messages exchanged between the requesting side and the worker.
//!
//! Buffers travel by move: once a message is sent the sender no longer owns
//! the bytes it carried.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::capabilities::FormatCapabilitySet;
use crate::error::RequestError;
use crate::transcode::TranscodedImage;

/// Identifier of one texture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the container bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// Fetch the container from a URL.
    Url(String),
    /// Use container bytes the caller already has.
    Buffer(Bytes),
}

impl TextureSource {
    /// Builds a source from optional parts, preferring the URL.
    ///
    /// An empty URL counts as absent.
    pub fn from_parts(url: Option<String>, buffer: Option<Bytes>) -> Option<Self> {
        match (url.filter(|u| !u.is_empty()), buffer) {
            (Some(url), _) => Some(TextureSource::Url(url)),
            (None, Some(buffer)) => Some(TextureSource::Buffer(buffer)),
            (None, None) => None,
        }
    }
}

/// Per-request settings chosen by the requester.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub allow_separate_alpha: bool,
    pub capabilities: FormatCapabilitySet,
}

/// Request sent to the worker.
#[derive(Debug, Clone)]
pub struct TranscodeRequest {
    pub id: RequestId,
    pub source: Option<TextureSource>,
    pub allow_separate_alpha: bool,
    pub capabilities: FormatCapabilitySet,
}

/// Response sent back by the worker.
///
/// Either the complete image or an error, never both.
#[derive(Debug)]
pub struct TranscodeResponse {
    pub id: RequestId,
    pub outcome: Result<TranscodedImage, RequestError>,
}

impl TranscodeResponse {
    pub fn success(id: RequestId, image: TranscodedImage) -> Self {
        Self {
            id,
            outcome: Ok(image),
        }
    }

    pub fn failure(id: RequestId, error: RequestError) -> Self {
        Self {
            id,
            outcome: Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_prefers_url() {
        let source = TextureSource::from_parts(
            Some("https://example.com/a.basis".to_string()),
            Some(Bytes::from_static(b"data")),
        );
        assert_eq!(
            source,
            Some(TextureSource::Url("https://example.com/a.basis".to_string()))
        );
    }

    #[test]
    fn test_source_empty_url_falls_back_to_buffer() {
        let source =
            TextureSource::from_parts(Some(String::new()), Some(Bytes::from_static(b"data")));
        assert_eq!(source, Some(TextureSource::Buffer(Bytes::from_static(b"data"))));
    }

    #[test]
    fn test_source_missing() {
        assert_eq!(TextureSource::from_parts(None, None), None);
        assert_eq!(TextureSource::from_parts(Some(String::new()), None), None);
    }

    #[test]
    fn test_request_id_display() {
        assert_eq!(RequestId(42).to_string(), "42");
    }
}
