//! Interface to the native container/transcoder.
//!
//! The bit-level transcoder is an external library. These traits describe
//! the subset of its surface the loader drives: open a container, query
//! image/level layout, and transcode one level into a caller buffer.

use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::pin::Pin;

use crate::format::TargetFormat;

use super::TranscodeError;

/// Index of the only image that is ever transcoded.
pub const IMAGE_INDEX: u32 = 0;

/// Which source channel a transcode call reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelector {
    /// Color data (and alpha, for formats that carry it).
    Color,
    /// Alpha data, written into an opaque target format.
    Alpha,
}

impl ChannelSelector {
    /// Value of the native "transcode alpha to opaque formats" flag.
    pub fn alpha_flag(self) -> u32 {
        match self {
            ChannelSelector::Color => 0,
            ChannelSelector::Alpha => 1,
        }
    }
}

/// Read-only per-level layout queries.
pub trait LevelSource {
    /// Transcoded byte size of `level` of `image` in `format`.
    fn transcoded_size(&self, image: u32, level: u32, format: TargetFormat) -> u32;

    /// Width in pixels of `level` of `image`.
    fn level_width(&self, image: u32, level: u32) -> u32;

    /// Height in pixels of `level` of `image`.
    fn level_height(&self, image: u32, level: u32) -> u32;
}

/// An opened container.
pub trait Container: LevelSource + Send {
    fn image_count(&self) -> u32;

    fn level_count(&self, image: u32) -> u32;

    fn has_alpha(&self) -> bool;

    /// Prepares the container for transcode calls. Returns false on failure.
    fn start_transcoding(&mut self) -> bool;

    /// Transcodes one level into `out`. Returns false on failure.
    fn transcode_level(
        &mut self,
        image: u32,
        level: u32,
        format: TargetFormat,
        channel: ChannelSelector,
        out: &mut [u8],
    ) -> bool;

    /// Releases native resources. Called exactly once per opened container.
    fn close(&mut self);
}

/// Boxed future returned by [`Transcoder::initialize`].
pub type InitFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TranscodeError>> + Send + 'a>>;

/// The native transcoder library.
pub trait Transcoder: Send + Sync + 'static {
    type Container: Container;

    /// One-time asynchronous initialization of the library.
    fn initialize(&self) -> InitFuture<'_>;

    /// Parses `data` into a container.
    fn open(&self, data: &[u8]) -> Result<Self::Container, TranscodeError>;
}

// =============================================================================
// Close guard
// =============================================================================

/// Owns an opened container and closes it when dropped.
///
/// Every exit path of the executor, including `?` returns, passes through
/// this guard's `Drop`.
pub struct OpenContainer<C: Container> {
    inner: C,
}

impl<C: Container> OpenContainer<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: Container> Deref for OpenContainer<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: Container> DerefMut for OpenContainer<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: Container> Drop for OpenContainer<C> {
    fn drop(&mut self) {
        self.inner.close();
    }
}

// =============================================================================
// Estimated levels
// =============================================================================

/// A [`LevelSource`] computed from base dimensions instead of a container.
///
/// Each level halves the previous dimensions (minimum 1) and sizes come
/// from [`TargetFormat::expected_level_size`]. Useful for previewing a plan
/// before any data is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatedLevels {
    width: u32,
    height: u32,
    levels: u32,
}

impl EstimatedLevels {
    pub fn new(width: u32, height: u32, levels: u32) -> Self {
        Self {
            width,
            height,
            levels,
        }
    }

    /// A full mip chain down to 1×1.
    pub fn full_chain(width: u32, height: u32) -> Self {
        let largest = width.max(height).max(1);
        let levels = u32::BITS - largest.leading_zeros();
        Self::new(width, height, levels)
    }

    pub fn level_count(&self) -> u32 {
        self.levels
    }

    fn dimension(base: u32, level: u32) -> u32 {
        base.checked_shr(level).unwrap_or(0).max(1)
    }
}

impl LevelSource for EstimatedLevels {
    fn transcoded_size(&self, image: u32, level: u32, format: TargetFormat) -> u32 {
        let size = format.expected_level_size(
            self.level_width(image, level),
            self.level_height(image, level),
        );
        u32::try_from(size).unwrap_or(u32::MAX)
    }

    fn level_width(&self, _image: u32, level: u32) -> u32 {
        Self::dimension(self.width, level)
    }

    fn level_height(&self, _image: u32, level: u32) -> u32 {
        Self::dimension(self.height, level)
    }
}
