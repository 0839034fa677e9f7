//! Transcode planning and execution.
//!
//! This module turns raw container bytes into GPU-ready buffers:
//!
//! ```text
//!   bytes ──► Transcoder::open ──► OpenContainer
//!                                       │
//!                    select_format ◄────┤ has_alpha
//!                          │            │
//!                          ▼            ▼
//!                      TranscodePlan (level offsets/sizes)
//!                          │
//!                          ▼
//!                      execute ──► TranscodeOutput (primary [+ alpha])
//! ```
//!
//! The native transcoder is abstracted behind [`Transcoder`] and
//! [`Container`] so the planner and executor can be driven by any
//! implementation, including in-memory test doubles.

mod container;
mod error;
mod executor;
mod plan;

#[cfg(test)]
pub(crate) mod testing;

pub use container::{
    ChannelSelector, Container, EstimatedLevels, InitFuture, LevelSource, OpenContainer,
    Transcoder, IMAGE_INDEX,
};
pub use error::TranscodeError;
pub use executor::{execute, transcode, TranscodeJob, TranscodeOutput, TranscodedImage};
pub use plan::{planned_level_count, MipLevelDescriptor, TranscodePlan};
