//! Drives the native transcoder through a full request.
//!
//! # Protocol
//!
//! ```text
//! open ──► validate counts ──► start ──► select ──► plan ──► allocate ──► levels
//!  │             │               │                    │                   │
//!  └─────────────┴───────────────┴──── any failure ───┴───────────────────┘
//!                                         │
//!                                   close container
//!                                         ▼
//!                                   TranscodeError
//! ```
//!
//! The container is wrapped in [`OpenContainer`] as soon as it is opened, so
//! it is closed on every exit path, success included, before the result is
//! handed back.

use tracing::debug;

use crate::capabilities::FormatCapabilitySet;
use crate::format::{select_format, FormatDescriptor, TargetFormat};

use super::container::{ChannelSelector, Container, OpenContainer, Transcoder, IMAGE_INDEX};
use super::plan::{MipLevelDescriptor, TranscodePlan};
use super::TranscodeError;

/// Per-request inputs to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeJob {
    /// Compressed families the requesting device supports.
    pub capabilities: FormatCapabilitySet,
    /// Whether alpha may be returned as a second texture.
    pub allow_separate_alpha: bool,
}

/// Output buffers filled according to a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeOutput {
    pub buffer: Vec<u8>,
    /// Present only when the plan needs a secondary alpha pass.
    pub alpha_buffer: Option<Vec<u8>>,
}

/// A fully transcoded texture, ready to cross to the requesting side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodedImage {
    pub buffer: Vec<u8>,
    pub alpha_buffer: Option<Vec<u8>>,
    pub format: TargetFormat,
    pub mip_levels: Vec<MipLevelDescriptor>,
    /// Whether the source container has an alpha channel.
    pub has_alpha: bool,
}

impl TranscodedImage {
    pub fn descriptor(&self) -> FormatDescriptor {
        self.format.descriptor()
    }

    /// Total bytes across primary and alpha buffers.
    pub fn byte_len(&self) -> usize {
        self.buffer.len() + self.alpha_buffer.as_ref().map_or(0, Vec::len)
    }
}

/// Transcodes the first image of the container in `data`.
///
/// # Errors
///
/// - [`TranscodeError::MalformedContainer`] if the data can't be opened or
///   reports zero images or levels; `start_transcoding` is not called
/// - [`TranscodeError::TranscodeStartFailed`] if the handshake fails
/// - [`TranscodeError::InvalidContainerData`] if a level reports a zero size
/// - [`TranscodeError::LevelTranscodeFailed`] / [`TranscodeError::AlphaLevelTranscodeFailed`]
pub fn transcode<T: Transcoder + ?Sized>(
    transcoder: &T,
    data: &[u8],
    job: &TranscodeJob,
) -> Result<TranscodedImage, TranscodeError> {
    let mut container = OpenContainer::new(transcoder.open(data)?);

    let images = container.image_count();
    let levels = container.level_count(IMAGE_INDEX);
    let has_alpha = container.has_alpha();
    if images == 0 || levels == 0 {
        return Err(TranscodeError::MalformedContainer(format!(
            "{} image(s), {} level(s)",
            images, levels
        )));
    }

    if !container.start_transcoding() {
        return Err(TranscodeError::TranscodeStartFailed);
    }

    let selection = select_format(has_alpha, &job.capabilities, job.allow_separate_alpha)?;
    let plan = TranscodePlan::build(&*container, selection, levels);

    if let Some(bad) = plan.first_invalid_level() {
        return Err(TranscodeError::InvalidContainerData {
            level: bad.level,
            reason: format!(
                "size {} for {}×{} in {}",
                bad.size,
                bad.width,
                bad.height,
                plan.format()
            ),
        });
    }

    debug!(
        format = %plan.format(),
        levels = plan.levels().len(),
        total_size = plan.total_size(),
        secondary_alpha = plan.needs_secondary_alpha(),
        "Transcode plan built"
    );

    let output = execute(&mut *container, &plan)?;
    drop(container);

    Ok(TranscodedImage {
        buffer: output.buffer,
        alpha_buffer: output.alpha_buffer,
        format: plan.format(),
        mip_levels: plan.into_levels(),
        has_alpha,
    })
}

/// Allocates the output buffers and transcodes every planned level.
///
/// For each level the color pass runs before the alpha pass. The caller owns
/// the container lifecycle.
pub fn execute<C: Container + ?Sized>(
    container: &mut C,
    plan: &TranscodePlan,
) -> Result<TranscodeOutput, TranscodeError> {
    let format = plan.format();
    let mut buffer = vec![0u8; plan.total_size()];
    let mut alpha_buffer = plan
        .needs_secondary_alpha()
        .then(|| vec![0u8; plan.total_size()]);

    for descriptor in plan.levels() {
        let level = descriptor.level;

        if !container.transcode_level(
            IMAGE_INDEX,
            level,
            format,
            ChannelSelector::Color,
            &mut buffer[descriptor.range()],
        ) {
            return Err(TranscodeError::LevelTranscodeFailed { level });
        }

        if let Some(alpha) = alpha_buffer.as_mut() {
            if !container.transcode_level(
                IMAGE_INDEX,
                level,
                format,
                ChannelSelector::Alpha,
                &mut alpha[descriptor.range()],
            ) {
                return Err(TranscodeError::AlphaLevelTranscodeFailed { level });
            }
        }
    }

    Ok(TranscodeOutput {
        buffer,
        alpha_buffer,
    })
}
