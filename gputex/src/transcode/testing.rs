//! In-memory transcoder used by unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::format::TargetFormat;

use super::container::{
    ChannelSelector, Container, EstimatedLevels, InitFuture, LevelSource, Transcoder,
};
use super::TranscodeError;

/// A call observed on a mock container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerCall {
    Start,
    Transcode { level: u32, channel: ChannelSelector },
    Close,
}

/// Shared log of container calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<ContainerCall>>>);

impl CallLog {
    fn push(&self, call: ContainerCall) {
        self.0.lock().push(call);
    }

    pub fn snapshot(&self) -> Vec<ContainerCall> {
        self.0.lock().clone()
    }

    pub fn close_count(&self) -> usize {
        self.0
            .lock()
            .iter()
            .filter(|c| **c == ContainerCall::Close)
            .count()
    }
}

/// Shape and failure points of the containers a [`MockTranscoder`] opens.
#[derive(Debug, Clone)]
pub struct MockContainerSpec {
    images: u32,
    levels: EstimatedLevels,
    has_alpha: bool,
    start_result: bool,
    failing_level: Option<u32>,
    failing_alpha_level: Option<u32>,
    zero_sized_level: Option<u32>,
}

impl MockContainerSpec {
    pub fn new(width: u32, height: u32, levels: u32) -> Self {
        Self {
            images: 1,
            levels: EstimatedLevels::new(width, height, levels),
            has_alpha: false,
            start_result: true,
            failing_level: None,
            failing_alpha_level: None,
            zero_sized_level: None,
        }
    }

    pub fn with_images(mut self, images: u32) -> Self {
        self.images = images;
        self
    }

    pub fn with_alpha(mut self, has_alpha: bool) -> Self {
        self.has_alpha = has_alpha;
        self
    }

    pub fn with_start_result(mut self, ok: bool) -> Self {
        self.start_result = ok;
        self
    }

    pub fn with_failing_level(mut self, level: u32) -> Self {
        self.failing_level = Some(level);
        self
    }

    pub fn with_failing_alpha_level(mut self, level: u32) -> Self {
        self.failing_alpha_level = Some(level);
        self
    }

    pub fn with_zero_sized_level(mut self, level: u32) -> Self {
        self.zero_sized_level = Some(level);
        self
    }

    /// Byte the mock writes for `level` on `channel`.
    pub fn fill_byte(level: u32, channel: ChannelSelector) -> u8 {
        let base: u8 = match channel {
            ChannelSelector::Color => 0x10,
            ChannelSelector::Alpha => 0x80,
        };
        base.wrapping_add(level as u8)
    }
}

pub struct MockContainer {
    spec: MockContainerSpec,
    calls: CallLog,
}

impl LevelSource for MockContainer {
    fn transcoded_size(&self, image: u32, level: u32, format: TargetFormat) -> u32 {
        if self.spec.zero_sized_level == Some(level) {
            return 0;
        }
        self.spec.levels.transcoded_size(image, level, format)
    }

    fn level_width(&self, image: u32, level: u32) -> u32 {
        self.spec.levels.level_width(image, level)
    }

    fn level_height(&self, image: u32, level: u32) -> u32 {
        self.spec.levels.level_height(image, level)
    }
}

impl Container for MockContainer {
    fn image_count(&self) -> u32 {
        self.spec.images
    }

    fn level_count(&self, _image: u32) -> u32 {
        self.spec.levels.level_count()
    }

    fn has_alpha(&self) -> bool {
        self.spec.has_alpha
    }

    fn start_transcoding(&mut self) -> bool {
        self.calls.push(ContainerCall::Start);
        self.spec.start_result
    }

    fn transcode_level(
        &mut self,
        image: u32,
        level: u32,
        format: TargetFormat,
        channel: ChannelSelector,
        out: &mut [u8],
    ) -> bool {
        self.calls.push(ContainerCall::Transcode { level, channel });

        let failing = match channel {
            ChannelSelector::Color => self.spec.failing_level,
            ChannelSelector::Alpha => self.spec.failing_alpha_level,
        };
        if failing == Some(level) {
            return false;
        }
        if out.len() != self.transcoded_size(image, level, format) as usize {
            return false;
        }

        out.fill(MockContainerSpec::fill_byte(level, channel));
        true
    }

    fn close(&mut self) {
        self.calls.push(ContainerCall::Close);
    }
}

/// Transcoder that opens [`MockContainer`]s from any non-empty input.
pub struct MockTranscoder {
    spec: MockContainerSpec,
    calls: CallLog,
    init_calls: AtomicU32,
    init_error: Option<String>,
    init_delay: Duration,
}

impl MockTranscoder {
    pub fn new(spec: MockContainerSpec) -> Self {
        Self {
            spec,
            calls: CallLog::default(),
            init_calls: AtomicU32::new(0),
            init_error: None,
            init_delay: Duration::ZERO,
        }
    }

    pub fn with_init_error(mut self, message: impl Into<String>) -> Self {
        self.init_error = Some(message.into());
        self
    }

    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }

    pub fn init_calls(&self) -> u32 {
        self.init_calls.load(Ordering::SeqCst)
    }
}

impl Transcoder for MockTranscoder {
    type Container = MockContainer;

    fn initialize(&self) -> InitFuture<'_> {
        Box::pin(async move {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            if !self.init_delay.is_zero() {
                tokio::time::sleep(self.init_delay).await;
            }
            match &self.init_error {
                Some(message) => Err(TranscodeError::InitializationFailed(message.clone())),
                None => Ok(()),
            }
        })
    }

    fn open(&self, data: &[u8]) -> Result<MockContainer, TranscodeError> {
        if data.is_empty() {
            return Err(TranscodeError::MalformedContainer("empty data".to_string()));
        }
        Ok(MockContainer {
            spec: self.spec.clone(),
            calls: self.calls.clone(),
        })
    }
}
