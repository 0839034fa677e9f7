//! gputex - GPU texture transcoding and loading
//!
//! This library chooses the best GPU-native compressed format for a
//! supercompressed texture container, plans and runs the per-level
//! transcode on a background worker, and hands the resulting buffers to a
//! graphics backend for upload.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────┐        ┌──────────────────────────────┐
//! │ requesting side             │        │ worker side                  │
//! │                             │        │                              │
//! │ TextureLoader               │ request│ TranscodeWorker              │
//! │   capabilities ─────────────┼───────►│   fetch ─► ReadinessGate     │
//! │   RequestCoordinator        │        │   transcode (select, plan,   │
//! │     pending: id ─► waiter   │◄───────┼─  execute) on blocking pool  │
//! │   materialize ─► backend    │response│                              │
//! └─────────────────────────────┘        └──────────────────────────────┘
//! ```
//!
//! The native transcoder and the GPU backend are supplied by the caller
//! through the [`transcode::Transcoder`] and
//! [`materialize::TextureMaterializer`] traits.

pub mod capabilities;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod logging;
pub mod materialize;
pub mod telemetry;
pub mod transcode;
pub mod worker;

pub use capabilities::{FormatCapabilitySet, FormatFamily};
pub use config::LoaderConfig;
pub use coordinator::{PendingTexture, TextureLoadError, TextureLoader};
pub use error::{ErrorCode, RequestError};
pub use format::{select_format, FormatSelection, TargetFormat};
pub use transcode::{TranscodeError, TranscodedImage};
