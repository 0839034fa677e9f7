//! Transcode target formats and the rules for choosing one.
//!
//! - [`TargetFormat`] enumerates the transcoder outputs with a GPU mapping
//! - [`FormatDescriptor`] is the static GPU-side description of each
//! - [`select_format`] picks the best target for a device
//!
//! # Example
//!
//! ```
//! use gputex::capabilities::{FormatCapabilitySet, FormatFamily};
//! use gputex::format::{select_format, TargetFormat};
//!
//! let caps = FormatCapabilitySet::with_families(&[FormatFamily::S3tc]);
//! let selection = select_format(true, &caps, false).unwrap();
//!
//! assert_eq!(selection.format, TargetFormat::Bc3Rgba);
//! assert!(!selection.needs_secondary_alpha);
//! ```

mod selector;
mod target;

pub use selector::{select_format, FormatSelection};
pub use target::{
    FormatDescriptor, TargetFormat, BLOCK_DIM, COMPRESSED_RGBA8_ETC2_EAC,
    COMPRESSED_RGBA_ASTC_4X4_KHR, COMPRESSED_RGBA_BPTC_UNORM_EXT,
    COMPRESSED_RGBA_PVRTC_4BPPV1_IMG, COMPRESSED_RGBA_S3TC_DXT5_EXT,
    COMPRESSED_RGB_ETC1_WEBGL, COMPRESSED_RGB_PVRTC_4BPPV1_IMG, COMPRESSED_RGB_S3TC_DXT1_EXT,
    GL_RGB, GL_RGBA, GL_UNSIGNED_BYTE, GL_UNSIGNED_SHORT_4_4_4_4, GL_UNSIGNED_SHORT_5_6_5,
};
