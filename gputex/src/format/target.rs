//! Transcoder output formats and their GPU descriptors.
//!
//! Every [`TargetFormat`] the selector can choose has exactly one
//! [`FormatDescriptor`]; the mapping is an exhaustive `match`, so adding a
//! variant without a descriptor fails to compile.

use serde::{Deserialize, Serialize};

// =============================================================================
// GL enums
// =============================================================================

/// `WEBGL_compressed_texture_s3tc`
pub const COMPRESSED_RGB_S3TC_DXT1_EXT: u32 = 0x83F0;
pub const COMPRESSED_RGBA_S3TC_DXT5_EXT: u32 = 0x83F3;

/// `WEBGL_compressed_texture_etc1`
pub const COMPRESSED_RGB_ETC1_WEBGL: u32 = 0x8D64;

/// `WEBGL_compressed_texture_etc`
pub const COMPRESSED_RGBA8_ETC2_EAC: u32 = 0x9278;

/// `WEBGL_compressed_texture_astc`
pub const COMPRESSED_RGBA_ASTC_4X4_KHR: u32 = 0x93B0;

/// `WEBGL_compressed_texture_pvrtc`
pub const COMPRESSED_RGB_PVRTC_4BPPV1_IMG: u32 = 0x8C00;
pub const COMPRESSED_RGBA_PVRTC_4BPPV1_IMG: u32 = 0x8C02;

/// `EXT_texture_compression_bptc`
pub const COMPRESSED_RGBA_BPTC_UNORM_EXT: u32 = 0x8E8C;

pub const GL_RGB: u32 = 0x1907;
pub const GL_RGBA: u32 = 0x1908;
pub const GL_UNSIGNED_BYTE: u32 = 0x1401;
pub const GL_UNSIGNED_SHORT_4_4_4_4: u32 = 0x8033;
pub const GL_UNSIGNED_SHORT_5_6_5: u32 = 0x8363;

/// Edge length in pixels of every block-compressed format handled here.
pub const BLOCK_DIM: u32 = 4;

/// PVRTC1 levels are padded to at least this many pixels per side.
const PVRTC_MIN_DIM: u32 = 8;

// =============================================================================
// Target format
// =============================================================================

/// A transcoder output format.
///
/// The discriminant is the native transcoder's format id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum TargetFormat {
    /// ETC1 RGB, opaque only.
    Etc1Rgb = 0,
    /// ETC2 RGBA (EAC alpha block followed by an ETC1 block).
    Etc2Rgba = 1,
    /// BC1 / DXT1, opaque only.
    Bc1Rgb = 2,
    /// BC3 / DXT5.
    Bc3Rgba = 3,
    /// BC7.
    Bc7Rgba = 6,
    /// PVRTC1 4bpp, opaque only.
    Pvrtc1Rgb = 8,
    /// PVRTC1 4bpp with alpha.
    Pvrtc1Rgba = 9,
    /// ASTC 4x4.
    Astc4x4Rgba = 10,
    /// 32bpp raster RGBA.
    Rgba32 = 13,
    /// 16bpp raster RGB, R at bit 11.
    Rgb565 = 14,
    /// 16bpp raster RGBA, R at bit 12, A at bit 0.
    Rgba4444 = 16,
}

impl TargetFormat {
    /// All formats with a GPU mapping.
    pub const ALL: [TargetFormat; 11] = [
        TargetFormat::Etc1Rgb,
        TargetFormat::Etc2Rgba,
        TargetFormat::Bc1Rgb,
        TargetFormat::Bc3Rgba,
        TargetFormat::Bc7Rgba,
        TargetFormat::Pvrtc1Rgb,
        TargetFormat::Pvrtc1Rgba,
        TargetFormat::Astc4x4Rgba,
        TargetFormat::Rgba32,
        TargetFormat::Rgb565,
        TargetFormat::Rgba4444,
    ];

    /// The numeric id understood by the native transcoder.
    pub fn transcoder_id(self) -> u32 {
        self as u32
    }

    /// Short, stable name used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            TargetFormat::Etc1Rgb => "ETC1_RGB",
            TargetFormat::Etc2Rgba => "ETC2_RGBA",
            TargetFormat::Bc1Rgb => "BC1_RGB",
            TargetFormat::Bc3Rgba => "BC3_RGBA",
            TargetFormat::Bc7Rgba => "BC7_RGBA",
            TargetFormat::Pvrtc1Rgb => "PVRTC1_4_RGB",
            TargetFormat::Pvrtc1Rgba => "PVRTC1_4_RGBA",
            TargetFormat::Astc4x4Rgba => "ASTC_4x4_RGBA",
            TargetFormat::Rgba32 => "RGBA32",
            TargetFormat::Rgb565 => "RGB565",
            TargetFormat::Rgba4444 => "RGBA4444",
        }
    }

    /// Returns the GPU descriptor for this format.
    pub fn descriptor(self) -> FormatDescriptor {
        match self {
            TargetFormat::Etc1Rgb => FormatDescriptor::compressed(COMPRESSED_RGB_ETC1_WEBGL, 8),
            TargetFormat::Etc2Rgba => FormatDescriptor::compressed(COMPRESSED_RGBA8_ETC2_EAC, 16),
            TargetFormat::Bc1Rgb => FormatDescriptor::compressed(COMPRESSED_RGB_S3TC_DXT1_EXT, 8),
            TargetFormat::Bc3Rgba => {
                FormatDescriptor::compressed(COMPRESSED_RGBA_S3TC_DXT5_EXT, 16)
            }
            TargetFormat::Bc7Rgba => {
                FormatDescriptor::compressed(COMPRESSED_RGBA_BPTC_UNORM_EXT, 16)
            }
            TargetFormat::Pvrtc1Rgb => {
                FormatDescriptor::compressed(COMPRESSED_RGB_PVRTC_4BPPV1_IMG, 8)
            }
            TargetFormat::Pvrtc1Rgba => {
                FormatDescriptor::compressed(COMPRESSED_RGBA_PVRTC_4BPPV1_IMG, 8)
            }
            TargetFormat::Astc4x4Rgba => {
                FormatDescriptor::compressed(COMPRESSED_RGBA_ASTC_4X4_KHR, 16)
            }
            TargetFormat::Rgba32 => FormatDescriptor::raster(GL_RGBA, GL_UNSIGNED_BYTE, 4),
            TargetFormat::Rgb565 => FormatDescriptor::raster(GL_RGB, GL_UNSIGNED_SHORT_5_6_5, 2),
            TargetFormat::Rgba4444 => {
                FormatDescriptor::raster(GL_RGBA, GL_UNSIGNED_SHORT_4_4_4_4, 2)
            }
        }
    }

    /// Returns true for raster (non block-compressed) formats.
    pub fn is_uncompressed(self) -> bool {
        self.descriptor().uncompressed
    }

    /// Returns true if the format stores an alpha channel alongside color.
    pub fn carries_alpha(self) -> bool {
        matches!(
            self,
            TargetFormat::Etc2Rgba
                | TargetFormat::Bc3Rgba
                | TargetFormat::Bc7Rgba
                | TargetFormat::Pvrtc1Rgba
                | TargetFormat::Astc4x4Rgba
                | TargetFormat::Rgba32
                | TargetFormat::Rgba4444
        )
    }

    /// Byte size of one transcoded level of the given dimensions.
    ///
    /// Block formats round each side up to whole 4×4 blocks. PVRTC1 is
    /// additionally padded to at least 8×8 pixels, as GL requires for very
    /// small textures.
    pub fn expected_level_size(self, width: u32, height: u32) -> u64 {
        let desc = self.descriptor();
        if desc.uncompressed {
            return width as u64 * height as u64 * desc.bytes_per_texel.unwrap_or(0) as u64;
        }

        if matches!(self, TargetFormat::Pvrtc1Rgb | TargetFormat::Pvrtc1Rgba) {
            let w = (width as u64).div_ceil(BLOCK_DIM as u64) * BLOCK_DIM as u64;
            let h = (height as u64).div_ceil(BLOCK_DIM as u64) * BLOCK_DIM as u64;
            let min = PVRTC_MIN_DIM as u64;
            return (w.max(min) * h.max(min) * 4 + 7) / 8;
        }

        let blocks_wide = width.div_ceil(BLOCK_DIM) as u64;
        let blocks_high = height.div_ceil(BLOCK_DIM) as u64;
        blocks_wide * blocks_high * desc.bytes_per_block.unwrap_or(0) as u64
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Descriptor
// =============================================================================

/// How a [`TargetFormat`] is handed to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// GL internal format (compressed) or pixel format (raster).
    pub gl_format: u32,
    /// True for raster formats uploaded with `texImage2D`.
    pub uncompressed: bool,
    /// GL pixel type for raster formats.
    pub pixel_type: Option<u32>,
    /// Bytes per texel for raster formats.
    pub bytes_per_texel: Option<u32>,
    /// Bytes per 4×4 block for compressed formats.
    pub bytes_per_block: Option<u32>,
}

impl FormatDescriptor {
    const fn compressed(gl_format: u32, bytes_per_block: u32) -> Self {
        Self {
            gl_format,
            uncompressed: false,
            pixel_type: None,
            bytes_per_texel: None,
            bytes_per_block: Some(bytes_per_block),
        }
    }

    const fn raster(gl_format: u32, pixel_type: u32, bytes_per_texel: u32) -> Self {
        Self {
            gl_format,
            uncompressed: true,
            pixel_type: Some(pixel_type),
            bytes_per_texel: Some(bytes_per_texel),
            bytes_per_block: None,
        }
    }

    /// Size in bytes of one upload element.
    ///
    /// Packed 16-bit raster types are uploaded as `u16` elements; everything
    /// else as bytes.
    pub fn element_size(&self) -> usize {
        match self.pixel_type {
            Some(GL_UNSIGNED_SHORT_4_4_4_4) | Some(GL_UNSIGNED_SHORT_5_6_5) => 2,
            _ => 1,
        }
    }
}
