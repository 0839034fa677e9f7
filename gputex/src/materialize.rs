//! GPU upload interface.
//!
//! Uploading is owned by the caller's graphics backend. This module decides
//! the upload parameters and drives a [`TextureMaterializer`] once a complete
//! transcoded image is available; nothing is created for a failed request.

use crate::format::FormatDescriptor;
use crate::transcode::{MipLevelDescriptor, TranscodedImage};

/// Sampling filter for an uploaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Linear,
    LinearMipmapLinear,
}

/// Parameters derived from the format and level list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadParams {
    pub min_filter: TextureFilter,
    /// Always [`TextureFilter::Linear`].
    pub mag_filter: TextureFilter,
    /// True when the backend should generate the mip chain after upload.
    pub generate_mipmaps: bool,
    /// Size in bytes of one upload element (2 for packed 16-bit types).
    pub element_size: usize,
}

impl UploadParams {
    /// Derives upload parameters.
    ///
    /// Mipmap filtering is used when more than one level was transcoded or
    /// the format is raster. Raster output with a single level gets its chain
    /// generated on the GPU.
    pub fn new(format: &FormatDescriptor, levels: &[MipLevelDescriptor]) -> Self {
        let min_filter = if levels.len() > 1 || format.uncompressed {
            TextureFilter::LinearMipmapLinear
        } else {
            TextureFilter::Linear
        };

        Self {
            min_filter,
            mag_filter: TextureFilter::Linear,
            generate_mipmaps: format.uncompressed && levels.len() == 1,
            element_size: format.element_size(),
        }
    }

    /// Number of upload elements in `level`.
    pub fn element_count(&self, level: &MipLevelDescriptor) -> usize {
        level.size / self.element_size
    }
}

/// A graphics backend able to create textures from transcoded levels.
pub trait TextureMaterializer {
    type Texture;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a texture from `data`, uploading each level from its range.
    fn create_texture(
        &mut self,
        format: &FormatDescriptor,
        params: &UploadParams,
        levels: &[MipLevelDescriptor],
        data: &[u8],
    ) -> Result<Self::Texture, Self::Error>;
}

/// A texture created from a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTexture<T> {
    pub texture: T,
    /// Separate alpha texture, when alpha was transcoded on its own.
    pub alpha_texture: Option<T>,
    /// Whether the source container had an alpha channel.
    pub has_alpha: bool,
    /// Number of uploaded mip levels.
    pub mip_levels: usize,
    /// Dimensions of the base level.
    pub width: u32,
    pub height: u32,
}

/// Uploads `image` (and its alpha buffer, if any) through `materializer`.
pub fn materialize<M: TextureMaterializer + ?Sized>(
    materializer: &mut M,
    image: &TranscodedImage,
) -> Result<LoadedTexture<M::Texture>, M::Error> {
    let format = image.descriptor();
    let params = UploadParams::new(&format, &image.mip_levels);

    let texture = materializer.create_texture(&format, &params, &image.mip_levels, &image.buffer)?;
    let alpha_texture = match &image.alpha_buffer {
        Some(alpha) => Some(materializer.create_texture(
            &format,
            &params,
            &image.mip_levels,
            alpha,
        )?),
        None => None,
    };

    let (width, height) = image
        .mip_levels
        .first()
        .map_or((0, 0), |base| (base.width, base.height));

    Ok(LoadedTexture {
        texture,
        alpha_texture,
        has_alpha: image.has_alpha,
        mip_levels: image.mip_levels.len(),
        width,
        height,
    })
}
