//! GPU textures used as material color maps.

use std::path::Path;
use std::sync::Arc;

use image::GenericImageView;

use crate::context::Context;
use crate::error::Result;

/// Wrapping behavior for texture coordinates outside [0, 1].
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureWrapping {
    /// Repeats the texture.
    Repeat,
    /// Repeats the mirrored texture.
    MirroredRepeat,
    /// Clamps to the nearest edge texel.
    ClampToEdge,
}

impl From<TextureWrapping> for wgpu::AddressMode {
    #[inline]
    fn from(val: TextureWrapping) -> Self {
        match val {
            TextureWrapping::Repeat => wgpu::AddressMode::Repeat,
            TextureWrapping::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
            TextureWrapping::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// A GPU texture with its view and sampler.
pub struct Texture {
    /// The underlying wgpu texture.
    pub texture: wgpu::Texture,
    /// The view bound by materials.
    pub view: wgpu::TextureView,
    /// The sampler bound by materials.
    pub sampler: wgpu::Sampler,
    /// Dimensions in pixels.
    pub size: (u32, u32),
}

impl Texture {
    /// Creates a texture from tightly packed RGBA8 data.
    pub fn from_rgba(
        width: u32,
        height: u32,
        data: &[u8],
        wrapping: TextureWrapping,
    ) -> Arc<Texture> {
        let ctxt = Context::get();

        let texture = ctxt.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tre3d texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctxt.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let address_mode = wrapping.into();
        let sampler = ctxt.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tre3d sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Arc::new(Texture {
            texture,
            view,
            sampler,
            size: (width, height),
        })
    }

    /// Creates a texture from a decoded image.
    pub fn from_image(image: &image::DynamicImage, wrapping: TextureWrapping) -> Arc<Texture> {
        let (width, height) = image.dimensions();
        let rgba = image.to_rgba8();
        Texture::from_rgba(width, height, &rgba, wrapping)
    }

    /// Loads and decodes an image file into a texture.
    pub fn from_file(path: impl AsRef<Path>, wrapping: TextureWrapping) -> Result<Arc<Texture>> {
        let image = image::open(path)?;
        Ok(Texture::from_image(&image, wrapping))
    }

    /// A 1x1 opaque white texture, used when a material has no color map.
    pub fn default_white() -> Arc<Texture> {
        Texture::from_rgba(1, 1, &[255, 255, 255, 255], TextureWrapping::Repeat)
    }
}
