//! # Textures
//!
//! Loads an image from disk into a mip-mapped `Rgba8Unorm` GPU texture. The image is decoded
//! with the `image` crate and forced to four channels, the mip chain is built on the CPU by
//! [`crate::mipmap`], and every level is written to its own subresource with
//! `wgpu::Queue::write_texture`.

use std::path::Path;

use crate::error::{Error, Result};
use crate::mipmap::{generate_mip_chain, MipLevel};

pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A sampled texture with a view spanning all of its mip levels.
pub struct LoadedTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: wgpu::Extent3d,
    pub mip_level_count: u32,
}

/// Decodes the image at `path` and uploads it with a full mip chain.
pub fn load_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: impl AsRef<Path>,
) -> Result<LoadedTexture> {
    let path = path.as_ref();
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();
    log::info!("Loaded texture {path:?} ({width} x {height})");

    let levels = generate_mip_chain(width, height, image.as_raw())?;
    create_texture(device, queue, &path.to_string_lossy(), &levels)
}

/// Creates a texture sized for the first level and uploads every level.
///
/// An empty `levels` slice is reported as [`Error::EmptyImage`].
pub fn create_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    levels: &[MipLevel],
) -> Result<LoadedTexture> {
    let base = levels.first().ok_or(Error::EmptyImage)?;
    let size = wgpu::Extent3d {
        width: base.width,
        height: base.height,
        depth_or_array_layers: 1,
    };
    let mip_level_count = levels.len() as u32;

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    write_mip_levels(queue, &texture, levels);

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        format: Some(TEXTURE_FORMAT),
        dimension: Some(wgpu::TextureViewDimension::D2),
        usage: None,
        aspect: wgpu::TextureAspect::All,
        base_mip_level: 0,
        mip_level_count: Some(mip_level_count),
        base_array_layer: 0,
        array_layer_count: Some(1),
    });

    Ok(LoadedTexture {
        texture,
        view,
        size,
        mip_level_count,
    })
}

fn write_mip_levels(queue: &wgpu::Queue, texture: &wgpu::Texture, levels: &[MipLevel]) {
    for (mip_level, level) in levels.iter().enumerate() {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: mip_level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &level.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(level.bytes_per_row()),
                rows_per_image: Some(level.height),
            },
            wgpu::Extent3d {
                width: level.width,
                height: level.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Trilinear sampler clamped to the texture edges.
pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Texture Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        lod_min_clamp: 0.0,
        lod_max_clamp: 8.0,
        compare: None,
        anisotropy_clamp: 1,
        border_color: None,
    })
}

