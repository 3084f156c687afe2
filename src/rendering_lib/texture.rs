// src/rendering_lib/texture.rs

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, GrayImage, RgbaImage};

use crate::error::{LessonError, Result};

/// Decoded pixels plus the mip chain, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TexelData {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    /// Level 0 first; each level halves both dimensions down to 1x1.
    pub levels: Vec<Vec<u8>>,
}

impl TexelData {
    /// Flips the image vertically and picks a format from its channel count:
    /// one channel stays single-channel, RGB is widened to RGBA.
    pub fn from_image(image: &DynamicImage, generate_mips: bool) -> Self {
        let flipped = image.flipv();
        let (width, height) = (flipped.width(), flipped.height());
        let level_count = if generate_mips { mip_level_count(width, height) } else { 1 };

        if flipped.color().channel_count() == 1 {
            let base = flipped.to_luma8();
            let levels = build_levels(&base, level_count, |img, w, h| image::imageops::resize(img, w, h, FilterType::Triangle))
                .into_iter()
                .map(GrayImage::into_raw)
                .collect();
            Self { width, height, format: wgpu::TextureFormat::R8Unorm, levels }
        } else {
            let base = flipped.to_rgba8();
            let levels = build_levels(&base, level_count, |img, w, h| image::imageops::resize(img, w, h, FilterType::Triangle))
                .into_iter()
                .map(RgbaImage::into_raw)
                .collect();
            Self { width, height, format: wgpu::TextureFormat::Rgba8Unorm, levels }
        }
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self.format {
            wgpu::TextureFormat::R8Unorm => 1,
            _ => 4,
        }
    }
}

fn build_levels<I: Clone>(base: &I, count: u32, downsample: impl Fn(&I, u32, u32) -> I) -> Vec<I>
where
    I: image::GenericImageView,
{
    let mut levels = vec![base.clone()];
    for _ in 1..count {
        let Some(prev) = levels.last() else { break };
        let (w, h) = prev.dimensions();
        let next = downsample(prev, (w / 2).max(1), (h / 2).max(1));
        levels.push(next);
    }
    levels
}

pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: wgpu::Extent3d,
}

impl Texture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

    /// Repeat wrapping, trilinear filtering, full mip chain.
    pub fn from_path(device: &wgpu::Device, queue: &wgpu::Queue, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| LessonError::Image { path: path.to_path_buf(), source })?;
        let label = path.to_string_lossy();
        log::info!("Loaded texture {} ({}x{})", label, image.width(), image.height());
        Ok(Self::from_texels(device, queue, &TexelData::from_image(&image, true), &label))
    }

    /// Like `from_path`, but logs the failure and substitutes a white texel.
    pub fn from_path_or_white(device: &wgpu::Device, queue: &wgpu::Queue, path: impl AsRef<Path>) -> Self {
        match Self::from_path(device, queue, path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{}", e);
                Self::solid(device, queue, [255, 255, 255, 255])
            }
        }
    }

    pub fn from_texels(device: &wgpu::Device, queue: &wgpu::Queue, data: &TexelData, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: data.levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: data.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, bytes) in data.levels.iter().enumerate() {
            let level_width = (data.width >> level).max(1);
            let level_height = (data.height >> level).max(1);
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                bytes,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(level_width * data.bytes_per_pixel()),
                    rows_per_image: Some(level_height),
                },
                wgpu::Extent3d {
                    width: level_width,
                    height: level_height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self { texture, view, sampler, size }
    }

    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4]) -> Self {
        let data = TexelData {
            width: 1,
            height: 1,
            format: wgpu::TextureFormat::Rgba8Unorm,
            levels: vec![rgba.to_vec()],
        };
        Self::from_texels(device, queue, &data, "solid texture")
    }

    /// Single-channel coverage bitmap with clamp-to-edge sampling. Zero-sized
    /// bitmaps become one transparent texel.
    pub fn coverage(device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32, bytes: &[u8], label: &str) -> Self {
        let data = if width == 0 || height == 0 {
            TexelData { width: 1, height: 1, format: wgpu::TextureFormat::R8Unorm, levels: vec![vec![0]] }
        } else {
            TexelData { width, height, format: wgpu::TextureFormat::R8Unorm, levels: vec![bytes.to_vec()] }
        };
        let mut texture = Self::from_texels(device, queue, &data, label);
        texture.sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        texture
    }

    /// Colour attachment that can be sampled afterwards.
    pub fn render_target(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat, label: &str) -> Self {
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self { texture, view, sampler, size }
    }

    pub fn depth_stencil(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        Self { texture, view, sampler, size }
    }

    /// Layout for a texture at binding 0 and its sampler at binding 1.
    pub fn bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some(label),
        })
    }

    pub fn bind_group(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some(label),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba};

    #[test]
    fn mip_count_covers_largest_dimension() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 1), 2);
        assert_eq!(mip_level_count(512, 512), 10);
        assert_eq!(mip_level_count(500, 300), 9);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn rgb_is_widened_and_flipped() {
        let mut img = RgbImage::new(1, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(0, 1, Rgb([0, 0, 255]));
        let data = TexelData::from_image(&DynamicImage::ImageRgb8(img), false);
        assert_eq!(data.format, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(data.levels.len(), 1);
        // Bottom row comes first after the flip.
        assert_eq!(data.levels[0], vec![0, 0, 255, 255, 255, 0, 0, 255]);
    }

    #[test]
    fn single_channel_stays_single_channel() {
        let img = GrayImage::from_pixel(4, 4, Luma([200]));
        let data = TexelData::from_image(&DynamicImage::ImageLuma8(img), true);
        assert_eq!(data.format, wgpu::TextureFormat::R8Unorm);
        assert_eq!(data.bytes_per_pixel(), 1);
        assert_eq!(data.levels.len(), 3);
        assert_eq!(data.levels[0].len(), 16);
        assert_eq!(data.levels[1].len(), 4);
        assert_eq!(data.levels[2], vec![200]);
    }

    #[test]
    fn mip_levels_halve_non_square_images() {
        let img = RgbaImage::from_pixel(8, 2, Rgba([10, 20, 30, 255]));
        let data = TexelData::from_image(&DynamicImage::ImageRgba8(img), true);
        let sizes: Vec<usize> = data.levels.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![8 * 2 * 4, 4 * 4, 2 * 4, 4]);
    }
}
