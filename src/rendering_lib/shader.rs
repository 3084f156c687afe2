// src/rendering_lib/shader.rs

use std::marker::PhantomData;

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use crate::config::LessonConfig;
use crate::error::{LessonError, Result};

/// A WGSL program a lesson can load by its asset-relative path.
///
/// The embedded copy is used when the asset directory has no file at `path`.
#[derive(Debug, Clone, Copy)]
pub struct ShaderAsset {
    pub path: &'static str,
    pub embedded: &'static str,
}

macro_rules! shader_asset {
    ($name:ident, $file:literal) => {
        pub const $name: ShaderAsset = ShaderAsset {
            path: concat!("./shader/", $file),
            embedded: include_str!(concat!("../../assets/shader/", $file)),
        };
    };
}

shader_asset!(POINT_TRIANGLE, "point_triangle.wgsl");
shader_asset!(UNIFORM_COLOR, "uniform_color.wgsl");
shader_asset!(VERTEX_COLOR, "vertex_color.wgsl");
shader_asset!(LIT_SCENE, "lit_scene.wgsl");
shader_asset!(LIGHT_OBJECT, "light_object.wgsl");
shader_asset!(FRAME_BUFFER_QUAD, "frame_buffer_quad.wgsl");
shader_asset!(TEXT, "text.wgsl");

pub struct Shader {
    pub module: wgpu::ShaderModule,
    pub label: String,
}

impl Shader {
    pub const VERTEX_ENTRY: &'static str = "vs_main";
    pub const FRAGMENT_ENTRY: &'static str = "fs_main";

    /// Loads `asset` from the lesson's asset directory, falling back to the
    /// copy compiled into the binary.
    pub async fn load(device: &wgpu::Device, config: &LessonConfig, asset: ShaderAsset) -> Result<Self> {
        let path = config.resolve(asset.path);
        let source = match std::fs::read_to_string(&path) {
            Ok(text) => {
                log::info!("Loaded shader {}", path.display());
                text
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("{} not found, using embedded shader", path.display());
                asset.embedded.to_string()
            }
            Err(e) => return Err(LessonError::io(path, e)),
        };
        Self::from_source(device, asset.path, &source).await
    }

    /// Compiles WGSL, turning validation failures into `ShaderCompile` errors.
    pub async fn from_source(device: &wgpu::Device, label: &str, source: &str) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(error) = device.pop_error_scope().await {
            log::error!("ERROR::SHADER::COMPILATION_FAILED {}", label);
            return Err(LessonError::ShaderCompile {
                path: label.to_string(),
                message: error.to_string(),
            });
        }
        Ok(Self { module, label: label.to_string() })
    }
}

/// Typed uniform block bound at binding 0 of its own bind group.
pub struct UniformBuffer<T: Pod> {
    buffer: wgpu::Buffer,
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    _marker: PhantomData<T>,
}

impl<T: Pod> UniformBuffer<T> {
    pub fn new(device: &wgpu::Device, label: &str, visibility: wgpu::ShaderStages, initial: &T) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some(label),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(label),
        });
        Self { buffer, layout, bind_group, _marker: PhantomData }
    }

    pub fn write(&self, queue: &wgpu::Queue, value: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
    }
}

/// One uniform buffer holding `capacity` copies of `T`, addressed through a
/// dynamic offset. Used when several draws in one pass need different values.
pub struct DynamicUniformBuffer<T: Pod> {
    buffer: wgpu::Buffer,
    stride: wgpu::BufferAddress,
    capacity: usize,
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    _marker: PhantomData<T>,
}

impl<T: Pod> DynamicUniformBuffer<T> {
    pub fn new(device: &wgpu::Device, label: &str, visibility: wgpu::ShaderStages, capacity: usize) -> Self {
        let stride = aligned_stride(
            std::mem::size_of::<T>() as wgpu::BufferAddress,
            device.limits().min_uniform_buffer_offset_alignment as wgpu::BufferAddress,
        );
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride * capacity.max(1) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
                },
                count: None,
            }],
            label: Some(label),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
                }),
            }],
            label: Some(label),
        });
        Self { buffer, stride, capacity: capacity.max(1), layout, bind_group, _marker: PhantomData }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Writes `values` into consecutive slots; extra values past capacity are dropped.
    pub fn write_all(&self, queue: &wgpu::Queue, values: &[T]) {
        if values.len() > self.capacity {
            log::warn!("{} uniform slots requested, only {} available", values.len(), self.capacity);
        }
        for (slot, value) in values.iter().take(self.capacity).enumerate() {
            queue.write_buffer(&self.buffer, slot as u64 * self.stride, bytemuck::bytes_of(value));
        }
    }

    pub fn offset(&self, slot: usize) -> wgpu::DynamicOffset {
        (slot.min(self.capacity - 1) as wgpu::BufferAddress * self.stride) as wgpu::DynamicOffset
    }
}

pub fn aligned_stride(size: wgpu::BufferAddress, alignment: wgpu::BufferAddress) -> wgpu::BufferAddress {
    if alignment == 0 {
        return size;
    }
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(aligned_stride(80, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
        assert_eq!(aligned_stride(80, 0), 80);
    }

    #[test]
    fn embedded_shaders_declare_entry_points() {
        for asset in [POINT_TRIANGLE, UNIFORM_COLOR, VERTEX_COLOR, LIT_SCENE, LIGHT_OBJECT, FRAME_BUFFER_QUAD, TEXT] {
            assert!(asset.embedded.contains("fn vs_main"), "{} has no vs_main", asset.path);
            assert!(asset.embedded.contains("fn fs_main"), "{} has no fs_main", asset.path);
            assert!(asset.path.starts_with("./shader/"));
        }
    }
}
