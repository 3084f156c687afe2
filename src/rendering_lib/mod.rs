// src/rendering_lib/mod.rs

pub mod framebuffer;
pub mod mesh;
pub mod pipeline;
pub mod shader;
pub mod text;
pub mod texture;
pub mod vertex;

pub use framebuffer::Framebuffer;
pub use mesh::GpuMesh;
pub use pipeline::PipelineBuilder;
pub use shader::{DynamicUniformBuffer, Shader, ShaderAsset, UniformBuffer};
pub use text::{GlyphCache, TextRenderer};
pub use texture::Texture;
