// src/lessons/shader_class.rs

use wgpu::util::DeviceExt;
use winit::event::WindowEvent;

use crate::engine_lib::controller::{exit_requested, InputResponse};
use crate::error::Result;
use crate::rendering_lib::pipeline::{line_loop_indices, PipelineBuilder};
use crate::rendering_lib::shader::{self, Shader};
use crate::rendering_lib::vertex::ColorVertex;

use super::{to_wgpu_color, GpuContext, Lesson};

const VERTICES: [ColorVertex; 3] = [
    ColorVertex::new([0.5, 0.5, 0.0], [1.0, 0.0, 0.0]),   // top right
    ColorVertex::new([0.5, -0.5, 0.0], [0.0, 1.0, 0.0]),  // bottom right
    ColorVertex::new([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0]), // bottom left
];

/// One triangle with per-vertex colours, outlined as a closed line loop.
pub struct ShaderClassLesson {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    clear_color: [f32; 4],
}

impl ShaderClassLesson {
    pub async fn new(ctx: &GpuContext<'_>) -> Result<Self> {
        let shader = Shader::load(ctx.device, ctx.config, shader::VERTEX_COLOR).await?;
        let pipeline = PipelineBuilder::new("Line Loop Pipeline", &shader, ctx.surface_format)
            .vertex_layout(ColorVertex::desc())
            .topology(wgpu::PrimitiveTopology::LineStrip)
            .build(ctx.device);

        let vertex_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let indices = line_loop_indices(VERTICES.len() as u16);
        let index_count = indices.len() as u32;
        let index_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Line Loop Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count,
            clear_color: ctx.config.clear_color,
        })
    }
}

impl Lesson for ShaderClassLesson {
    fn name(&self) -> &'static str {
        "shader-class"
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> InputResponse {
        if exit_requested(event) {
            InputResponse::Exit
        } else {
            InputResponse::Ignored
        }
    }

    fn update(&mut self, _ctx: &GpuContext, _dt: f32, _elapsed: f32) {}

    fn resize(&mut self, _ctx: &GpuContext) {}

    fn render(&mut self, _ctx: &GpuContext, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shader Class Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(to_wgpu_color(self.clear_color)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    fn clear_color_mut(&mut self) -> &mut [f32; 4] {
        &mut self.clear_color
    }
}
