// src/lessons/shader_glsl.rs

//! Two triangles in separate vertex buffers, drawn as points and then as
//! filled triangles by two programs: one with a fixed orange colour, one with
//! a uniform colour whose green channel pulses over time.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::event::WindowEvent;

use crate::engine_lib::controller::{exit_requested, InputResponse};
use crate::error::Result;
use crate::rendering_lib::pipeline::PipelineBuilder;
use crate::rendering_lib::shader::{self, Shader, UniformBuffer};
use crate::rendering_lib::vertex::PositionVertex;

use super::{to_wgpu_color, GpuContext, Lesson};

const FIRST_TRIANGLE: [PositionVertex; 3] = [
    PositionVertex::new(-0.5, 0.5, 0.0),
    PositionVertex::new(-0.75, -0.5, 0.0),
    PositionVertex::new(-0.25, -0.5, 0.0),
];

const SECOND_TRIANGLE: [PositionVertex; 3] = [
    PositionVertex::new(0.5, 0.5, 0.0),
    PositionVertex::new(0.75, -0.5, 0.0),
    PositionVertex::new(0.25, -0.5, 0.0),
];

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct ColorUniform {
    pub our_color: [f32; 4],
}

/// `(0.3, sin(t) / 2 + 0.5, 0.2, 1.0)`
pub fn pulsing_color(elapsed: f32) -> [f32; 4] {
    let green = elapsed.sin() / 2.0 + 0.5;
    [0.3, green, 0.2, 1.0]
}

/// Point and triangle pipelines built from one shader.
struct Program {
    points: wgpu::RenderPipeline,
    triangles: wgpu::RenderPipeline,
}

impl Program {
    fn new(device: &wgpu::Device, shader: &Shader, format: wgpu::TextureFormat, layouts: &[&wgpu::BindGroupLayout]) -> Self {
        let build = |label, topology| {
            let mut builder = PipelineBuilder::new(label, shader, format)
                .vertex_layout(PositionVertex::desc())
                .topology(topology);
            for layout in layouts {
                builder = builder.bind_group_layout(layout);
            }
            builder.build(device)
        };
        Self {
            points: build("Point Pipeline", wgpu::PrimitiveTopology::PointList),
            triangles: build("Triangle Pipeline", wgpu::PrimitiveTopology::TriangleList),
        }
    }

    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, vertices: &'a wgpu::Buffer) {
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.set_pipeline(&self.points);
        pass.draw(0..3, 0..1);
        pass.set_pipeline(&self.triangles);
        pass.draw(0..3, 0..1);
    }
}

pub struct ShaderGlslLesson {
    fixed_color: Program,
    uniform_color: Program,
    color: UniformBuffer<ColorUniform>,
    vertex_buffers: [wgpu::Buffer; 2],
    clear_color: [f32; 4],
}

impl ShaderGlslLesson {
    pub async fn new(ctx: &GpuContext<'_>) -> Result<Self> {
        let fixed_shader = Shader::load(ctx.device, ctx.config, shader::POINT_TRIANGLE).await?;
        let uniform_shader = Shader::load(ctx.device, ctx.config, shader::UNIFORM_COLOR).await?;

        let color = UniformBuffer::new(
            ctx.device,
            "Color Uniform Buffer",
            wgpu::ShaderStages::FRAGMENT,
            &ColorUniform { our_color: pulsing_color(0.0) },
        );

        let fixed_color = Program::new(ctx.device, &fixed_shader, ctx.surface_format, &[]);
        let uniform_color = Program::new(ctx.device, &uniform_shader, ctx.surface_format, &[&color.layout]);

        let buffer = |label, vertices: &[PositionVertex]| {
            ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
        };

        Ok(Self {
            fixed_color,
            uniform_color,
            color,
            vertex_buffers: [
                buffer("First Triangle", &FIRST_TRIANGLE),
                buffer("Second Triangle", &SECOND_TRIANGLE),
            ],
            clear_color: ctx.config.clear_color,
        })
    }
}

impl Lesson for ShaderGlslLesson {
    fn name(&self) -> &'static str {
        "shader-glsl"
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> InputResponse {
        if exit_requested(event) {
            InputResponse::Exit
        } else {
            InputResponse::Ignored
        }
    }

    fn update(&mut self, ctx: &GpuContext, _dt: f32, elapsed: f32) {
        self.color.write(ctx.queue, &ColorUniform { our_color: pulsing_color(elapsed) });
    }

    fn resize(&mut self, _ctx: &GpuContext) {}

    fn render(&mut self, _ctx: &GpuContext, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shader GLSL Pass"),
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

        self.fixed_color.draw(&mut pass, &self.vertex_buffers[0]);
        pass.set_bind_group(0, &self.color.bind_group, &[]);
        self.uniform_color.draw(&mut pass, &self.vertex_buffers[1]);
    }

    fn clear_color_mut(&mut self) -> &mut [f32; 4] {
        &mut self.clear_color
    }
}
