// src/lessons/lit_scene.rs

//! Pipelines and uniform blocks shared by the lit 3D lessons: textured
//! surfaces under the full light set, plus small unlit spheres marking where
//! the lights are.

use bytemuck::Zeroable;
use glam::Vec3;

use crate::engine_lib::camera::CameraUniform;
use crate::engine_lib::geometry::Geometry;
use crate::engine_lib::lighting::{LightMarkerUniform, LightsUniform, ModelUniform};
use crate::engine_lib::model::material_bind_group_layout;
use crate::error::Result;
use crate::rendering_lib::mesh::GpuMesh;
use crate::rendering_lib::pipeline::PipelineBuilder;
use crate::rendering_lib::shader::{self, DynamicUniformBuffer, Shader, UniformBuffer};
use crate::rendering_lib::vertex::MeshVertex;

use super::GpuContext;

/// Bind group index of the diffuse/specular material textures.
pub const MATERIAL_GROUP: u32 = 3;

pub struct LitSceneOptions {
    pub target_format: wgpu::TextureFormat,
    pub cull_back_faces: bool,
    /// Number of lit draws per frame.
    pub model_slots: usize,
    pub marker_slots: usize,
    pub marker_radius: f32,
}

pub struct LitScene {
    lit_pipeline: wgpu::RenderPipeline,
    marker_pipeline: wgpu::RenderPipeline,
    camera: UniformBuffer<CameraUniform>,
    lights: UniformBuffer<LightsUniform>,
    models: DynamicUniformBuffer<ModelUniform>,
    markers: DynamicUniformBuffer<LightMarkerUniform>,
    marker_mesh: GpuMesh,
    marker_count: usize,
    pub material_layout: wgpu::BindGroupLayout,
}

impl LitScene {
    pub async fn new(ctx: &GpuContext<'_>, options: LitSceneOptions) -> Result<Self> {
        let lit_shader = Shader::load(ctx.device, ctx.config, shader::LIT_SCENE).await?;
        let marker_shader = Shader::load(ctx.device, ctx.config, shader::LIGHT_OBJECT).await?;

        let camera = UniformBuffer::new(
            ctx.device,
            "Camera Uniform Buffer",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            &CameraUniform::zeroed(),
        );
        let lights = UniformBuffer::new(
            ctx.device,
            "Lights Uniform Buffer",
            wgpu::ShaderStages::FRAGMENT,
            &LightsUniform::zeroed(),
        );
        let models = DynamicUniformBuffer::new(ctx.device, "Model Uniform Buffer", wgpu::ShaderStages::VERTEX, options.model_slots);
        let markers = DynamicUniformBuffer::new(
            ctx.device,
            "Light Marker Uniform Buffer",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            options.marker_slots,
        );
        let material_layout = material_bind_group_layout(ctx.device);

        let mut lit = PipelineBuilder::new("Lit Scene Pipeline", &lit_shader, options.target_format)
            .vertex_layout(MeshVertex::desc())
            .bind_group_layout(&camera.layout)
            .bind_group_layout(&lights.layout)
            .bind_group_layout(&models.layout)
            .bind_group_layout(&material_layout)
            .depth_test()
            .alpha_blending();
        let mut marker = PipelineBuilder::new("Light Object Pipeline", &marker_shader, options.target_format)
            .vertex_layout(MeshVertex::desc())
            .bind_group_layout(&camera.layout)
            .bind_group_layout(&markers.layout)
            .depth_test();
        if options.cull_back_faces {
            lit = lit.cull_back_faces();
            marker = marker.cull_back_faces();
        }
        let lit_pipeline = lit.build(ctx.device);
        let marker_pipeline = marker.build(ctx.device);

        Ok(Self {
            lit_pipeline,
            marker_pipeline,
            marker_mesh: Geometry::sphere(options.marker_radius, 10, 10).upload(ctx.device, "Light Marker Sphere"),
            marker_count: 0,
            camera,
            lights,
            models,
            markers,
            material_layout,
        })
    }

    pub fn write_camera(&self, queue: &wgpu::Queue, camera: &CameraUniform) {
        self.camera.write(queue, camera);
    }

    pub fn write_lights(&self, queue: &wgpu::Queue, lights: &LightsUniform) {
        self.lights.write(queue, lights);
    }

    /// Slot `i` of `models` is selected later with `set_model(pass, i)`.
    pub fn write_models(&self, queue: &wgpu::Queue, models: &[ModelUniform]) {
        self.models.write_all(queue, models);
    }

    pub fn write_markers(&mut self, queue: &wgpu::Queue, markers: &[LightMarkerUniform]) {
        self.markers.write_all(queue, markers);
        self.marker_count = markers.len().min(self.markers.capacity());
    }

    /// Binds the lit pipeline with the camera and light blocks.
    pub fn begin_lit<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.lit_pipeline);
        pass.set_bind_group(0, &self.camera.bind_group, &[]);
        pass.set_bind_group(1, &self.lights.bind_group, &[]);
    }

    pub fn set_model<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, slot: usize) {
        pass.set_bind_group(2, &self.models.bind_group, &[self.models.offset(slot)]);
    }

    pub fn draw_markers<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.marker_pipeline);
        pass.set_bind_group(0, &self.camera.bind_group, &[]);
        for slot in 0..self.marker_count {
            pass.set_bind_group(1, &self.markers.bind_group, &[self.markers.offset(slot)]);
            self.marker_mesh.draw(pass);
        }
    }
}

/// Directional light "position" swinging along x, as both 3D lessons animate it.
pub fn swinging_light(elapsed: f32) -> Vec3 {
    Vec3::new(SWING_ORIGIN.x * elapsed.sin() * 2.0, SWING_ORIGIN.y, SWING_ORIGIN.z)
}

const SWING_ORIGIN: Vec3 = Vec3::new(1.0, 2.5, 2.0);

/// Clear colour of the 3D lessons, rgb 25/255.
pub const DARK_CLEAR: [f32; 4] = [25.0 / 255.0, 25.0 / 255.0, 25.0 / 255.0, 1.0];
