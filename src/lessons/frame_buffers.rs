// src/lessons/frame_buffers.rs

//! The scene is drawn into an offscreen colour + depth/stencil target, which
//! is then sampled onto a window-filling quad.

use bytemuck::Zeroable;
use glam::{Mat4, Vec3};
use winit::event::WindowEvent;

use crate::engine_lib::camera::Camera;
use crate::engine_lib::controller::{CameraController, InputResponse};
use crate::engine_lib::geometry::Geometry;
use crate::engine_lib::lighting::{
    DirectionLight, LightMarkerUniform, LightsUniform, MaterialUniform, ModelUniform, SpotLight, POINT_LIGHT_COUNT,
};
use crate::engine_lib::model::material_bind_group;
use crate::engine_lib::transparency::sort_back_to_front;
use crate::error::Result;
use crate::rendering_lib::framebuffer::Framebuffer;
use crate::rendering_lib::mesh::GpuMesh;
use crate::rendering_lib::pipeline::PipelineBuilder;
use crate::rendering_lib::shader::{self, Shader};
use crate::rendering_lib::texture::Texture;
use crate::rendering_lib::vertex::MeshVertex;

use super::lit_scene::{swinging_light, LitScene, LitSceneOptions, DARK_CLEAR, MATERIAL_GROUP};
use super::{to_wgpu_color, GpuContext, Lesson};

const WOOD_TEXTURE: &str = "./static/texture/wood.png";
const BRICK_TEXTURE: &str = "./static/texture/brick_diffuse.jpg";
const WINDOW_TEXTURE: &str = "./static/texture/blending_transparent_window.png";

const POINT_LIGHT_POSITIONS: [Vec3; POINT_LIGHT_COUNT] = [
    Vec3::new(0.7, 1.0, 1.5),
    Vec3::new(2.3, 3.0, -4.0),
    Vec3::new(-4.0, 2.0, 1.0),
    Vec3::new(1.4, 2.0, 1.3),
];

const POINT_LIGHT_COLORS: [Vec3; POINT_LIGHT_COUNT] = [
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(0.0, 1.0, 0.0),
];

const WINDOW_POSITIONS: [Vec3; 5] = [
    Vec3::new(-1.5, 0.5, -0.48),
    Vec3::new(1.5, 0.5, 0.51),
    Vec3::new(0.0, 0.5, 0.7),
    Vec3::new(-0.3, 0.5, -2.3),
    Vec3::new(0.5, 0.5, -0.6),
];

const ORBIT_RADIUS: f32 = 5.0;
const ORBIT_SPEED: f32 = 0.5;

const GROUND_SLOT: usize = 0;
const BOX_SLOTS: [usize; 2] = [1, 2];
const FIRST_WINDOW_SLOT: usize = 3;
const MODEL_SLOTS: usize = FIRST_WINDOW_SLOT + WINDOW_POSITIONS.len();

/// The first point light circles the origin at its starting height.
pub fn point_light_positions(elapsed: f32) -> [Vec3; POINT_LIGHT_COUNT] {
    let mut positions = POINT_LIGHT_POSITIONS;
    let angle = elapsed * ORBIT_SPEED;
    positions[0].x = angle.sin() * ORBIT_RADIUS;
    positions[0].z = angle.cos() * ORBIT_RADIUS;
    positions
}

/// Ground, two bricks and the window panes farthest first, in slot order.
pub fn scene_transforms(camera_position: Vec3, ground_uv_scale: f32) -> Vec<ModelUniform> {
    let mut models = vec![
        ModelUniform::new(Mat4::from_rotation_x((-90.0f32).to_radians()), ground_uv_scale),
        ModelUniform::new(
            Mat4::from_translation(Vec3::new(1.0, 1.0, -1.0)) * Mat4::from_scale(Vec3::splat(2.0)),
            1.0,
        ),
        ModelUniform::new(Mat4::from_translation(Vec3::new(-1.0, 0.5, 2.0)), 1.0),
    ];
    models.extend(
        sort_back_to_front(camera_position, &WINDOW_POSITIONS)
            .into_iter()
            .map(|position| ModelUniform::new(Mat4::from_translation(position), 1.0)),
    );
    models
}

struct Surface {
    mesh: GpuMesh,
    _texture: Texture,
    material: wgpu::BindGroup,
}

impl Surface {
    fn new(ctx: &GpuContext, layout: &wgpu::BindGroupLayout, geometry: Geometry, texture_path: &str) -> Self {
        let texture = Texture::from_path_or_white(ctx.device, ctx.queue, ctx.config.resolve(texture_path));
        let material = material_bind_group(ctx.device, layout, &texture, &texture, texture_path);
        Self {
            mesh: geometry.upload(ctx.device, texture_path),
            _texture: texture,
            material,
        }
    }

    fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_bind_group(MATERIAL_GROUP, &self.material, &[]);
        self.mesh.draw(pass);
    }
}

pub struct FrameBuffersLesson {
    scene: LitScene,
    framebuffer: Framebuffer,
    screen_pipeline: wgpu::RenderPipeline,
    screen_layout: wgpu::BindGroupLayout,
    screen_bind_group: wgpu::BindGroup,
    screen_quad: GpuMesh,
    ground: Surface,
    brick: Surface,
    window: Surface,
    camera: Camera,
    controller: CameraController,
    lights: LightsUniform,
    ground_uv_scale: f32,
    clear_color: [f32; 4],
}

impl FrameBuffersLesson {
    pub async fn new(ctx: &GpuContext<'_>) -> Result<Self> {
        let framebuffer = Framebuffer::new(ctx.device, ctx.width, ctx.height, ctx.surface_format)?;
        let scene = LitScene::new(
            ctx,
            LitSceneOptions {
                target_format: framebuffer.color_format(),
                cull_back_faces: true,
                model_slots: MODEL_SLOTS,
                marker_slots: 1 + POINT_LIGHT_COUNT,
                marker_radius: 0.04,
            },
        )
        .await?;

        let screen_shader = Shader::load(ctx.device, ctx.config, shader::FRAME_BUFFER_QUAD).await?;
        let screen_layout = Texture::bind_group_layout(ctx.device, "screen_texture_bind_group_layout");
        let screen_pipeline = PipelineBuilder::new("Screen Quad Pipeline", &screen_shader, ctx.surface_format)
            .vertex_layout(MeshVertex::desc())
            .bind_group_layout(&screen_layout)
            .build(ctx.device);
        let screen_bind_group = framebuffer.color.bind_group(ctx.device, &screen_layout, "Screen Texture");

        let layout = &scene.material_layout;
        let ground = Surface::new(ctx, layout, Geometry::plane(10.0, 10.0, 1, 1), WOOD_TEXTURE);
        let brick = Surface::new(ctx, layout, Geometry::cuboid(1.0, 1.0, 1.0, 1), BRICK_TEXTURE);
        let window = Surface::new(ctx, layout, Geometry::plane(1.0, 1.0, 1, 1), WINDOW_TEXTURE);

        let mut lights = LightsUniform::zeroed();
        lights.material = MaterialUniform::default();
        lights.direction_light = DirectionLight::new(Vec3::ZERO, Vec3::splat(0.6), Vec3::splat(0.9), Vec3::ONE);
        lights.spot_light = SpotLight::disabled();

        Ok(Self {
            screen_quad: Geometry::plane(2.0, 2.0, 1, 1).upload(ctx.device, "Screen Quad"),
            scene,
            framebuffer,
            screen_pipeline,
            screen_layout,
            screen_bind_group,
            ground,
            brick,
            window,
            camera: Camera::new(Vec3::new(0.0, 1.0, 6.0)),
            controller: CameraController::new(),
            lights,
            ground_uv_scale: 4.0,
            clear_color: DARK_CLEAR,
        })
    }
}

impl Lesson for FrameBuffersLesson {
    fn name(&self) -> &'static str {
        "frame-buffers"
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> InputResponse {
        self.controller.handle_window_event(event)
    }

    fn update(&mut self, ctx: &GpuContext, dt: f32, elapsed: f32) {
        self.controller.apply(&mut self.camera, dt);

        let light_position = swinging_light(elapsed);
        let point_positions = point_light_positions(elapsed);
        self.lights.direction_light.direction = light_position.to_array();
        self.lights.set_point_lights(&point_positions, &POINT_LIGHT_COLORS);

        self.scene.write_camera(ctx.queue, &self.camera.uniform(ctx.aspect()));
        self.scene.write_lights(ctx.queue, &self.lights);
        self.scene
            .write_models(ctx.queue, &scene_transforms(self.camera.position, self.ground_uv_scale));

        let mut markers = vec![LightMarkerUniform::new(light_position, Vec3::ONE)];
        markers.extend(
            point_positions
                .iter()
                .zip(POINT_LIGHT_COLORS.iter())
                .map(|(position, color)| LightMarkerUniform::new(*position, *color)),
        );
        self.scene.write_markers(ctx.queue, &markers);
    }

    fn resize(&mut self, ctx: &GpuContext) {
        if self.framebuffer.resize(ctx.device, ctx.width, ctx.height) {
            if let Err(e) = self.framebuffer.check_complete() {
                log::error!("{}", e);
            }
            self.screen_bind_group = self.framebuffer.color.bind_group(ctx.device, &self.screen_layout, "Screen Texture");
        }
    }

    fn render(&mut self, _ctx: &GpuContext, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Offscreen Scene Pass"),
                color_attachments: &[Some(self.framebuffer.color_attachment(to_wgpu_color(self.clear_color)))],
                depth_stencil_attachment: Some(self.framebuffer.depth_attachment()),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.scene.begin_lit(&mut pass);
            self.scene.set_model(&mut pass, GROUND_SLOT);
            self.ground.draw(&mut pass);
            for slot in BOX_SLOTS {
                self.scene.set_model(&mut pass, slot);
                self.brick.draw(&mut pass);
            }
            // Sorted farthest first, so blending sees what is behind each pane.
            for slot in FIRST_WINDOW_SLOT..MODEL_SLOTS {
                self.scene.set_model(&mut pass, slot);
                self.window.draw(&mut pass);
            }
            self.scene.draw_markers(&mut pass);
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Screen Quad Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.screen_pipeline);
        pass.set_bind_group(0, &self.screen_bind_group, &[]);
        self.screen_quad.draw(&mut pass);
    }

    fn clear_color_mut(&mut self) -> &mut [f32; 4] {
        &mut self.clear_color
    }

    fn uses_camera(&self) -> bool {
        true
    }

    fn ui(&mut self, ui: &mut egui::Ui) {
        let (width, height) = self.framebuffer.size();
        ui.label(format!("Framebuffer: {}x{}", width, height));
        ui.add(egui::Slider::new(&mut self.ground_uv_scale, 1.0..=8.0).text("Ground uv scale"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_point_light_orbits() {
        let start = point_light_positions(0.0);
        assert_eq!(start[0], Vec3::new(0.0, 1.0, ORBIT_RADIUS));
        assert_eq!(start[1..], POINT_LIGHT_POSITIONS[1..]);

        // Quarter orbit after pi seconds at half speed.
        let quarter = point_light_positions(std::f32::consts::PI);
        assert_relative_eq!(quarter[0].x, ORBIT_RADIUS, epsilon = 1e-5);
        assert_relative_eq!(quarter[0].z, 0.0, epsilon = 1e-5);
        assert_eq!(quarter[0].y, 1.0);
    }

    #[test]
    fn transforms_fill_every_slot() {
        let models = scene_transforms(Vec3::new(0.0, 1.0, 6.0), 4.0);
        assert_eq!(models.len(), MODEL_SLOTS);
        assert_eq!(models[GROUND_SLOT].uv_scale, 4.0);
        assert!(models[FIRST_WINDOW_SLOT..].iter().all(|m| m.uv_scale == 1.0));
    }

    #[test]
    fn ground_lies_flat_facing_up() {
        let models = scene_transforms(Vec3::ZERO, 4.0);
        let ground = Mat4::from_cols_array_2d(&models[GROUND_SLOT].model);
        let normal = ground.transform_vector3(Vec3::Z);
        assert_relative_eq!(normal.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn window_panes_are_drawn_farthest_first() {
        let camera = Vec3::new(0.0, 1.0, 6.0);
        let models = scene_transforms(camera, 4.0);
        let distances: Vec<f32> = models[FIRST_WINDOW_SLOT..]
            .iter()
            .map(|m| Mat4::from_cols_array_2d(&m.model).transform_point3(Vec3::ZERO).distance(camera))
            .collect();
        assert!(distances.windows(2).all(|pair| pair[0] >= pair[1]));
    }
}
