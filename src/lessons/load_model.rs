// src/lessons/load_model.rs

use bytemuck::Zeroable;
use glam::{Mat4, Vec3};
use winit::event::WindowEvent;

use crate::engine_lib::camera::Camera;
use crate::engine_lib::controller::{CameraController, InputResponse};
use crate::engine_lib::lighting::{
    DirectionLight, LightMarkerUniform, LightsUniform, MaterialUniform, ModelUniform, SpotLight, POINT_LIGHT_COUNT,
};
use crate::engine_lib::model::Model;
use crate::error::Result;
use crate::rendering_lib::framebuffer::depth_clear_attachment;
use crate::rendering_lib::texture::Texture;

use super::lit_scene::{swinging_light, LitScene, LitSceneOptions, DARK_CLEAR, MATERIAL_GROUP};
use super::{to_wgpu_color, GpuContext, Lesson};

const MODEL_PATH: &str = "./static/model/nanosuit/nanosuit.obj";

const POINT_LIGHT_POSITIONS: [Vec3; POINT_LIGHT_COUNT] = [
    Vec3::new(0.7, 0.2, 1.5),
    Vec3::new(2.3, -3.3, -4.0),
    Vec3::new(-4.0, 2.0, -12.0),
    Vec3::new(0.0, 0.0, -3.0),
];

const POINT_LIGHT_COLORS: [Vec3; POINT_LIGHT_COUNT] = [
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(0.0, 1.0, 0.0),
];

/// Turns 15 degrees per second about Y, standing one unit lower and scaled to
/// fit the view.
pub fn model_transform(elapsed: f32) -> Mat4 {
    Mat4::from_rotation_y((15.0 * elapsed).to_radians())
        * Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0))
        * Mat4::from_scale(Vec3::splat(0.13))
}

fn initial_lights(spot_direction: Vec3) -> LightsUniform {
    let mut lights = LightsUniform::zeroed();
    lights.material = MaterialUniform::default();
    lights.direction_light = DirectionLight::new(Vec3::ZERO, Vec3::splat(0.01), Vec3::splat(0.2), Vec3::ONE);
    lights.spot_light = SpotLight::new(Vec3::new(0.0, 0.0, 2.0), spot_direction);
    lights.set_point_lights(&POINT_LIGHT_POSITIONS, &POINT_LIGHT_COLORS);
    lights
}

pub struct LoadModelLesson {
    scene: LitScene,
    model: Option<Model>,
    camera: Camera,
    controller: CameraController,
    depth: Texture,
    lights: LightsUniform,
    spot_light: SpotLight,
    spot_enabled: bool,
    clear_color: [f32; 4],
}

impl LoadModelLesson {
    pub async fn new(ctx: &GpuContext<'_>) -> Result<Self> {
        let scene = LitScene::new(
            ctx,
            LitSceneOptions {
                target_format: ctx.surface_format,
                cull_back_faces: false,
                model_slots: 1,
                marker_slots: 1 + POINT_LIGHT_COUNT,
                marker_radius: 0.1,
            },
        )
        .await?;

        let path = ctx.config.resolve(MODEL_PATH);
        let model = match Model::load(ctx.device, ctx.queue, &path, &scene.material_layout) {
            Ok(model) => Some(model),
            Err(e) => {
                log::error!("{}; drawing the lights only", e);
                None
            }
        };

        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        let lights = initial_lights(camera.front);

        Ok(Self {
            depth: Texture::depth_stencil(ctx.device, ctx.width, ctx.height, "Depth Stencil"),
            scene,
            model,
            spot_light: lights.spot_light,
            lights,
            camera,
            controller: CameraController::new(),
            spot_enabled: true,
            clear_color: DARK_CLEAR,
        })
    }
}

impl Lesson for LoadModelLesson {
    fn name(&self) -> &'static str {
        "load-model"
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> InputResponse {
        self.controller.handle_window_event(event)
    }

    fn update(&mut self, ctx: &GpuContext, dt: f32, elapsed: f32) {
        self.controller.apply(&mut self.camera, dt);

        let light_position = swinging_light(elapsed);
        self.lights.direction_light.direction = light_position.to_array();
        self.lights.spot_light = if self.spot_enabled { self.spot_light } else { SpotLight::disabled() };

        self.scene.write_camera(ctx.queue, &self.camera.uniform(ctx.aspect()));
        self.scene.write_lights(ctx.queue, &self.lights);
        self.scene.write_models(ctx.queue, &[ModelUniform::new(model_transform(elapsed), 1.0)]);

        let mut markers = vec![LightMarkerUniform::new(light_position, Vec3::ONE)];
        markers.extend(
            POINT_LIGHT_POSITIONS
                .iter()
                .zip(POINT_LIGHT_COLORS.iter())
                .map(|(position, color)| LightMarkerUniform::new(*position, *color)),
        );
        self.scene.write_markers(ctx.queue, &markers);
    }

    fn resize(&mut self, ctx: &GpuContext) {
        self.depth = Texture::depth_stencil(ctx.device, ctx.width, ctx.height, "Depth Stencil");
    }

    fn render(&mut self, _ctx: &GpuContext, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Load Model Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(to_wgpu_color(self.clear_color)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(depth_clear_attachment(&self.depth.view)),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        if let Some(model) = &self.model {
            self.scene.begin_lit(&mut pass);
            self.scene.set_model(&mut pass, 0);
            model.draw(&mut pass, MATERIAL_GROUP);
        }
        self.scene.draw_markers(&mut pass);
    }

    fn clear_color_mut(&mut self) -> &mut [f32; 4] {
        &mut self.clear_color
    }

    fn uses_camera(&self) -> bool {
        true
    }

    fn ui(&mut self, ui: &mut egui::Ui) {
        match &self.model {
            Some(model) => ui.label(format!("Meshes: {}", model.meshes.len())),
            None => ui.label("Model not loaded"),
        };
        ui.checkbox(&mut self.spot_enabled, "Spot light");
    }
}
