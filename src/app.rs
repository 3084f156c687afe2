// src/app.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{event::WindowEvent, window::Window};

use crate::config::LessonConfig;
use crate::engine_lib::controller::InputResponse;
use crate::error::{LessonError, Result};
use crate::frame_timer::FrameTimer;
use crate::lessons::{GpuContext, Lesson, LessonKind};
use crate::ui::build_ui;

const TITLE_REFRESH: Duration = Duration::from_millis(500);

fn gpu_context<'a>(
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    surface_config: &wgpu::SurfaceConfiguration,
    lesson_config: &'a LessonConfig,
) -> GpuContext<'a> {
    GpuContext {
        device,
        queue,
        surface_format: surface_config.format,
        width: surface_config.width,
        height: surface_config.height,
        config: lesson_config,
    }
}

/// Lesson colours are already gamma-encoded, so a non-sRGB target stores
/// them unchanged.
fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())
}

/// Owns the window surface, the GPU device, the egui overlay and the running
/// lesson.
pub struct App {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    lesson_config: LessonConfig,
    lesson: Box<dyn Lesson>,
    frame_timer: FrameTimer,
    started: Instant,
    last_title: Instant,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl App {
    pub async fn new(window: Arc<Window>, kind: LessonKind, lesson_config: LessonConfig) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(LessonError::NoAdapter)?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = pick_surface_format(&surface_caps.formats).ok_or(LessonError::NoAdapter)?;
        if surface_format.is_srgb() {
            log::warn!("Only sRGB surface formats available, colours will look lighter");
        }
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: lesson_config.present_mode(),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let lesson = kind
            .create(&gpu_context(&device, &queue, &config, &lesson_config))
            .await?;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1);

        let now = Instant::now();
        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            lesson_config,
            lesson,
            frame_timer: FrameTimer::new(),
            started: now,
            last_title: now,
            egui_ctx,
            egui_state,
            egui_renderer,
        })
    }

    pub fn get_size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            let ctx = gpu_context(&self.device, &self.queue, &self.config, &self.lesson_config);
            self.lesson.resize(&ctx);
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.frame_timer.record(dt);
        let elapsed = self.started.elapsed().as_secs_f32();
        let ctx = gpu_context(&self.device, &self.queue, &self.config, &self.lesson_config);
        self.lesson.update(&ctx, dt, elapsed);
    }

    pub fn render(&mut self, window: &Window) -> std::result::Result<(), wgpu::SurfaceError> {
        let output_texture = self.surface.get_current_texture()?;
        let view = output_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Main Command Encoder"),
        });

        {
            let ctx = gpu_context(&self.device, &self.queue, &self.config, &self.lesson_config);
            self.lesson.render(&ctx, &mut encoder, &view);
        }

        let raw_input = self.egui_state.take_egui_input(window);
        let frame_timer = &self.frame_timer;
        let lesson = self.lesson.as_mut();
        let full_output = self.egui_ctx.run(raw_input, |ctx| build_ui(ctx, frame_timer, lesson));
        self.egui_state.handle_platform_output(window, full_output.platform_output);
        let tris = self.egui_ctx.tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };
        self.egui_renderer
            .update_buffers(&self.device, &self.queue, &mut encoder, &tris, &screen_descriptor);
        {
            let mut gui_render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("GUI Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.egui_renderer.render(&mut gui_render_pass, &tris, &screen_descriptor);
        }
        for tex_id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(tex_id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output_texture.present();

        if self.last_title.elapsed() >= TITLE_REFRESH {
            self.last_title = Instant::now();
            window.set_title(&self.frame_timer.title(&self.lesson_config.title));
        }
        Ok(())
    }

    /// egui sees the event first; whatever it leaves goes to the lesson.
    pub fn handle_window_event(&mut self, event: &WindowEvent, window: &Window) -> InputResponse {
        if self.egui_state.on_window_event(window, event).consumed {
            return InputResponse::Consumed;
        }
        self.lesson.handle_window_event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_prefers_non_srgb_format() {
        let formats = [wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Bgra8Unorm];
        assert_eq!(pick_surface_format(&formats), Some(wgpu::TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn surface_falls_back_to_first_format() {
        let formats = [wgpu::TextureFormat::Rgba8UnormSrgb];
        assert_eq!(pick_surface_format(&formats), Some(wgpu::TextureFormat::Rgba8UnormSrgb));
        assert_eq!(pick_surface_format(&[]), None);
    }
}
