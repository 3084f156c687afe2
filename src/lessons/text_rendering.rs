// src/lessons/text_rendering.rs

use std::path::PathBuf;

use glam::Vec3;
use winit::event::WindowEvent;

use crate::config::LessonConfig;
use crate::engine_lib::controller::{exit_requested, InputResponse};
use crate::error::{LessonError, Result};
use crate::rendering_lib::shader::{self, Shader};
use crate::rendering_lib::text::{GlyphCache, TextRenderer};

use super::{to_wgpu_color, GpuContext, Lesson};

const DEFAULT_FONT: &str = "./Fonts/arial.ttf";

/// A line of text at a pixel position measured from the bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub color: Vec3,
}

pub fn default_lines() -> Vec<TextLine> {
    vec![
        TextLine {
            text: "This is sample text".to_string(),
            x: 25.0,
            y: 25.0,
            scale: 1.0,
            color: Vec3::new(0.5, 0.8, 0.2),
        },
        TextLine {
            text: "(C) LearnOpenGL.com".to_string(),
            x: 540.0,
            y: 570.0,
            scale: 0.5,
            color: Vec3::new(0.3, 0.7, 0.9),
        },
    ]
}

pub fn font_path(config: &LessonConfig) -> PathBuf {
    match &config.font_path {
        Some(path) => config.resolve(path),
        None => config.resolve(DEFAULT_FONT),
    }
}

pub struct TextRenderingLesson {
    renderer: TextRenderer,
    lines: Vec<TextLine>,
    clear_color: [f32; 4],
}

impl TextRenderingLesson {
    pub async fn new(ctx: &GpuContext<'_>) -> Result<Self> {
        let path = font_path(ctx.config);
        let bytes = std::fs::read(&path).map_err(|e| LessonError::io(&path, e))?;
        let cache = GlyphCache::from_font_bytes(&bytes, ctx.config.font_pixel_size)?;
        log::info!("Loaded {} glyphs from {}", cache.len(), path.display());

        let shader = Shader::load(ctx.device, ctx.config, shader::TEXT).await?;
        let renderer = TextRenderer::new(
            ctx.device,
            ctx.queue,
            &shader,
            ctx.surface_format,
            cache,
            ctx.width,
            ctx.height,
        );

        Ok(Self {
            renderer,
            lines: default_lines(),
            clear_color: ctx.config.clear_color,
        })
    }
}

impl Lesson for TextRenderingLesson {
    fn name(&self) -> &'static str {
        "text-rendering"
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> InputResponse {
        if exit_requested(event) {
            InputResponse::Exit
        } else {
            InputResponse::Ignored
        }
    }

    fn update(&mut self, ctx: &GpuContext, _dt: f32, _elapsed: f32) {
        self.renderer.clear();
        for line in &self.lines {
            self.renderer.render_text(&line.text, line.x, line.y, line.scale, line.color);
        }
        self.renderer.prepare(ctx.device, ctx.queue);
    }

    fn resize(&mut self, ctx: &GpuContext) {
        self.renderer.set_viewport(ctx.width, ctx.height);
    }

    fn render(&mut self, _ctx: &GpuContext, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Text Pass"),
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
        self.renderer.draw(&mut pass);
    }

    fn clear_color_mut(&mut self) -> &mut [f32; 4] {
        &mut self.clear_color
    }

    fn ui(&mut self, ui: &mut egui::Ui) {
        let cache = self.renderer.cache();
        ui.label(format!("Glyphs: {} at {}px", cache.len(), cache.pixel_size()));
        if let Some(first) = self.lines.first_mut() {
            ui.text_edit_singleline(&mut first.text);
            ui.add(egui::Slider::new(&mut first.scale, 0.25..=2.0).text("Scale"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_font_resolves_under_asset_dir() {
        let config = LessonConfig {
            asset_dir: PathBuf::from("/data/lessons"),
            ..LessonConfig::default()
        };
        assert_eq!(font_path(&config), PathBuf::from("/data/lessons/Fonts/arial.ttf"));
    }

    #[test]
    fn configured_font_wins() {
        let config = LessonConfig {
            font_path: Some(PathBuf::from("fonts/mono.ttf")),
            ..LessonConfig::default()
        };
        assert_eq!(font_path(&config), PathBuf::from("./fonts/mono.ttf"));
    }

    #[test]
    fn lines_fit_an_800_by_600_window() {
        let lines = default_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.x < 800.0 && l.y < 600.0));
        assert_eq!(lines[1].scale, 0.5);
    }
}
