// src/lessons/mod.rs

//! The runnable lessons. Each one owns its GPU resources; dropping it
//! releases them.

pub mod frame_buffers;
pub mod lit_scene;
pub mod load_model;
pub mod shader_class;
pub mod shader_glsl;
pub mod text_rendering;

use std::fmt;
use std::str::FromStr;

use winit::event::WindowEvent;

use crate::config::LessonConfig;
use crate::engine_lib::controller::InputResponse;
use crate::error::{LessonError, Result};

/// Borrowed view of the device and surface a lesson draws with.
pub struct GpuContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub config: &'a LessonConfig,
}

impl GpuContext<'_> {
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

pub trait Lesson {
    fn name(&self) -> &'static str;

    fn handle_window_event(&mut self, event: &WindowEvent) -> InputResponse;

    /// `dt` is the last frame's duration and `elapsed` the time since start, both in seconds.
    fn update(&mut self, ctx: &GpuContext, dt: f32, elapsed: f32);

    fn resize(&mut self, ctx: &GpuContext);

    /// Encodes this frame's passes into `view`. The first pass must clear it.
    fn render(&mut self, ctx: &GpuContext, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView);

    fn clear_color_mut(&mut self) -> &mut [f32; 4];

    /// Whether W/A/S/D, the mouse and the wheel drive a camera.
    fn uses_camera(&self) -> bool {
        false
    }

    /// Extra controls shown under the frame statistics.
    fn ui(&mut self, _ui: &mut egui::Ui) {}
}

pub fn to_wgpu_color(color: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: color[0] as f64,
        g: color[1] as f64,
        b: color[2] as f64,
        a: color[3] as f64,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonKind {
    ShaderGlsl,
    ShaderClass,
    LoadModel,
    FrameBuffers,
    TextRendering,
}

impl LessonKind {
    pub const ALL: [LessonKind; 5] = [
        LessonKind::ShaderGlsl,
        LessonKind::ShaderClass,
        LessonKind::LoadModel,
        LessonKind::FrameBuffers,
        LessonKind::TextRendering,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LessonKind::ShaderGlsl => "shader-glsl",
            LessonKind::ShaderClass => "shader-class",
            LessonKind::LoadModel => "load-model",
            LessonKind::FrameBuffers => "frame-buffers",
            LessonKind::TextRendering => "text-rendering",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LessonKind::ShaderGlsl => "two shader programs drawing points and triangles, one with an animated uniform colour",
            LessonKind::ShaderClass => "shader helper with per-vertex colours drawn as a line loop",
            LessonKind::LoadModel => "OBJ model lit by directional, point and spot lights",
            LessonKind::FrameBuffers => "scene rendered to a texture, then drawn on a fullscreen quad",
            LessonKind::TextRendering => "text drawn from a rasterised glyph cache",
        }
    }

    pub async fn create(self, ctx: &GpuContext<'_>) -> Result<Box<dyn Lesson>> {
        log::info!("Starting lesson {}", self.name());
        Ok(match self {
            LessonKind::ShaderGlsl => Box::new(shader_glsl::ShaderGlslLesson::new(ctx).await?),
            LessonKind::ShaderClass => Box::new(shader_class::ShaderClassLesson::new(ctx).await?),
            LessonKind::LoadModel => Box::new(load_model::LoadModelLesson::new(ctx).await?),
            LessonKind::FrameBuffers => Box::new(frame_buffers::FrameBuffersLesson::new(ctx).await?),
            LessonKind::TextRendering => Box::new(text_rendering::TextRenderingLesson::new(ctx).await?),
        })
    }

    fn valid_names() -> String {
        Self::ALL.iter().map(|kind| kind.name()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for LessonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LessonKind {
    type Err = LessonError;

    /// Accepts the lesson name, with `_` in place of `-` if preferred.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| LessonError::UnknownLesson {
                name: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in LessonKind::ALL {
            assert_eq!(kind.name().parse::<LessonKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn underscores_and_case_are_accepted() {
        assert_eq!("Frame_Buffers".parse::<LessonKind>().unwrap(), LessonKind::FrameBuffers);
    }

    #[test]
    fn unknown_lesson_lists_valid_names() {
        let err = "hello-triangle".parse::<LessonKind>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("hello-triangle"));
        for kind in LessonKind::ALL {
            assert!(message.contains(kind.name()));
        }
    }
}
