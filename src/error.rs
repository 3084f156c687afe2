// src/error.rs

use std::path::PathBuf;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, LessonError>;

#[derive(Debug, thiserror::Error)]
pub enum LessonError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Texture failed to load at path {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to load model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Failed to load font: {0}")]
    Font(String),

    #[error("Shader {path} failed to compile:\n{message}")]
    ShaderCompile { path: String, message: String },

    #[error("Framebuffer is not complete: {0}")]
    FramebufferIncomplete(String),

    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Unknown lesson '{name}', expected one of: {valid}")]
    UnknownLesson { name: String, valid: String },
}

impl LessonError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
