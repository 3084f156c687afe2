// src/lib.rs

pub mod app;
pub mod config;
pub mod engine_lib;
pub mod error;
pub mod frame_timer;
pub mod lessons;
pub mod rendering_lib;
pub mod ui;

pub use config::LessonConfig;
pub use error::{LessonError, Result};
pub use lessons::LessonKind;
