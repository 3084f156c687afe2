// src/config.rs

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Window and asset settings shared by every lesson.
///
/// All fields are optional in the TOML file; anything missing falls back to
/// the values in `Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Root that lesson-relative paths such as `./shader/vertex.wgsl` resolve against.
    pub asset_dir: PathBuf,
    pub clear_color: [f32; 4],
    pub vsync: bool,
    pub resizable: bool,
    pub font_path: Option<PathBuf>,
    pub font_pixel_size: u32,
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "LearnOpenGL".to_string(),
            asset_dir: PathBuf::from("."),
            clear_color: [0.2, 0.3, 0.3, 1.0],
            vsync: true,
            resizable: true,
            font_path: None,
            font_pixel_size: 48,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl LessonConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        let relative = relative.as_ref();
        let relative = relative.strip_prefix("./").unwrap_or(relative);
        self.asset_dir.join(relative)
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = LessonConfig::from_toml_str("width = 1600\nheight = 1200\n").unwrap();
        assert_eq!(config.width, 1600);
        assert_eq!(config.height, 1200);
        assert_eq!(config.title, "LearnOpenGL");
        assert_eq!(config.font_pixel_size, 48);
        assert!(config.vsync);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(LessonConfig::from_toml_str("").unwrap(), LessonConfig::default());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = LessonConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("render_lessons_no_such_config.toml");
        let err = LessonConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join("render_lessons_config_test.toml");
        std::fs::write(&path, "title = \"Frame buffers\"\nclear_color = [0.1, 0.1, 0.1, 1.0]\n").unwrap();
        let config = LessonConfig::load_from_file(&path).unwrap();
        assert_eq!(config.title, "Frame buffers");
        assert_eq!(config.clear_color, [0.1, 0.1, 0.1, 1.0]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn resolve_strips_leading_dot_slash() {
        let config = LessonConfig { asset_dir: PathBuf::from("/lessons/27"), ..Default::default() };
        assert_eq!(config.resolve("./shader/vertex.wgsl"), PathBuf::from("/lessons/27/shader/vertex.wgsl"));
        assert_eq!(config.resolve("static/texture/wood.png"), PathBuf::from("/lessons/27/static/texture/wood.png"));
    }

    #[test]
    fn aspect_handles_zero_height() {
        let config = LessonConfig { height: 0, ..Default::default() };
        assert_eq!(config.aspect(), 1.0);
        assert!((LessonConfig::default().aspect() - 800.0 / 600.0).abs() < 1e-6);
    }
}
