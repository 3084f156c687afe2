// src/engine_lib/mod.rs
pub mod camera;
pub mod controller;
pub mod geometry;
pub mod lighting;
pub mod model;
pub mod transparency;

pub use camera::{Camera, CameraMovement, CameraUniform};
pub use controller::{CameraController, InputResponse};
pub use geometry::Geometry;
pub use model::Model;
pub use transparency::sort_back_to_front;
