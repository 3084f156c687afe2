// src/engine_lib/camera.rs

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

pub const YAW: f32 = -90.0;
pub const PITCH: f32 = 0.0;
pub const SPEED: f32 = 2.5;
pub const SENSITIVITY: f32 = 0.1;
pub const ZOOM: f32 = 45.0;

const PITCH_LIMIT: f32 = 89.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// View block shared by the lit and light-marker shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    _pad: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Fly camera driven by Euler angles. Angles are stored in degrees.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self::with_orientation(position, Vec3::Y, YAW, PITCH)
    }

    pub fn with_orientation(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            zoom: ZOOM,
        };
        camera.update_camera_vectors();
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection using the current zoom as vertical field of view.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, NEAR, FAR)
    }

    pub fn uniform(&self, aspect: f32) -> CameraUniform {
        CameraUniform {
            view: self.view_matrix().to_cols_array_2d(),
            projection: self.projection_matrix(aspect).to_cols_array_2d(),
            view_pos: self.position.to_array(),
            _pad: 0.0,
        }
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    pub fn process_mouse_movement(&mut self, xoffset: f32, yoffset: f32, constrain_pitch: bool) {
        self.yaw += xoffset * self.mouse_sensitivity;
        self.pitch += yoffset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_camera_vectors();
    }

    pub fn process_mouse_scroll(&mut self, yoffset: f32) {
        self.zoom = (self.zoom - yoffset).clamp(1.0, ZOOM);
    }

    fn update_camera_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-5);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-5);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        assert_vec3_eq(camera.front, Vec3::NEG_Z);
        assert_vec3_eq(camera.right, Vec3::X);
        assert_vec3_eq(camera.up, Vec3::Y);
    }

    #[test]
    fn keyboard_moves_along_basis() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_keyboard(CameraMovement::Forward, 1.0);
        assert_vec3_eq(camera.position, Vec3::new(0.0, 0.0, -SPEED));
        camera.process_keyboard(CameraMovement::Right, 2.0);
        assert_vec3_eq(camera.position, Vec3::new(2.0 * SPEED, 0.0, -SPEED));
        camera.process_keyboard(CameraMovement::Backward, 1.0);
        camera.process_keyboard(CameraMovement::Left, 2.0);
        assert_vec3_eq(camera.position, Vec3::ZERO);
    }

    #[test]
    fn pitch_is_clamped_when_constrained() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(camera.pitch, 89.0);
        camera.process_mouse_movement(0.0, -20_000.0, true);
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn unconstrained_pitch_is_left_alone() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_movement(0.0, 1000.0, false);
        assert_relative_eq!(camera.pitch, 100.0);
    }

    #[test]
    fn yaw_turns_right() {
        let mut camera = Camera::new(Vec3::ZERO);
        // 900 px * 0.1 = 90 degrees: from -Z to +X.
        camera.process_mouse_movement(900.0, 0.0, true);
        assert_vec3_eq(camera.front, Vec3::X);
    }

    #[test]
    fn scroll_zoom_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom, 1.0);
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.zoom, 45.0);
    }

    #[test]
    fn uniform_carries_view_position() {
        let camera = Camera::new(Vec3::new(0.0, 1.0, 6.0));
        let uniform = camera.uniform(800.0 / 600.0);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
        assert_eq!(uniform.view_pos, [0.0, 1.0, 6.0]);
        assert_eq!(uniform.view, camera.view_matrix().to_cols_array_2d());
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        let origin_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert_vec3_eq(origin_in_view, Vec3::new(0.0, 0.0, -5.0));
    }
}
