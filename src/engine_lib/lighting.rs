// src/engine_lib/lighting.rs

//! Light and material blocks laid out to match the WGSL structs in
//! `lit_scene.wgsl`. Every `vec3` is followed by a scalar or padding so each
//! row fills 16 bytes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

pub const POINT_LIGHT_COUNT: usize = 4;

pub const ATTENUATION_CONSTANT: f32 = 1.0;
pub const ATTENUATION_LINEAR: f32 = 0.09;
pub const ATTENUATION_QUADRATIC: f32 = 0.032;

/// 1 / (constant + linear * d + quadratic * d^2)
pub fn attenuation(distance: f32) -> f32 {
    1.0 / (ATTENUATION_CONSTANT + ATTENUATION_LINEAR * distance + ATTENUATION_QUADRATIC * distance * distance)
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct MaterialUniform {
    pub ambient: [f32; 3],
    pub shininess: f32,
}

impl Default for MaterialUniform {
    fn default() -> Self {
        Self { ambient: [1.0, 0.5, 0.31], shininess: 32.0 }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct DirectionLight {
    pub direction: [f32; 3],
    _pad0: f32,
    pub ambient: [f32; 3],
    _pad1: f32,
    pub diffuse: [f32; 3],
    _pad2: f32,
    pub specular: [f32; 3],
    _pad3: f32,
}

impl DirectionLight {
    pub fn new(direction: Vec3, ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        Self {
            direction: direction.to_array(),
            ambient: ambient.to_array(),
            diffuse: diffuse.to_array(),
            specular: specular.to_array(),
            ..Zeroable::zeroed()
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct PointLight {
    pub position: [f32; 3],
    pub constant: f32,
    pub ambient: [f32; 3],
    pub linear: f32,
    pub diffuse: [f32; 3],
    pub quadratic: f32,
    pub specular: [f32; 3],
    _pad: f32,
}

impl PointLight {
    /// Point light with the standard attenuation, dim ambient and white specular.
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            constant: ATTENUATION_CONSTANT,
            ambient: [0.01, 0.01, 0.01],
            linear: ATTENUATION_LINEAR,
            diffuse: color.to_array(),
            quadratic: ATTENUATION_QUADRATIC,
            specular: [1.0, 1.0, 1.0],
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct SpotLight {
    pub position: [f32; 3],
    pub constant: f32,
    pub direction: [f32; 3],
    pub linear: f32,
    pub ambient: [f32; 3],
    pub quadratic: f32,
    pub diffuse: [f32; 3],
    /// Cosine of the inner cone angle.
    pub cut_off: f32,
    pub specular: [f32; 3],
    pub outer_cut_off: f32,
}

impl SpotLight {
    /// 12.5 degree inner cone fading out to 15 degrees.
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position: position.to_array(),
            constant: ATTENUATION_CONSTANT,
            direction: direction.to_array(),
            linear: ATTENUATION_LINEAR,
            ambient: [0.0, 0.0, 0.0],
            quadratic: ATTENUATION_QUADRATIC,
            diffuse: [1.0, 1.0, 1.0],
            cut_off: 12.5f32.to_radians().cos(),
            specular: [1.0, 1.0, 1.0],
            outer_cut_off: 15.0f32.to_radians().cos(),
        }
    }

    pub fn disabled() -> Self {
        Self { diffuse: [0.0; 3], specular: [0.0; 3], ..Self::new(Vec3::ZERO, Vec3::NEG_Z) }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct LightsUniform {
    pub material: MaterialUniform,
    pub direction_light: DirectionLight,
    pub point_lights: [PointLight; POINT_LIGHT_COUNT],
    pub spot_light: SpotLight,
}

impl LightsUniform {
    pub fn set_point_lights(&mut self, positions: &[Vec3; POINT_LIGHT_COUNT], colors: &[Vec3; POINT_LIGHT_COUNT]) {
        for (light, (position, color)) in self.point_lights.iter_mut().zip(positions.iter().zip(colors)) {
            *light = PointLight::new(*position, *color);
        }
    }
}

/// Per-draw transform for the lit shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for transforming normals.
    pub normal_matrix: [[f32; 4]; 4],
    pub uv_scale: f32,
    _pad: [f32; 3],
}

impl ModelUniform {
    pub fn new(model: Mat4, uv_scale: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            uv_scale,
            _pad: [0.0; 3],
        }
    }
}

/// Per-draw block for the unlit light marker spheres.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LightMarkerUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 3],
    _pad: f32,
}

impl LightMarkerUniform {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            model: Mat4::from_translation(position).to_cols_array_2d(),
            color: color.to_array(),
            _pad: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn blocks_are_sixteen_byte_rows() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 16);
        assert_eq!(std::mem::size_of::<DirectionLight>(), 64);
        assert_eq!(std::mem::size_of::<PointLight>(), 64);
        assert_eq!(std::mem::size_of::<SpotLight>(), 80);
        assert_eq!(std::mem::size_of::<LightsUniform>(), 16 + 64 + 4 * 64 + 80);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 144);
        assert_eq!(std::mem::size_of::<LightMarkerUniform>(), 80);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let uniform = ModelUniform::new(Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)), 4.0);
        let normal = Mat4::from_cols_array_2d(&uniform.normal_matrix).transform_vector3(Vec3::X);
        assert_relative_eq!(normal.x, 0.5);
        assert_eq!(uniform.uv_scale, 4.0);
    }

    #[test]
    fn marker_translates_to_light() {
        let marker = LightMarkerUniform::new(Vec3::new(0.7, 0.2, 1.5), Vec3::Z);
        let at = Mat4::from_cols_array_2d(&marker.model).transform_point3(Vec3::ZERO);
        assert_eq!(at, Vec3::new(0.7, 0.2, 1.5));
        assert_eq!(marker.color, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn attenuation_falls_off_with_distance() {
        assert_relative_eq!(attenuation(0.0), 1.0);
        assert_relative_eq!(attenuation(10.0), 1.0 / (1.0 + 0.9 + 3.2), epsilon = 1e-6);
        assert!(attenuation(50.0) < attenuation(7.0));
    }

    #[test]
    fn spot_cone_cosines() {
        let spot = SpotLight::new(Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z);
        assert!(spot.cut_off > spot.outer_cut_off);
        assert_relative_eq!(spot.cut_off, 0.976_296, epsilon = 1e-5);
        assert_relative_eq!(spot.outer_cut_off, 0.965_926, epsilon = 1e-5);
    }

    #[test]
    fn disabled_spot_emits_nothing() {
        let spot = SpotLight::disabled();
        assert_eq!(spot.diffuse, [0.0; 3]);
        assert_eq!(spot.specular, [0.0; 3]);
    }

    #[test]
    fn point_lights_take_positions_and_colors() {
        let mut lights = LightsUniform::zeroed();
        let positions = [Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE];
        let colors = [Vec3::ONE, Vec3::X, Vec3::Z, Vec3::Y];
        lights.set_point_lights(&positions, &colors);
        assert_eq!(lights.point_lights[3].position, [1.0, 1.0, 1.0]);
        assert_eq!(lights.point_lights[1].diffuse, [1.0, 0.0, 0.0]);
        assert_eq!(lights.point_lights[2].linear, ATTENUATION_LINEAR);
    }
}
