// src/engine_lib/geometry.rs

//! Indexed primitive generators: plane, box and UV sphere.
//!
//! Triangles wind counter-clockwise seen from the side the normal points to.

use std::f32::consts::PI;

use glam::Vec3;

use crate::rendering_lib::mesh::GpuMesh;
use crate::rendering_lib::vertex::MeshVertex;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Plane in XY centred on the origin, facing +Z.
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let mut geometry = Self::default();
        geometry.build_plane([0, 1, 2], 1.0, -1.0, width, height, 0.0, width_segments.max(1), height_segments.max(1));
        geometry
    }

    /// Axis-aligned box centred on the origin with outward normals.
    pub fn cuboid(width: f32, height: f32, depth: f32, segments: u32) -> Self {
        let s = segments.max(1);
        let mut geometry = Self::default();
        geometry.build_plane([2, 1, 0], -1.0, -1.0, depth, height, width, s, s); // +x
        geometry.build_plane([2, 1, 0], 1.0, -1.0, depth, height, -width, s, s); // -x
        geometry.build_plane([0, 2, 1], 1.0, 1.0, width, depth, height, s, s); // +y
        geometry.build_plane([0, 2, 1], 1.0, -1.0, width, depth, -height, s, s); // -y
        geometry.build_plane([0, 1, 2], 1.0, -1.0, width, height, depth, s, s); // +z
        geometry.build_plane([0, 1, 2], -1.0, -1.0, width, height, -depth, s, s); // -z
        geometry
    }

    /// Latitude/longitude sphere. At least 3 segments around and 2 from pole to pole.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);
        let mut geometry = Self::default();
        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(hs as usize + 1);

        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            let u_offset = if iy == 0 {
                0.5 / ws as f32
            } else if iy == hs {
                -0.5 / ws as f32
            } else {
                0.0
            };

            let mut row = Vec::with_capacity(ws as usize + 1);
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let phi = u * 2.0 * PI;
                let theta = v * PI;
                let position = Vec3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                );
                let normal = position.normalize_or_zero();
                row.push(geometry.vertices.len() as u32);
                geometry.vertices.push(MeshVertex::new(position.to_array(), normal.to_array(), [u + u_offset, 1.0 - v]));
            }
            grid.push(row);
        }

        for iy in 0..hs as usize {
            for ix in 0..ws as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                if iy != 0 {
                    geometry.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != hs as usize - 1 {
                    geometry.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        geometry
    }

    /// `axes` names which vertex components the plane's u, v and w (normal)
    /// directions write to. `depth` places the plane at `w = depth / 2`, and
    /// its sign picks the normal direction.
    #[allow(clippy::too_many_arguments)]
    fn build_plane(
        &mut self,
        axes: [usize; 3],
        u_dir: f32,
        v_dir: f32,
        width: f32,
        height: f32,
        depth: f32,
        grid_x: u32,
        grid_y: u32,
    ) {
        let [u, v, w] = axes;
        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;
        let vertex_offset = self.vertices.len() as u32;
        let normal_sign = if depth < 0.0 { -1.0 } else { 1.0 };

        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - height / 2.0;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - width / 2.0;

                let mut position = [0.0; 3];
                position[u] = x * u_dir;
                position[v] = y * v_dir;
                position[w] = depth / 2.0;

                let mut normal = [0.0; 3];
                normal[w] = normal_sign;

                let uv = [ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32];
                self.vertices.push(MeshVertex::new(position, normal, uv));
            }
        }

        let row = grid_x + 1;
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = vertex_offset + ix + row * iy;
                let b = vertex_offset + ix + row * (iy + 1);
                let c = vertex_offset + (ix + 1) + row * (iy + 1);
                let d = vertex_offset + (ix + 1) + row * iy;
                self.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
    }

    pub fn upload(&self, device: &wgpu::Device, label: &str) -> GpuMesh {
        GpuMesh::new(device, label, &self.vertices, &self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle_normal(g: &Geometry, tri: &[u32]) -> Vec3 {
        let p = |i: u32| Vec3::from_array(g.vertices[i as usize].position);
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
    }

    #[test]
    fn unit_plane_is_a_quad() {
        let plane = Geometry::plane(1.0, 1.0, 1, 1);
        assert_eq!(plane.vertices.len(), 4);
        assert_eq!(plane.indices, vec![0, 2, 1, 2, 3, 1]);
        assert_eq!(plane.vertices[0].position, [-0.5, 0.5, 0.0]);
        assert_eq!(plane.vertices[0].uv, [0.0, 1.0]);
        assert_eq!(plane.vertices[3].position, [0.5, -0.5, 0.0]);
        assert_eq!(plane.vertices[3].uv, [1.0, 0.0]);
    }

    #[test]
    fn plane_segments_scale_counts() {
        let plane = Geometry::plane(10.0, 10.0, 4, 3);
        assert_eq!(plane.vertices.len(), 5 * 4);
        assert_eq!(plane.indices.len(), 6 * 4 * 3);
    }

    #[test]
    fn zero_segments_are_clamped() {
        assert_eq!(Geometry::plane(2.0, 2.0, 0, 0), Geometry::plane(2.0, 2.0, 1, 1));
    }

    #[test]
    fn plane_winds_towards_its_normal() {
        let plane = Geometry::plane(2.0, 2.0, 1, 1);
        for tri in plane.indices.chunks(3) {
            assert!(triangle_normal(&plane, tri).z > 0.0);
        }
    }

    #[test]
    fn box_has_six_faces_with_outward_winding() {
        let cube = Geometry::cuboid(1.0, 2.0, 3.0, 1);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        for tri in cube.indices.chunks(3) {
            let face_normal = triangle_normal(&cube, tri).normalize();
            let vertex_normal = Vec3::from_array(cube.vertices[tri[0] as usize].normal);
            assert_relative_eq!(face_normal.dot(vertex_normal), 1.0, epsilon = 1e-5);
            let center = Vec3::from_array(cube.vertices[tri[0] as usize].position);
            assert!(center.dot(vertex_normal) > 0.0, "normal points inward");
        }
    }

    #[test]
    fn box_extents_match_dimensions() {
        let cube = Geometry::cuboid(1.0, 2.0, 3.0, 2);
        let max = cube.vertices.iter().fold(Vec3::splat(f32::MIN), |m, v| m.max(Vec3::from_array(v.position)));
        assert_eq!(max, Vec3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn sphere_counts_drop_pole_triangles() {
        let sphere = Geometry::sphere(0.1, 10, 10);
        assert_eq!(sphere.vertices.len(), 11 * 11);
        assert_eq!(sphere.indices.len(), 6 * 10 * 9);
    }

    #[test]
    fn sphere_vertices_sit_on_radius_with_unit_normals() {
        let sphere = Geometry::sphere(2.0, 8, 6);
        for v in &sphere.vertices {
            let p = Vec3::from_array(v.position);
            assert_relative_eq!(p.length(), 2.0, epsilon = 1e-4);
            assert_relative_eq!(Vec3::from_array(v.normal).length(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn sphere_triangles_face_outward() {
        let sphere = Geometry::sphere(1.0, 12, 8);
        for tri in sphere.indices.chunks(3) {
            let n = triangle_normal(&sphere, tri);
            let centroid = tri.iter().map(|&i| Vec3::from_array(sphere.vertices[i as usize].position)).sum::<Vec3>() / 3.0;
            assert!(n.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn sphere_minimum_segments() {
        let sphere = Geometry::sphere(1.0, 1, 1);
        assert_eq!(sphere.vertices.len(), 4 * 3);
    }
}
