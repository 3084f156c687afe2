// src/engine_lib/model.rs

//! OBJ models: one GPU mesh per OBJ object, each with a diffuse and specular
//! texture taken from its material.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::error::{LessonError, Result};
use crate::rendering_lib::mesh::GpuMesh;
use crate::rendering_lib::texture::Texture;
use crate::rendering_lib::vertex::MeshVertex;

/// CPU-side mesh converted from a `tobj::Mesh`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub material_id: Option<usize>,
}

impl MeshData {
    /// Expects a single-index, triangulated mesh. Missing normals are
    /// rebuilt from the faces, missing texture coordinates become (0, 0).
    pub fn from_tobj(name: &str, mesh: &tobj::Mesh) -> Self {
        let vertex_count = mesh.positions.len() / 3;
        let has_normals = mesh.normals.len() == mesh.positions.len();
        let has_uvs = mesh.texcoords.len() / 2 == vertex_count;

        let generated;
        let normals: &[f32] = if has_normals {
            &mesh.normals
        } else {
            generated = face_normals(&mesh.positions, &mesh.indices);
            &generated
        };

        let vertices = (0..vertex_count)
            .map(|i| {
                let uv = if has_uvs { [mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]] } else { [0.0, 0.0] };
                MeshVertex::new(
                    [mesh.positions[i * 3], mesh.positions[i * 3 + 1], mesh.positions[i * 3 + 2]],
                    [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                    uv,
                )
            })
            .collect();

        Self {
            name: name.to_string(),
            vertices,
            indices: mesh.indices.clone(),
            material_id: mesh.material_id,
        }
    }
}

/// Per-vertex normals averaged from the normals of the faces sharing it.
pub fn face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let point = |i: u32| {
        let i = i as usize * 3;
        Vec3::new(positions[i], positions[i + 1], positions[i + 2])
    };

    let mut accumulated = vec![Vec3::ZERO; positions.len() / 3];
    for tri in indices.chunks_exact(3) {
        let normal = (point(tri[1]) - point(tri[0])).cross(point(tri[2]) - point(tri[0]));
        for &i in tri {
            accumulated[i as usize] += normal;
        }
    }
    accumulated.into_iter().flat_map(|n| n.normalize_or_zero().to_array()).collect()
}

/// Texture names in MTL files are relative to the OBJ and sometimes use
/// Windows separators.
pub fn texture_path(model_dir: &Path, name: &str) -> PathBuf {
    model_dir.join(name.replace('\\', "/"))
}

pub fn material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    };
    let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[texture_entry(0), sampler_entry(1), texture_entry(2), sampler_entry(3)],
        label: Some("material_bind_group_layout"),
    })
}

/// Diffuse map at bindings 0/1, specular map at 2/3.
pub fn material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    diffuse: &Texture,
    specular: &Texture,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&diffuse.view) },
            wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&diffuse.sampler) },
            wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::TextureView(&specular.view) },
            wgpu::BindGroupEntry { binding: 3, resource: wgpu::BindingResource::Sampler(&specular.sampler) },
        ],
        label: Some(label),
    })
}

pub struct Mesh {
    pub name: String,
    gpu: GpuMesh,
    material: wgpu::BindGroup,
}

pub struct Model {
    pub meshes: Vec<Mesh>,
    /// Every texture file loaded for this model, by resolved path.
    textures_loaded: HashMap<PathBuf, usize>,
    textures: Vec<Texture>,
}

impl Model {
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
        material_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self> {
        let path = path.as_ref();
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| LessonError::Model { path: path.to_path_buf(), source })?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("Failed to load materials for {}: {}", path.display(), e);
            Vec::new()
        });

        let model_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut model = Self {
            meshes: Vec::with_capacity(models.len()),
            textures_loaded: HashMap::new(),
            textures: vec![Texture::solid(device, queue, [255, 255, 255, 255])],
        };

        for obj in &models {
            let data = MeshData::from_tobj(&obj.name, &obj.mesh);
            let material = data.material_id.and_then(|id| materials.get(id));
            let diffuse = model.texture_slot(
                device,
                queue,
                material.and_then(|m| m.diffuse_texture.as_deref()).map(|name| texture_path(model_dir, name)),
            );
            let specular = model.texture_slot(
                device,
                queue,
                material.and_then(|m| m.specular_texture.as_deref()).map(|name| texture_path(model_dir, name)),
            );

            let bind_group = material_bind_group(
                device,
                material_layout,
                &model.textures[diffuse],
                &model.textures[specular],
                &data.name,
            );
            model.meshes.push(Mesh {
                gpu: GpuMesh::new(device, &data.name, &data.vertices, &data.indices),
                name: data.name,
                material: bind_group,
            });
        }

        log::info!(
            "Loaded model {} ({} meshes, {} textures)",
            path.display(),
            model.meshes.len(),
            model.textures_loaded.len()
        );
        Ok(model)
    }

    /// Slot 0 is the white fallback used for absent or unreadable maps.
    fn texture_slot(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, path: Option<PathBuf>) -> usize {
        let Some(path) = path else { return 0 };
        if let Some(&slot) = self.textures_loaded.get(&path) {
            return slot;
        }
        let slot = match Texture::from_path(device, queue, &path) {
            Ok(texture) => {
                self.textures.push(texture);
                self.textures.len() - 1
            }
            Err(e) => {
                log::warn!("{}", e);
                0
            }
        };
        self.textures_loaded.insert(path, slot);
        slot
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, material_group: u32) {
        for mesh in &self.meshes {
            pass.set_bind_group(material_group, &mesh.material, &[]);
            mesh.gpu.draw(pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle_mesh() -> tobj::Mesh {
        tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            indices: vec![0, 1, 2],
            ..Default::default()
        }
    }

    #[test]
    fn missing_normals_follow_winding() {
        let data = MeshData::from_tobj("tri", &triangle_mesh());
        assert_eq!(data.vertices.len(), 3);
        for v in &data.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
            assert_eq!(v.uv, [0.0, 0.0]);
        }
    }

    #[test]
    fn provided_attributes_are_kept() {
        let mut mesh = triangle_mesh();
        mesh.normals = vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        mesh.texcoords = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        mesh.material_id = Some(2);
        let data = MeshData::from_tobj("tri", &mesh);
        assert_eq!(data.vertices[1].normal, [0.0, 1.0, 0.0]);
        assert_eq!(data.vertices[2].uv, [0.0, 1.0]);
        assert_eq!(data.material_id, Some(2));
        assert_eq!(data.indices, vec![0, 1, 2]);
    }

    #[test]
    fn shared_vertices_average_face_normals() {
        // Two faces folded along the x axis: one facing +z, one facing +y.
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0];
        let normals = face_normals(&positions, &[0, 1, 2, 0, 1, 3]);
        let shared = Vec3::new(normals[0], normals[1], normals[2]);
        assert_relative_eq!(shared.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(shared.y, shared.z, epsilon = 1e-6);
        assert_eq!(&normals[6..9], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn obj_text_converts_to_meshes() {
        let obj = "o quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 2/2 3/3 4/4\n";
        let (models, _) = tobj::load_obj_buf(
            &mut std::io::Cursor::new(obj),
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
            |_| Ok((Vec::new(), Default::default())),
        )
        .expect("valid obj");
        let data = MeshData::from_tobj(&models[0].name, &models[0].mesh);
        assert_eq!(data.name, "quad");
        assert_eq!(data.vertices.len(), 4);
        assert_eq!(data.indices.len(), 6);
        assert_eq!(data.vertices[2].uv, [1.0, 1.0]);
        assert!(data.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn texture_paths_resolve_against_model_dir() {
        let dir = Path::new("static/model/nanosuit");
        assert_eq!(texture_path(dir, "arm_dif.png"), PathBuf::from("static/model/nanosuit/arm_dif.png"));
        assert_eq!(texture_path(dir, "maps\\arm_dif.png"), PathBuf::from("static/model/nanosuit/maps/arm_dif.png"));
    }
}
