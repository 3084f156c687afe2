// src/rendering_lib/pipeline.rs

use super::shader::Shader;
use super::texture::Texture;

/// Collects the fixed-function state a lesson would otherwise toggle with
/// `glEnable`/`glDisable` and bakes it into a render pipeline.
pub struct PipelineBuilder<'a> {
    label: &'a str,
    shader: &'a Shader,
    vertex_layouts: Vec<wgpu::VertexBufferLayout<'a>>,
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    depth_test: bool,
    blend: Option<wgpu::BlendState>,
    target_format: wgpu::TextureFormat,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(label: &'a str, shader: &'a Shader, target_format: wgpu::TextureFormat) -> Self {
        Self {
            label,
            shader,
            vertex_layouts: Vec::new(),
            bind_group_layouts: Vec::new(),
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            depth_test: false,
            blend: None,
            target_format,
        }
    }

    pub fn vertex_layout(mut self, layout: wgpu::VertexBufferLayout<'a>) -> Self {
        self.vertex_layouts.push(layout);
        self
    }

    pub fn bind_group_layout(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    pub fn topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn cull_back_faces(mut self) -> Self {
        self.cull_mode = Some(wgpu::Face::Back);
        self
    }

    /// Depth test with `Less` against a `Depth24PlusStencil8` attachment.
    pub fn depth_test(mut self) -> Self {
        self.depth_test = true;
        self
    }

    /// `SRC_ALPHA, ONE_MINUS_SRC_ALPHA`.
    pub fn alpha_blending(mut self) -> Self {
        self.blend = Some(wgpu::BlendState::ALPHA_BLENDING);
        self
    }

    pub fn build(self, device: &wgpu::Device) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(self.label),
            bind_group_layouts: &self.bind_group_layouts,
            push_constant_ranges: &[],
        });

        let depth_stencil = self.depth_test.then(|| wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &self.shader.module,
                entry_point: Shader::VERTEX_ENTRY,
                buffers: &self.vertex_layouts,
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader.module,
                entry_point: Shader::FRAGMENT_ENTRY,
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.target_format,
                    blend: self.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: self.topology,
                strip_index_format: strip_index_format(self.topology),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: self.cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        })
    }
}

fn strip_index_format(topology: wgpu::PrimitiveTopology) -> Option<wgpu::IndexFormat> {
    if topology.is_strip() {
        Some(wgpu::IndexFormat::Uint16)
    } else {
        None
    }
}

/// Index list that draws a closed outline with a line strip, the way
/// `GL_LINE_LOOP` joins the last vertex back to the first.
pub fn line_loop_indices(vertex_count: u16) -> Vec<u16> {
    if vertex_count == 0 {
        return Vec::new();
    }
    let mut indices: Vec<u16> = (0..vertex_count).collect();
    indices.push(0);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_loop_closes_back_to_first_vertex() {
        assert_eq!(line_loop_indices(3), vec![0, 1, 2, 0]);
        assert_eq!(line_loop_indices(1), vec![0, 0]);
        assert!(line_loop_indices(0).is_empty());
    }

    #[test]
    fn only_strips_get_an_index_format() {
        assert_eq!(strip_index_format(wgpu::PrimitiveTopology::LineStrip), Some(wgpu::IndexFormat::Uint16));
        assert_eq!(strip_index_format(wgpu::PrimitiveTopology::TriangleList), None);
        assert_eq!(strip_index_format(wgpu::PrimitiveTopology::PointList), None);
    }
}
