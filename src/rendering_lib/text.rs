// src/rendering_lib/text.rs

//! Glyph cache and textured-quad text drawing.
//!
//! Every character code below 128 is rasterised once into its own coverage
//! texture; strings are then drawn as one quad per character, positioned from
//! the glyph's bearing and advanced by its advance width in 1/64 pixels.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use fontdue::{Font, FontSettings};
use glam::{IVec2, Mat4, Vec3};

use crate::error::{LessonError, Result};

use super::pipeline::PipelineBuilder;
use super::shader::{DynamicUniformBuffer, Shader};
use super::texture::Texture;
use super::vertex::TextVertex;

pub const FIRST_CHAR_CODE: u32 = 0;
pub const CHAR_CODE_END: u32 = 128;
const MAX_TEXT_RUNS: usize = 32;
const VERTICES_PER_GLYPH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Character {
    /// Bitmap width and rows.
    pub size: IVec2,
    /// Offset from the pen position on the baseline to the bitmap's left/top edge.
    pub bearing: IVec2,
    /// Horizontal advance in 1/64 pixels.
    pub advance: u32,
}

impl Character {
    pub fn from_raster(xmin: i32, ymin: i32, width: usize, height: usize, advance_width: f32) -> Self {
        Self {
            size: IVec2::new(width as i32, height as i32),
            bearing: IVec2::new(xmin, ymin + height as i32),
            advance: (advance_width.max(0.0) * 64.0).round() as u32,
        }
    }

    pub fn advance_pixels(&self) -> u32 {
        self.advance >> 6
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

/// Character metrics and bitmaps keyed by character. Filled once, never evicted.
#[derive(Debug, Clone, Default)]
pub struct GlyphCache {
    pixel_size: u32,
    characters: BTreeMap<char, Character>,
    bitmaps: BTreeMap<char, GlyphBitmap>,
}

impl GlyphCache {
    pub fn new(pixel_size: u32) -> Self {
        Self { pixel_size, ..Default::default() }
    }

    pub fn from_font_bytes(bytes: &[u8], pixel_size: u32) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| LessonError::Font(e.to_string()))?;
        Ok(Self::from_font(&font, pixel_size))
    }

    pub fn from_font(font: &Font, pixel_size: u32) -> Self {
        let mut cache = Self::new(pixel_size);
        for code in FIRST_CHAR_CODE..CHAR_CODE_END {
            let Some(ch) = char::from_u32(code) else {
                log::warn!("ERROR::FONT: Failed to load glyph {}", code);
                continue;
            };
            let (metrics, coverage) = font.rasterize(ch, pixel_size as f32);
            let character = Character::from_raster(metrics.xmin, metrics.ymin, metrics.width, metrics.height, metrics.advance_width);
            cache.insert(
                ch,
                character,
                GlyphBitmap { width: metrics.width as u32, height: metrics.height as u32, coverage },
            );
        }
        log::info!("Glyph cache populated: {} glyphs at {}px", cache.len(), pixel_size);
        cache
    }

    pub fn insert(&mut self, ch: char, character: Character, bitmap: GlyphBitmap) {
        self.characters.insert(ch, character);
        self.bitmaps.insert(ch, bitmap);
    }

    pub fn get(&self, ch: char) -> Option<&Character> {
        self.characters.get(&ch)
    }

    pub fn bitmap(&self, ch: char) -> Option<&GlyphBitmap> {
        self.bitmaps.get(&ch)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    pub fn iter(&self) -> impl Iterator<Item = (&char, &Character)> {
        self.characters.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    pub ch: char,
    pub vertices: [TextVertex; VERTICES_PER_GLYPH],
}

/// Lays `text` out left to right from the baseline point `(x, y)`.
///
/// Characters missing from the cache are skipped without moving the pen.
/// Empty glyphs such as space move the pen but emit no quad.
pub fn layout_text(cache: &GlyphCache, text: &str, mut x: f32, y: f32, scale: f32) -> Vec<GlyphQuad> {
    let mut quads = Vec::with_capacity(text.len());
    for c in text.chars() {
        let Some(ch) = cache.get(c) else {
            log::trace!("No glyph cached for {:?}", c);
            continue;
        };

        let xpos = x + ch.bearing.x as f32 * scale;
        let ypos = y - (ch.size.y - ch.bearing.y) as f32 * scale;
        let w = ch.size.x as f32 * scale;
        let h = ch.size.y as f32 * scale;

        if ch.size.x > 0 && ch.size.y > 0 {
            quads.push(GlyphQuad {
                ch: c,
                vertices: [
                    TextVertex::new(xpos, ypos + h, 0.0, 0.0),
                    TextVertex::new(xpos, ypos, 0.0, 1.0),
                    TextVertex::new(xpos + w, ypos, 1.0, 1.0),
                    TextVertex::new(xpos, ypos + h, 0.0, 0.0),
                    TextVertex::new(xpos + w, ypos, 1.0, 1.0),
                    TextVertex::new(xpos + w, ypos + h, 1.0, 0.0),
                ],
            });
        }

        x += ch.advance_pixels() as f32 * scale;
    }
    quads
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct TextUniform {
    pub projection: [[f32; 4]; 4],
    pub text_color: [f32; 4],
}

struct GlyphTexture {
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

struct TextRun {
    uniform_slot: usize,
    glyphs: Vec<(char, Range<u32>)>,
}

pub struct TextRenderer {
    cache: GlyphCache,
    glyphs: HashMap<char, GlyphTexture>,
    pipeline: wgpu::RenderPipeline,
    uniforms: DynamicUniformBuffer<TextUniform>,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    projection: Mat4,
    vertices: Vec<TextVertex>,
    runs: Vec<TextRun>,
    run_uniforms: Vec<TextUniform>,
}

impl TextRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shader: &Shader,
        target_format: wgpu::TextureFormat,
        cache: GlyphCache,
        width: u32,
        height: u32,
    ) -> Self {
        let texture_layout = Texture::bind_group_layout(device, "glyph_texture_bind_group_layout");
        let uniforms = DynamicUniformBuffer::new(
            device,
            "Text Uniform Buffer",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            MAX_TEXT_RUNS,
        );

        let pipeline = PipelineBuilder::new("Text Pipeline", shader, target_format)
            .vertex_layout(TextVertex::desc())
            .bind_group_layout(&uniforms.layout)
            .bind_group_layout(&texture_layout)
            .cull_back_faces()
            .alpha_blending()
            .build(device);

        let mut glyphs = HashMap::with_capacity(cache.len());
        for (ch, _) in cache.iter() {
            let Some(bitmap) = cache.bitmap(*ch) else { continue };
            let label = format!("Glyph {:?}", ch);
            let texture = Texture::coverage(device, queue, bitmap.width, bitmap.height, &bitmap.coverage, &label);
            let bind_group = texture.bind_group(device, &texture_layout, &label);
            glyphs.insert(*ch, GlyphTexture { _texture: texture, bind_group });
        }

        let vertex_capacity = 256 * VERTICES_PER_GLYPH;
        let vertex_buffer = Self::create_vertex_buffer(device, vertex_capacity);

        Self {
            cache,
            glyphs,
            pipeline,
            uniforms,
            vertex_buffer,
            vertex_capacity,
            projection: screen_projection(width, height),
            vertices: Vec::new(),
            runs: Vec::new(),
            run_uniforms: Vec::new(),
        }
    }

    fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Text Vertex Buffer"),
            size: (capacity * std::mem::size_of::<TextVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn cache(&self) -> &GlyphCache {
        &self.cache
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.projection = screen_projection(width, height);
    }

    /// Queues `text` for this frame. Runs beyond the uniform capacity are dropped.
    pub fn render_text(&mut self, text: &str, x: f32, y: f32, scale: f32, color: Vec3) {
        if self.runs.len() >= self.uniforms.capacity() {
            log::warn!("Too many text runs this frame, dropping {:?}", text);
            return;
        }
        let uniform_slot = self.run_uniforms.len();
        self.run_uniforms.push(TextUniform {
            projection: self.projection.to_cols_array_2d(),
            text_color: color.extend(1.0).to_array(),
        });

        let mut glyphs = Vec::new();
        for quad in layout_text(&self.cache, text, x, y, scale) {
            let start = self.vertices.len() as u32;
            self.vertices.extend_from_slice(&quad.vertices);
            glyphs.push((quad.ch, start..start + VERTICES_PER_GLYPH as u32));
        }
        self.runs.push(TextRun { uniform_slot, glyphs });
    }

    /// Uploads everything queued since the last `clear`.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.vertices.len() > self.vertex_capacity {
            self.vertex_capacity = self.vertices.len().next_power_of_two();
            self.vertex_buffer = Self::create_vertex_buffer(device, self.vertex_capacity);
        }
        if !self.vertices.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));
        }
        self.uniforms.write_all(queue, &self.run_uniforms);
    }

    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if self.vertices.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        for run in &self.runs {
            pass.set_bind_group(0, &self.uniforms.bind_group, &[self.uniforms.offset(run.uniform_slot)]);
            for (ch, range) in &run.glyphs {
                let Some(glyph) = self.glyphs.get(ch) else { continue };
                pass.set_bind_group(1, &glyph.bind_group, &[]);
                pass.draw(range.clone(), 0..1);
            }
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.runs.clear();
        self.run_uniforms.clear();
    }
}

/// Pixel coordinates with the origin at the bottom-left corner.
pub fn screen_projection(width: u32, height: u32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width as f32, 0.0, height as f32, -1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn glyph(width: i32, height: i32, bearing_x: i32, bearing_y: i32, advance_px: u32) -> (Character, GlyphBitmap) {
        (
            Character {
                size: IVec2::new(width, height),
                bearing: IVec2::new(bearing_x, bearing_y),
                advance: advance_px << 6,
            },
            GlyphBitmap {
                width: width as u32,
                height: height as u32,
                coverage: vec![255; (width * height) as usize],
            },
        )
    }

    fn test_cache() -> GlyphCache {
        let mut cache = GlyphCache::new(48);
        let (a, a_bitmap) = glyph(20, 30, 2, 25, 24);
        let (space, space_bitmap) = glyph(0, 0, 0, 0, 12);
        cache.insert('A', a, a_bitmap);
        cache.insert(' ', space, space_bitmap);
        cache
    }

    const TEST_FONT: &[u8] = include_bytes!("../../assets/fonts/Hack-Regular.ttf");

    #[test]
    fn invalid_font_bytes_are_a_font_error() {
        let err = GlyphCache::from_font_bytes(b"definitely not a font", 48).unwrap_err();
        assert!(matches!(err, LessonError::Font(_)));
    }

    #[test]
    fn font_cache_holds_the_first_128_codes() {
        let cache = GlyphCache::from_font_bytes(TEST_FONT, 48).unwrap();
        assert_eq!(cache.len(), (CHAR_CODE_END - FIRST_CHAR_CODE) as usize);
        assert_eq!(cache.pixel_size(), 48);
        assert!(cache.get('\u{0}').is_some());
        assert!(cache.get('\u{7f}').is_some());
        assert!(cache.get('\u{80}').is_none());
        assert!(cache.bitmap('A').is_some());
    }

    #[test]
    fn missing_glyphs_share_the_notdef_entry() {
        let font = Font::from_bytes(TEST_FONT, FontSettings::default()).unwrap();
        assert_eq!(font.lookup_glyph_index('\u{1}'), 0);
        assert_eq!(font.lookup_glyph_index('\u{2}'), 0);

        let cache = GlyphCache::from_font(&font, 48);
        let notdef = font.metrics_indexed(0, 48.0);
        let expected = Character::from_raster(notdef.xmin, notdef.ymin, notdef.width, notdef.height, notdef.advance_width);
        assert_eq!(cache.get('\u{1}'), Some(&expected));
        assert_eq!(cache.get('\u{2}'), Some(&expected));
    }

    #[test]
    fn advance_is_stored_in_64ths_of_a_pixel() {
        let font = Font::from_bytes(TEST_FONT, FontSettings::default()).unwrap();
        let cache = GlyphCache::from_font(&font, 48);
        for ch in ['A', 'g', ' ', '~'] {
            let advance_px = font.metrics(ch, 48.0).advance_width;
            let character = cache.get(ch).unwrap();
            assert_eq!(character.advance, (advance_px * 64.0).round() as u32);
            assert_eq!(character.advance_pixels(), character.advance >> 6);
        }
    }

    #[test]
    fn raster_metrics_convert_to_top_bearing() {
        let ch = Character::from_raster(1, -5, 10, 20, 12.5);
        assert_eq!(ch.size, IVec2::new(10, 20));
        assert_eq!(ch.bearing, IVec2::new(1, 15));
        assert_eq!(ch.advance, 800);
        assert_eq!(ch.advance_pixels(), 12);
    }

    #[test]
    fn quad_matches_bearing_and_size() {
        let cache = test_cache();
        let quads = layout_text(&cache, "A", 25.0, 25.0, 1.0);
        assert_eq!(quads.len(), 1);
        let v = quads[0].vertices;
        // xpos = 25 + 2, ypos = 25 - (30 - 25), w = 20, h = 30
        assert_eq!(v[0].pos_uv, [27.0, 50.0, 0.0, 0.0]);
        assert_eq!(v[1].pos_uv, [27.0, 20.0, 0.0, 1.0]);
        assert_eq!(v[2].pos_uv, [47.0, 20.0, 1.0, 1.0]);
        assert_eq!(v[5].pos_uv, [47.0, 50.0, 1.0, 0.0]);
    }

    #[test]
    fn pen_advances_in_whole_pixels_times_scale() {
        let cache = test_cache();
        let quads = layout_text(&cache, "A A", 0.0, 0.0, 0.5);
        assert_eq!(quads.len(), 2);
        // 24px + 12px advance, halved.
        assert_relative_eq!(quads[1].vertices[1].pos_uv[0] - quads[0].vertices[1].pos_uv[0], 18.0);
    }

    #[test]
    fn uncached_characters_are_skipped_without_advancing() {
        let cache = test_cache();
        let with_unknown = layout_text(&cache, "A\u{00e9}A", 0.0, 0.0, 1.0);
        let without = layout_text(&cache, "AA", 0.0, 0.0, 1.0);
        assert_eq!(with_unknown, without);
    }

    #[test]
    fn empty_text_yields_no_quads() {
        assert!(layout_text(&test_cache(), "", 10.0, 10.0, 1.0).is_empty());
        assert!(layout_text(&test_cache(), "   ", 10.0, 10.0, 1.0).is_empty());
    }

    #[test]
    fn projection_maps_window_corners_to_ndc() {
        let projection = screen_projection(800, 600);
        let bottom_left = projection.project_point3(Vec3::new(0.0, 0.0, 0.0));
        let top_right = projection.project_point3(Vec3::new(800.0, 600.0, 0.0));
        assert_relative_eq!(bottom_left.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(bottom_left.y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(top_right.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(top_right.y, 1.0, epsilon = 1e-6);
    }
}
