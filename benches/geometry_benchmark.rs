// benches/geometry_benchmark.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use glam::Vec3;
use rand::Rng;
use render_lessons::engine_lib::camera::Camera;
use render_lessons::engine_lib::geometry::Geometry;
use render_lessons::engine_lib::transparency::sort_back_to_front;
use render_lessons::rendering_lib::text::{layout_text, Character, GlyphBitmap, GlyphCache};

fn synthetic_cache() -> GlyphCache {
    let mut cache = GlyphCache::new(48);
    for ch in ' '..='~' {
        let character = Character::from_raster(2, -4, 24, 36, 28.0);
        let bitmap = GlyphBitmap {
            width: 24,
            height: 36,
            coverage: vec![255; 24 * 36],
        };
        cache.insert(ch, character, bitmap);
    }
    cache
}

fn random_line(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| rng.gen_range(' '..='~')).collect()
}

fn geometry_benchmark_fn(c: &mut Criterion) {
    let mut group = c.benchmark_group("GeometryGeneration");
    group.bench_function("sphere_64x64", |b| b.iter(|| Geometry::sphere(black_box(1.0), 64, 64)));
    group.bench_function("cuboid_16_segments", |b| {
        b.iter(|| Geometry::cuboid(black_box(1.0), 1.0, 1.0, 16))
    });
    group.bench_function("plane_100x100", |b| b.iter(|| Geometry::plane(black_box(10.0), 10.0, 100, 100)));
    group.finish();
}

fn text_benchmark_fn(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let cache = synthetic_cache();

    const NUM_LINES: usize = 100;
    let lines: Vec<String> = (0..NUM_LINES).map(|_| random_line(&mut rng, 40)).collect();

    let mut group = c.benchmark_group("TextLayout");
    group.bench_function("layout_100_lines_of_40_chars", |b| {
        let mut line_iter = lines.iter().cycle();
        b.iter(|| {
            let line = line_iter.next().unwrap();
            layout_text(black_box(&cache), black_box(line), 25.0, 25.0, 1.0)
        })
    });
    group.finish();
}

fn transparency_benchmark_fn(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let camera = Camera::new(Vec3::new(0.0, 1.0, 6.0));
    let positions: Vec<Vec3> = (0..1000)
        .map(|_| Vec3::new(rng.gen_range(-10.0..10.0), 0.5, rng.gen_range(-10.0..10.0)))
        .collect();

    c.bench_function("sort_1000_panes_back_to_front", |b| {
        b.iter(|| sort_back_to_front(black_box(camera.position), black_box(&positions)))
    });
}

criterion_group!(benches, geometry_benchmark_fn, text_benchmark_fn, transparency_benchmark_fn);
criterion_main!(benches);
