use criterion::{criterion_group, criterion_main, Criterion, black_box};

use terramarch::terrain::{BiomeManager, FlatTerrain, TerrainConfig, TerrainSource};
use terramarch::voxel::{RegionCoord, RegionSampler, generate_region, marching_cubes};
use terramarch::streaming::{GenerationQueue, WorkItem};

use glam::Vec3;

fn bench_biome_sample(c: &mut Criterion) {
    let manager = BiomeManager::new(&TerrainConfig::default());

    c.bench_function("biome_sample", |b| {
        let mut i = 0u32;
        b.iter(|| {
            i = i.wrapping_add(1);
            let x = (i % 4096) as f32 * 8.0;
            manager.sample(black_box(x), black_box(x * 0.5))
        });
    });
}

fn bench_surface_color(c: &mut Criterion) {
    let manager = BiomeManager::new(&TerrainConfig::default());
    let p = Vec3::new(1200.0, 130.0, -800.0);

    c.bench_function("surface_color_shore_band", |b| {
        b.iter(|| manager.surface_color(black_box(p)));
    });
}

fn bench_density_fill(c: &mut Criterion) {
    let manager = BiomeManager::new(&TerrainConfig::default());

    c.bench_function("density_fill_region", |b| {
        b.iter(|| RegionSampler::new(black_box(RegionCoord::new(3, -2)), &manager));
    });
}

fn bench_polygonize_flat(c: &mut Criterion) {
    let flat = FlatTerrain::new(100.0);
    let sampler = RegionSampler::new(RegionCoord::new(0, 0), &flat);

    c.bench_function("polygonize_flat_region", |b| {
        b.iter(|| marching_cubes::polygonize(black_box(&sampler)));
    });
}

fn bench_generate_region(c: &mut Criterion) {
    let manager = BiomeManager::new(&TerrainConfig::default());

    let mut group = c.benchmark_group("generate_region");
    group.sample_size(20);
    group.bench_function("biome_terrain", |b| {
        b.iter(|| generate_region(black_box(RegionCoord::new(1, 1)), &manager, false));
    });
    group.finish();
}

fn bench_queue_fill_drain(c: &mut Criterion) {
    let viewer = Vec3::new(128.0, 200.0, 128.0);
    let coords: Vec<RegionCoord> = RegionCoord::new(0, 0).square_around(8).collect();

    c.bench_function("generation_queue_289", |b| {
        b.iter(|| {
            let mut queue = GenerationQueue::new();
            for &coord in &coords {
                queue.push(WorkItem::from_viewer(coord, black_box(viewer)));
            }
            let mut n = 0;
            while queue.pop().is_some() {
                n += 1;
            }
            n
        });
    });
}

criterion_group!(
    benches,
    bench_biome_sample,
    bench_surface_color,
    bench_density_fill,
    bench_polygonize_flat,
    bench_generate_region,
    bench_queue_fill_drain,
);
criterion_main!(benches);
