//! World preview generator: meshes a square of regions in parallel and
//! writes top-down previews plus a summary.
//!
//! Usage: cargo run --release --bin generate_world -- [OPTIONS]
//!
//! Options:
//!   --radius <N>      Regions around the origin to generate (default: 4)
//!   --seed <SEED>     Terrain seed (overrides the config file)
//!   --config <PATH>   World config JSON (default: built-in defaults)
//!   --pixels <N>      Preview pixels per region side (default: 64)
//!   --name <NAME>     Output directory name (default: "preview")
//!   --jobs <N>        Parallel region builds (default: all cores)
//!
//! Output structure:
//!   assets/worlds/<name>/
//!     summary.json      # Config, per-region triangle counts and timings
//!     colormap.png      # Surface color with water tint
//!     heightmap.png     # Surface height, 0 = bottom of the region volume

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use image::{GrayImage, Luma, Rgb, RgbImage};
use rayon::prelude::*;
use serde_json::json;

use terramarch::WorldConfig;
use terramarch::core::{Result, Vec3, logging};
use terramarch::terrain::{BiomeManager, TerrainSource};
use terramarch::voxel::{
    REGION_WORLD_HEIGHT, REGION_WORLD_SIZE, RegionCoord, WATER_LEVEL, generate_region,
    water::WATER_COLOR,
};

struct RegionReport {
    coord: RegionCoord,
    triangles: usize,
    build_ms: f64,
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let radius = parse_i32_arg(&args, "--radius").unwrap_or(4).max(0);
    let pixels = parse_u32_arg(&args, "--pixels").unwrap_or(64).max(1);
    let name = parse_str_arg(&args, "--name").unwrap_or_else(|| "preview".to_string());

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => WorldConfig::load_sync(&PathBuf::from(path))?,
        None => WorldConfig::default(),
    };
    if let Some(seed) = parse_u32_arg(&args, "--seed") {
        config.terrain = config.terrain.with_seed(seed);
    }
    config.validate()?;

    if let Some(jobs) = parse_usize_arg(&args, "--jobs") {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .build_global()
            .map_err(|e| terramarch::core::Error::Worker(e.to_string()))?;
    }

    let output_dir = PathBuf::from(format!("assets/worlds/{}", name));
    std::fs::create_dir_all(&output_dir)?;

    let side = (radius * 2 + 1) as u32;
    println!("=== Terramarch World Preview ===");
    println!("Seed:    {}", config.terrain.seed);
    println!("Regions: {} x {} (radius {})", side, side, radius);
    println!("Preview: {} px per region", pixels);
    println!("Output:  {}", output_dir.display());
    println!();

    let terrain = BiomeManager::new(&config.terrain);
    let center = RegionCoord::new(0, 0);
    let coords: Vec<RegionCoord> = center.square_around(radius).collect();
    let total = coords.len();

    // Phase 1: mesh every region
    let start = Instant::now();
    let done = AtomicUsize::new(0);
    let mut reports: Vec<RegionReport> = coords
        .par_iter()
        .map(|&coord| {
            let package = generate_region(coord, &terrain, false);
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % 10 == 0 || finished == total {
                eprintln!("  [{}/{}] regions meshed", finished, total);
            }
            RegionReport {
                coord,
                triangles: package.mesh.triangle_count(),
                build_ms: package.build_time.as_secs_f64() * 1000.0,
            }
        })
        .collect();
    reports.sort_by_key(|r| (r.coord.z, r.coord.x));
    let mesh_elapsed = start.elapsed();

    let with_geometry = reports.iter().filter(|r| r.triangles > 0).count();
    let triangles: usize = reports.iter().map(|r| r.triangles).sum();
    println!();
    println!(
        "Meshed {} regions in {:.1}s ({} with geometry, {} triangles)",
        total,
        mesh_elapsed.as_secs_f64(),
        with_geometry,
        triangles
    );

    // Phase 2: top-down previews, one image row per parallel task
    let width = side * pixels;
    let step = REGION_WORLD_SIZE / pixels as f32;
    let min = center.offset(-radius, -radius).world_origin();

    let rows: Vec<Vec<([u8; 3], u8)>> = (0..width)
        .into_par_iter()
        .map(|py| {
            (0..width)
                .map(|px| {
                    let x = min.x + (px as f32 + 0.5) * step;
                    let z = min.z + (py as f32 + 0.5) * step;
                    preview_pixel(&terrain, x, z)
                })
                .collect()
        })
        .collect();

    let mut colormap = RgbImage::new(width, width);
    let mut heightmap = GrayImage::new(width, width);
    for (py, row) in rows.iter().enumerate() {
        for (px, (rgb, h)) in row.iter().enumerate() {
            colormap.put_pixel(px as u32, py as u32, Rgb(*rgb));
            heightmap.put_pixel(px as u32, py as u32, Luma([*h]));
        }
    }

    let colormap_path = output_dir.join("colormap.png");
    let heightmap_path = output_dir.join("heightmap.png");
    colormap
        .save(&colormap_path)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    heightmap
        .save(&heightmap_path)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    // Phase 3: summary
    let summary = json!({
        "seed": config.terrain.seed,
        "radius": radius,
        "region_world_size": REGION_WORLD_SIZE,
        "water_level": WATER_LEVEL,
        "mesh_seconds": mesh_elapsed.as_secs_f64(),
        "regions_with_geometry": with_geometry,
        "total_triangles": triangles,
        "config": config,
        "regions": reports.iter().map(|r| {
            json!({"x": r.coord.x, "z": r.coord.z, "triangles": r.triangles, "build_ms": r.build_ms})
        }).collect::<Vec<_>>(),
    });
    let summary_path = output_dir.join("summary.json");
    std::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;

    println!();
    println!("=== Preview Complete ===");
    println!("Color:   {}", colormap_path.display());
    println!("Height:  {}", heightmap_path.display());
    println!("Summary: {}", summary_path.display());
    Ok(())
}

/// Surface color (water tinted) and 8-bit height for one column
fn preview_pixel(terrain: &BiomeManager, x: f32, z: f32) -> ([u8; 3], u8) {
    let sample = terrain.sample(x, z);
    let mut color = terrain.surface_color(Vec3::new(x, sample.height, z));
    if sample.height < WATER_LEVEL {
        let depth = ((WATER_LEVEL - sample.height) / 64.0).clamp(0.0, 1.0);
        color = color.lerp(WATER_COLOR, 0.5 + 0.5 * depth);
    }

    let rgb = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    let h = (sample.height / REGION_WORLD_HEIGHT).clamp(0.0, 1.0) * 255.0;
    ([rgb.x as u8, rgb.y as u8, rgb.z as u8], h.round() as u8)
}

fn parse_i32_arg(args: &[String], flag: &str) -> Option<i32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
