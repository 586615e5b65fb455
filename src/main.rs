//! Terramarch - headless streaming flythrough
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   World config JSON (default: built-in defaults)
//!   --frames <N>      Frames to simulate (default: 600)
//!   --speed <UNITS>   Camera speed in world units per second (default: 400)
//!   --fps <N>         Simulated frame rate (default: 60)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use terramarch::WorldConfig;
use terramarch::core::{Result, Vec3, camera::Camera, logging, time::FrameTimer};
use terramarch::render::{DrawContext, HeadlessHandle, HeadlessRenderer, MeshRenderer};
use terramarch::streaming::WorldStreamer;
use terramarch::terrain::BiomeManager;
use terramarch::voxel::{RegionCoord, water_surface_mesh};

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let frames = parse_usize_arg(&args, "--frames").unwrap_or(600);
    let speed = parse_f32_arg(&args, "--speed").unwrap_or(400.0);
    let fps = parse_usize_arg(&args, "--fps").unwrap_or(60).max(1);

    let config = match parse_str_arg(&args, "--config") {
        Some(path) => WorldConfig::load_sync(&PathBuf::from(path))?,
        None => WorldConfig::default(),
    };
    config.validate()?;

    log::info!(
        "Seed {}, load radius {}, unload radius {}",
        config.terrain.seed,
        config.streaming.load_radius,
        config.streaming.unload_radius
    );

    let terrain = Arc::new(BiomeManager::new(&config.terrain));
    let mut streamer = WorldStreamer::new(config.streaming.clone(), terrain, HeadlessRenderer::new())?;

    let mut camera = Camera::default();
    camera.set_rotation_euler(-90f32.to_radians(), -20f32.to_radians());
    let dt = 1.0 / fps as f32;
    let frame_time = Duration::from_secs_f32(dt);

    let mut water_region: Option<RegionCoord> = None;
    let mut water: Option<HeadlessHandle> = None;
    let mut timer = FrameTimer::new();

    for frame in 0..frames {
        camera.position += Vec3::X * speed * dt;
        streamer.update(camera.position);

        // Water plane follows the viewer one region at a time
        let region = RegionCoord::from_world_pos(camera.position);
        if water_region != Some(region) {
            let renderer = streamer.renderer_mut();
            if let Some(old) = water.take() {
                renderer.release(old);
            }
            water = Some(renderer.upload(&water_surface_mesh(region, config.streaming.load_radius)));
            water_region = Some(region);
        }

        let ctx = DrawContext::new(camera.view_projection(), camera.position);
        streamer.renderer_mut().begin_frame();
        streamer.draw(&ctx);
        if let Some(handle) = &water {
            streamer.renderer_mut().draw(handle, &ctx);
        }

        if timer.tick() || frame + 1 == frames {
            let stats = streamer.stats();
            log::info!(
                "frame {} ({:.0} fps) at {:?}: {} loaded, {} pending, {} drawn / {} culled, {} triangles",
                frame + 1,
                timer.fps(),
                region,
                stats.loaded,
                stats.pending,
                stats.last_drawn,
                stats.last_culled,
                streamer.renderer().triangles_drawn()
            );
        }

        std::thread::sleep(frame_time);
    }

    let stats = streamer.stats();
    log::info!(
        "Done: {} integrated, {} evicted, {} empty, {} stale, {} pruned",
        stats.integrated_total,
        stats.evicted_total,
        stats.discarded_empty,
        stats.discarded_stale,
        stats.pruned_total
    );

    if let Some(handle) = water.take() {
        streamer.renderer_mut().release(handle);
    }
    streamer.shutdown();
    Ok(())
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
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
