//! Terramarch - streamed marching-cubes terrain

pub mod core;
pub mod math;
pub mod terrain;
pub mod voxel;
pub mod render;
pub mod streaming;
pub mod config;

pub use config::WorldConfig;
