//! Terrain sampling seam used by region generation

use crate::core::Vec3;

/// Deterministic terrain field shared by all generation workers.
///
/// Density is positive inside solid ground and negative in air. The
/// default derives it from the surface height, which makes every source a
/// height field.
pub trait TerrainSource: Send + Sync {
    /// Surface height at world (x, z)
    fn surface_height(&self, x: f32, z: f32) -> f32;

    /// Surface color for a surface point in world space
    fn surface_color(&self, position: Vec3) -> Vec3;

    /// Signed density at a world position
    fn density(&self, position: Vec3) -> f32 {
        self.surface_height(position.x, position.z) - position.y
    }
}

/// Constant-height terrain with a single color
#[derive(Clone, Copy, Debug)]
pub struct FlatTerrain {
    pub height: f32,
    pub color: Vec3,
}

impl FlatTerrain {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            color: Vec3::new(0.5, 0.5, 0.5),
        }
    }
}

impl TerrainSource for FlatTerrain {
    fn surface_height(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }

    fn surface_color(&self, _position: Vec3) -> Vec3 {
        self.color
    }
}
