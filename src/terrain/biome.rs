//! Plains and ocean biomes: surface height and base color per column

use crate::core::Vec3;
use crate::voxel::region::{HEIGHT_VARIATION, VOXEL_SIZE, WATER_LEVEL};
use super::config::{OceanParams, PlainsParams, color};
use super::noise_field::{NoiseField, NoiseStack};

/// Biome identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BiomeKind {
    Plains,
    Ocean,
}

/// Gently rolling land sitting above the water level
pub struct Plains {
    base: NoiseStack,
    hills: NoiseField,
    base_lift: f32,
    base_shape_scale: f32,
    hill_scale: f32,
    hill_fade_start: f32,
    hill_fade_width: f32,
    color: Vec3,
}

impl Plains {
    pub fn new(seed: u32, params: &PlainsParams) -> Self {
        let base = NoiseStack::new()
            .with_layer(NoiseField::new(seed, &params.continental), params.continental_weight)
            .with_layer(NoiseField::new(seed, &params.detail), params.detail_weight);

        Self {
            base,
            hills: NoiseField::new(seed, &params.hills),
            base_lift: params.base_lift_voxels * VOXEL_SIZE,
            base_shape_scale: params.base_shape_scale,
            hill_scale: params.hill_scale,
            hill_fade_start: params.hill_fade_start,
            hill_fade_width: params.hill_fade_width,
            color: color(params.color),
        }
    }

    pub fn height(&self, x: f32, z: f32) -> f32 {
        // [-1, 1] -> [0, 1]
        let shape = (self.base.sample(x, z) + 1.0) * 0.5;
        let mut height = WATER_LEVEL + self.base_lift + HEIGHT_VARIATION * self.base_shape_scale * shape;

        let above_water = height - WATER_LEVEL;
        let hill_mask =
            ((above_water - self.hill_fade_start) / self.hill_fade_width).clamp(0.0, 1.0);
        if hill_mask > 0.0 {
            height += self.hills.sample(x, z) * HEIGHT_VARIATION * self.hill_scale * hill_mask;
        }
        height
    }
}

/// Shallow seabed with a slight undulation
pub struct Ocean {
    floor: NoiseField,
    depth: f32,
    floor_variation: f32,
    color: Vec3,
}

impl Ocean {
    pub fn new(seed: u32, params: &OceanParams) -> Self {
        Self {
            floor: NoiseField::new(seed, &params.floor),
            depth: params.depth_voxels * VOXEL_SIZE,
            floor_variation: params.floor_variation_voxels * VOXEL_SIZE,
            color: color(params.color),
        }
    }

    pub fn height(&self, x: f32, z: f32) -> f32 {
        WATER_LEVEL - self.depth + self.floor.sample(x, z) * self.floor_variation
    }
}

/// A terrain biome: deterministic height and a constant surface color
pub enum Biome {
    Plains(Plains),
    Ocean(Ocean),
}

impl Biome {
    pub fn plains(seed: u32, params: &PlainsParams) -> Self {
        Biome::Plains(Plains::new(seed, params))
    }

    pub fn ocean(seed: u32, params: &OceanParams) -> Self {
        Biome::Ocean(Ocean::new(seed, params))
    }

    pub fn kind(&self) -> BiomeKind {
        match self {
            Biome::Plains(_) => BiomeKind::Plains,
            Biome::Ocean(_) => BiomeKind::Ocean,
        }
    }

    /// Surface height at world (x, z)
    pub fn height(&self, x: f32, z: f32) -> f32 {
        match self {
            Biome::Plains(plains) => plains.height(x, z),
            Biome::Ocean(ocean) => ocean.height(x, z),
        }
    }

    /// Surface color; the height argument is accepted for future banding
    /// and currently ignored by both biomes
    pub fn surface_color(&self, _y: f32) -> Vec3 {
        match self {
            Biome::Plains(plains) => plains.color,
            Biome::Ocean(ocean) => ocean.color,
        }
    }
}
