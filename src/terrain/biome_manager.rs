//! Land/ocean blending and shore coloring

use crate::core::Vec3;
use crate::voxel::region::{VOXEL_SIZE, WATER_LEVEL};
use super::biome::Biome;
use super::config::{ShoreParams, TerrainConfig, color};
use super::noise_field::NoiseField;
use super::source::TerrainSource;

/// Blended terrain at one world column
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeSample {
    /// Surface height in world units
    pub height: f32,
    /// 1.0 is fully ocean, 0.0 fully land
    pub ocean_weight: f32,
}

/// GLSL-style smoothstep
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Blends plains and ocean with a low-frequency selector mask.
///
/// All methods are pure functions of world (x, z) and the config the
/// manager was built from.
pub struct BiomeManager {
    selector: NoiseField,
    land_bias: f32,
    plains: Biome,
    ocean: Biome,
    shore: ShoreParams,
    sand: Vec3,
}

impl BiomeManager {
    pub fn new(config: &TerrainConfig) -> Self {
        log::debug!(
            "Building biome manager (seed {}, land bias {})",
            config.seed,
            config.land_bias
        );
        Self {
            selector: NoiseField::new(config.seed, &config.selector),
            land_bias: config.land_bias,
            plains: Biome::plains(config.seed, &config.plains),
            ocean: Biome::ocean(config.seed, &config.ocean),
            shore: config.shore.clone(),
            sand: color(config.shore.sand_color),
        }
    }

    /// Selector mask in [-1, 1] after the land bias, unclamped beyond that
    pub fn mask(&self, x: f32, z: f32) -> f32 {
        self.selector.sample(x, z) + self.land_bias
    }

    /// Land weight in [0, 1]
    pub fn land_weight(&self, x: f32, z: f32) -> f32 {
        smoothstep(-1.0, 0.0, self.mask(x, z))
    }

    pub fn sample(&self, x: f32, z: f32) -> BiomeSample {
        let t = self.land_weight(x, z);
        let ocean_h = self.ocean.height(x, z);
        let plains_h = self.plains.height(x, z);
        let height = ocean_h * (1.0 - t) + plains_h * t;

        // Anything at or below the water line renders as ocean
        let ocean_weight = if height <= WATER_LEVEL { 1.0 } else { 1.0 - t };

        BiomeSample { height, ocean_weight }
    }

    /// True if any point of a 3x3 probe around (x, z) reads as ocean
    pub fn near_ocean(&self, x: f32, z: f32) -> bool {
        let step = self.shore.probe_step_voxels * VOXEL_SIZE;
        for dz in -1..=1 {
            for dx in -1..=1 {
                let m = self.mask(x + dx as f32 * step, z + dz as f32 * step);
                let oceanness = smoothstep(self.shore.mask_edge_low, self.shore.mask_edge_high, m);
                if oceanness < self.shore.ocean_threshold {
                    return true;
                }
            }
        }
        false
    }

    /// Surface color at height `y`, given the column's ocean weight.
    ///
    /// Near the water line, columns close to the ocean get a solid sand band
    /// followed by a linear sand-to-grass transition. Everything else is the
    /// ocean/plains color mix.
    pub fn blended_surface_color(&self, y: f32, ocean_weight: f32, x: f32, z: f32) -> Vec3 {
        let plains = self.plains.surface_color(y);
        let ocean = self.ocean.surface_color(y);

        let sand_start = WATER_LEVEL - self.shore.sand_below_voxels * VOXEL_SIZE;
        let sand_end = WATER_LEVEL + self.shore.sand_above_voxels * VOXEL_SIZE;
        let blend_end = WATER_LEVEL + self.shore.blend_end_voxels * VOXEL_SIZE;

        if y >= sand_start && y < blend_end && self.near_ocean(x, z) {
            if y < sand_end {
                return self.sand;
            }
            let t = (y - sand_end) / (blend_end - sand_end);
            return self.sand.lerp(plains, t);
        }

        ocean.lerp(plains, 1.0 - ocean_weight)
    }

    pub fn plains(&self) -> &Biome {
        &self.plains
    }

    pub fn ocean(&self) -> &Biome {
        &self.ocean
    }
}

impl TerrainSource for BiomeManager {
    fn surface_height(&self, x: f32, z: f32) -> f32 {
        self.sample(x, z).height
    }

    fn surface_color(&self, position: Vec3) -> Vec3 {
        let sample = self.sample(position.x, position.z);
        self.blended_surface_color(position.y, sample.ocean_weight, position.x, position.z)
    }
}
