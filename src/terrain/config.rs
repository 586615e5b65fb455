//! Terrain generation parameters

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, Vec3};
use super::noise_field::NoiseLayer;

/// Parameters of the plains (land) biome.
///
/// Height offsets are expressed in voxels; fractions scale the global
/// height variation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlainsParams {
    /// Large-scale rolling shape
    pub continental: NoiseLayer,
    /// Occasional taller hills
    pub hills: NoiseLayer,
    /// Small surface detail
    pub detail: NoiseLayer,
    pub continental_weight: f32,
    pub detail_weight: f32,
    /// Lift above the water level, in voxels
    pub base_lift_voxels: f32,
    /// Fraction of the height variation spent on the base shape
    pub base_shape_scale: f32,
    /// Fraction of the height variation spent on hills
    pub hill_scale: f32,
    /// Hills start fading in this far above the water level
    pub hill_fade_start: f32,
    /// Width of the hill fade-in band
    pub hill_fade_width: f32,
    pub color: [f32; 3],
}

impl Default for PlainsParams {
    fn default() -> Self {
        Self {
            continental: NoiseLayer::new(0.0001, 4, 0.5).with_seed_offset(1),
            hills: NoiseLayer::new(0.001, 3, 0.5).with_seed_offset(2),
            detail: NoiseLayer::new(0.006, 2, 0.5).with_seed_offset(3),
            continental_weight: 0.85,
            detail_weight: 0.15,
            base_lift_voxels: 5.0,
            base_shape_scale: 0.4,
            hill_scale: 0.5,
            hill_fade_start: 32.0,
            hill_fade_width: 8.0,
            color: [0.25, 0.6, 0.25],
        }
    }
}

/// Parameters of the ocean biome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanParams {
    pub floor: NoiseLayer,
    /// Seabed depth below the water level, in voxels
    pub depth_voxels: f32,
    /// Seabed undulation amplitude, in voxels
    pub floor_variation_voxels: f32,
    pub color: [f32; 3],
}

impl Default for OceanParams {
    fn default() -> Self {
        Self {
            floor: NoiseLayer::new(0.00005, 3, 0.5).with_seed_offset(4),
            depth_voxels: 15.0,
            floor_variation_voxels: 1.0,
            color: [0.10, 0.35, 0.55],
        }
    }
}

/// Sand banding near the water line.
///
/// Offsets are in voxels relative to the water level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoreParams {
    pub sand_color: [f32; 3],
    /// Solid sand starts this far below the water level
    pub sand_below_voxels: f32,
    /// Solid sand ends (and the sand-grass blend starts) here
    pub sand_above_voxels: f32,
    /// The sand-grass blend ends here
    pub blend_end_voxels: f32,
    /// Spacing of the 3x3 shore probe
    pub probe_step_voxels: f32,
    /// Ocean-ness smoothstep edges applied to the biome mask
    pub mask_edge_low: f32,
    pub mask_edge_high: f32,
    /// A probe counts as ocean when its ocean-ness is below this
    pub ocean_threshold: f32,
}

impl Default for ShoreParams {
    fn default() -> Self {
        Self {
            sand_color: [0.93, 0.85, 0.55],
            sand_below_voxels: 0.1,
            sand_above_voxels: 2.0,
            blend_end_voxels: 3.0,
            probe_step_voxels: 4.0,
            mask_edge_low: 0.5,
            mask_edge_high: 1.0,
            ocean_threshold: 0.5,
        }
    }
}

/// Complete terrain description: a seed and per-layer parameters.
///
/// Identical configs produce bit-identical terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub seed: u32,
    /// Low-frequency land/ocean selector
    pub selector: NoiseLayer,
    /// Added to the selector mask before blending; negative means more ocean
    pub land_bias: f32,
    pub plains: PlainsParams,
    pub ocean: OceanParams,
    pub shore: ShoreParams,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            selector: NoiseLayer::new(0.00025, 5, 0.2).with_lacunarity(3.0),
            land_bias: 0.0,
            plains: PlainsParams::default(),
            ocean: OceanParams::default(),
            shore: ShoreParams::default(),
        }
    }
}

impl TerrainConfig {
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.selector.validate("selector")?;
        self.plains.continental.validate("plains.continental")?;
        self.plains.hills.validate("plains.hills")?;
        self.plains.detail.validate("plains.detail")?;
        self.ocean.floor.validate("ocean.floor")?;

        if self.plains.hill_fade_width <= 0.0 {
            return Err(Error::Config(format!(
                "plains.hill_fade_width must be positive, got {}",
                self.plains.hill_fade_width
            )));
        }

        let shore = &self.shore;
        if !(shore.sand_above_voxels < shore.blend_end_voxels) {
            return Err(Error::Config(format!(
                "shore.sand_above_voxels ({}) must be below shore.blend_end_voxels ({})",
                shore.sand_above_voxels, shore.blend_end_voxels
            )));
        }
        if -shore.sand_below_voxels > shore.sand_above_voxels {
            return Err(Error::Config("shore sand band is inverted".to_string()));
        }
        if !(shore.mask_edge_low < shore.mask_edge_high) {
            return Err(Error::Config(format!(
                "shore.mask_edge_low ({}) must be below shore.mask_edge_high ({})",
                shore.mask_edge_low, shore.mask_edge_high
            )));
        }

        let colors = [
            ("plains.color", self.plains.color),
            ("ocean.color", self.ocean.color),
            ("shore.sand_color", self.shore.sand_color),
        ];
        for (name, color) in colors {
            if color.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(Error::Config(format!(
                    "{} components must be in [0, 1], got {:?}",
                    name, color
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn color(rgb: [f32; 3]) -> Vec3 {
    Vec3::from_array(rgb)
}
