//! Deterministic 2D noise layers keyed by world (x, z)

use noise::{Fbm, MultiFractal, NoiseFn, OpenSimplex};
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Upper bound accepted for `NoiseLayer::octaves`.
pub const MAX_OCTAVES: usize = 16;

/// Configuration of one fractal noise layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseLayer {
    /// Base frequency in cycles per world unit
    pub frequency: f64,
    /// FBM octaves (detail levels)
    pub octaves: usize,
    /// Amplitude multiplier between octaves (persistence)
    pub gain: f64,
    /// Frequency multiplier between octaves
    pub lacunarity: f64,
    /// Added to the world seed so layers stay decorrelated
    pub seed_offset: u32,
}

impl NoiseLayer {
    pub fn new(frequency: f64, octaves: usize, gain: f64) -> Self {
        Self {
            frequency,
            octaves,
            gain,
            ..Default::default()
        }
    }

    pub fn with_lacunarity(mut self, lacunarity: f64) -> Self {
        self.lacunarity = lacunarity;
        self
    }

    pub fn with_seed_offset(mut self, seed_offset: u32) -> Self {
        self.seed_offset = seed_offset;
        self
    }

    /// Check the layer parameters, naming the layer in the error.
    pub fn validate(&self, name: &str) -> Result<()> {
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(Error::Config(format!(
                "noise layer `{}`: frequency must be positive, got {}",
                name, self.frequency
            )));
        }
        if self.octaves == 0 || self.octaves > MAX_OCTAVES {
            return Err(Error::Config(format!(
                "noise layer `{}`: octaves must be in 1..={}, got {}",
                name, MAX_OCTAVES, self.octaves
            )));
        }
        if !(self.gain.is_finite() && self.gain > 0.0) {
            return Err(Error::Config(format!(
                "noise layer `{}`: gain must be positive, got {}",
                name, self.gain
            )));
        }
        if !(self.lacunarity.is_finite() && self.lacunarity >= 1.0) {
            return Err(Error::Config(format!(
                "noise layer `{}`: lacunarity must be >= 1, got {}",
                name, self.lacunarity
            )));
        }
        Ok(())
    }
}

impl Default for NoiseLayer {
    fn default() -> Self {
        Self {
            frequency: 0.001,
            octaves: 3,
            gain: 0.5,
            lacunarity: 2.0,
            seed_offset: 0,
        }
    }
}

/// Fractal OpenSimplex noise evaluator.
///
/// `sample` is a pure function of (x, z): no state changes after
/// construction, so it is safe to share between worker threads.
pub struct NoiseField {
    fbm: Fbm<OpenSimplex>,
}

impl NoiseField {
    pub fn new(world_seed: u32, layer: &NoiseLayer) -> Self {
        let fbm = Fbm::<OpenSimplex>::new(world_seed.wrapping_add(layer.seed_offset))
            .set_frequency(layer.frequency)
            .set_octaves(layer.octaves.clamp(1, MAX_OCTAVES))
            .set_persistence(layer.gain)
            .set_lacunarity(layer.lacunarity);

        Self { fbm }
    }

    /// Noise value at world position (x, z), clamped to [-1, 1]
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let value = self.fbm.get([x as f64, z as f64]) as f32;
        value.clamp(-1.0, 1.0)
    }
}

/// Fixed weighted sum of noise fields, clamped to [-1, 1].
pub struct NoiseStack {
    layers: Vec<(NoiseField, f32)>,
}

impl NoiseStack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn with_layer(mut self, field: NoiseField, weight: f32) -> Self {
        self.layers.push((field, weight));
        self
    }

    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let sum: f32 = self
            .layers
            .iter()
            .map(|(field, weight)| field.sample(x, z) * weight)
            .sum();
        sum.clamp(-1.0, 1.0)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for NoiseStack {
    fn default() -> Self {
        Self::new()
    }
}
