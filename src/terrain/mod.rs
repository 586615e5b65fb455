//! Procedural terrain: noise layers, biomes and their blend

pub mod config;
pub use config::{OceanParams, PlainsParams, ShoreParams, TerrainConfig};

pub mod noise_field;
pub use noise_field::{NoiseField, NoiseLayer, NoiseStack};

pub mod biome;
pub use biome::{Biome, BiomeKind};

pub mod biome_manager;
pub use biome_manager::{BiomeManager, BiomeSample};

pub mod source;
pub use source::{FlatTerrain, TerrainSource};
