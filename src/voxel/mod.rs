//! Region grid, density sampling and surface extraction

pub mod region;
pub mod density;
pub mod tables;
pub mod marching_cubes;
pub mod mesh;
pub mod water;

pub use region::{
    BASE_HEIGHT, HEIGHT_VARIATION, REGION_HEIGHT, REGION_SIZE, REGION_WORLD_HEIGHT,
    REGION_WORLD_SIZE, RegionCoord, VOXEL_SIZE, WATER_LEVEL,
};
pub use density::{DensityField, RegionSampler};
pub use mesh::{MeshData, MeshPackage, TerrainVertex};
pub use water::water_surface_mesh;

use std::time::Instant;

use crate::terrain::TerrainSource;

/// Sample and polygonize one region.
///
/// Pure with respect to `source`: the same coordinate always yields the
/// same mesh.
pub fn generate_region<S: TerrainSource + ?Sized>(
    coord: RegionCoord,
    source: &S,
    retain_density: bool,
) -> MeshPackage {
    let start = Instant::now();

    let sampler = RegionSampler::new(coord, source);
    let mesh = marching_cubes::polygonize(&sampler);

    let mut package = MeshPackage::new(coord, mesh);
    if retain_density {
        package.density = Some(sampler.into_field());
    }
    package.build_time = start.elapsed();

    log::debug!(
        "Generated region {} in {:.2}ms ({} triangles)",
        coord,
        package.build_time.as_secs_f64() * 1000.0,
        package.mesh.triangle_count()
    );
    package
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{BiomeManager, FlatTerrain, TerrainConfig};

    #[test]
    fn test_generate_is_deterministic() {
        let manager = BiomeManager::new(&TerrainConfig::default());
        let a = generate_region(RegionCoord::new(-3, 5), &manager, false);
        let b = generate_region(RegionCoord::new(-3, 5), &manager, false);
        assert_eq!(a.mesh.indices, b.mesh.indices);
        assert_eq!(a.mesh.positions, b.mesh.positions);
        assert_eq!(a.mesh.colors, b.mesh.colors);
        assert!(a.density.is_none());
    }

    #[test]
    fn test_retain_density() {
        let flat = FlatTerrain::new(100.0);
        let package = generate_region(RegionCoord::new(0, 0), &flat, true);
        let field = package.density.expect("density retained");
        assert_eq!(field.coord(), RegionCoord::new(0, 0));
        assert!(package.has_geometry);
    }

    #[test]
    fn test_deep_ocean_region_is_empty() {
        // Seabed pushed below the bottom of the sampled volume
        let mut config = TerrainConfig {
            land_bias: -2.0,
            ..Default::default()
        };
        config.ocean.depth_voxels = 20.0;
        let manager = BiomeManager::new(&config);

        let package = generate_region(RegionCoord::new(4, 4), &manager, false);
        assert!(!package.has_geometry);
        assert!(package.mesh.is_empty());
    }

    #[test]
    fn test_ocean_region_is_continuous_seabed() {
        let config = TerrainConfig {
            land_bias: -2.0,
            ..Default::default()
        };
        let manager = BiomeManager::new(&config);
        let coord = RegionCoord::new(-2, 7);
        let package = generate_region(coord, &manager, false);
        assert!(package.has_geometry);

        // Every column cell carries part of the seabed
        let origin = coord.world_origin();
        let mut covered = vec![false; (REGION_SIZE * REGION_SIZE) as usize];
        for tri in package.mesh.indices.chunks_exact(3) {
            let centroid = tri
                .iter()
                .map(|&i| package.mesh.positions[i as usize])
                .sum::<crate::core::Vec3>()
                / 3.0;
            assert!(centroid.y <= WATER_LEVEL);
            let cx = ((centroid.x - origin.x) / VOXEL_SIZE).floor() as i32;
            let cz = ((centroid.z - origin.z) / VOXEL_SIZE).floor() as i32;
            if (0..REGION_SIZE).contains(&cx) && (0..REGION_SIZE).contains(&cz) {
                covered[(cx * REGION_SIZE + cz) as usize] = true;
            }
        }
        assert!(covered.iter().all(|&c| c));
    }
}
