//! Region grid: fixed-size square columns of world space

use crate::core::Vec3;
use crate::math::Aabb;

/// Edge length of one voxel cell in world units
pub const VOXEL_SIZE: f32 = 8.0;

/// Cells per region along X and Z
pub const REGION_SIZE: i32 = 32;

/// Cells per region along Y
pub const REGION_HEIGHT: i32 = 32;

/// Region extent along X and Z in world units
pub const REGION_WORLD_SIZE: f32 = REGION_SIZE as f32 * VOXEL_SIZE;

/// Region extent along Y in world units
pub const REGION_WORLD_HEIGHT: f32 = REGION_HEIGHT as f32 * VOXEL_SIZE;

/// Reference terrain height at the middle of the vertical range
pub const BASE_HEIGHT: f32 = REGION_WORLD_HEIGHT * 0.5;

/// Global height amplitude that biome shapes are scaled by
pub const HEIGHT_VARIATION: f32 = REGION_WORLD_HEIGHT * 0.25;

/// Height of the global water plane
pub const WATER_LEVEL: f32 = BASE_HEIGHT;

/// Integer coordinate identifying a region on the XZ grid.
///
/// A region covers world X in `[x*S*V, (x+1)*S*V)` and the same along Z,
/// spanning the full vertical range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCoord {
    pub x: i32,
    pub z: i32,
}

impl RegionCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region containing a world position (floor division)
    pub fn from_world_pos(pos: Vec3) -> Self {
        Self {
            x: (pos.x / REGION_WORLD_SIZE).floor() as i32,
            z: (pos.z / REGION_WORLD_SIZE).floor() as i32,
        }
    }

    /// Minimum corner of this region in world space
    pub fn world_origin(&self) -> Vec3 {
        Vec3::new(
            self.x as f32 * REGION_WORLD_SIZE,
            0.0,
            self.z as f32 * REGION_WORLD_SIZE,
        )
    }

    /// Center of the region volume in world space
    pub fn world_center(&self) -> Vec3 {
        self.world_origin()
            + Vec3::new(
                REGION_WORLD_SIZE * 0.5,
                REGION_WORLD_HEIGHT * 0.5,
                REGION_WORLD_SIZE * 0.5,
            )
    }

    /// World-space box covering the whole region volume
    pub fn bounds(&self) -> Aabb {
        let min = self.world_origin();
        Aabb::new(
            min,
            min + Vec3::new(REGION_WORLD_SIZE, REGION_WORLD_HEIGHT, REGION_WORLD_SIZE),
        )
    }

    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Chebyshev (max-axis) distance in regions
    pub fn chebyshev_distance(&self, other: &RegionCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// All coordinates within `radius` (Chebyshev) of this one, row by row
    pub fn square_around(&self, radius: i32) -> impl Iterator<Item = RegionCoord> + use<> {
        let center = *self;
        (-radius..=radius)
            .flat_map(move |dz| (-radius..=radius).map(move |dx| center.offset(dx, dz)))
    }
}

impl std::fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_scale() {
        assert_eq!(REGION_WORLD_SIZE, 256.0);
        assert_eq!(REGION_WORLD_HEIGHT, 256.0);
        assert_eq!(WATER_LEVEL, 128.0);
        assert_eq!(HEIGHT_VARIATION, 64.0);
    }

    #[test]
    fn test_from_world_pos_floors() {
        assert_eq!(RegionCoord::from_world_pos(Vec3::new(0.0, 0.0, 0.0)), RegionCoord::new(0, 0));
        assert_eq!(RegionCoord::from_world_pos(Vec3::new(255.9, 900.0, 10.0)), RegionCoord::new(0, 0));
        assert_eq!(RegionCoord::from_world_pos(Vec3::new(256.0, 0.0, -0.1)), RegionCoord::new(1, -1));
        assert_eq!(RegionCoord::from_world_pos(Vec3::new(-256.0, 0.0, -257.0)), RegionCoord::new(-1, -2));
    }

    #[test]
    fn test_origin_and_bounds() {
        let coord = RegionCoord::new(2, -1);
        assert_eq!(coord.world_origin(), Vec3::new(512.0, 0.0, -256.0));
        let bounds = coord.bounds();
        assert_eq!(bounds.min, Vec3::new(512.0, 0.0, -256.0));
        assert_eq!(bounds.max, Vec3::new(768.0, 256.0, 0.0));
        assert_eq!(coord.world_center(), Vec3::new(640.0, 128.0, -128.0));
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = RegionCoord::new(0, 0);
        assert_eq!(a.chebyshev_distance(&RegionCoord::new(3, -5)), 5);
        assert_eq!(a.chebyshev_distance(&RegionCoord::new(-2, 1)), 2);
        assert_eq!(a.chebyshev_distance(&a), 0);
    }

    #[test]
    fn test_square_around() {
        let center = RegionCoord::new(10, -4);
        let coords: Vec<_> = center.square_around(4).collect();
        assert_eq!(coords.len(), 81);
        assert!(coords.iter().all(|c| c.chebyshev_distance(&center) <= 4));

        let unique: std::collections::HashSet<_> = coords.iter().collect();
        assert_eq!(unique.len(), 81);
    }
}
