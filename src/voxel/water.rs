//! Flat water plane covering the loaded area

use crate::core::Vec3;
use super::mesh::MeshData;
use super::region::{REGION_WORLD_SIZE, RegionCoord, WATER_LEVEL};

/// Tint of the water surface
pub const WATER_COLOR: Vec3 = Vec3::new(0.15, 0.45, 0.75);

/// Square quad at the water level spanning every region within `radius`
/// of `center`. The quad faces up.
pub fn water_surface_mesh(center: RegionCoord, radius: i32) -> MeshData {
    let min = center.offset(-radius, -radius).world_origin();
    let extent = (2 * radius + 1) as f32 * REGION_WORLD_SIZE;
    let y = WATER_LEVEL;

    let corners = [
        Vec3::new(min.x, y, min.z),
        Vec3::new(min.x + extent, y, min.z),
        Vec3::new(min.x + extent, y, min.z + extent),
        Vec3::new(min.x, y, min.z + extent),
    ];

    let mut mesh = MeshData::with_capacity(4);
    for corner in corners {
        mesh.push_vertex(corner, Vec3::Y, WATER_COLOR);
    }
    mesh.push_triangle(0, 2, 1);
    mesh.push_triangle(0, 3, 2);
    mesh
}
