//! Marching-cubes polygonization of a region's density field

use crate::core::Vec3;
use crate::terrain::TerrainSource;
use super::density::RegionSampler;
use super::mesh::MeshData;
use super::region::{REGION_HEIGHT, REGION_SIZE, VOXEL_SIZE};
use super::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};

/// Density value the surface is extracted at
pub const ISO_LEVEL: f32 = 0.0;

/// Central-difference step for surface normals
pub const NORMAL_EPSILON: f32 = 0.25 * VOXEL_SIZE;

/// Gradients shorter than this fall back to an upward normal
const MIN_GRADIENT_LENGTH: f32 = 1e-3;

/// Outward unit normal at a world position.
///
/// Density grows into the ground, so the surface normal is the negated
/// gradient.
pub fn surface_normal<S: TerrainSource + ?Sized>(source: &S, p: Vec3) -> Vec3 {
    let e = NORMAL_EPSILON;
    let gradient = Vec3::new(
        source.density(p + Vec3::new(e, 0.0, 0.0)) - source.density(p - Vec3::new(e, 0.0, 0.0)),
        source.density(p + Vec3::new(0.0, e, 0.0)) - source.density(p - Vec3::new(0.0, e, 0.0)),
        source.density(p + Vec3::new(0.0, 0.0, e)) - source.density(p - Vec3::new(0.0, 0.0, e)),
    );

    let length = gradient.length();
    if length > MIN_GRADIENT_LENGTH {
        -gradient / length
    } else {
        Vec3::Y
    }
}

/// Point on the edge `p0 -> p1` where density crosses `iso`
#[inline]
fn interpolate_edge(iso: f32, p0: Vec3, p1: Vec3, d0: f32, d1: f32) -> Vec3 {
    let delta = d1 - d0;
    let t = if delta.abs() > f32::EPSILON {
        ((iso - d0) / delta).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p0 + (p1 - p0) * t
}

#[inline]
fn corner_rank(corner: usize) -> i32 {
    let [x, y, z] = CORNER_OFFSETS[corner];
    x + y + z
}

/// Extract the iso-surface of a sampled region.
///
/// Triangles are wound counter-clockwise when seen from the air side.
/// Vertices are not shared between triangles. Output positions are in
/// world space.
pub fn polygonize<S: TerrainSource + ?Sized>(sampler: &RegionSampler<'_, S>) -> MeshData {
    let coord = sampler.coord();
    let origin = coord.world_origin();
    let source = sampler.source();
    let mut mesh = MeshData::new();

    let mut corner_density = [0.0f32; 8];
    let mut corner_pos = [Vec3::ZERO; 8];
    let mut edge_vertex = [Vec3::ZERO; 12];

    for x in 0..REGION_SIZE {
        for y in 0..REGION_HEIGHT {
            for z in 0..REGION_SIZE {
                let mut all_solid = true;
                let mut all_air = true;
                for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
                    let d = sampler.sample_at(x + offset[0], y + offset[1], z + offset[2]);
                    corner_density[i] = d;
                    all_solid &= d > ISO_LEVEL;
                    all_air &= d < ISO_LEVEL;
                }
                if all_solid || all_air {
                    continue;
                }

                let mut cube_index = 0usize;
                for (i, &d) in corner_density.iter().enumerate() {
                    if d < ISO_LEVEL {
                        cube_index |= 1 << i;
                    }
                }

                let edges = EDGE_TABLE[cube_index];
                if edges == 0 {
                    continue;
                }

                for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
                    corner_pos[i] = Vec3::new(
                        (x + offset[0]) as f32,
                        (y + offset[1]) as f32,
                        (z + offset[2]) as f32,
                    ) * VOXEL_SIZE;
                }

                for (e, &[a, b]) in EDGE_CORNERS.iter().enumerate() {
                    if edges & (1 << e) != 0 {
                        // Always walk from the lower corner so neighbouring
                        // regions produce identical seam vertices
                        let (a, b) = if corner_rank(a) > corner_rank(b) { (b, a) } else { (a, b) };
                        edge_vertex[e] = interpolate_edge(
                            ISO_LEVEL,
                            corner_pos[a],
                            corner_pos[b],
                            corner_density[a],
                            corner_density[b],
                        );
                    }
                }

                for tri in TRI_TABLE[cube_index].chunks_exact(3) {
                    if tri[0] < 0 {
                        break;
                    }
                    let mut ids = [0u32; 3];
                    for (k, &edge) in tri.iter().enumerate() {
                        let local = edge_vertex[edge as usize];
                        let world = origin + local;
                        let normal = surface_normal(source, world);
                        let color = source.surface_color(world);
                        ids[k] = mesh.push_vertex(local, normal, color);
                    }
                    // Table order faces into the ground; swap to face the air
                    mesh.push_triangle(ids[0], ids[2], ids[1]);
                }
            }
        }
    }

    mesh.translate(origin);

    log::trace!(
        "Region {} polygonized: {} triangles",
        coord,
        mesh.triangle_count()
    );
    mesh
}
