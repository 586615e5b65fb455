//! Triangle mesh data produced by region generation

use std::time::Duration;

use bytemuck::{Pod, Zeroable};

use crate::core::Vec3;
use crate::math::Aabb;
use super::density::DensityField;
use super::region::RegionCoord;

/// Interleaved vertex layout for uploading (must match shader input)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    /// World position (12 bytes, offset 0)
    pub position: [f32; 3],
    /// Unit normal (12 bytes, offset 12)
    pub normal: [f32; 3],
    /// Linear RGB color (12 bytes, offset 24)
    pub color: [f32; 3],
}

/// Indexed triangle list with per-vertex normal and color.
///
/// `positions`, `normals` and `colors` always have the same length.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            colors: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(vertices),
        }
    }

    /// Append one vertex, returning its index
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, color: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        self.colors.push(color);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Shift every position by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Tight bounds of the vertex positions
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.positions)
    }

    /// Vertices in the interleaved upload layout
    pub fn interleaved(&self) -> Vec<TerrainVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.colors)
            .map(|((p, n), c)| TerrainVertex {
                position: p.to_array(),
                normal: n.to_array(),
                color: c.to_array(),
            })
            .collect()
    }

    /// Index buffer as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Approximate heap size of the mesh in bytes
    pub fn size_bytes(&self) -> usize {
        self.positions.len() * std::mem::size_of::<TerrainVertex>()
            + self.indices.len() * std::mem::size_of::<u32>()
    }
}

/// Finished output of generating one region, handed from a worker to the
/// integration thread.
#[derive(Debug)]
pub struct MeshPackage {
    pub coord: RegionCoord,
    pub mesh: MeshData,
    pub has_geometry: bool,
    /// Sampled density grid, kept only when requested
    pub density: Option<DensityField>,
    /// Wall time spent generating
    pub build_time: Duration,
}

impl MeshPackage {
    pub fn new(coord: RegionCoord, mesh: MeshData) -> Self {
        let has_geometry = !mesh.is_empty();
        Self {
            coord,
            mesh,
            has_geometry,
            density: None,
            build_time: Duration::ZERO,
        }
    }
}
