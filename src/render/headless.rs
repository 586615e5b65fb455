//! Renderer that keeps meshes in memory and counts work

use std::collections::HashMap;

use super::{DrawContext, MeshRenderer};
use crate::voxel::MeshData;

/// Handle returned by [`HeadlessRenderer::upload`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeadlessHandle(u64);

impl HeadlessHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug)]
struct ResidentMesh {
    triangles: usize,
    bytes: usize,
}

/// In-memory stand-in for a GPU backend
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_id: u64,
    resident: HashMap<u64, ResidentMesh>,
    uploads: u64,
    releases: u64,
    draw_calls: u64,
    triangles_drawn: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Meshes currently uploaded and not yet released
    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    pub fn resident_bytes(&self) -> usize {
        self.resident.values().map(|m| m.bytes).sum()
    }

    pub fn is_resident(&self, handle: &HeadlessHandle) -> bool {
        self.resident.contains_key(&handle.0)
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    pub fn releases(&self) -> u64 {
        self.releases
    }

    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    pub fn triangles_drawn(&self) -> u64 {
        self.triangles_drawn
    }

    /// Reset per-frame draw counters
    pub fn begin_frame(&mut self) {
        self.draw_calls = 0;
        self.triangles_drawn = 0;
    }
}

impl MeshRenderer for HeadlessRenderer {
    type Handle = HeadlessHandle;

    fn upload(&mut self, mesh: &MeshData) -> HeadlessHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.uploads += 1;
        self.resident.insert(
            id,
            ResidentMesh {
                triangles: mesh.triangle_count(),
                bytes: mesh.size_bytes(),
            },
        );
        HeadlessHandle(id)
    }

    fn draw(&mut self, handle: &HeadlessHandle, _ctx: &DrawContext) {
        match self.resident.get(&handle.0) {
            Some(mesh) => {
                self.draw_calls += 1;
                self.triangles_drawn += mesh.triangles as u64;
            }
            None => log::warn!("Draw with released handle {}", handle.0),
        }
    }

    fn release(&mut self, handle: HeadlessHandle) {
        if self.resident.remove(&handle.0).is_some() {
            self.releases += 1;
        } else {
            log::warn!("Double release of handle {}", handle.0);
        }
    }
}
