//! Rendering seam: mesh upload, per-frame draw and release

pub mod headless;
pub use headless::{HeadlessHandle, HeadlessRenderer};

use crate::core::{Mat4, Vec3};
use crate::voxel::MeshData;

/// Per-frame draw parameters shared by every region
#[derive(Clone, Copy, Debug)]
pub struct DrawContext {
    pub view_projection: Mat4,
    pub viewer_position: Vec3,
    /// Direction light travels in (unit length)
    pub light_direction: Vec3,
}

impl DrawContext {
    pub fn new(view_projection: Mat4, viewer_position: Vec3) -> Self {
        Self {
            view_projection,
            viewer_position,
            light_direction: Vec3::new(-0.7, -0.7, -0.7).normalize(),
        }
    }
}

/// Backend that owns GPU-side (or stand-in) mesh resources.
///
/// Only the integration thread talks to the renderer, so implementations
/// need not be thread safe.
pub trait MeshRenderer {
    /// Opaque reference to an uploaded mesh
    type Handle;

    /// Upload a finished mesh and return a handle to it
    fn upload(&mut self, mesh: &MeshData) -> Self::Handle;

    /// Draw a previously uploaded mesh
    fn draw(&mut self, handle: &Self::Handle, ctx: &DrawContext);

    /// Free the resources behind a handle
    fn release(&mut self, handle: Self::Handle);
}
