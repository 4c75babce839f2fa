use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::world::coord::Coord3;

/// Vertex layout handed to the renderer: chunk-local position, outward face
/// normal, material id.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub material: u32,
}

/// Borrowed view over the valid prefix of a mesher's scratch buffers.
#[derive(Debug, Clone, Copy)]
pub struct MeshView<'a> {
    pub vertices: &'a [Vertex],
    pub indices: &'a [u32],
}

impl<'a> MeshView<'a> {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn vertex_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.vertices)
    }

    pub fn index_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.indices)
    }
}

/// Rendering backend. It copies what it needs out of the view during
/// `upload` and owns the GPU resources from then on.
pub trait Renderer {
    type Handle;

    /// Creates a drawable for the chunk at `coord`, placed at `origin`.
    fn upload(&mut self, coord: Coord3, origin: Vec3, mesh: &MeshView<'_>) -> Self::Handle;

    fn release(&mut self, handle: Self::Handle);
}
