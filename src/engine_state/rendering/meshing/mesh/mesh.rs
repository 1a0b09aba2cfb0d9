//! CPU-side chunk meshes waiting to be uploaded.

use cgmath::Point3;

use crate::engine_state::rendering::vertex::{ColorVertex, Triangle};

/// The triangles gathered for one chunk, tagged with the window slot they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMesh {
    /// Slot of the chunk inside its plane
    pub slot: usize,
    /// Chunk coordinate
    pub position: Point3<i32>,
    /// Triangle list in world space
    pub triangles: Vec<Triangle>,
}

impl ChunkMesh {
    /// Wraps a finished triangle list.
    pub fn new(slot: usize, position: Point3<i32>, triangles: Vec<Triangle>) -> Self {
        Self {
            slot,
            position,
            triangles,
        }
    }

    /// Number of vertices a non-indexed draw needs.
    pub fn vertex_count(&self) -> u32 {
        (self.triangles.len() * 3) as u32
    }

    /// Number of quads, two triangles each.
    pub fn quad_count(&self) -> usize {
        self.triangles.len() / 2
    }

    /// Whether the chunk produced no geometry.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The triangle list as a flat vertex slice.
    pub fn vertices(&self) -> &[ColorVertex] {
        bytemuck::cast_slice(&self.triangles)
    }
}
