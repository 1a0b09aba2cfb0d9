//! Mesh generation and upload for the chunked field.
//!
//! # Architecture
//! - `mesh/`: face culling sweeps that turn voxels into per-chunk triangle lists
//! - [`MeshManager`]: owns one vertex buffer per non-empty chunk and remembers how many
//!   vertices each holds
//! - [`MeshingRenderer`]: the render pipeline that draws those buffers
//!
//! Only chunks reported dirty by [`Plane::generate_meshes`] are re-uploaded. A chunk whose
//! mesh became empty has its buffer dropped rather than kept at zero length.
//!
//! [`Plane::generate_meshes`]: crate::engine_state::voxels::chunk::plane::Plane::generate_meshes

use log::debug;
use wgpu::util::BufferInitDescriptor;

mod mesh;
mod renderer;

pub use mesh::*;
pub use renderer::*;

use crate::{core::StResource, engine_state::buffer_state::BufferState};

/// Name of the vertex buffer holding the mesh of the chunk in `slot`.
pub fn chunk_buffer_name(slot: usize) -> String {
    format!("chunk_mesh_{}", slot)
}

/// Tracks which chunks have geometry on the GPU.
pub struct MeshManager {
    buffer_state: StResource<BufferState>,
    vertex_counts: Vec<u32>,
}

impl MeshManager {
    /// Creates a manager for a window of `chunk_count` chunks, none of them uploaded yet.
    pub fn new(buffer_state: StResource<BufferState>, chunk_count: usize) -> Self {
        Self {
            buffer_state,
            vertex_counts: vec![0; chunk_count],
        }
    }

    /// Replaces the GPU mesh of every chunk in `meshes`. Returns how many buffers now hold
    /// geometry after the upload.
    pub fn upload(&mut self, meshes: Vec<ChunkMesh>) -> usize {
        if meshes.is_empty() {
            return self.live_buffers();
        }

        let mut buffer_state = self.buffer_state.get_mut();
        for mesh in &meshes {
            let Some(count) = self.vertex_counts.get_mut(mesh.slot) else {
                continue;
            };
            let name = chunk_buffer_name(mesh.slot);

            if mesh.is_empty() {
                buffer_state.remove_buffer(&name);
                *count = 0;
                continue;
            }

            buffer_state.create_buffer_init(
                name.as_str(),
                BufferInitDescriptor {
                    label: Some(&name),
                    contents: bytemuck::cast_slice(mesh.vertices()),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                },
            );
            *count = mesh.vertex_count();
        }
        drop(buffer_state);

        debug!(
            "Uploaded {} chunk meshes, {} chunks with geometry",
            meshes.len(),
            self.live_buffers()
        );
        self.live_buffers()
    }

    /// Vertex count currently on the GPU for `slot`.
    pub fn vertex_count(&self, slot: usize) -> u32 {
        self.vertex_counts.get(slot).copied().unwrap_or(0)
    }

    /// Slots with geometry, paired with their vertex counts.
    pub fn draw_list(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.vertex_counts
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, count)| count > 0)
    }

    fn live_buffers(&self) -> usize {
        self.draw_list().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_names_are_unique_per_slot() {
        assert_eq!(chunk_buffer_name(0), "chunk_mesh_0");
        assert_ne!(chunk_buffer_name(1), chunk_buffer_name(11));
    }
}
