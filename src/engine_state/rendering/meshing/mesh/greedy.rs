//! Face-culled meshing for the chunked field.
//!
//! Each of the six directions is swept over the whole window, layer by layer along the axis
//! the direction faces. A voxel emits one unit quad for that direction unless its neighbor
//! mask says the face is covered. No coplanar faces are merged; skipping covered faces is
//! the only reduction.

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::engine_state::voxels::{block::block_side::BlockSide, chunk::plane::Plane};

use super::{face::Face, mesh::ChunkMesh};

/// The order directions are swept in by [`Plane::generate_meshes`].
pub const SWEEP_ORDER: [BlockSide; 6] = [
    BlockSide::FRONT,
    BlockSide::BACK,
    BlockSide::LEFT,
    BlockSide::RIGHT,
    BlockSide::TOP,
    BlockSide::BOTTOM,
];

/// The two axes spanning a layer perpendicular to `axis`.
fn layer_axes(axis: usize) -> (usize, usize) {
    match axis {
        0 => (2, 1),
        1 => (0, 2),
        _ => (0, 1),
    }
}

impl Plane {
    /// Sweeps one face direction over the window and appends a quad to the owning chunk for
    /// every uncovered face. Returns the number of quads emitted.
    ///
    /// Neighbor masks must be current, see [`Plane::check_voxels`]. A voxel already checked
    /// in this direction is skipped, so repeating a sweep emits nothing new.
    pub fn sweep_face(&mut self, side: BlockSide) -> usize {
        let (min, max) = self.voxel_bounds();
        let axis = side.sweep_axis();
        let (u, v) = layer_axes(axis);

        let mut emitted = 0;
        for layer in min[axis]..max[axis] {
            for j in min[v]..max[v] {
                for i in min[u]..max[u] {
                    let mut position = Point3::new(0, 0, 0);
                    position[axis] = layer;
                    position[u] = i;
                    position[v] = j;

                    let Some((slot, local)) = self.locate(position.x, position.y, position.z)
                    else {
                        continue;
                    };
                    let chunk = &mut self.chunks_mut()[slot];
                    let voxel = &mut chunk.voxels[local];

                    let visited = voxel.is_checked(side);
                    voxel.checked |= side.bit();
                    if visited || voxel.has_neighbor(side) {
                        continue;
                    }

                    let face = Face::new(position, voxel.voxel_type, side);
                    chunk.triangles.extend(face.triangles());
                    emitted += 1;
                }
            }
        }
        emitted
    }

    /// Rebuilds neighbor masks, sweeps all six directions and hands back meshes for the
    /// chunks marked dirty since the last call.
    ///
    /// Every chunk's CPU triangle list is emptied and the dirty set is cleared, whether or not
    /// its mesh was returned.
    pub fn generate_meshes(&mut self) -> Vec<ChunkMesh> {
        if !self.needs_remesh() {
            return Vec::new();
        }

        let start = Instant::now();
        self.check_voxels();

        let mut quads = 0;
        for side in SWEEP_ORDER {
            quads += self.sweep_face(side);
        }

        let dirty = self.take_dirty();
        let mut meshes = Vec::new();
        for (slot, chunk) in self.chunks_mut().iter_mut().enumerate() {
            let triangles = std::mem::take(&mut chunk.triangles);
            if dirty[slot] {
                meshes.push(ChunkMesh::new(slot, chunk.position, triangles));
            }
        }

        debug!(
            "Meshed {} quads, {} of {} chunks dirty, took {:?}",
            quads,
            meshes.len(),
            dirty.len(),
            start.elapsed()
        );
        meshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_axes_exclude_the_sweep_axis() {
        for axis in 0..3 {
            let (u, v) = layer_axes(axis);
            assert_ne!(u, axis);
            assert_ne!(v, axis);
            assert_ne!(u, v);
        }
    }

    #[test]
    fn repeated_sweep_emits_nothing() {
        let mut plane = Plane::new([1, 1, 1], Point3::new(0, 0, 0)).unwrap();
        plane.set_voxel(4, 4, 4, 1).unwrap();
        plane.check_voxels();
        assert_eq!(plane.sweep_face(BlockSide::TOP), 1);
        assert_eq!(plane.sweep_face(BlockSide::TOP), 0);
    }

    #[test]
    fn clean_plane_skips_meshing() {
        let mut plane = Plane::new([1, 1, 1], Point3::new(0, 0, 0)).unwrap();
        assert!(plane.generate_meshes().len() == 1);
        assert!(plane.generate_meshes().is_empty());
    }
}
