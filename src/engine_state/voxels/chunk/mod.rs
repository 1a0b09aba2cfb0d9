//! # Chunk Module
//!
//! Fixed 10x10x10 blocks of voxels making up the chunked field. Each voxel carries two
//! six-bit masks next to its type:
//! - `neighbors`: which faces touch another non-empty voxel
//! - `checked`: which face directions a sweep has already visited
//!
//! Voxels are stored x-fastest: `index = x + y * W + z * W * H`.

use cgmath::{Point3, Vector3};

use super::block::{block_side::BlockSide, VoxelTypeId, EMPTY_VOXEL};
use crate::engine_state::rendering::vertex::Triangle;

pub mod plane;

/// Chunk width in voxels (x).
pub const CHUNK_WIDTH: i32 = 10;
/// Chunk height in voxels (y).
pub const CHUNK_HEIGHT: i32 = 10;
/// Chunk depth in voxels (z).
pub const CHUNK_DEPTH: i32 = 10;
/// Voxels in one chunk.
pub const CHUNK_VOLUME: usize = (CHUNK_WIDTH * CHUNK_HEIGHT * CHUNK_DEPTH) as usize;

/// Chunk extents as a vector, for per-axis arithmetic.
pub const CHUNK_EXTENT: Vector3<i32> = Vector3 {
    x: CHUNK_WIDTH,
    y: CHUNK_HEIGHT,
    z: CHUNK_DEPTH,
};

/// A single voxel of the chunked field.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkVoxel {
    /// Face bits set where an adjacent voxel is non-empty
    pub neighbors: u8,
    /// Face bits set once a sweep in that direction has visited this voxel
    pub checked: u8,
    /// Voxel type, [`EMPTY_VOXEL`] for air
    pub voxel_type: VoxelTypeId,
}

impl ChunkVoxel {
    /// Whether the voxel holds nothing.
    pub fn is_empty(&self) -> bool {
        self.voxel_type == EMPTY_VOXEL
    }

    /// Whether the face on `side` is covered by a non-empty neighbor.
    pub fn has_neighbor(&self, side: BlockSide) -> bool {
        self.neighbors & side.bit() != 0
    }

    /// Whether a sweep in direction `side` has visited this voxel.
    pub fn is_checked(&self, side: BlockSide) -> bool {
        self.checked & side.bit() != 0
    }
}

/// A 10x10x10 block of voxels plus the triangles gathered for it by the last sweep.
#[derive(Debug)]
pub struct Chunk {
    /// Position of this chunk in chunk coordinates
    pub position: Point3<i32>,
    /// Voxel storage in x-fastest order
    pub voxels: Vec<ChunkVoxel>,
    /// Triangles emitted by face sweeps since the last mesh generation
    pub triangles: Vec<Triangle>,
}

impl Chunk {
    /// Creates an all-empty chunk at `position` (chunk coordinates).
    pub fn new(position: Point3<i32>) -> Self {
        Self {
            position,
            voxels: vec![ChunkVoxel::default(); CHUNK_VOLUME],
            triangles: Vec::new(),
        }
    }

    /// Global voxel coordinate of this chunk's (0, 0, 0) corner.
    pub fn origin(&self) -> Point3<i32> {
        Point3::new(
            self.position.x * CHUNK_WIDTH,
            self.position.y * CHUNK_HEIGHT,
            self.position.z * CHUNK_DEPTH,
        )
    }

    /// Storage index of a chunk-local coordinate.
    ///
    /// # Panics
    /// Debug builds assert that the coordinate lies inside the chunk.
    pub fn local_index(x: i32, y: i32, z: i32) -> usize {
        debug_assert!((0..CHUNK_WIDTH).contains(&x));
        debug_assert!((0..CHUNK_HEIGHT).contains(&y));
        debug_assert!((0..CHUNK_DEPTH).contains(&z));
        (x + y * CHUNK_WIDTH + z * CHUNK_WIDTH * CHUNK_HEIGHT) as usize
    }

    /// Voxel at a chunk-local coordinate.
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> &ChunkVoxel {
        &self.voxels[Self::local_index(x, y, z)]
    }

    /// Number of non-empty voxels in this chunk.
    pub fn count_typed_voxels(&self) -> u32 {
        self.voxels.iter().filter(|voxel| !voxel.is_empty()).count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_index_is_x_fastest() {
        assert_eq!(Chunk::local_index(0, 0, 0), 0);
        assert_eq!(Chunk::local_index(1, 0, 0), 1);
        assert_eq!(Chunk::local_index(0, 1, 0), CHUNK_WIDTH as usize);
        assert_eq!(
            Chunk::local_index(0, 0, 1),
            (CHUNK_WIDTH * CHUNK_HEIGHT) as usize
        );
        assert_eq!(Chunk::local_index(9, 9, 9), CHUNK_VOLUME - 1);
    }

    #[test]
    fn origin_scales_by_extent() {
        let chunk = Chunk::new(Point3::new(-1, 2, 0));
        assert_eq!(chunk.origin(), Point3::new(-10, 20, 0));
        assert_eq!(chunk.count_typed_voxels(), 0);
    }
}
