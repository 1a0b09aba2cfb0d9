//! The fixed-size node record stored in the octree arena and mirrored byte-for-byte into the
//! GPU storage buffer.

use super::octant::CHILDREN_PER_NODE;

/// One node of the flat octree.
///
/// `child_base < 0` marks a leaf (or a never-subdivided node). Otherwise `child_base` is the
/// arena index of the first of eight contiguous children.
///
/// # Memory Layout
/// - Type: u32 (4 bytes)
/// - Child base: i32 (4 bytes)
///
/// Total size: 8 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VoxelRecord {
    /// Voxel type of a leaf, 0 for empty space and interior nodes
    pub voxel_type: u32,
    /// Index of the first child, negative when there are none
    pub child_base: i32,
}

impl VoxelRecord {
    /// An unallocated, empty node.
    pub const EMPTY: VoxelRecord = VoxelRecord {
        voxel_type: 0,
        child_base: -1,
    };

    /// Index of the first child, if this node has been subdivided.
    pub fn child_base(&self) -> Option<usize> {
        usize::try_from(self.child_base).ok()
    }

    /// Arena index of the child in `octant`, if children exist.
    pub fn child(&self, octant: usize) -> Option<usize> {
        debug_assert!(octant < CHILDREN_PER_NODE);
        self.child_base().map(|base| base + octant)
    }

    /// A record keeps its block alive while it holds a type or owns children.
    pub fn is_in_use(&self) -> bool {
        self.voxel_type != 0 || self.child_base >= 0
    }
}

impl Default for VoxelRecord {
    fn default() -> Self {
        Self::EMPTY
    }
}
