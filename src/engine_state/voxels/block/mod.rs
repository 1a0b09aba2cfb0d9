//! # Block Module
//!
//! Voxel type identifiers and the six face directions shared by both volume
//! representations.

pub mod block_side;

/// Integer type used for voxel type ids on the edit surface.
///
/// Zero is reserved for empty space. The octree widens this to `u32` inside its GPU-visible
/// records; the chunked field stores it as-is.
pub type VoxelTypeId = u16;

/// The reserved "nothing here" type id.
pub const EMPTY_VOXEL: VoxelTypeId = 0;
