//! # Block Side Module
//!
//! The six axis-aligned face directions of a voxel. Each direction owns one bit in the
//! per-voxel neighbor and checked masks used by face culling.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel.
///
/// The discriminant doubles as the bit index in occupancy masks, so the order
/// [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT] is load-bearing.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing negative Z)
    FRONT = 0,

    /// The back face (facing positive Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

/// Mask with every direction bit set.
pub const ALL_SIDES_MASK: u8 = 0b11_1111;

impl BlockSide {
    /// Returns all six faces in discriminant order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The bit this side owns in neighbor and checked masks.
    pub fn bit(self) -> u8 {
        1 << self as u8
    }

    /// The face on the other side of a shared boundary.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    /// Unit step from a voxel to its neighbor across this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, -1),
            BlockSide::BACK => Vector3::new(0, 0, 1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Index of the axis a sweep over this face advances along (0 = x, 1 = y, 2 = z).
    pub fn sweep_axis(self) -> usize {
        match self {
            BlockSide::LEFT | BlockSide::RIGHT => 0,
            BlockSide::BOTTOM | BlockSide::TOP => 1,
            BlockSide::FRONT | BlockSide::BACK => 2,
        }
    }
}
