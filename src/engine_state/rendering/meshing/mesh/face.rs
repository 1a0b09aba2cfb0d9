use cgmath::{Point3, Vector3};

use crate::engine_state::{
    rendering::vertex::{ColorVertex, Triangle},
    voxels::block::{block_side::BlockSide, VoxelTypeId},
};

/// A single unit quad on one side of a voxel.
///
/// The corners lie on the voxel's cell boundary `[p, p + 1)` and run lower-left, upper-left,
/// upper-right, lower-right, which is counter-clockwise when the face is seen from outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner in world space
    pub ll: Point3<i32>,
    /// Upper-left corner in world space
    pub ul: Point3<i32>,
    /// Upper-right corner in world space
    pub ur: Point3<i32>,
    /// Lower-right corner in world space
    pub lr: Point3<i32>,
    /// Type of the voxel this face belongs to
    pub voxel_type: VoxelTypeId,
    /// Which side of the voxel this face covers
    pub block_side: BlockSide,
}

/// Corner offsets from the voxel position, in `ll, ul, ur, lr` order.
fn corner_offsets(side: BlockSide) -> [Vector3<i32>; 4] {
    let v = Vector3::new;
    match side {
        BlockSide::FRONT => [v(0, 0, 0), v(0, 1, 0), v(1, 1, 0), v(1, 0, 0)],
        BlockSide::BACK => [v(0, 0, 1), v(1, 0, 1), v(1, 1, 1), v(0, 1, 1)],
        BlockSide::BOTTOM => [v(0, 0, 0), v(1, 0, 0), v(1, 0, 1), v(0, 0, 1)],
        BlockSide::TOP => [v(0, 1, 0), v(0, 1, 1), v(1, 1, 1), v(1, 1, 0)],
        BlockSide::LEFT => [v(0, 0, 0), v(0, 0, 1), v(0, 1, 1), v(0, 1, 0)],
        BlockSide::RIGHT => [v(1, 0, 0), v(1, 1, 0), v(1, 1, 1), v(1, 0, 1)],
    }
}

/// Flat debug color for each face direction.
pub fn side_color(side: BlockSide) -> [f32; 4] {
    match side {
        BlockSide::FRONT => [1.0, 0.0, 0.0, 1.0],
        BlockSide::BACK => [0.5, 0.5, 0.0, 1.0],
        BlockSide::BOTTOM => [0.0, 0.5, 0.5, 1.0],
        BlockSide::TOP => [0.0, 1.0, 0.0, 1.0],
        BlockSide::LEFT => [0.5, 0.0, 0.5, 1.0],
        BlockSide::RIGHT => [0.0, 0.0, 1.0, 1.0],
    }
}

impl Face {
    /// Creates the face on `block_side` of the voxel at `position` (global voxel coordinates).
    pub fn new(position: Point3<i32>, voxel_type: VoxelTypeId, block_side: BlockSide) -> Self {
        let [ll, ul, ur, lr] = corner_offsets(block_side).map(|offset| position + offset);
        Face {
            ll,
            ul,
            ur,
            lr,
            voxel_type,
            block_side,
        }
    }

    /// Splits the quad into `{ll, ul, lr}` and `{ul, ur, lr}`, keeping the winding.
    pub fn triangles(&self) -> [Triangle; 2] {
        let color = side_color(self.block_side);
        let a = ColorVertex::new(self.ll, color);
        let b = ColorVertex::new(self.ul, color);
        let c = ColorVertex::new(self.ur, color);
        let d = ColorVertex::new(self.lr, color);
        [Triangle::new(a, b, d), Triangle::new(b, c, d)]
    }
}
