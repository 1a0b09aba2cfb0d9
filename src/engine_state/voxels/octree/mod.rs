//! # Sparse Voxel Octree
//!
//! A cubic volume of typed voxels stored as a flat arena of [`VoxelRecord`]s. Index 0 is the
//! root. Every subdivided node owns eight contiguous children starting at its `child_base`,
//! and blocks are handed out from a bump `cursor`.
//!
//! ## Key Components
//!
//! * [`SparseOctree`] - The arena, its cursor, and the edit operations
//! * [`VoxelRecord`] - The 8-byte node record, identical on CPU and GPU
//! * [`octant`] - Octant classification and the node-count bound
//!
//! ## Editing
//!
//! Insertion descends from the root, allocating child blocks lazily. Removal descends the same
//! way (tunnelling through sparse regions by allocating empty blocks), clears the leaf, then
//! walks back up collapsing every child block that no longer holds anything. Collapsing
//! shifts all later records down by one block and rewrites the child pointers that pointed
//! past the hole, so the arena stays dense and traversal never follows a stale index.
//!
//! ## Performance Considerations
//!
//! * Lookups and insertions are O(log size)
//! * A removal that prunes is O(cursor) because of the shift and pointer fix-up
//! * The arena is sized once to the worst-case node count and never reallocates

use cgmath::Vector3;
use log::{debug, info};

use crate::error::{OctreeError, OctreeResult};

use super::{
    block::{VoxelTypeId, EMPTY_VOXEL},
    generation::PopulationPattern,
};

pub mod octant;
mod voxel_record;

use octant::{child_center, max_node_count, octant_of, CHILDREN_PER_NODE};
pub use voxel_record::VoxelRecord;

/// Index of the root record.
pub const ROOT_INDEX: usize = 0;

/// A sparse voxel octree over a cube of edge `size`.
///
/// # Examples
///
/// ```
/// use octree_voxel_engine::SparseOctree;
///
/// let mut octree = SparseOctree::new(4).unwrap();
/// octree.add_voxel(0, 0, 0, 5).unwrap();
/// assert_eq!(octree.voxel_at(0, 0, 0), 5);
/// assert_eq!(octree.count_typed_voxels(), 1);
/// ```
#[derive(Debug)]
pub struct SparseOctree {
    /// Flat node arena sized to the worst-case node count
    voxels: Vec<VoxelRecord>,
    /// Edge length of the volume, a power of two
    size: u32,
    /// Midpoint of the root node in voxel coordinates
    center: Vector3<f32>,
    /// Next free child-block index
    cursor: usize,
    /// Content changed since the last full GPU upload
    updated: bool,
    /// A full upload happened that the renderer has not yet observed
    changed: bool,
}

impl SparseOctree {
    /// Creates an empty octree for a cube of edge `size`.
    ///
    /// # Errors
    /// * [`OctreeError::InvalidSize`] if `size` is zero, not a power of two, or too large for
    ///   32-bit child pointers
    /// * [`OctreeError::Allocation`] if the arena cannot be reserved
    pub fn new(size: u32) -> OctreeResult<Self> {
        let capacity = max_node_count(size)
            .filter(|&capacity| capacity <= i32::MAX as usize)
            .ok_or(OctreeError::InvalidSize(size))?;

        let mut voxels = Vec::new();
        voxels
            .try_reserve_exact(capacity)
            .map_err(|_| OctreeError::Allocation {
                requested: capacity,
            })?;
        voxels.resize(capacity, VoxelRecord::EMPTY);

        let midpoint = (size as f32 - 1.0) / 2.0;

        info!(
            "Created octree of size {} with {} node records ({} bytes)",
            size,
            capacity,
            capacity * std::mem::size_of::<VoxelRecord>()
        );

        Ok(Self {
            voxels,
            size,
            center: Vector3::new(midpoint, midpoint, midpoint),
            cursor: ROOT_INDEX + 1,
            updated: true,
            changed: false,
        })
    }

    /// Fills the volume cell by cell from `pattern`, returning how many cells were set.
    pub fn populate(
        &mut self,
        pattern: &PopulationPattern,
        rng: &mut fastrand::Rng,
    ) -> OctreeResult<u32> {
        let mut sampler = pattern.sampler(rng);
        let mut filled = 0;
        for z in 0..self.size {
            for y in 0..self.size {
                for x in 0..self.size {
                    let voxel_type = sampler.sample(x as i32, y as i32, z as i32);
                    if voxel_type != EMPTY_VOXEL {
                        self.add_voxel(x, y, z, voxel_type)?;
                        filled += 1;
                    }
                }
            }
        }
        info!(
            "Populated octree with {} voxels, cursor at {}",
            filled, self.cursor
        );
        Ok(filled)
    }

    /// Writes `voxel_type` into the leaf at `(x, y, z)`, subdividing on the way down.
    ///
    /// A type of [`EMPTY_VOXEL`] is treated as a removal so the tree never keeps empty
    /// branches alive.
    pub fn add_voxel(
        &mut self,
        x: u32,
        y: u32,
        z: u32,
        voxel_type: VoxelTypeId,
    ) -> OctreeResult<()> {
        if voxel_type == EMPTY_VOXEL {
            return self.remove_voxel(x, y, z);
        }
        self.check_bounds(x, y, z)?;

        let leaf = self.descend_allocating(x, y, z, None)?;
        self.voxels[leaf].voxel_type = u32::from(voxel_type);
        self.updated = true;
        Ok(())
    }

    /// Clears the leaf at `(x, y, z)` and collapses every ancestor block left empty.
    ///
    /// Removing a voxel that was never set leaves the tree exactly as it was.
    pub fn remove_voxel(&mut self, x: u32, y: u32, z: u32) -> OctreeResult<()> {
        self.check_bounds(x, y, z)?;

        let mut branch = Vec::with_capacity(self.size.trailing_zeros() as usize);
        let leaf = self.descend_allocating(x, y, z, Some(&mut branch))?;
        self.voxels[leaf].voxel_type = 0;
        self.updated = true;

        let mut pruned = 0;
        for &parent in branch.iter().rev() {
            let Some(base) = self.voxels[parent].child_base() else {
                break;
            };
            if self.voxels[base..base + CHILDREN_PER_NODE]
                .iter()
                .any(VoxelRecord::is_in_use)
            {
                break;
            }
            self.collapse_block(parent, base);
            pruned += 1;
        }

        if pruned > 0 {
            debug!(
                "Removed ({}, {}, {}): pruned {} blocks, cursor now {}",
                x, y, z, pruned, self.cursor
            );
        }
        Ok(())
    }

    /// Type stored at `(x, y, z)`; cells never written and cells outside the volume read as
    /// [`EMPTY_VOXEL`].
    pub fn voxel_at(&self, x: u32, y: u32, z: u32) -> VoxelTypeId {
        if self.check_bounds(x, y, z).is_err() {
            return EMPTY_VOXEL;
        }

        let target = Vector3::new(x as f32, y as f32, z as f32);
        let mut node = ROOT_INDEX;
        let mut center = self.center;
        let mut extent = self.size;

        while extent > 1 {
            let octant = octant_of(target - center);
            let Some(child) = self.voxels[node].child(octant) else {
                return EMPTY_VOXEL;
            };
            node = child;
            center = child_center(center, octant, extent);
            extent /= 2;
        }

        self.voxels[node].voxel_type as VoxelTypeId
    }

    /// Number of live records holding a non-empty type.
    pub fn count_typed_voxels(&self) -> u32 {
        self.voxels[..self.cursor]
            .iter()
            .filter(|record| record.voxel_type != 0)
            .count() as u32
    }

    /// Edge length of the volume.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Midpoint of the root node.
    pub fn center(&self) -> Vector3<f32> {
        self.center
    }

    /// Next free child-block index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total records in the arena, live or not.
    pub fn capacity(&self) -> usize {
        self.voxels.len()
    }

    /// The whole arena as it should appear on the GPU.
    pub fn records(&self) -> &[VoxelRecord] {
        &self.voxels
    }

    /// Whether content changed since the last full upload.
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// Starts a full upload if content changed, raising the renderer-facing `changed` flag.
    ///
    /// The content flag stays set until [`SparseOctree::confirm_upload`], so an upload that
    /// fails is staged again on the next frame.
    pub fn stage_upload(&mut self) -> bool {
        if self.updated {
            self.changed = true;
        }
        self.updated
    }

    /// Marks the staged upload as written.
    pub fn confirm_upload(&mut self) {
        self.updated = false;
    }

    /// Reads and clears the renderer-facing change latch.
    pub fn check_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn check_bounds(&self, x: u32, y: u32, z: u32) -> OctreeResult<()> {
        if x >= self.size || y >= self.size || z >= self.size {
            return Err(OctreeError::OutOfBounds {
                x,
                y,
                z,
                size: self.size,
            });
        }
        Ok(())
    }

    /// Walks from the root to the leaf for `(x, y, z)`, subdividing any node without
    /// children. Every interior node visited is pushed onto `branch` when one is given.
    fn descend_allocating(
        &mut self,
        x: u32,
        y: u32,
        z: u32,
        mut branch: Option<&mut Vec<usize>>,
    ) -> OctreeResult<usize> {
        let target = Vector3::new(x as f32, y as f32, z as f32);
        let mut node = ROOT_INDEX;
        let mut center = self.center;
        let mut extent = self.size;

        while extent > 1 {
            if let Some(branch) = branch.as_deref_mut() {
                branch.push(node);
            }

            let octant = octant_of(target - center);
            let base = match self.voxels[node].child_base() {
                Some(base) => base,
                None => {
                    let base = self.allocate_block()?;
                    self.voxels[node].child_base = base as i32;
                    base
                }
            };
            debug_assert!(base + CHILDREN_PER_NODE <= self.cursor);

            node = base + octant;
            center = child_center(center, octant, extent);
            extent /= 2;
        }

        Ok(node)
    }

    fn allocate_block(&mut self) -> OctreeResult<usize> {
        let base = self.cursor;
        let end = base + CHILDREN_PER_NODE;
        if end > self.voxels.len() {
            return Err(OctreeError::CapacityExhausted {
                cursor: self.cursor,
                capacity: self.voxels.len(),
            });
        }
        self.voxels[base..end].fill(VoxelRecord::EMPTY);
        self.cursor = end;
        Ok(base)
    }

    /// Splices the child block at `base` out of the arena and detaches it from `parent`.
    fn collapse_block(&mut self, parent: usize, base: usize) {
        // Blocks are only ever handed out below the nodes that own them.
        debug_assert!(parent < base);
        debug_assert!(base + CHILDREN_PER_NODE <= self.cursor);

        self.voxels
            .copy_within(base + CHILDREN_PER_NODE..self.cursor, base);
        self.cursor -= CHILDREN_PER_NODE;
        self.voxels[self.cursor..self.cursor + CHILDREN_PER_NODE].fill(VoxelRecord::EMPTY);
        self.voxels[parent].child_base = -1;

        let hole = base as i32;
        for record in &mut self.voxels[..self.cursor] {
            if record.child_base > hole {
                record.child_base -= CHILDREN_PER_NODE as i32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two_sizes() {
        assert!(matches!(
            SparseOctree::new(3),
            Err(OctreeError::InvalidSize(3))
        ));
        assert!(matches!(
            SparseOctree::new(0),
            Err(OctreeError::InvalidSize(0))
        ));
    }

    #[test]
    fn fresh_tree_is_flagged_for_upload() {
        let mut octree = SparseOctree::new(8).unwrap();
        assert_eq!(octree.cursor(), 1);
        assert!(!octree.check_changed());
        assert!(octree.stage_upload());
        assert!(octree.check_changed());
        assert!(!octree.check_changed());

        // Unconfirmed uploads are staged again.
        assert!(octree.stage_upload());
        octree.confirm_upload();
        assert!(!octree.stage_upload());
        assert!(!octree.check_changed());
    }

    #[test]
    fn child_pointers_stay_inside_the_live_region() {
        let mut octree = SparseOctree::new(8).unwrap();
        let cells = [(0, 0, 0), (7, 7, 7), (3, 4, 5), (1, 6, 2), (6, 1, 6)];
        for &(x, y, z) in &cells {
            octree.add_voxel(x, y, z, 1).unwrap();
        }
        octree.remove_voxel(7, 7, 7).unwrap();
        octree.remove_voxel(0, 0, 0).unwrap();

        let cursor = octree.cursor();
        for record in &octree.records()[..cursor] {
            if let Some(base) = record.child_base() {
                assert!(base + CHILDREN_PER_NODE <= cursor);
                assert_eq!((base - 1) % CHILDREN_PER_NODE, 0);
            }
        }
        assert!(octree.records()[cursor..]
            .iter()
            .all(|record| *record == VoxelRecord::EMPTY));
        assert_eq!(octree.voxel_at(3, 4, 5), 1);
        assert_eq!(octree.voxel_at(1, 6, 2), 1);
        assert_eq!(octree.voxel_at(6, 1, 6), 1);
    }

    #[test]
    fn volume_of_one_is_a_single_leaf() {
        let mut octree = SparseOctree::new(1).unwrap();
        octree.add_voxel(0, 0, 0, 9).unwrap();
        assert_eq!(octree.cursor(), 1);
        assert_eq!(octree.voxel_at(0, 0, 0), 9);
        octree.remove_voxel(0, 0, 0).unwrap();
        assert_eq!(octree.count_typed_voxels(), 0);
    }
}
