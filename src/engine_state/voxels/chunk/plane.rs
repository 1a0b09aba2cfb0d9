//! # Plane
//!
//! A fixed window of chunks centred on one chunk. The window is odd-sized on every axis, so
//! the centre chunk sits exactly in the middle.
//!
//! Global voxel coordinates resolve to a chunk by floor division by the chunk extent. The
//! remainder gives the voxel inside that chunk. Coordinates whose chunk falls outside the
//! window resolve to nothing: [`Plane::get_voxel`] returns `None` and callers treat it as
//! "no neighbor".
//!
//! Edits mark the touched chunk dirty, plus any chunk across a face the voxel shares, so mesh
//! regeneration can skip uploads for chunks whose geometry cannot have changed.

use bitvec::vec::BitVec;
use cgmath::{Point3, Vector3};
use log::debug;

use super::{Chunk, ChunkVoxel, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::{
    engine_state::voxels::{
        block::{
            block_side::{BlockSide, ALL_SIDES_MASK},
            VoxelTypeId, EMPTY_VOXEL,
        },
        generation::PopulationPattern,
    },
    error::{FieldError, FieldResult},
};

/// A window of chunks forming the chunked voxel field.
pub struct Plane {
    /// Chunks in x-fastest order over the window
    chunks: Vec<Chunk>,
    /// Chunk counts per axis
    window: [u32; 3],
    /// Chunk coordinate at the middle of the window
    center_chunk: Point3<i32>,
    /// Chunk coordinate of the window's minimum corner
    min_chunk: Point3<i32>,
    /// One bit per chunk, set when its mesh must be re-uploaded
    dirty: BitVec,
}

impl Plane {
    /// Builds an empty window of `window` chunks centred on `center_chunk`.
    ///
    /// # Errors
    /// [`FieldError::InvalidWindow`] when any dimension is zero or even.
    pub fn new(window: [u32; 3], center_chunk: Point3<i32>) -> FieldResult<Self> {
        if window.iter().any(|&n| n == 0 || n % 2 == 0) {
            return Err(FieldError::InvalidWindow(window));
        }

        let half = Vector3::new(
            (window[0] / 2) as i32,
            (window[1] / 2) as i32,
            (window[2] / 2) as i32,
        );
        let min_chunk = center_chunk - half;

        let mut chunks = Vec::with_capacity((window[0] * window[1] * window[2]) as usize);
        for z in 0..window[2] as i32 {
            for y in 0..window[1] as i32 {
                for x in 0..window[0] as i32 {
                    chunks.push(Chunk::new(min_chunk + Vector3::new(x, y, z)));
                }
            }
        }

        let dirty = BitVec::repeat(true, chunks.len());

        Ok(Self {
            chunks,
            window,
            center_chunk,
            min_chunk,
            dirty,
        })
    }

    /// Fills every loaded voxel from `pattern`, returning how many became non-empty.
    pub fn populate(&mut self, pattern: &PopulationPattern, rng: &mut fastrand::Rng) -> u32 {
        let mut sampler = pattern.sampler(rng);
        let mut filled = 0;
        for chunk in &mut self.chunks {
            let origin = chunk.origin();
            for z in 0..CHUNK_DEPTH {
                for y in 0..CHUNK_HEIGHT {
                    for x in 0..CHUNK_WIDTH {
                        let voxel_type = sampler.sample(origin.x + x, origin.y + y, origin.z + z);
                        chunk.voxels[Chunk::local_index(x, y, z)].voxel_type = voxel_type;
                        if voxel_type != EMPTY_VOXEL {
                            filled += 1;
                        }
                    }
                }
            }
        }
        self.dirty.fill(true);
        filled
    }

    /// Resolves a global coordinate to `(chunk slot, voxel index)` inside the window.
    pub fn locate(&self, x: i32, y: i32, z: i32) -> Option<(usize, usize)> {
        let chunk = Point3::new(
            x.div_euclid(CHUNK_WIDTH),
            y.div_euclid(CHUNK_HEIGHT),
            z.div_euclid(CHUNK_DEPTH),
        );
        let slot = self.chunk_slot(chunk)?;
        let local = Chunk::local_index(
            x.rem_euclid(CHUNK_WIDTH),
            y.rem_euclid(CHUNK_HEIGHT),
            z.rem_euclid(CHUNK_DEPTH),
        );
        Some((slot, local))
    }

    fn chunk_slot(&self, chunk: Point3<i32>) -> Option<usize> {
        let relative = chunk - self.min_chunk;
        let [w, h, d] = self.window.map(|n| n as i32);
        if !(0..w).contains(&relative.x)
            || !(0..h).contains(&relative.y)
            || !(0..d).contains(&relative.z)
        {
            return None;
        }
        Some((relative.x + relative.y * w + relative.z * w * h) as usize)
    }

    /// Voxel at a global coordinate, `None` outside the loaded window.
    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> Option<&ChunkVoxel> {
        let (slot, local) = self.locate(x, y, z)?;
        Some(&self.chunks[slot].voxels[local])
    }

    /// Sets the type at a global coordinate and marks affected chunks dirty.
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, voxel_type: VoxelTypeId) -> FieldResult<()> {
        let (slot, local) = self
            .locate(x, y, z)
            .ok_or(FieldError::OutOfWindow { x, y, z })?;

        let voxel = &mut self.chunks[slot].voxels[local];
        if voxel.voxel_type == voxel_type {
            return Ok(());
        }
        voxel.voxel_type = voxel_type;

        self.dirty.set(slot, true);
        for side in BlockSide::all() {
            let step = side.offset();
            if let Some((neighbor_slot, _)) = self.locate(x + step.x, y + step.y, z + step.z) {
                self.dirty.set(neighbor_slot, true);
            }
        }
        Ok(())
    }

    /// Recomputes every voxel's neighbor mask from scratch and clears the checked masks.
    ///
    /// Empty voxels get every bit set in both masks so no sweep ever emits for them. Each
    /// adjacent pair of non-empty voxels marks the shared face on both sides.
    pub fn check_voxels(&mut self) {
        for voxel in self.chunks.iter_mut().flat_map(|chunk| chunk.voxels.iter_mut()) {
            let mask = if voxel.is_empty() { ALL_SIDES_MASK } else { 0 };
            voxel.neighbors = mask;
            voxel.checked = mask;
        }

        let (min, max) = self.voxel_bounds();
        let mut links = 0usize;
        for z in min.z..max.z {
            for y in min.y..max.y {
                for x in min.x..max.x {
                    let Some((slot, local)) = self.locate(x, y, z) else {
                        continue;
                    };
                    if self.chunks[slot].voxels[local].is_empty() {
                        continue;
                    }

                    for side in BlockSide::all() {
                        let step = side.offset();
                        let Some((neighbor_slot, neighbor_local)) =
                            self.locate(x + step.x, y + step.y, z + step.z)
                        else {
                            continue;
                        };
                        if self.chunks[neighbor_slot].voxels[neighbor_local].is_empty() {
                            continue;
                        }
                        self.chunks[slot].voxels[local].neighbors |= side.bit();
                        self.chunks[neighbor_slot].voxels[neighbor_local].neighbors |=
                            side.opposite().bit();
                        links += 1;
                    }
                }
            }
        }
        debug!("Neighbor pass linked {} voxel faces", links);
    }

    /// Inclusive minimum and exclusive maximum global voxel coordinates of the window.
    pub fn voxel_bounds(&self) -> (Point3<i32>, Point3<i32>) {
        let min = Point3::new(
            self.min_chunk.x * CHUNK_WIDTH,
            self.min_chunk.y * CHUNK_HEIGHT,
            self.min_chunk.z * CHUNK_DEPTH,
        );
        let [w, h, d] = self.extent().map(|n| n as i32);
        (min, min + Vector3::new(w, h, d))
    }

    /// Window size in voxels per axis.
    pub fn extent(&self) -> [u32; 3] {
        [
            self.window[0] * CHUNK_WIDTH as u32,
            self.window[1] * CHUNK_HEIGHT as u32,
            self.window[2] * CHUNK_DEPTH as u32,
        ]
    }

    /// Chunk counts per axis.
    pub fn window(&self) -> [u32; 3] {
        self.window
    }

    /// Chunk coordinate the window is centred on.
    pub fn center_chunk(&self) -> Point3<i32> {
        self.center_chunk
    }

    /// All loaded chunks in slot order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Mutable access to the loaded chunks for the mesher. Type edits go through
    /// [`Plane::set_voxel`] so they are tracked.
    pub(crate) fn chunks_mut(&mut self) -> &mut [Chunk] {
        &mut self.chunks
    }

    /// Whether the chunk in `slot` needs its mesh regenerated.
    pub fn is_dirty(&self, slot: usize) -> bool {
        self.dirty.get(slot).map_or(false, |bit| *bit)
    }

    /// Whether any chunk needs its mesh regenerated.
    pub fn needs_remesh(&self) -> bool {
        self.dirty.any()
    }

    /// Returns the dirty set and clears it.
    pub fn take_dirty(&mut self) -> BitVec {
        let cleared = BitVec::repeat(false, self.chunks.len());
        std::mem::replace(&mut self.dirty, cleared)
    }

    /// Number of non-empty voxels in the window.
    pub fn count_typed_voxels(&self) -> u32 {
        self.chunks.iter().map(Chunk::count_typed_voxels).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_must_be_odd() {
        assert!(matches!(
            Plane::new([3, 2, 3], Point3::new(1, 1, 1)),
            Err(FieldError::InvalidWindow(_))
        ));
        assert!(Plane::new([1, 1, 1], Point3::new(0, 0, 0)).is_ok());
    }

    #[test]
    fn negative_coordinates_resolve_by_floor_division() {
        let plane = Plane::new([3, 3, 3], Point3::new(0, 0, 0)).unwrap();
        let (slot, local) = plane.locate(-1, 0, 0).unwrap();
        assert_eq!(plane.chunks()[slot].position, Point3::new(-1, 0, 0));
        assert_eq!(local, Chunk::local_index(9, 0, 0));
        assert!(plane.locate(-11, 0, 0).is_none());
        assert!(plane.locate(20, 0, 0).is_none());
    }

    #[test]
    fn edits_mark_neighbouring_chunks_dirty() {
        let mut plane = Plane::new([3, 1, 1], Point3::new(1, 0, 0)).unwrap();
        plane.take_dirty();

        plane.set_voxel(15, 5, 5, 1).unwrap();
        assert!(plane.is_dirty(1));
        assert!(!plane.is_dirty(0));
        assert!(!plane.is_dirty(2));

        plane.take_dirty();
        plane.set_voxel(19, 5, 5, 1).unwrap();
        assert!(plane.is_dirty(1));
        assert!(plane.is_dirty(2));
        assert!(!plane.is_dirty(0));

        plane.take_dirty();
        plane.set_voxel(19, 5, 5, 1).unwrap();
        assert!(!plane.needs_remesh());
    }
}
