//! # Renderable Volumes
//!
//! Both world representations sit behind one edit surface, and the engine picks one at
//! construction:
//!
//! * [`SparseOctree`] is raycast on the GPU straight from its node arena
//! * [`Plane`] is face-culled into per-chunk triangle meshes and rasterised
//!
//! Coordinates on this surface are unsigned and measured from the volume's minimum corner.

use cgmath::Point3;
use log::info;
use serde::Deserialize;

use super::{
    block::VoxelTypeId,
    chunk::plane::Plane,
    octree::SparseOctree,
};
use crate::{
    config::EngineConfig,
    error::{FieldError, VolumeResult},
};

/// Which representation backs the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeStrategy {
    /// Sparse voxel octree rendered by a compute raycast
    Octree,
    /// Chunked field rendered as face-culled meshes
    ChunkedMesh,
}

/// The edit and query surface shared by every volume representation.
pub trait RenderableVolume {
    /// Writes `voxel_type` at `(x, y, z)`; type 0 clears the cell.
    fn add_voxel(&mut self, x: u32, y: u32, z: u32, voxel_type: VoxelTypeId) -> VolumeResult<()>;

    /// Clears the cell at `(x, y, z)`.
    fn remove_voxel(&mut self, x: u32, y: u32, z: u32) -> VolumeResult<()>;

    /// Type stored at `(x, y, z)`, 0 for empty or out-of-range cells.
    fn voxel_at(&self, x: u32, y: u32, z: u32) -> VoxelTypeId;

    /// Number of non-empty cells.
    fn count_typed_voxels(&self) -> u32;

    /// Cell counts per axis.
    fn extent(&self) -> [u32; 3];

    /// Which strategy this volume renders with.
    fn strategy(&self) -> VolumeStrategy;
}

impl RenderableVolume for SparseOctree {
    fn add_voxel(&mut self, x: u32, y: u32, z: u32, voxel_type: VoxelTypeId) -> VolumeResult<()> {
        Ok(SparseOctree::add_voxel(self, x, y, z, voxel_type)?)
    }

    fn remove_voxel(&mut self, x: u32, y: u32, z: u32) -> VolumeResult<()> {
        Ok(SparseOctree::remove_voxel(self, x, y, z)?)
    }

    fn voxel_at(&self, x: u32, y: u32, z: u32) -> VoxelTypeId {
        SparseOctree::voxel_at(self, x, y, z)
    }

    fn count_typed_voxels(&self) -> u32 {
        SparseOctree::count_typed_voxels(self)
    }

    fn extent(&self) -> [u32; 3] {
        [self.size(); 3]
    }

    fn strategy(&self) -> VolumeStrategy {
        VolumeStrategy::Octree
    }
}

impl Plane {
    fn global_from_volume(&self, x: u32, y: u32, z: u32) -> Option<Point3<i32>> {
        let extent = self.extent();
        if x >= extent[0] || y >= extent[1] || z >= extent[2] {
            return None;
        }
        let (min, _) = self.voxel_bounds();
        Some(Point3::new(min.x + x as i32, min.y + y as i32, min.z + z as i32))
    }

    fn set_from_volume(&mut self, x: u32, y: u32, z: u32, voxel_type: VoxelTypeId) -> VolumeResult<()> {
        let global = self.global_from_volume(x, y, z).ok_or(FieldError::OutOfWindow {
            x: x as i32,
            y: y as i32,
            z: z as i32,
        })?;
        Ok(self.set_voxel(global.x, global.y, global.z, voxel_type)?)
    }
}

impl RenderableVolume for Plane {
    fn add_voxel(&mut self, x: u32, y: u32, z: u32, voxel_type: VoxelTypeId) -> VolumeResult<()> {
        self.set_from_volume(x, y, z, voxel_type)
    }

    fn remove_voxel(&mut self, x: u32, y: u32, z: u32) -> VolumeResult<()> {
        self.set_from_volume(x, y, z, 0)
    }

    fn voxel_at(&self, x: u32, y: u32, z: u32) -> VoxelTypeId {
        self.global_from_volume(x, y, z)
            .and_then(|global| self.get_voxel(global.x, global.y, global.z))
            .map_or(0, |voxel| voxel.voxel_type)
    }

    fn count_typed_voxels(&self) -> u32 {
        Plane::count_typed_voxels(self)
    }

    fn extent(&self) -> [u32; 3] {
        Plane::extent(self)
    }

    fn strategy(&self) -> VolumeStrategy {
        VolumeStrategy::ChunkedMesh
    }
}

/// The world volume, fixed to one representation for the life of the engine.
pub enum WorldVolume {
    /// Sparse voxel octree
    Octree(SparseOctree),
    /// Chunk window
    Chunked(Plane),
}

impl WorldVolume {
    /// Builds and populates the representation named by `config.strategy`.
    pub fn from_config(config: &EngineConfig, rng: &mut fastrand::Rng) -> VolumeResult<Self> {
        let volume = match config.strategy {
            VolumeStrategy::Octree => {
                let mut octree = SparseOctree::new(config.volume_size)?;
                octree.populate(&config.population, rng)?;
                WorldVolume::Octree(octree)
            }
            VolumeStrategy::ChunkedMesh => {
                let window = config.chunk_window;
                let center = Point3::new(
                    (window[0] / 2) as i32,
                    (window[1] / 2) as i32,
                    (window[2] / 2) as i32,
                );
                let mut plane = Plane::new(window, center)?;
                plane.populate(&config.population, rng);
                WorldVolume::Chunked(plane)
            }
        };
        info!(
            "Built {:?} volume with extent {:?} and {} typed voxels",
            volume.strategy(),
            volume.extent(),
            volume.count_typed_voxels()
        );
        Ok(volume)
    }

    /// The volume behind the shared edit surface.
    pub fn as_volume(&self) -> &dyn RenderableVolume {
        match self {
            WorldVolume::Octree(octree) => octree,
            WorldVolume::Chunked(plane) => plane,
        }
    }

    /// The volume behind the shared edit surface, mutably.
    pub fn as_volume_mut(&mut self) -> &mut dyn RenderableVolume {
        match self {
            WorldVolume::Octree(octree) => octree,
            WorldVolume::Chunked(plane) => plane,
        }
    }

    /// See [`RenderableVolume::strategy`].
    pub fn strategy(&self) -> VolumeStrategy {
        self.as_volume().strategy()
    }

    /// See [`RenderableVolume::extent`].
    pub fn extent(&self) -> [u32; 3] {
        self.as_volume().extent()
    }

    /// See [`RenderableVolume::count_typed_voxels`].
    pub fn count_typed_voxels(&self) -> u32 {
        self.as_volume().count_typed_voxels()
    }
}
