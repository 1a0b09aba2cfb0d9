//! # Voxel Storage
//!
//! The two world representations and everything they share.
//!
//! ## Architecture
//!
//! * **Block**: voxel type ids and the six face directions
//! * **Octree**: the sparse voxel octree, a flat arena the GPU raycasts directly
//! * **Chunk**: fixed-size chunks and the [`chunk::plane::Plane`] window that holds them
//! * **Generation**: fill patterns used to populate a fresh volume
//! * **Volume**: the edit surface both representations implement
//!
//! ## Data Flow
//!
//! 1. The engine builds a [`volume::WorldVolume`] from configuration
//! 2. Edits arrive through [`volume::RenderableVolume`]
//! 3. Octree edits raise its update flag; chunk edits mark chunks dirty
//! 4. The renderer either re-uploads the arena or regenerates the dirty meshes

pub mod block;
pub mod chunk;
pub mod generation;
pub mod octree;
pub mod volume;
