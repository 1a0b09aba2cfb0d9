#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Octree Voxel Engine
//!
//! A voxel renderer built on WGPU with two interchangeable world representations:
//!
//! * a sparse voxel octree stored as a flat node arena, uploaded as-is and raycast per pixel
//!   in a compute shader
//! * a window of fixed-size chunks, face culled into triangle meshes and rasterised
//!
//! ## Key Modules
//!
//! * `application_state` - Window, device bring-up and input
//! * `config` - JSON engine settings
//! * `core` - Shared-ownership helpers used throughout the engine
//! * `engine_state` - Volumes, camera, GPU buffers and the renderers
//! * `error` - Error types for every fallible surface
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     octree_voxel_engine::run();
//! }
//! ```
//!
//! The volumes work without a GPU:
//!
//! ```
//! use octree_voxel_engine::{RenderableVolume, SparseOctree};
//!
//! let mut octree = SparseOctree::new(8).unwrap();
//! RenderableVolume::add_voxel(&mut octree, 1, 2, 3, 5).unwrap();
//! assert_eq!(octree.voxel_at(1, 2, 3), 5);
//! assert_eq!(octree.count_typed_voxels(), 1);
//! ```

use application_state::{
    graphics_resources_builder::{GraphicsBuilder, MaybeGraphics},
    ApplicationState,
};
use log::{error, info};
use winit::event_loop::EventLoop;

mod application_state;
pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::EngineConfig;
pub use engine_state::{
    buffer_state::{BufferState, BufferWriteCommand},
    camera_state::camera::Camera,
    rendering::{
        meshing::ChunkMesh,
        octree_buffer::{FrameSync, OctreeGpuBuffer, OctreeGpuHeader},
    },
    voxels::{
        block::{block_side::BlockSide, VoxelTypeId},
        chunk::{plane::Plane, Chunk, ChunkVoxel},
        generation::PopulationPattern,
        octree::{SparseOctree, VoxelRecord},
        volume::{RenderableVolume, VolumeStrategy, WorldVolume},
    },
};

/// Starts logging, loads the configuration and runs the event loop until the window closes.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = EngineConfig::load_or_default();
    info!("Volume strategy: {:?}", config.strategy);

    let event_loop = match EventLoop::with_user_event().build() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!("Could not create event loop: {}", err);
            return;
        }
    };

    let mut state = ApplicationState::new(
        MaybeGraphics::Builder(GraphicsBuilder::new(event_loop.create_proxy())),
        config,
    );

    if let Err(err) = event_loop.run_app(&mut state) {
        error!("Event loop exited with an error: {}", err);
    }
}
