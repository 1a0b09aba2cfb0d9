//! # Error Types
//!
//! Error enums for every fallible surface of the engine. Octree and chunked-field errors are
//! kept separate so callers that know which representation they hold can match precisely,
//! while [`VolumeError`] unifies them behind the strategy-agnostic edit API.

use std::path::PathBuf;

/// Errors raised by the sparse voxel octree.
#[derive(Debug, thiserror::Error)]
pub enum OctreeError {
    /// The requested edge length is zero or not a power of two.
    #[error("Octree size must be a non-zero power of two, got {0}")]
    InvalidSize(u32),

    /// The flat voxel arena could not be allocated.
    #[error("Failed to allocate {requested} voxel records for the octree arena")]
    Allocation {
        /// Number of records that were requested
        requested: usize,
    },

    /// An edit targeted a cell outside `[0, size)` on some axis.
    #[error("Voxel ({x}, {y}, {z}) lies outside an octree of size {size}")]
    OutOfBounds {
        /// X coordinate of the rejected edit
        x: u32,
        /// Y coordinate of the rejected edit
        y: u32,
        /// Z coordinate of the rejected edit
        z: u32,
        /// Edge length of the volume
        size: u32,
    },

    /// A child block was requested past the end of the arena.
    #[error("Octree arena exhausted: cursor {cursor} with capacity {capacity}")]
    CapacityExhausted {
        /// Cursor at the time of the failed allocation
        cursor: usize,
        /// Total records in the arena
        capacity: usize,
    },
}

/// Errors raised by the chunked voxel field.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// Window dimensions must be odd and non-zero so a centre chunk exists.
    #[error("Chunk window {0:?} must be odd and non-zero on every axis")]
    InvalidWindow([u32; 3]),

    /// The coordinate resolves to a chunk outside the loaded window.
    #[error("Voxel ({x}, {y}, {z}) is outside the loaded chunk window")]
    OutOfWindow {
        /// Global X coordinate
        x: i32,
        /// Global Y coordinate
        y: i32,
        /// Global Z coordinate
        z: i32,
    },
}

/// Strategy-agnostic error for the [`RenderableVolume`](crate::engine_state::voxels::volume::RenderableVolume) surface.
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    /// Failure inside the octree representation
    #[error(transparent)]
    Octree(#[from] OctreeError),

    /// Failure inside the chunked representation
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Errors raised by the named GPU buffer registry.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// A buffer would be larger than the device can allocate or bind.
    #[error("Buffer '{buffer}' needs {size} bytes but the device allows {limit}")]
    ExceedsLimit {
        /// Name of the buffer
        buffer: String,
        /// Requested size in bytes
        size: u64,
        /// Largest size the device accepts in bytes
        limit: u64,
    },

    /// No buffer is registered under the name.
    #[error("No buffer named '{0}'")]
    Missing(String),

    /// A write would run past the end of the buffer.
    #[error("Write of {len} bytes at offset {offset} overruns buffer '{buffer}' of {size} bytes")]
    OutOfBounds {
        /// Name of the target buffer
        buffer: String,
        /// Byte offset of the write
        offset: u64,
        /// Length of the write in bytes
        len: u64,
        /// Allocated size of the buffer
        size: u64,
    },
}

/// Errors raised while loading the engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Could not read config file {path:?}: {source}")]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying IO failure
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`EngineConfig`](crate::config::EngineConfig).
    #[error("Could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value parsed correctly but is semantically unusable.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors that stop the engine from starting or drawing.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The world volume could not be built
    #[error(transparent)]
    Volume(#[from] VolumeError),

    /// A GPU buffer could not be bound or written
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Errors raised while bringing up the window and the GPU device.
#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    /// The window could not be created
    #[error("Could not create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The window cannot host a WebGPU surface
    #[error("Could not create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// No adapter is compatible with the surface
    #[error("No compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused the device request
    #[error("Could not open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// The surface reports no usable texture format
    #[error("Surface supports no texture formats")]
    NoSurfaceFormat,
}

/// Result alias for octree operations.
pub type OctreeResult<T> = Result<T, OctreeError>;
/// Result alias for chunked field operations.
pub type FieldResult<T> = Result<T, FieldError>;
/// Result alias for strategy-agnostic volume operations.
pub type VolumeResult<T> = Result<T, VolumeError>;
/// Result alias for buffer registry operations.
pub type BufferResult<T> = Result<T, BufferError>;
