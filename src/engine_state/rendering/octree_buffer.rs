//! # Octree GPU Buffer
//!
//! The octree and the camera basis share one storage buffer:
//!
//! ```text
//! offset 0   OctreeGpuHeader (96 bytes)
//! offset 96  VoxelRecord[capacity] (8 bytes each)
//! ```
//!
//! Each frame [`OctreeGpuBuffer::synchronize`] decides what to upload and whether the raycast
//! must run again. It produces plain [`BufferWriteCommand`]s, so the decision is observable
//! without a GPU.
//!
//! ## Frame protocol
//!
//! 1. If the octree's `updated` flag is set, the header and the whole arena are written, and
//!    the octree's `changed` flag is raised.
//! 2. The raycast is dispatched when the camera or the octree reports a change.
//! 3. A dispatch without a full upload still rewrites the header, since the camera moved.
//!
//! `updated` is only cleared once every write of a full upload has gone through, so a failed
//! upload is retried on the next frame.

use cgmath::Vector3;
use log::trace;

use crate::{
    engine_state::{
        buffer_state::{BufferState, BufferWriteCommand},
        camera_state::camera::Camera,
        voxels::octree::{SparseOctree, VoxelRecord},
    },
    error::{BufferError, BufferResult},
};

/// Name of the storage buffer holding the header and the voxel arena.
pub const OCTREE_BUFFER_NAME: &str = "octree_buffer";

/// Byte size of [`OctreeGpuHeader`], and the offset of the first voxel record.
pub const OCTREE_HEADER_SIZE: u64 = std::mem::size_of::<OctreeGpuHeader>() as u64;

/// Fixed-layout prefix of the octree buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OctreeGpuHeader {
    /// Edge length of the volume
    pub size: u32,
    /// Viewport width in pixels
    pub view_width: u32,
    /// Viewport height in pixels
    pub view_height: u32,
    /// Always zero
    pub padding: u32,
    /// Camera position, w = 1
    pub position: [f32; 4],
    /// Camera right vector, w = 0
    pub right: [f32; 4],
    /// Camera up vector, w = 0
    pub up: [f32; 4],
    /// Camera forward vector, w = 0
    pub forward: [f32; 4],
    /// Root node midpoint, w = 0
    pub center: [f32; 4],
}

fn extend(v: Vector3<f32>, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

impl OctreeGpuHeader {
    /// Captures the octree geometry and the current camera basis.
    pub fn new(octree: &SparseOctree, camera: &Camera) -> Self {
        let position = Vector3::new(camera.position.x, camera.position.y, camera.position.z);
        Self {
            size: octree.size(),
            view_width: camera.width,
            view_height: camera.height,
            padding: 0,
            position: extend(position, 1.0),
            right: extend(camera.right(), 0.0),
            up: extend(camera.up(), 0.0),
            forward: extend(camera.forward(), 0.0),
            center: extend(octree.center(), 0.0),
        }
    }
}

/// What one frame must upload, and whether the raycast runs.
#[derive(Debug)]
pub struct FrameSync {
    /// Writes to perform, in order
    pub commands: Vec<BufferWriteCommand>,
    /// Whether the raycast pass must be dispatched
    pub dispatch: bool,
    full_upload: bool,
}

impl FrameSync {
    /// Whether the frame uploads the voxel arena.
    pub fn is_full_upload(&self) -> bool {
        self.full_upload
    }
}

/// The octree's storage buffer.
pub struct OctreeGpuBuffer {
    capacity: usize,
}

impl OctreeGpuBuffer {
    /// Byte size of a buffer holding the header and `capacity` records.
    pub fn buffer_size(capacity: usize) -> u64 {
        OCTREE_HEADER_SIZE + (capacity * std::mem::size_of::<VoxelRecord>()) as u64
    }

    /// Checks that a buffer for `capacity` records can be created and bound as one storage
    /// binding under `limits`, returning its byte size.
    ///
    /// # Errors
    /// [`BufferError::ExceedsLimit`] when the buffer is too large for the device.
    pub fn checked_size(capacity: usize, limits: &wgpu::Limits) -> BufferResult<u64> {
        let size = Self::buffer_size(capacity);
        let limit = limits
            .max_buffer_size
            .min(u64::from(limits.max_storage_buffer_binding_size));
        if size > limit {
            return Err(BufferError::ExceedsLimit {
                buffer: OCTREE_BUFFER_NAME.to_string(),
                size,
                limit,
            });
        }
        Ok(size)
    }

    /// Registers a storage buffer large enough for the whole arena of `octree`.
    ///
    /// # Errors
    /// [`BufferError::ExceedsLimit`] when the arena does not fit the device's `limits`.
    pub fn new(
        buffer_state: &mut BufferState,
        octree: &SparseOctree,
        limits: &wgpu::Limits,
    ) -> BufferResult<Self> {
        let capacity = octree.capacity();
        let size = Self::checked_size(capacity, limits)?;
        buffer_state.create_buffer(
            OCTREE_BUFFER_NAME,
            wgpu::BufferDescriptor {
                label: Some(OCTREE_BUFFER_NAME),
                size,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        );
        Ok(Self { capacity })
    }

    /// Number of voxel records the buffer holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Decides this frame's uploads and whether to dispatch. See the module docs for the order.
    pub fn synchronize(octree: &mut SparseOctree, camera: &mut Camera) -> FrameSync {
        let mut commands = Vec::new();

        let full_upload = octree.stage_upload();
        if full_upload {
            commands.push(Self::header_command(octree, camera));
            commands.push(BufferWriteCommand {
                name: "octree voxels".to_string(),
                buffer_name: OCTREE_BUFFER_NAME.to_string(),
                offset: OCTREE_HEADER_SIZE,
                data: Box::new(octree.records().to_vec()),
            });
        }

        // Both latches are read every frame so neither change is carried into the next one.
        let camera_changed = camera.check_changed();
        let octree_changed = octree.check_changed();
        let dispatch = camera_changed || octree_changed;

        if dispatch && !full_upload {
            commands.push(Self::header_command(octree, camera));
        }

        trace!(
            "Octree sync: full upload {}, dispatch {}, {} commands",
            full_upload,
            dispatch,
            commands.len()
        );
        FrameSync {
            commands,
            dispatch,
            full_upload,
        }
    }

    /// Executes the frame's writes through `buffer_state`, returning whether to dispatch.
    pub fn apply(
        buffer_state: &BufferState,
        frame: FrameSync,
        octree: &mut SparseOctree,
    ) -> BufferResult<bool> {
        Self::submit(frame, octree, |command| buffer_state.write(command))
    }

    /// Hands each of the frame's writes to `write` in order. A full upload is confirmed on
    /// the octree only when every write succeeded; the first failure is returned as is.
    pub fn submit<F>(frame: FrameSync, octree: &mut SparseOctree, mut write: F) -> BufferResult<bool>
    where
        F: FnMut(BufferWriteCommand) -> BufferResult<()>,
    {
        for command in frame.commands {
            write(command)?;
        }
        if frame.full_upload {
            octree.confirm_upload();
        }
        Ok(frame.dispatch)
    }

    fn header_command(octree: &SparseOctree, camera: &Camera) -> BufferWriteCommand {
        BufferWriteCommand {
            name: "octree header".to_string(),
            buffer_name: OCTREE_BUFFER_NAME.to_string(),
            offset: 0,
            data: Box::new([OctreeGpuHeader::new(octree, camera)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout_matches_the_shader() {
        assert_eq!(OCTREE_HEADER_SIZE, 96);
        assert_eq!(std::mem::offset_of!(OctreeGpuHeader, position), 16);
        assert_eq!(std::mem::offset_of!(OctreeGpuHeader, center), 80);
        assert_eq!(OctreeGpuBuffer::buffer_size(73), 96 + 73 * 8);
    }

    #[test]
    fn size_check_takes_the_tighter_limit() {
        let limits = wgpu::Limits {
            max_buffer_size: 1 << 20,
            max_storage_buffer_binding_size: 1 << 12,
            ..wgpu::Limits::default()
        };
        assert_eq!(OctreeGpuBuffer::checked_size(500, &limits).unwrap(), 96 + 500 * 8);
        assert!(matches!(
            OctreeGpuBuffer::checked_size(501, &limits),
            Err(BufferError::ExceedsLimit { size: 4104, limit: 4096, .. })
        ));
    }

    #[test]
    fn header_carries_camera_basis() {
        let octree = SparseOctree::new(8).unwrap();
        let camera = Camera::framing_volume(8, 1.0, 640, 480);
        let header = OctreeGpuHeader::new(&octree, &camera);
        assert_eq!(header.size, 8);
        assert_eq!((header.view_width, header.view_height), (640, 480));
        assert_eq!(header.position, [4.0, 4.0, -12.0, 1.0]);
        assert_eq!(header.center, [3.5, 3.5, 3.5, 0.0]);
        assert_eq!(header.padding, 0);
    }
}
