//! Rendering system for the voxel engine.
//!
//! Two draw paths share this module. The octree is raycast in a compute pass and blitted to
//! the surface; the chunked field is rasterised from per-chunk meshes. [`RenderManager`]
//! owns the surface and hands each frame to whichever path the volume needs.

use log::{error, info};
use pipeline_manager::PipelineManager;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use crate::{core::StResource, error::BufferResult};

use super::{buffer_state::BufferState, camera_state::camera::Camera, voxels::volume::WorldVolume};

mod bind_group_state;
pub mod meshing;
pub mod octree_buffer;
mod pipeline_manager;
mod raycast_renderer;
mod texture;
pub mod vertex;

pub use raycast_renderer::{workgroup_count, WORKGROUP_SIZE};
pub use vertex::{ColorVertex, Triangle};

/// Owns the surface and drives one frame at a time.
pub struct RenderManager {
    /// The WebGPU surface being rendered to
    pub surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    pub surface_config: SurfaceConfiguration,
    /// The WebGPU device used for creating GPU resources
    pub device: Device,
    /// The WebGPU queue for submitting command buffers
    pub queue: Queue,
    /// Pipelines for the active strategy
    pipeline_manager: PipelineManager,
}

impl RenderManager {
    /// Creates the pipelines for `volume` against a configured surface.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        buffer_state: StResource<BufferState>,
        volume: &WorldVolume,
    ) -> BufferResult<Self> {
        let pipeline_manager =
            PipelineManager::new(&device, &surface_config, buffer_state, volume)?;
        info!(
            "Render pipelines ready for {:?} at {}x{}",
            volume.strategy(),
            surface_config.width,
            surface_config.height
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
        })
    }

    /// Reconfigures the surface and the size-dependent textures. Zero sizes are ignored.
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) -> BufferResult<()> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.pipeline_manager
            .resize(&self.device, &self.surface_config)?;
        info!("Surface resized to {}x{}", size.width, size.height);
        Ok(())
    }

    /// Synchronises the volume with the GPU and presents a frame.
    ///
    /// A frame that cannot be acquired is skipped before anything is uploaded, so the change
    /// flags survive until a frame can be drawn.
    pub fn render(&mut self, volume: &mut WorldVolume, camera: &mut Camera) -> BufferResult<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                error!("Error getting current frame: {:?}, reconfiguring", err);
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(err) => {
                error!("Error getting current frame: {:?}", err);
                return Ok(());
            }
        };

        let dispatch = self.pipeline_manager.prepare(volume, camera)?;

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = self.device.create_command_encoder(&Default::default());
        self.pipeline_manager.render(&mut encoder, &view, dispatch);

        self.queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }
}
