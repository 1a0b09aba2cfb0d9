//! Owns the GPU pipelines and shared render resources for the active volume strategy.
//!
//! # Architecture
//!
//! - `PipelineManager`: coordinates a frame, holds the bind groups and the depth texture
//! - `RaycastRenderer`: compute raycast plus blit, used with the octree
//! - `MeshingRenderer` with a `MeshManager`: rasterised chunk meshes, used with the chunked
//!   field
//!
//! The strategy is fixed when the engine starts, so exactly one of the two paths exists.

use log::warn;
use wgpu::{CommandEncoder, Device, SurfaceConfiguration, TextureView};

use crate::{
    core::StResource,
    engine_state::{
        buffer_state::BufferState,
        camera_state::camera::Camera,
        voxels::volume::{VolumeStrategy, WorldVolume},
    },
    error::BufferResult,
};

use super::{
    bind_group_state::BindGroupState,
    meshing::{MeshManager, MeshingRenderer},
    raycast_renderer::RaycastRenderer,
    texture::Texture,
};

/// The draw path matching the volume's representation.
pub enum VolumePipeline {
    /// Octree raycast
    Raycast(RaycastRenderer),
    /// Chunk meshes
    Mesh {
        /// Pipeline drawing the chunk buffers
        renderer: MeshingRenderer,
        /// Per-chunk vertex buffers
        mesh_manager: MeshManager,
    },
}

impl VolumePipeline {
    fn strategy(&self) -> VolumeStrategy {
        match self {
            VolumePipeline::Raycast(_) => VolumeStrategy::Octree,
            VolumePipeline::Mesh { .. } => VolumeStrategy::ChunkedMesh,
        }
    }
}

/// Coordinates the pipelines and their shared resources.
pub struct PipelineManager {
    /// Layouts and bind groups for every pipeline
    bind_group_state: BindGroupState,
    /// Shared state for buffer management
    buffer_state: StResource<BufferState>,
    /// Depth texture used by the mesh path
    depth_texture: Texture,
    /// The strategy's draw path
    volume_pipeline: VolumePipeline,
}

impl PipelineManager {
    /// Builds the draw path for `volume`.
    ///
    /// The camera uniform buffer must already be registered in `buffer_state`.
    pub fn new(
        device: &Device,
        config: &SurfaceConfiguration,
        buffer_state: StResource<BufferState>,
        volume: &WorldVolume,
    ) -> BufferResult<Self> {
        let mut bind_group_state = BindGroupState::new(device);
        bind_group_state.generate_camera_bindgroup(device, &buffer_state.get())?;

        let depth_texture = Texture::create_depth_texture(device, config, "DEPTH TEXTURE");

        let volume_pipeline = match volume {
            WorldVolume::Octree(octree) => VolumePipeline::Raycast(RaycastRenderer::new(
                device,
                &mut buffer_state.get_mut(),
                &mut bind_group_state,
                octree,
                config.format,
                config.width,
                config.height,
            )?),
            WorldVolume::Chunked(plane) => VolumePipeline::Mesh {
                renderer: MeshingRenderer::new(device, &bind_group_state, config.format),
                mesh_manager: MeshManager::new(buffer_state.clone(), plane.chunks().len()),
            },
        };

        Ok(Self {
            bind_group_state,
            buffer_state,
            depth_texture,
            volume_pipeline,
        })
    }

    /// Uploads this frame's changes. Returns whether the raycast must run; the mesh path
    /// always reports `true`.
    pub fn prepare(&mut self, volume: &mut WorldVolume, camera: &mut Camera) -> BufferResult<bool> {
        match (&mut self.volume_pipeline, volume) {
            (VolumePipeline::Raycast(renderer), WorldVolume::Octree(octree)) => {
                renderer.prepare(&self.buffer_state.get(), octree, camera)
            }
            (VolumePipeline::Mesh { mesh_manager, .. }, WorldVolume::Chunked(plane)) => {
                mesh_manager.upload(plane.generate_meshes());
                Ok(true)
            }
            (pipeline, volume) => {
                warn!(
                    "{:?} pipeline cannot draw a {:?} volume",
                    pipeline.strategy(),
                    volume.strategy()
                );
                Ok(false)
            }
        }
    }

    /// Records the frame's passes onto `view`.
    pub fn render(&self, encoder: &mut CommandEncoder, view: &TextureView, dispatch: bool) {
        match &self.volume_pipeline {
            VolumePipeline::Raycast(renderer) => {
                renderer.encode(encoder, &self.bind_group_state, view, dispatch);
            }
            VolumePipeline::Mesh {
                renderer,
                mesh_manager,
            } => {
                let buffer_state = self.buffer_state.get();
                let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Chunk Mesh Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                renderer.render(
                    &mut rpass,
                    &self.bind_group_state,
                    &buffer_state,
                    mesh_manager,
                );
            }
        }
    }

    /// Recreates the size-dependent textures.
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) -> BufferResult<()> {
        self.depth_texture = Texture::create_depth_texture(device, config, "DEPTH TEXTURE");
        if let VolumePipeline::Raycast(renderer) = &mut self.volume_pipeline {
            renderer.resize(
                device,
                &self.buffer_state.get(),
                &mut self.bind_group_state,
                config.width,
                config.height,
            )?;
        }
        Ok(())
    }
}
