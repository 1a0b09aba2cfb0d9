//! Draws the octree by raycasting it in a compute pass and blitting the result.
//!
//! The compute pass writes one texel per viewport pixel into a storage image. It only runs on
//! frames where [`OctreeGpuBuffer::synchronize`] asks for a dispatch; every other frame blits
//! the image left by the last dispatch.

use log::{debug, info};
use wgpu::{CommandEncoder, ComputePipeline, Device, RenderPipeline, TextureFormat, TextureView};

use crate::{
    engine_state::{
        buffer_state::BufferState, camera_state::camera::Camera, voxels::octree::SparseOctree,
    },
    error::BufferResult,
};

use super::{
    bind_group_state::{BindGroupState, BLIT_BIND_GROUP, RAYCAST_BIND_GROUP},
    octree_buffer::OctreeGpuBuffer,
    texture::Texture,
};

const RAYCAST_SHADER: &str = include_str!("../../../assets/shaders/octree_raycast.wgsl");
const BLIT_SHADER: &str = include_str!("../../../assets/shaders/screen_quad.wgsl");

/// Edge length of a compute workgroup, matching `@workgroup_size` in the shader.
pub const WORKGROUP_SIZE: u32 = 8;

/// Workgroups needed to cover a `width` by `height` viewport.
pub fn workgroup_count(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(WORKGROUP_SIZE), height.div_ceil(WORKGROUP_SIZE))
}

/// Compute raycast plus fullscreen blit.
pub struct RaycastRenderer {
    raycast_pipeline: ComputePipeline,
    blit_pipeline: RenderPipeline,
    output: Texture,
    octree_buffer: OctreeGpuBuffer,
    width: u32,
    height: u32,
}

impl RaycastRenderer {
    /// Builds both pipelines, registers the octree buffer and binds a fresh output image.
    ///
    /// # Errors
    /// Fails if the octree arena is too large for the device, or if the buffer cannot be bound
    /// after registration.
    pub fn new(
        device: &Device,
        buffer_state: &mut BufferState,
        bind_group_state: &mut BindGroupState,
        octree: &SparseOctree,
        surface_format: TextureFormat,
        width: u32,
        height: u32,
    ) -> BufferResult<Self> {
        let octree_buffer = OctreeGpuBuffer::new(buffer_state, octree, &device.limits())?;
        info!(
            "Octree buffer holds {} records ({} bytes)",
            octree_buffer.capacity(),
            OctreeGpuBuffer::buffer_size(octree_buffer.capacity())
        );

        let raycast_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Octree Raycast Shader"),
            source: wgpu::ShaderSource::Wgsl(RAYCAST_SHADER.into()),
        });
        let blit_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Screen Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
        });

        let raycast_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Octree Raycast Pipeline Layout"),
            bind_group_layouts: &[&bind_group_state.raycast_layout],
            push_constant_ranges: &[],
        });
        let raycast_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Octree Raycast Pipeline"),
            layout: Some(&raycast_layout),
            module: &raycast_module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let blit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Screen Quad Pipeline Layout"),
            bind_group_layouts: &[&bind_group_state.blit_layout],
            push_constant_ranges: &[],
        });
        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Screen Quad Pipeline"),
            layout: Some(&blit_layout),
            vertex: wgpu::VertexState {
                module: &blit_module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let output = Texture::create_storage_texture(device, width, height, "Raycast Output");
        bind_group_state.generate_raycast_bindgroups(device, buffer_state, &output)?;

        Ok(Self {
            raycast_pipeline,
            blit_pipeline,
            output,
            octree_buffer,
            width,
            height,
        })
    }

    /// Uploads whatever changed since the last frame and reports whether to dispatch.
    pub fn prepare(
        &self,
        buffer_state: &BufferState,
        octree: &mut SparseOctree,
        camera: &mut Camera,
    ) -> BufferResult<bool> {
        let frame = OctreeGpuBuffer::synchronize(octree, camera);
        OctreeGpuBuffer::apply(buffer_state, frame, octree)
    }

    /// Records the raycast (when `dispatch` is set) and the blit onto `target`.
    pub fn encode(
        &self,
        encoder: &mut CommandEncoder,
        bind_group_state: &BindGroupState,
        target: &TextureView,
        dispatch: bool,
    ) {
        let (Some(raycast_bind_group), Some(blit_bind_group)) = (
            bind_group_state.get_bind_group(RAYCAST_BIND_GROUP),
            bind_group_state.get_bind_group(BLIT_BIND_GROUP),
        ) else {
            return;
        };

        if dispatch {
            let (groups_x, groups_y) = workgroup_count(self.width, self.height);
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Octree Raycast Pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.raycast_pipeline);
            cpass.set_bind_group(0, raycast_bind_group, &[]);
            cpass.dispatch_workgroups(groups_x, groups_y, 1);
        }

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Screen Quad Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(&self.blit_pipeline);
        rpass.set_bind_group(0, blit_bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }

    /// Replaces the output image with one of the new size and rebinds it.
    ///
    /// The camera's viewport change forces the next frame to dispatch, so the fresh image is
    /// filled before it is shown for long.
    pub fn resize(
        &mut self,
        device: &Device,
        buffer_state: &BufferState,
        bind_group_state: &mut BindGroupState,
        width: u32,
        height: u32,
    ) -> BufferResult<()> {
        self.width = width;
        self.height = height;
        self.output = Texture::create_storage_texture(device, width, height, "Raycast Output");
        bind_group_state.generate_raycast_bindgroups(device, buffer_state, &self.output)?;
        debug!("Raycast output recreated at {}x{}", width, height);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workgroups_cover_every_pixel() {
        assert_eq!(workgroup_count(8, 8), (1, 1));
        assert_eq!(workgroup_count(9, 1), (2, 1));
        assert_eq!(workgroup_count(1920, 1080), (240, 135));
        assert_eq!(workgroup_count(0, 0), (0, 0));
    }
}
