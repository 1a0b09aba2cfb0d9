//! Manages WebGPU bind groups and their layouts.
//!
//! Layouts are created once and live as long as the renderer. Bind groups are stored by name
//! because the ones that reference the raycast output image are rebuilt on every resize.

use std::collections::HashMap;

use wgpu::{BindGroup, BindGroupLayout, Device};

use crate::{
    engine_state::{
        buffer_state::BufferState, camera_state::CAMERA_BUFFER_NAME,
        rendering::octree_buffer::OCTREE_BUFFER_NAME,
    },
    error::{BufferError, BufferResult},
};

use super::texture::Texture;

/// Camera uniform, read by the mesh pipeline
pub const CAMERA_BIND_GROUP: &str = "camera_bind_group";
/// Octree buffer and output image, read by the raycast pass
pub const RAYCAST_BIND_GROUP: &str = "raycast_bind_group";
/// Output image and sampler, read by the blit pass
pub const BLIT_BIND_GROUP: &str = "blit_bind_group";

/// Named bind groups over three fixed layouts.
pub struct BindGroupState {
    /// Uniform buffer visible to the vertex stage
    pub camera_layout: BindGroupLayout,
    /// Read-only storage buffer plus a write-only storage texture, compute stage
    pub raycast_layout: BindGroupLayout,
    /// Filterable texture plus sampler, fragment stage
    pub blit_layout: BindGroupLayout,
    bind_groups: HashMap<&'static str, BindGroup>,
}

impl BindGroupState {
    /// Creates the layouts. No bind group exists until one of the `generate_*` methods runs.
    pub fn new(device: &Device) -> Self {
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let raycast_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: Texture::STORAGE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
            label: Some("raycast_bind_group_layout"),
        });

        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("blit_bind_group_layout"),
        });

        Self {
            camera_layout,
            raycast_layout,
            blit_layout,
            bind_groups: HashMap::new(),
        }
    }

    /// Retrieves a bind group by name.
    pub fn get_bind_group(&self, name: &'static str) -> Option<&BindGroup> {
        self.bind_groups.get(name)
    }

    /// Binds the camera uniform buffer.
    ///
    /// # Errors
    /// [`BufferError::Missing`] when the camera buffer has not been registered.
    pub fn generate_camera_bindgroup(
        &mut self,
        device: &Device,
        buffer_state: &BufferState,
    ) -> BufferResult<()> {
        let camera_binding = buffer_state
            .get_entire_binding(CAMERA_BUFFER_NAME)
            .ok_or_else(|| BufferError::Missing(CAMERA_BUFFER_NAME.to_string()))?;

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_binding,
            }],
            label: Some(CAMERA_BIND_GROUP),
        });

        self.bind_groups.insert(CAMERA_BIND_GROUP, camera_bind_group);
        Ok(())
    }

    /// Binds the octree buffer and `output` for the raycast, and `output` for the blit.
    ///
    /// # Errors
    /// [`BufferError::Missing`] when the octree buffer has not been registered.
    pub fn generate_raycast_bindgroups(
        &mut self,
        device: &Device,
        buffer_state: &BufferState,
        output: &Texture,
    ) -> BufferResult<()> {
        let octree_binding = buffer_state
            .get_entire_binding(OCTREE_BUFFER_NAME)
            .ok_or_else(|| BufferError::Missing(OCTREE_BUFFER_NAME.to_string()))?;

        let raycast_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.raycast_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: octree_binding,
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&output.view),
                },
            ],
            label: Some(RAYCAST_BIND_GROUP),
        });

        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&output.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&output.sampler),
                },
            ],
            label: Some(BLIT_BIND_GROUP),
        });

        self.bind_groups.insert(RAYCAST_BIND_GROUP, raycast_bind_group);
        self.bind_groups.insert(BLIT_BIND_GROUP, blit_bind_group);
        Ok(())
    }
}
