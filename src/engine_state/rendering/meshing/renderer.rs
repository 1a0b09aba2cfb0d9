//! Meshing renderer for the chunked field.
//!
//! One non-indexed draw per chunk with geometry, all sharing the camera bind group.

use wgpu::{Device, RenderPass, RenderPipeline, TextureFormat};

use crate::engine_state::{
    buffer_state::BufferState,
    rendering::{
        bind_group_state::{BindGroupState, CAMERA_BIND_GROUP},
        texture::Texture,
        vertex::ColorVertex,
    },
};

use super::{chunk_buffer_name, MeshManager};

const MESH_SHADER: &str = include_str!("../../../../assets/shaders/chunk_mesh.wgsl");

/// Render pipeline for colored chunk meshes.
pub struct MeshingRenderer {
    /// The WebGPU render pipeline for mesh rendering
    render_pipeline: RenderPipeline,
}

impl MeshingRenderer {
    /// Creates the pipeline: depth tested, back faces culled.
    ///
    /// Faces are wound counter-clockwise seen from outside in world space. The view transform
    /// is left-handed and mirrors that winding on screen, so the pipeline treats clockwise as
    /// front facing.
    pub fn new(
        device: &Device,
        bind_group_state: &BindGroupState,
        texture_format: TextureFormat,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_state.camera_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[ColorVertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Texture::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self { render_pipeline }
    }

    /// Draws every chunk the mesh manager has geometry for.
    pub fn render(
        &self,
        render_pass: &mut RenderPass<'_>,
        bind_group_state: &BindGroupState,
        buffer_state: &BufferState,
        mesh_manager: &MeshManager,
    ) {
        let Some(camera_bind_group) = bind_group_state.get_bind_group(CAMERA_BIND_GROUP) else {
            return;
        };

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);

        for (slot, vertex_count) in mesh_manager.draw_list() {
            let Some(buffer) = buffer_state.get_buffer(&chunk_buffer_name(slot)) else {
                continue;
            };
            render_pass.set_vertex_buffer(0, buffer.slice(..));
            render_pass.draw(0..vertex_count, 0..1);
        }
    }
}
