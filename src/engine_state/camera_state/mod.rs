//! # Camera State Management
//!
//! Owns the camera, its controller and projection, and the uniform buffer the mesh path reads.
//!
//! ## Core Components
//! - `Camera`: position, quaternion orientation, zoom and viewport
//! - `CameraController`: turns player actions into per-frame movement
//! - `Projection`: perspective projection for rasterised meshes
//! - `CameraUniform`: GPU representation of the view-projection matrix
//!
//! The octree raycaster does not read the uniform. It receives the camera basis through the
//! octree header instead, see [`crate::engine_state::rendering::octree_buffer`].

use log::trace;

use crate::{config::CameraConfig, core::StResource, error::BufferResult};

use super::{buffer_state::BufferState, PlayerAction};

pub mod camera;

/// Name of the GPU buffer used for camera uniform data
pub const CAMERA_BUFFER_NAME: &str = "camera_buffer";

/// The camera system and its GPU-side uniform.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: camera::Camera,
    /// GPU-optimized camera data for shaders
    pub camera_uniform: camera::CameraUniform,
    /// Handles player input and camera movement
    pub camera_controller: camera::CameraController,
    /// Perspective projection for the mesh path
    pub projection: camera::Projection,
    /// Registry holding the uniform buffer
    buffer_state: StResource<BufferState>,
    /// The uniform must be rewritten on the next update
    uniform_stale: bool,
}

impl CameraState {
    /// Creates the camera framing a cube of edge `volume_size` and registers its uniform buffer.
    pub fn new(
        buffer_state: StResource<BufferState>,
        config: &CameraConfig,
        volume_size: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let camera = camera::Camera::framing_volume(volume_size, config.zoom, width, height);
        let projection = camera::Projection::new(
            width,
            height,
            cgmath::Rad(config.fov),
            config.near_clip,
            config.far_clip,
        );
        let camera_controller = camera::CameraController::new(config);

        let mut camera_uniform = camera::CameraUniform::new();
        camera_uniform.update_view_proj_and_pos(&camera, &projection);

        buffer_state.get_mut().create_buffer_init(
            CAMERA_BUFFER_NAME,
            wgpu::util::BufferInitDescriptor {
                label: Some(CAMERA_BUFFER_NAME),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        CameraState {
            camera,
            camera_uniform,
            camera_controller,
            projection,
            buffer_state,
            uniform_stale: false,
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Applies pending input over `dt` and refreshes the uniform if anything moved.
    ///
    /// Returns whether the camera moved this frame. The camera's own change latch is left for
    /// the octree synchronisation to consume.
    pub fn update(&mut self, dt: web_time::Duration) -> BufferResult<bool> {
        let moved = self.camera_controller.has_updates();
        self.camera_controller.update_camera(&mut self.camera, dt);

        if moved || self.uniform_stale {
            self.camera_uniform
                .update_view_proj_and_pos(&self.camera, &self.projection);
            self.buffer_state.get().write_buffer(
                CAMERA_BUFFER_NAME,
                0,
                bytemuck::cast_slice(&[self.camera_uniform]),
            )?;
            self.uniform_stale = false;
            trace!("Camera at {:?}", self.camera.position);
        }
        Ok(moved)
    }

    /// Follows a surface resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.projection.resize(width, height);
        self.uniform_stale = true;
    }
}
