//! # Engine State Module
//!
//! The core engine module that ties the world volume, the camera and the renderer together.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `buffer_state` - Named GPU buffers with usage analytics
//! * `camera_state` - Camera positioning, movement and its uniform buffer
//! * `rendering` - The raycast and mesh draw paths
//! * `voxels` - The octree, the chunked field and the edit surface they share
//!
//! ## Frame Flow
//!
//! 1. Input is translated into a [`PlayerAction`]
//! 2. The camera moves and debug edits are applied to the volume
//! 3. The renderer uploads whatever changed and draws

use log::{debug, error, info, warn};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::keyboard::KeyCode;

use crate::{
    application_state::input_state::ProcessedInputState,
    config::EngineConfig,
    core::StResource,
    error::EngineError,
};

use buffer_state::BufferState;
use camera_state::CameraState;
use rendering::RenderManager;
use voxels::{block::VoxelTypeId, volume::WorldVolume};

pub mod buffer_state;
pub mod camera_state;
pub mod rendering;
pub mod voxels;

/// Voxel type placed by the add-voxel debug key
const DEBUG_VOXEL_TYPE: VoxelTypeId = 1;

/// The main state container for the voxel engine
pub struct EngineState {
    /// Camera state managing position, orientation and movement
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// Buffer state for managing GPU buffers
    pub buffer_state: StResource<BufferState>,
    /// Surface and pipelines
    pub render_manager: RenderManager,
    /// The voxel world
    pub volume: WorldVolume,
    /// Source of the debug edit positions
    rng: fastrand::Rng,
}

impl EngineState {
    /// Builds the volume described by `config` and everything needed to draw it.
    ///
    /// # Errors
    /// Fails when the volume cannot be built or its GPU buffers cannot be bound.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let mut rng = config.rng();
        let volume = WorldVolume::from_config(config, &mut rng)?;

        let buffer_state = StResource::new(BufferState::new(device.clone(), queue.clone()));

        let volume_size = volume.extent().into_iter().max().unwrap_or(1);
        let camera_state = CameraState::new(
            buffer_state.clone(),
            &config.camera,
            volume_size,
            surface_config.width,
            surface_config.height,
        );

        let render_manager = RenderManager::new(
            surface,
            surface_config,
            device,
            queue,
            buffer_state.clone(),
            &volume,
        )?;

        Ok(Self {
            camera_state,
            player_actions: PlayerAction::default(),
            buffer_state,
            render_manager,
            volume,
            rng,
        })
    }

    /// Resizes the rendering surface when the window size changes
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Err(err) = self.render_manager.resize_surface(size) {
            error!("Failed to resize render targets: {}", err);
        }
        self.camera_state.resize(size.width, size.height);
    }

    /// Renders the current frame
    pub fn render(&mut self) {
        if let Err(err) = self
            .render_manager
            .render(&mut self.volume, &mut self.camera_state.camera)
        {
            error!("Frame failed: {}", err);
        }
    }

    /// Moves the camera and applies the debug actions for this frame.
    pub fn process_input(&mut self, wait_duration: web_time::Duration) {
        self.camera_state.intake_actions(&self.player_actions);
        if let Err(err) = self.camera_state.update(wait_duration) {
            error!("Camera uniform update failed: {}", err);
        }

        if self.player_actions.add_voxel {
            let [x, y, z] = self.random_cell();
            match self
                .volume
                .as_volume_mut()
                .add_voxel(x, y, z, DEBUG_VOXEL_TYPE)
            {
                Ok(()) => debug!("Added voxel at ({}, {}, {})", x, y, z),
                Err(err) => warn!("Could not add voxel: {}", err),
            }
        }

        if self.player_actions.remove_voxel {
            let [x, y, z] = self.random_cell();
            match self.volume.as_volume_mut().remove_voxel(x, y, z) {
                Ok(()) => debug!("Removed voxel at ({}, {}, {})", x, y, z),
                Err(err) => warn!("Could not remove voxel: {}", err),
            }
        }

        if self.player_actions.log_count {
            info!("{} typed voxels", self.volume.count_typed_voxels());
        }

        if self.player_actions.log_buffers {
            self.buffer_state.get().log_analytics();
        }

        // Debug actions fire once per press.
        self.player_actions.add_voxel = false;
        self.player_actions.remove_voxel = false;
        self.player_actions.log_count = false;
        self.player_actions.log_buffers = false;
    }

    /// Sets the input commands for the engine state.
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = PlayerAction::from_input(&input);
    }

    fn random_cell(&mut self) -> [u32; 3] {
        let [width, height, depth] = self.volume.extent();
        [
            self.rng.u32(0..width.max(1)),
            self.rng.u32(0..height.max(1)),
            self.rng.u32(0..depth.max(1)),
        ]
    }
}

/// Represents player actions derived from input
///
/// Movement and look flags are level triggered and stay set while the key is held. The debug
/// flags are edge triggered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlayerAction {
    /// D
    pub move_right: bool,
    /// A
    pub move_left: bool,
    /// W
    pub move_up: bool,
    /// S
    pub move_down: bool,
    /// E
    pub move_in: bool,
    /// Q
    pub move_out: bool,
    /// Right arrow
    pub look_right: bool,
    /// Left arrow
    pub look_left: bool,
    /// Up arrow
    pub look_up: bool,
    /// Down arrow
    pub look_down: bool,
    /// `=` or numpad `+`
    pub zoom_in: bool,
    /// `-` or numpad `-`
    pub zoom_out: bool,

    /// F: place a voxel at a random cell
    pub add_voxel: bool,
    /// G: clear a random cell
    pub remove_voxel: bool,
    /// C: log the typed voxel count
    pub log_count: bool,
    /// B: log buffer analytics
    pub log_buffers: bool,
}

impl PlayerAction {
    /// Translates the processed input state into player actions.
    pub fn from_input(input: &ProcessedInputState) -> Self {
        let held = |key| input.get_key_state(key).is_active();
        let pressed = |key| input.get_key_state(key).is_just_pressed();

        Self {
            move_right: held(KeyCode::KeyD),
            move_left: held(KeyCode::KeyA),
            move_up: held(KeyCode::KeyW),
            move_down: held(KeyCode::KeyS),
            move_in: held(KeyCode::KeyE),
            move_out: held(KeyCode::KeyQ),
            look_right: held(KeyCode::ArrowRight),
            look_left: held(KeyCode::ArrowLeft),
            look_up: held(KeyCode::ArrowUp),
            look_down: held(KeyCode::ArrowDown),
            zoom_in: held(KeyCode::Equal) || held(KeyCode::NumpadAdd),
            zoom_out: held(KeyCode::Minus) || held(KeyCode::NumpadSubtract),
            add_voxel: pressed(KeyCode::KeyF),
            remove_voxel: pressed(KeyCode::KeyG),
            log_count: pressed(KeyCode::KeyC),
            log_buffers: pressed(KeyCode::KeyB),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_state::input_state::RawInputState;

    fn input(keys: &[(KeyCode, RawInputState)]) -> ProcessedInputState {
        ProcessedInputState {
            keyboard_states: keys.iter().copied().collect(),
        }
    }

    #[test]
    fn held_keys_move_and_pressed_keys_edit() {
        let actions = PlayerAction::from_input(&input(&[
            (KeyCode::KeyW, RawInputState::Held),
            (KeyCode::ArrowLeft, RawInputState::Pressed),
            (KeyCode::KeyF, RawInputState::Pressed),
            (KeyCode::KeyG, RawInputState::Held),
        ]));

        assert!(actions.move_up);
        assert!(actions.look_left);
        assert!(actions.add_voxel);
        assert!(!actions.remove_voxel);
        assert!(!actions.move_down);
    }

    #[test]
    fn released_keys_do_nothing() {
        let actions = PlayerAction::from_input(&input(&[(KeyCode::KeyD, RawInputState::Released)]));
        assert_eq!(actions, PlayerAction::default());
    }
}
