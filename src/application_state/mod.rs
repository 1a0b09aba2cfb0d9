//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling
//! - Application lifecycle events

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{Graphics, MaybeGraphics};
use input_manager::InputManager;

use log::error;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{config::EngineConfig, engine_state::EngineState};

/// The main application state container that manages the application's lifecycle.
pub struct ApplicationState {
    /// The current graphics state, which may be initializing or ready
    pub graphics: MaybeGraphics,

    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,

    /// Settings the engine is built from
    pub config: EngineConfig,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The core engine state and logic
    pub engine_state: EngineState,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: web_time::Instant,
}

fn is_exit_request(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event: KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
                ..
            }
    )
}

impl ApplicationState {
    /// Creates the application in its initial, graphics-building state.
    pub fn new(graphics: MaybeGraphics, config: EngineConfig) -> Self {
        Self {
            graphics,
            state: None,
            config,
        }
    }

    /// Moves the ready graphics resources into a new engine.
    fn initialize_application_state(&mut self, event_loop: &ActiveEventLoop) {
        let MaybeGraphics::Graphics(gfx) = std::mem::replace(&mut self.graphics, MaybeGraphics::Moved)
        else {
            return;
        };

        let window = gfx.window;
        match EngineState::new(
            gfx.surface,
            gfx.surface_config,
            gfx.device,
            gfx.queue,
            &self.config,
        ) {
            Ok(engine_state) => {
                self.state = Some(InitializedApplicationState {
                    engine_state,
                    window,
                    input_manager: InputManager::new(),
                    last_wait_time: web_time::Instant::now(),
                });
            }
            Err(err) => {
                error!("Engine initialization failed: {}", err);
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler<Graphics> for ApplicationState {
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if is_exit_request(&event) {
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };
        let input_manager = &mut state.input_manager;
        let engine_state = &mut state.engine_state;

        input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                engine_state.resize_surface(size);
            }
            WindowEvent::Focused(is_focused) => {
                if !is_focused {
                    input_manager.reset_inputs();
                }
            }
            WindowEvent::RedrawRequested => {
                engine_state.render();
            }
            _ => (),
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: Graphics) {
        self.graphics = MaybeGraphics::Graphics(graphics);
        self.initialize_application_state(event_loop);
    }

    /// Runs once per loop iteration: input, camera and edits, then a redraw request.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            let now = web_time::Instant::now();
            let wait_dt = now - state.last_wait_time;

            if let Some(processed_input) = state.input_manager.get_and_reset_processed_input() {
                state.engine_state.set_input_commands(processed_input);
            }

            state.engine_state.process_input(wait_dt);

            state.last_wait_time = now;
            state.window.request_redraw();
        }
    }
}
