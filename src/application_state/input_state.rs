//! # Input State
//!
//! Per-frame key transitions produced by the input manager.

use std::collections::HashMap;
use winit::keyboard::KeyCode;

/// Represents the state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key is not pressed
    #[default]
    NotPressed,
    /// Key was just pressed this frame
    Pressed,
    /// Key has been held down for multiple frames
    Held,
    /// Key was just released this frame
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Determines if the input was just pressed this frame
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Derives the transition from the previous and current raw states
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of the tracked keys for one frame.
pub struct ProcessedInputState {
    /// Transition of every tracked key
    pub keyboard_states: HashMap<KeyCode, RawInputState>,
}

impl ProcessedInputState {
    /// Gets the state of a keyboard key
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }
}
