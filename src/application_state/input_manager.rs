//! # Input Manager
//!
//! Tracks the keys the engine listens to and turns raw press/release events into per-frame
//! transitions (pressed, held, released).

use std::collections::HashMap;

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{ProcessedInputState, RawInputState};

const KEY_CODES: [KeyCode; 18] = [
    KeyCode::KeyW,
    KeyCode::KeyA,
    KeyCode::KeyS,
    KeyCode::KeyD,
    KeyCode::KeyQ,
    KeyCode::KeyE,
    KeyCode::ArrowUp,
    KeyCode::ArrowDown,
    KeyCode::ArrowLeft,
    KeyCode::ArrowRight,
    KeyCode::Equal,
    KeyCode::Minus,
    KeyCode::NumpadAdd,
    KeyCode::NumpadSubtract,
    KeyCode::KeyF,
    KeyCode::KeyG,
    KeyCode::KeyC,
    KeyCode::KeyB,
];

/// Manages the state of the tracked keys.
pub struct InputManager {
    /// State of all tracked keys at the end of the previous frame
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a new InputManager with every tracked key released.
    pub fn new() -> Self {
        let mut keyboard_inputs_old = HashMap::new();
        let mut keyboard_inputs_new = HashMap::new();
        for key_code in KEY_CODES {
            keyboard_inputs_old.insert(key_code, false);
            keyboard_inputs_new.insert(key_code, false);
        }

        Self {
            keyboard_inputs_old,
            keyboard_inputs_new,
        }
    }

    /// Copies the current state into the previous state, ready for the next frame.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }
    }

    /// Processes a window event and updates internal input state.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state,
                    physical_key: PhysicalKey::Code(key),
                    ..
                },
            ..
        } = event
        {
            self.set_key(*key, *state == ElementState::Pressed);
        }
    }

    /// Records a key as down or up. Untracked keys are ignored.
    pub fn set_key(&mut self, key: KeyCode, is_down: bool) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            *key_state = is_down;
        }
    }

    /// Creates a processed input state from the current raw boolean states.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        ProcessedInputState { keyboard_states }
    }

    /// Returns the processed input state and advances to the next frame.
    pub fn get_and_reset_processed_input(&mut self) -> Option<ProcessedInputState> {
        let processed_input = Some(self.create_processed_input_state());
        self.reset_inputs();
        processed_input
    }

    /// Ends the current frame. Also called when the window loses focus.
    pub fn reset_inputs(&mut self) {
        self.move_old_states();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_transitions_follow_frames() {
        let mut input_manager = InputManager::new();

        input_manager.set_key(KeyCode::KeyF, true);
        let frame = input_manager.get_and_reset_processed_input().unwrap();
        assert_eq!(frame.get_key_state(KeyCode::KeyF), RawInputState::Pressed);

        let frame = input_manager.get_and_reset_processed_input().unwrap();
        assert_eq!(frame.get_key_state(KeyCode::KeyF), RawInputState::Held);

        input_manager.set_key(KeyCode::KeyF, false);
        let frame = input_manager.get_and_reset_processed_input().unwrap();
        assert_eq!(frame.get_key_state(KeyCode::KeyF), RawInputState::Released);
    }

    #[test]
    fn untracked_keys_are_ignored() {
        let mut input_manager = InputManager::new();
        input_manager.set_key(KeyCode::KeyZ, true);
        let frame = input_manager.create_processed_input_state();
        assert_eq!(frame.get_key_state(KeyCode::KeyZ), RawInputState::NotPressed);
    }
}
