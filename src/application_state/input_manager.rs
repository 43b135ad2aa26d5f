//! # Input Manager
//!
//! This module tracks raw key and button states between frames and turns them
//! into `ProcessedInputState` snapshots:
//! - Press/release intake from whatever drives the application
//! - Mouse movement accumulation
//! - Frame-to-frame transition tracking

use std::collections::HashMap;

use log::trace;

use super::input_state::{InputKey, ProcessedInputState, RawInputState};

/// Manages the state of all input devices.
///
/// Keys start released. Presses and releases update the "new" state; taking a
/// processed snapshot compares it with the "old" state and then rolls the new
/// state over.
pub struct InputManager {
    /// Previous state of all tracked keys
    pub key_inputs_old: HashMap<InputKey, bool>,
    /// Current state of all tracked keys
    pub key_inputs_new: HashMap<InputKey, bool>,

    /// Mouse movement accumulated since the last snapshot (x, y)
    pub mouse_delta: Option<(f64, f64)>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a new InputManager with every tracked key released.
    pub fn new() -> Self {
        let mut key_inputs_old = HashMap::new();
        let mut key_inputs_new = HashMap::new();
        for key in InputKey::all() {
            key_inputs_old.insert(key, false);
            key_inputs_new.insert(key, false);
        }

        Self {
            key_inputs_old,
            key_inputs_new,
            mouse_delta: None,
        }
    }

    /// Updates the old state with the current state to prepare for the next frame.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.key_inputs_new.iter() {
            if let Some(old_state) = self.key_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }
    }

    /// Marks `key` as held down. Untracked keys are ignored.
    pub fn press(&mut self, key: InputKey) {
        if let Some(key_state) = self.key_inputs_new.get_mut(&key) {
            *key_state = true;
        } else {
            trace!("Ignoring untracked key {:?}", key);
        }
    }

    /// Marks `key` as released.
    pub fn release(&mut self, key: InputKey) {
        if let Some(key_state) = self.key_inputs_new.get_mut(&key) {
            *key_state = false;
        }
    }

    /// Adds a mouse movement delta to this frame's total.
    ///
    /// # Arguments
    /// * `delta` - The (x, y) delta of mouse movement since the last update
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Creates a processed input state from the current raw boolean states.
    ///
    /// # Returns
    /// A new `ProcessedInputState` with one transition per tracked key.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let key_states = self
            .key_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.key_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        ProcessedInputState {
            key_states,
            mouse_delta: self.mouse_delta,
        }
    }

    /// Returns the processed input state and resets internal state for the
    /// next frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Rolls key states over and clears the mouse movement.
    pub fn reset_inputs(&mut self) {
        self.move_old_states();
        self.mouse_delta = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_then_hold_then_release() {
        let mut manager = InputManager::new();

        manager.press(InputKey::KeyW);
        let first = manager.get_and_reset_processed_input();
        assert_eq!(first.get_key_state(InputKey::KeyW), RawInputState::Pressed);

        let second = manager.get_and_reset_processed_input();
        assert_eq!(second.get_key_state(InputKey::KeyW), RawInputState::Held);

        manager.release(InputKey::KeyW);
        let third = manager.get_and_reset_processed_input();
        assert_eq!(third.get_key_state(InputKey::KeyW), RawInputState::Released);
        assert_eq!(third.get_key_state(InputKey::KeyS), RawInputState::NotPressed);
    }

    #[test]
    fn mouse_motion_accumulates_until_reset() {
        let mut manager = InputManager::new();
        manager.intake_mouse_motion((3.0, -1.0));
        manager.intake_mouse_motion((2.0, 4.0));

        let input = manager.get_and_reset_processed_input();
        assert_eq!(input.get_mouse_delta(), Some((5.0, 3.0)));
        assert_eq!(manager.create_processed_input_state().get_mouse_delta(), None);
    }
}
