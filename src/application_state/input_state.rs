//! # Input State
//!
//! This module defines the input state types used by the input manager.
//! Keys and mouse buttons share one `InputKey` space, so a frame's input is a
//! single map of transitions plus the accumulated mouse movement.

use std::collections::HashMap;

/// Every key and button the world simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKey {
    /// Move forward
    KeyW,
    /// Move backward
    KeyS,
    /// Strafe left
    KeyA,
    /// Strafe right
    KeyD,
    /// Jump
    Space,
    /// Toggle flying
    Tab,
    /// Cycle the selected block type
    KeyE,
    /// Break the focused block
    MouseLeft,
    /// Place a block against the focused face
    MouseRight,
    /// Select a block type directly, `1..=9`
    Digit(u8),
}

impl InputKey {
    /// All tracked keys, in a stable order.
    pub fn all() -> Vec<InputKey> {
        let mut keys = vec![
            InputKey::KeyW,
            InputKey::KeyS,
            InputKey::KeyA,
            InputKey::KeyD,
            InputKey::Space,
            InputKey::Tab,
            InputKey::KeyE,
            InputKey::MouseLeft,
            InputKey::MouseRight,
        ];
        keys.extend((1..=9).map(InputKey::Digit));
        keys
    }
}

/// Represents the state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button was just pressed this frame
    Pressed,
    /// Key/button has been held down for multiple frames
    Held,
    /// Key/button was just released this frame
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

    /// Determines if the input was just released this frame
    pub fn is_just_released(&self) -> bool {
        matches!(self, RawInputState::Released)
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

/// A snapshot of the processed input states with state transitions.
#[derive(Debug, Clone, Default)]
pub struct ProcessedInputState {
    /// Current state of all tracked keys and buttons
    pub key_states: HashMap<InputKey, RawInputState>,

    /// Mouse movement delta since the last frame (x, y)
    pub mouse_delta: Option<(f64, f64)>,
}

impl ProcessedInputState {
    /// Gets the state of a key or button
    pub fn get_key_state(&self, key: InputKey) -> RawInputState {
        self.key_states.get(&key).copied().unwrap_or_default()
    }

    /// Gets the mouse movement delta since the last frame
    pub fn get_mouse_delta(&self) -> Option<(f64, f64)> {
        self.mouse_delta
    }
}
