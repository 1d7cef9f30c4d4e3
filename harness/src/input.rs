//! Input seam and action bindings.
//!
//! The harness only asks "is this key/button held right now". Edge detection
//! (fire) and repeat behavior (jump) are decided by the callers.

use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    LeftControl,
    LeftShift,
    W,
    A,
    S,
    D,
    Q,
    E,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Polled keyboard/mouse state for the current frame.
pub trait InputState {
    fn is_key_down(&self, key: Key) -> bool;

    fn is_mouse_button_down(&self, button: MouseButton) -> bool;
}

/// Physical inputs bound to harness actions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: Key,
    pub back: Key,
    pub turn_left: Key,
    pub turn_right: Key,
    pub jump: Key,
    /// Held together with `fire`, projectiles spawn every frame instead of once per press.
    pub fire_override: Key,
    pub fire: MouseButton,
    pub camera: CameraBindings,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: Key::Up,
            back: Key::Down,
            turn_left: Key::Left,
            turn_right: Key::Right,
            jump: Key::Space,
            fire_override: Key::LeftControl,
            fire: MouseButton::Left,
            camera: CameraBindings::default(),
        }
    }
}

/// Fly-camera movement keys.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CameraBindings {
    pub forward: Key,
    pub back: Key,
    pub left: Key,
    pub right: Key,
    pub up: Key,
    pub down: Key,
}

impl Default for CameraBindings {
    fn default() -> Self {
        Self {
            forward: Key::W,
            back: Key::S,
            left: Key::A,
            right: Key::D,
            up: Key::E,
            down: Key::Q,
        }
    }
}

/// `+1` when only `positive` is held, `-1` when only `negative` is, else `0`.
pub fn axis(input: &dyn InputState, positive: Key, negative: Key) -> f32 {
    let mut value = 0.0;
    if input.is_key_down(positive) {
        value += 1.0;
    }
    if input.is_key_down(negative) {
        value -= 1.0;
    }
    value
}
