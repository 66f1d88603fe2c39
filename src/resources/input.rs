//! Per-frame input resource and the input capability it is fed from.
//!
//! The engine does not talk to hardware. A platform layer implements
//! [`InputSource`] (level-triggered "is this key down right now") and
//! [`update_input_state`](crate::systems::input::update_input_state) turns
//! that into the edge-triggered [`InputState`] systems read. Defaults use
//! WASD for movement, `E` to interact, `Space` to attack.
use bevy_ecs::prelude::*;
use glam::Vec2;
use rustc_hash::FxHashSet;

/// Keys the engine can bind actions to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Null,
    W,
    A,
    S,
    D,
    E,
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    F11,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Level-triggered input capability provided by the platform.
pub trait InputSource {
    fn is_key_down(&self, key: Key) -> bool;
    fn mouse_position(&self) -> Vec2;
    fn is_mouse_button_down(&self, button: MouseButton) -> bool;
}

/// Input snapshot backed by a set of held keys. Used for headless runs,
/// replays and tests.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pub keys: FxHashSet<Key>,
    pub buttons: FxHashSet<MouseButton>,
    pub mouse: Vec2,
}

impl InputSnapshot {
    pub fn with_keys(keys: &[Key]) -> Self {
        Self {
            keys: keys.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn press(&mut self, key: Key) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }
}

impl InputSource for InputSnapshot {
    fn is_key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    fn mouse_position(&self) -> Vec2 {
        self.mouse
    }

    fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Boolean key state with an associated keyboard binding.
pub struct BoolState {
    /// Whether the key is currently active/pressed this frame.
    pub active: bool,
    /// Whether the key was just pressed this frame.
    pub just_pressed: bool,
    /// Whether the key was just released this frame.
    pub just_released: bool,

    /// The key bound to this action.
    pub key_binding: Key,
}

impl Default for BoolState {
    fn default() -> Self {
        Self::bound(Key::Null)
    }
}

impl BoolState {
    pub fn bound(key_binding: Key) -> Self {
        Self {
            active: false,
            just_pressed: false,
            just_released: false,
            key_binding,
        }
    }

    /// Feed the current level and derive the edges against last frame.
    pub fn update(&mut self, down: bool) {
        self.just_pressed = down && !self.active;
        self.just_released = !down && self.active;
        self.active = down;
    }
}

/// Mouse position plus edge-triggered button states.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseState {
    pub position: Vec2,
    pub left: BoolState,
    pub right: BoolState,
    pub middle: BoolState,
}

/// Resource capturing the per-frame input state relevant to gameplay.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct InputState {
    pub up: BoolState,
    pub left: BoolState,
    pub down: BoolState,
    pub right: BoolState,
    pub interact: BoolState,
    pub attack: BoolState,
    pub back: BoolState,
    pub mode_debug: BoolState,
    pub mouse: MouseState,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            up: BoolState::bound(Key::W),
            left: BoolState::bound(Key::A),
            down: BoolState::bound(Key::S),
            right: BoolState::bound(Key::D),
            interact: BoolState::bound(Key::E),
            attack: BoolState::bound(Key::Space),
            back: BoolState::bound(Key::Escape),
            mode_debug: BoolState::bound(Key::F11),
            mouse: MouseState::default(),
        }
    }
}

impl InputState {
    /// Unnormalized direction from the four movement actions (y grows down).
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.up.active {
            dir.y -= 1.0;
        }
        if self.down.active {
            dir.y += 1.0;
        }
        if self.left.active {
            dir.x -= 1.0;
        }
        if self.right.active {
            dir.x += 1.0;
        }
        dir
    }
}
