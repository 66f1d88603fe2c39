use bevy_ecs::prelude::Component;
use glam::Vec2;

/// World-space placement of an entity.
///
/// `position` is the pivot in world units (pixels). Colliders and sprites
/// are laid out relative to it.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Rotation in degrees. Collision ignores it.
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl Transform {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
