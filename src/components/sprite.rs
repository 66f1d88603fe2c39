use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Sprite is identified by an image key, its size in world units and a
/// source offset if the image is a spritesheet or atlas.
/// The origin selects the pivot point (in pixels) relative to the image's
/// top-left, so the sprite's top-left lands at `position - origin`.
/// Lower `z_index` values are drawn first.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Sprite {
    pub image_key: String,
    pub width: f32,
    pub height: f32,
    pub offset: Vec2,
    pub origin: Vec2,
    pub flip_h: bool,
    pub flip_v: bool,
    pub z_index: i32,
    pub visible: bool,
}

impl Sprite {
    pub fn new(image_key: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            image_key: image_key.into(),
            width,
            height,
            offset: Vec2::ZERO,
            origin: Vec2::ZERO,
            flip_h: false,
            flip_v: false,
            z_index: 0,
            visible: true,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_z(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}
