//! Axis-aligned collider with a layer bitmask.
//!
//! Two colliders may interact only when their layers share at least one bit.
//! The collider keeps a copy of its world-space bounds which the collision
//! system refreshes from the entity's [`Transform`](super::transform::Transform)
//! every frame before any pair is tested.

use std::ops::{BitAnd, BitOr, BitOrAssign};

use bevy_ecs::prelude::{Commands, Component, Entity};
use glam::Vec2;

use crate::components::identity::EntityId;
use crate::geometry::Rect;

/// Power-of-two collision layer flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    pub const NONE: Self = Self(0);
    pub const SOLID: Self = Self(1);
    pub const TRIGGER: Self = Self(2);
    pub const PLAYER: Self = Self(4);
    pub const ENEMY: Self = Self(8);
    pub const ITEM: Self = Self(16);
    pub const NPC: Self = Self(32);

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when the two masks share at least one bit.
    pub const fn interacts_with(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse a layer name as used in level files (`"player"`, `"enemy"`...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(Self::NONE),
            "solid" => Some(Self::SOLID),
            "trigger" => Some(Self::TRIGGER),
            "player" => Some(Self::PLAYER),
            "enemy" => Some(Self::ENEMY),
            "item" => Some(Self::ITEM),
            "npc" => Some(Self::NPC),
            _ => None,
        }
    }
}

impl BitOr for CollisionLayer {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CollisionLayer {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CollisionLayer {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// What a collider's callback learns about the other participant.
#[derive(Debug, Clone, Copy)]
pub struct CollisionContact {
    /// Entity owning the callback.
    pub entity: Entity,
    pub id: EntityId,
    /// The other participant.
    pub other: Entity,
    pub other_id: EntityId,
    pub other_layer: CollisionLayer,
    pub other_is_trigger: bool,
    pub other_bounds: Rect,
}

/// Callback signature for colliders.
///
/// Invoked once per frame per overlapping, layer-compatible pair, for both
/// participants. The trigger flag never suppresses it.
pub type CollisionCallback = fn(contact: &CollisionContact, commands: &mut Commands);

#[derive(Component, Clone, Copy, Debug)]
pub struct Collider {
    pub size: Vec2,
    pub offset: Vec2,
    pub layer: CollisionLayer,
    pub is_trigger: bool,
    /// World-space bounds as of the last collision pass.
    pub bounds: Rect,
    pub on_collision: Option<CollisionCallback>,
}

impl Collider {
    /// Create a Collider with given size on the given layer.
    pub fn new(width: f32, height: f32, layer: CollisionLayer) -> Self {
        Self {
            size: Vec2::new(width, height),
            offset: Vec2::ZERO,
            layer,
            is_trigger: false,
            bounds: Rect::new(0.0, 0.0, width, height),
            on_collision: None,
        }
    }

    /// Collider whose bounds are set directly, with no offset.
    pub fn from_bounds(bounds: Rect, layer: CollisionLayer) -> Self {
        Self {
            size: Vec2::new(bounds.w, bounds.h),
            offset: Vec2::ZERO,
            layer,
            is_trigger: false,
            bounds,
            on_collision: None,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn with_callback(mut self, callback: CollisionCallback) -> Self {
        self.on_collision = Some(callback);
        self
    }

    /// World-space AABB for the given entity position.
    /// Handles negative size by normalizing to proper min/max.
    pub fn bounds_at(&self, position: Vec2) -> Rect {
        Rect::from_corner_size(position + self.offset, self.size)
    }

    /// Refresh the cached bounds from the entity position.
    pub fn sync(&mut self, position: Vec2) {
        self.bounds = self.bounds_at(position);
    }

    /// Entity position that would place the collider at `bounds`.
    pub fn position_for_bounds(&self, bounds: &Rect) -> Vec2 {
        let p0 = self.offset;
        let p1 = self.offset + self.size;
        bounds.min() - p0.min(p1)
    }

    /// Layer-gated AABB test on the cached bounds.
    pub fn check_collision(&self, other: &Collider) -> bool {
        self.layer.interacts_with(other.layer) && self.bounds.intersects(&other.bounds)
    }
}
