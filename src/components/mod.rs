//! ECS components for entities.
//!
//! This module groups all component types that can be attached to entities in
//! the game world. The seven gameplay kinds form the closed set
//! [`ComponentKind`]; an entity holds at most one component of each kind.
//! [`ComponentValue`] and [`ComponentRef`] are tagged variants over that set
//! so callers can work with a kind chosen at runtime, while
//! [`EngineComponent`] gives typed access when the kind is known statically.
//!
//! Submodules overview:
//! - [`collider`] – AABB collider with a layer bitmask and collision callback
//! - [`dialogue`] – linear NPC conversation state
//! - [`health`] – hit points, invulnerability window and contact damage
//! - [`identity`] – stable entity id, display name and the inactive marker
//! - [`inputcontrolled`] – player and camera-target tags
//! - [`inventory`] – stack inventory and world pickups
//! - [`movement`] – velocity, acceleration, max speed and friction
//! - [`sprite`] – image region to draw at the entity position
//! - [`transform`] – world-space position, rotation and scale

pub mod collider;
pub mod dialogue;
pub mod health;
pub mod identity;
pub mod inputcontrolled;
pub mod inventory;
pub mod movement;
pub mod sprite;
pub mod transform;

use bevy_ecs::component::{Component, Mutable};

use self::collider::Collider;
use self::dialogue::Dialogue;
use self::health::Health;
use self::inventory::Inventory;
use self::movement::Movement;
use self::sprite::Sprite;
use self::transform::Transform;

/// The closed set of gameplay component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Transform,
    Sprite,
    Collider,
    Movement,
    Health,
    Inventory,
    Dialogue,
}

impl ComponentKind {
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "transform",
            ComponentKind::Sprite => "sprite",
            ComponentKind::Collider => "collider",
            ComponentKind::Movement => "movement",
            ComponentKind::Health => "health",
            ComponentKind::Inventory => "inventory",
            ComponentKind::Dialogue => "dialogue",
        }
    }
}

/// An owned component of any kind.
#[derive(Debug, Clone)]
pub enum ComponentValue {
    Transform(Transform),
    Sprite(Sprite),
    Collider(Collider),
    Movement(Movement),
    Health(Health),
    Inventory(Inventory),
    Dialogue(Dialogue),
}

impl ComponentValue {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentValue::Transform(_) => ComponentKind::Transform,
            ComponentValue::Sprite(_) => ComponentKind::Sprite,
            ComponentValue::Collider(_) => ComponentKind::Collider,
            ComponentValue::Movement(_) => ComponentKind::Movement,
            ComponentValue::Health(_) => ComponentKind::Health,
            ComponentValue::Inventory(_) => ComponentKind::Inventory,
            ComponentValue::Dialogue(_) => ComponentKind::Dialogue,
        }
    }
}

/// A borrowed component of any kind.
#[derive(Debug, Clone, Copy)]
pub enum ComponentRef<'a> {
    Transform(&'a Transform),
    Sprite(&'a Sprite),
    Collider(&'a Collider),
    Movement(&'a Movement),
    Health(&'a Health),
    Inventory(&'a Inventory),
    Dialogue(&'a Dialogue),
}

impl ComponentRef<'_> {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentRef::Transform(_) => ComponentKind::Transform,
            ComponentRef::Sprite(_) => ComponentKind::Sprite,
            ComponentRef::Collider(_) => ComponentKind::Collider,
            ComponentRef::Movement(_) => ComponentKind::Movement,
            ComponentRef::Health(_) => ComponentKind::Health,
            ComponentRef::Inventory(_) => ComponentKind::Inventory,
            ComponentRef::Dialogue(_) => ComponentKind::Dialogue,
        }
    }
}

/// Statically known gameplay component type.
pub trait EngineComponent: Component<Mutability = Mutable> + Sized {
    const KIND: ComponentKind;
    fn into_value(self) -> ComponentValue;
}

macro_rules! engine_component {
    ($ty:ident) => {
        impl EngineComponent for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;
            fn into_value(self) -> ComponentValue {
                ComponentValue::$ty(self)
            }
        }

        impl From<$ty> for ComponentValue {
            fn from(c: $ty) -> Self {
                ComponentValue::$ty(c)
            }
        }
    };
}

engine_component!(Transform);
engine_component!(Sprite);
engine_component!(Collider);
engine_component!(Movement);
engine_component!(Health);
engine_component!(Inventory);
engine_component!(Dialogue);
