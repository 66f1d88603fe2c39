//! Collision notifications.
//!
//! The entity collision pass triggers a [`CollisionEvent`] for every
//! qualifying pair, once per frame, after both sides' `on_collision`
//! callbacks ran. Observers receive the pair ordered by [`EntityId`].
use bevy_ecs::prelude::*;

use crate::components::identity::EntityId;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: Entity,
    pub a_id: EntityId,
    pub b: Entity,
    pub b_id: EntityId,
}

impl CollisionEvent {
    pub fn involves(&self, id: EntityId) -> bool {
        self.a_id == id || self.b_id == id
    }
}
