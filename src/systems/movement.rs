//! Velocity integration.
//!
//! Each frame, every active entity with [`Transform`] and [`Movement`] loses
//! velocity to friction, is clamped to its max speed and then moves by
//! `velocity * dt`. Input is applied earlier in the frame through
//! [`move_entity`] or the input controller.
use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::identity::{EntityId, Inactive};
use crate::components::movement::Movement;
use crate::components::transform::Transform;
use crate::resources::entitystore::EntityStore;
use crate::resources::worldtime::WorldTime;

pub fn movement_system(
    mut query: Query<(&mut Transform, &mut Movement), Without<Inactive>>,
    time: Res<WorldTime>,
) {
    let dt = time.delta;
    for (mut transform, mut movement) in query.iter_mut() {
        movement.apply_friction(dt);
        movement.clamp_speed();
        let delta = movement.velocity * dt;
        transform.translate(delta);
    }
}

/// Accelerate an entity along `direction` for `dt` seconds. Returns false
/// when the entity is unknown or has no [`Movement`].
pub fn move_entity(store: &mut EntityStore, id: EntityId, direction: Vec2, dt: f32) -> bool {
    match store.get_mut::<Movement>(id) {
        Some(mut movement) => {
            movement.apply_input(direction, dt);
            true
        }
        None => false,
    }
}
