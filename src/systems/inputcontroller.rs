//! Input-driven acceleration for player-controlled entities.
use bevy_ecs::prelude::*;

use crate::components::identity::Inactive;
use crate::components::inputcontrolled::PlayerControlled;
use crate::components::movement::Movement;
use crate::resources::input::InputState;
use crate::resources::worldtime::WorldTime;

/// Accelerate every active [`PlayerControlled`] entity along the held
/// direction keys. Runs before the movement system in the same frame.
pub fn input_controller_system(
    input: Res<InputState>,
    time: Res<WorldTime>,
    mut query: Query<&mut Movement, (With<PlayerControlled>, Without<Inactive>)>,
) {
    let direction = input.direction();
    if direction == glam::Vec2::ZERO {
        return;
    }
    for mut movement in query.iter_mut() {
        movement.apply_input(direction, time.delta);
    }
}
