//! Input- and camera-related tag components.
//!
//! - [`PlayerControlled`] – entity driven by the directional input actions
//! - [`CameraTarget`] – entity the follow camera tracks
//!
//! [`crate::systems::inputcontroller`] and [`crate::systems::camera`] read them.

use bevy_ecs::prelude::Component;

/// Marks the entity whose [`Movement`](super::movement::Movement) receives the
/// directional input impulse each frame, and who may talk to NPCs.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct PlayerControlled;

/// Marks the entity the camera follows. Only the first one found is used.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct CameraTarget;
