//! Camera follow.
//!
//! In [`CameraMode::Follow`] the camera target eases toward the
//! [`CameraTarget`] entity by `1 - (1 - smoothing)^(dt * 60)` of the
//! remaining distance each frame, then is clamped so the view stays inside
//! the controller bounds. [`CameraMode::Fixed`] leaves the target alone.
use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::collider::Collider;
use crate::components::identity::Inactive;
use crate::components::inputcontrolled::CameraTarget;
use crate::components::transform::Transform;
use crate::geometry::Rect;
use crate::resources::camera2d::{Camera2D, CameraController, CameraMode};
use crate::resources::worldtime::WorldTime;

/// Fraction of the remaining distance covered in a step of `dt` seconds.
pub fn follow_factor(smoothing: f32, dt: f32) -> f32 {
    1.0 - (1.0 - smoothing.clamp(0.0, 1.0)).powf(dt * 60.0)
}

/// Keep a view of `half_extent` centered on `target` inside `bounds`. A view
/// larger than the bounds is centered on them.
pub fn clamp_to_bounds(target: Vec2, half_extent: Vec2, bounds: &Rect) -> Vec2 {
    let clamp_axis = |value: f32, half: f32, min: f32, max: f32| {
        if max - min <= half * 2.0 {
            (min + max) * 0.5
        } else {
            value.clamp(min + half, max - half)
        }
    };
    Vec2::new(
        clamp_axis(target.x, half_extent.x, bounds.x, bounds.right()),
        clamp_axis(target.y, half_extent.y, bounds.y, bounds.bottom()),
    )
}

fn target_point(transform: &Transform, collider: Option<&Collider>) -> Vec2 {
    collider
        .map(|c| c.bounds_at(transform.position).center())
        .unwrap_or(transform.position)
}

pub fn camera_follow_system(
    mut camera: ResMut<Camera2D>,
    controller: Res<CameraController>,
    time: Res<WorldTime>,
    targets: Query<(&Transform, Option<&Collider>), (With<CameraTarget>, Without<Inactive>)>,
) {
    let CameraMode::Follow { smoothing } = controller.mode else {
        return;
    };
    let Some(goal) = targets.iter().next().map(|(t, c)| target_point(t, c)) else {
        return;
    };
    let factor = follow_factor(smoothing, time.delta);
    let mut next = camera.target + (goal - camera.target) * factor;
    if let Some(bounds) = controller.bounds {
        next = clamp_to_bounds(next, camera.half_extent(), &bounds);
    }
    camera.target = next;
}

/// Jump straight to the camera target, e.g. right after a level load.
pub fn snap_camera(world: &mut World) {
    let mut query = world.query_filtered::<(&Transform, Option<&Collider>), (With<CameraTarget>, Without<Inactive>)>();
    let Some(goal) = query.iter(world).next().map(|(t, c)| target_point(t, c)) else {
        return;
    };
    let bounds = world.get_resource::<CameraController>().and_then(|c| c.bounds);
    if let Some(mut camera) = world.get_resource_mut::<Camera2D>() {
        let half = camera.half_extent();
        camera.target = match bounds {
            Some(b) => clamp_to_bounds(goal, half, &b),
            None => goal,
        };
    }
}
