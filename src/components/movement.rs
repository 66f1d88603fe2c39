//! Kinematic movement state.
//!
//! The [`Movement`] component stores velocity together with the parameters
//! the movement system needs to integrate it: how fast input accelerates the
//! body, the maximum speed, and a per-second friction coefficient.
//!
//! Friction is applied as `friction^(dt * 60)`, so a coefficient of `0.9`
//! removes 10% of the velocity per 60 Hz frame regardless of the actual frame
//! rate. `1.0` disables friction.

use bevy_ecs::prelude::Component;
use glam::Vec2;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Movement {
    /// Current velocity in world units per second.
    pub velocity: Vec2,
    /// Velocity gained per second of input along the input direction.
    pub acceleration: f32,
    /// Velocity magnitude limit.
    pub max_speed: f32,
    /// Velocity retention per 60 Hz frame, in `[0, 1]`.
    pub friction: f32,
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: 800.0,
            max_speed: 200.0,
            friction: 0.85,
        }
    }
}

impl Movement {
    pub fn new(acceleration: f32, max_speed: f32, friction: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration,
            max_speed,
            friction,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Add an impulse of `acceleration * dt` along `direction`.
    ///
    /// The direction is normalized first; a zero direction is ignored.
    pub fn apply_input(&mut self, direction: Vec2, dt: f32) {
        if let Some(dir) = direction.try_normalize() {
            self.velocity += dir * self.acceleration * dt;
        }
    }

    /// Apply frame-rate independent friction for a step of `dt` seconds.
    pub fn apply_friction(&mut self, dt: f32) {
        self.velocity *= self.friction.powf(dt * 60.0);
    }

    /// Rescale the velocity to `max_speed` if it exceeds it, keeping direction.
    pub fn clamp_speed(&mut self) {
        let speed = self.velocity.length();
        if speed > self.max_speed && speed > 0.0 {
            self.velocity *= self.max_speed / speed;
        }
    }
}
