//! Hit points and contact damage.

use bevy_ecs::prelude::Component;

use crate::components::collider::CollisionLayer;

/// Hit points with a short invulnerability window after each hit.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
    /// Seconds of invulnerability granted by each hit.
    pub invulnerability: f32,
    /// Remaining invulnerability in seconds.
    pub invulnerable_for: f32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self {
            current: max,
            max,
            invulnerability: 0.5,
            invulnerable_for: 0.0,
        }
    }

    pub fn with_invulnerability(mut self, seconds: f32) -> Self {
        self.invulnerability = seconds;
        self
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_for > 0.0
    }

    /// Apply damage unless invulnerable. Returns the damage actually dealt.
    pub fn damage(&mut self, amount: i32) -> i32 {
        if amount <= 0 || self.is_invulnerable() || self.is_dead() {
            return 0;
        }
        let dealt = amount.min(self.current);
        self.current -= dealt;
        self.invulnerable_for = self.invulnerability;
        dealt
    }

    /// Restore hit points up to `max`. Returns the amount healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if amount <= 0 || self.is_dead() {
            return 0;
        }
        let healed = amount.min(self.max - self.current);
        self.current += healed;
        healed
    }

    pub fn tick(&mut self, dt: f32) {
        self.invulnerable_for = (self.invulnerable_for - dt).max(0.0);
    }
}

/// Damage dealt to any [`Health`] holder this entity touches whose collider
/// layer intersects `targets`.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct ContactDamage {
    pub amount: i32,
    pub targets: CollisionLayer,
}

impl ContactDamage {
    pub fn new(amount: i32, targets: CollisionLayer) -> Self {
        Self { amount, targets }
    }
}
