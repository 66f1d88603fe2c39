//! Identity and lifecycle tags attached to every store-managed entity.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Stable entity identifier handed out by
/// [`EntityStore`](crate::resources::entitystore::EntityStore).
///
/// Unlike bevy's `Entity`, whose index is recycled after despawn, an
/// `EntityId` increases monotonically and is never handed out twice by the
/// same store. Ordering by `EntityId` is therefore creation order.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Display name given at creation time.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct EntityName(pub String);

impl EntityName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Marker for deactivated entities. Every system filters these out with
/// `Without<Inactive>`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Inactive;
