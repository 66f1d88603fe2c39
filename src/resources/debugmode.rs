//! Debug toggle resource.
//!
//! The mere presence of this resource indicates that debug rendering and
//! diagnostics should be enabled. Remove it to disable debug behavior.

use bevy_ecs::prelude::Resource;

/// Marker resource: when present, the render pass outlines colliders and
/// solid tiles.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct DebugMode;
