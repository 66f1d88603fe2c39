//! Combat messages.
use bevy_ecs::message::Message;

use crate::components::identity::EntityId;

/// Request to damage an entity, processed by the combat pass of the same
/// frame.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct DamageRequest {
    pub target: EntityId,
    pub amount: i32,
    pub source: Option<EntityId>,
}

/// Outcome of combat, one message per hit or death.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum CombatMessage {
    Damaged {
        target: EntityId,
        source: Option<EntityId>,
        amount: i32,
        remaining: i32,
    },
    Died {
        target: EntityId,
    },
}
