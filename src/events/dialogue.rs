//! Dialogue messages.
use bevy_ecs::message::Message;

use crate::components::identity::EntityId;

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum DialogueMessage {
    Started { npc: EntityId, speaker: String },
    /// A line is now showing; sent for the first line too.
    Line {
        npc: EntityId,
        speaker: String,
        text: String,
    },
    Ended { npc: EntityId },
}
