//! Inventory messages.
use bevy_ecs::message::Message;

use crate::components::identity::EntityId;

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum InventoryMessage {
    /// `quantity` items moved from `pickup` into the collector's inventory.
    Collected {
        collector: EntityId,
        pickup: EntityId,
        item_id: String,
        quantity: u32,
    },
    /// The collector had no room for any of the pickup.
    Full {
        collector: EntityId,
        item_id: String,
    },
}
