//! Message buffer rotation.
//!
//! Runs last in the frame. Messages written this frame stay readable through
//! the next one and are dropped after that.
use bevy_ecs::prelude::*;

use crate::events::combat::{CombatMessage, DamageRequest};
use crate::events::dialogue::DialogueMessage;
use crate::events::inventory::InventoryMessage;

pub fn update_messages(
    mut damage: ResMut<Messages<DamageRequest>>,
    mut combat: ResMut<Messages<CombatMessage>>,
    mut inventory: ResMut<Messages<InventoryMessage>>,
    mut dialogue: ResMut<Messages<DialogueMessage>>,
) {
    damage.update();
    combat.update();
    inventory.update();
    dialogue.update();
}

/// Register every engine message type.
pub fn init_messages(world: &mut World) {
    world.init_resource::<Messages<DamageRequest>>();
    world.init_resource::<Messages<CombatMessage>>();
    world.init_resource::<Messages<InventoryMessage>>();
    world.init_resource::<Messages<DialogueMessage>>();
}
