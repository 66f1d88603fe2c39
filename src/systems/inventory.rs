//! Item pickup.
//!
//! An [`Inventory`] holder touching an [`ItemPickup`] takes as much of it as
//! fits, limited by free slots and the per-stack cap. A fully taken pickup is
//! marked [`Inactive`]; a partial one keeps the remainder for a later frame.
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::identity::{EntityId, Inactive};
use crate::components::inventory::{Inventory, ItemPickup};
use crate::events::inventory::InventoryMessage;
use crate::resources::contacts::FrameContacts;

pub fn inventory_system(
    contacts: Res<FrameContacts>,
    mut collectors: Query<(&EntityId, &mut Inventory), Without<Inactive>>,
    mut pickups: Query<(&EntityId, &mut ItemPickup), Without<Inactive>>,
    mut messages: MessageWriter<InventoryMessage>,
    mut commands: Commands,
) {
    for contact in &contacts.pairs {
        for (collector, pickup) in [(contact.a, contact.b), (contact.b, contact.a)] {
            let Ok((collector_id, mut inventory)) = collectors.get_mut(collector) else {
                continue;
            };
            let Ok((pickup_id, mut item)) = pickups.get_mut(pickup) else {
                continue;
            };
            if item.quantity == 0 {
                continue;
            }
            let taken = inventory.add_item(&item.item_id, item.quantity);
            if taken == 0 {
                messages.write(InventoryMessage::Full {
                    collector: *collector_id,
                    item_id: item.item_id.clone(),
                });
                continue;
            }
            item.quantity -= taken;
            debug!(
                "{} picked up {} x{} from {}",
                collector_id, item.item_id, taken, pickup_id
            );
            messages.write(InventoryMessage::Collected {
                collector: *collector_id,
                pickup: *pickup_id,
                item_id: item.item_id.clone(),
                quantity: taken,
            });
            if item.quantity == 0 {
                commands.entity(pickup).insert(Inactive);
            }
        }
    }
}
