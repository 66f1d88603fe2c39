//! Contacts found by the entity collision pass in the current frame.
//!
//! Written by [`entity_collision_system`](crate::systems::collision::entity_collision_system),
//! read by the combat, inventory and dialogue stages that run after it.

use bevy_ecs::prelude::{Entity, Resource};

use crate::components::identity::EntityId;

/// One overlapping, layer-compatible pair. `a` is always the lower id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: Entity,
    pub a_id: EntityId,
    pub b: Entity,
    pub b_id: EntityId,
}

impl Contact {
    /// The other participant if `entity` is part of this contact.
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.a == entity {
            Some(self.b)
        } else if self.b == entity {
            Some(self.a)
        } else {
            None
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct FrameContacts {
    pub pairs: Vec<Contact>,
}

impl FrameContacts {
    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn involving(&self, id: EntityId) -> impl Iterator<Item = &Contact> {
        self.pairs.iter().filter(move |c| c.a_id == id || c.b_id == id)
    }
}
