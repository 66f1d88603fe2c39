//! Entity-component store.
//!
//! [`EntityStore`] owns the bevy [`World`] and layers the engine's entity
//! contract on top of it:
//!
//! - ids are [`EntityId`]s that increase monotonically and are never reused,
//!   even though bevy recycles `Entity` indices after despawn;
//! - iteration follows insertion order;
//! - components are addressed either statically through
//!   [`EngineComponent`] or dynamically through [`ComponentKind`];
//! - every operation on an unknown or removed id is a no-op returning
//!   `None`/`false`.
//!
//! Systems still run against the inner `World` through a `Schedule`; the
//! store only maintains the id index next to it.

use bevy_ecs::prelude::*;
use log::debug;
use rustc_hash::FxHashMap;

use crate::components::collider::Collider;
use crate::components::dialogue::Dialogue;
use crate::components::health::Health;
use crate::components::identity::{EntityId, EntityName, Inactive};
use crate::components::inventory::Inventory;
use crate::components::movement::Movement;
use crate::components::sprite::Sprite;
use crate::components::transform::Transform;
use crate::components::{ComponentKind, ComponentRef, ComponentValue, EngineComponent};

pub struct EntityStore {
    world: World,
    index: FxHashMap<EntityId, Entity>,
    order: Vec<EntityId>,
    next_id: u64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::with_world(World::new())
    }

    /// Wrap an existing world, typically one with resources already inserted.
    /// Entities already present in it are not indexed.
    pub fn with_world(world: World) -> Self {
        Self {
            world,
            index: FxHashMap::default(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Create an active entity with no gameplay components.
    pub fn create(&mut self, name: impl Into<String>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let entity = self.world.spawn((id, EntityName(name.into()))).id();
        self.index.insert(id, entity);
        self.order.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// bevy handle for an id, for use with queries and commands.
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        self.index.get(&id).copied()
    }

    /// Reverse lookup from a bevy handle.
    pub fn id_of(&self, entity: Entity) -> Option<EntityId> {
        let id = *self.world.get::<EntityId>(entity)?;
        self.contains(id).then_some(id)
    }

    pub fn name(&self, id: EntityId) -> Option<&str> {
        let entity = self.entity(id)?;
        self.world.get::<EntityName>(entity).map(EntityName::as_str)
    }

    /// First active entity with the given name, in insertion order.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.is_active(*id) && self.name(*id) == Some(name))
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.entity(id)
            .is_some_and(|e| self.world.get::<Inactive>(e).is_none())
    }

    /// Toggle the active flag. Returns false for unknown ids.
    pub fn set_active(&mut self, id: EntityId, active: bool) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        let Ok(mut e) = self.world.get_entity_mut(entity) else {
            return false;
        };
        if active {
            e.remove::<Inactive>();
        } else {
            e.insert(Inactive);
        }
        true
    }

    /// Attach a component, replacing any existing one of the same kind.
    pub fn add_component(&mut self, id: EntityId, value: impl Into<ComponentValue>) -> bool {
        match value.into() {
            ComponentValue::Transform(c) => self.insert(id, c),
            ComponentValue::Sprite(c) => self.insert(id, c),
            ComponentValue::Collider(c) => self.insert(id, c),
            ComponentValue::Movement(c) => self.insert(id, c),
            ComponentValue::Health(c) => self.insert(id, c),
            ComponentValue::Inventory(c) => self.insert(id, c),
            ComponentValue::Dialogue(c) => self.insert(id, c),
        }
    }

    /// Typed variant of [`add_component`](Self::add_component).
    pub fn insert<T: EngineComponent>(&mut self, id: EntityId, component: T) -> bool {
        self.insert_bundle(id, component)
    }

    /// Attach any bundle, including tag components outside [`ComponentKind`].
    pub fn insert_bundle<B: Bundle>(&mut self, id: EntityId, bundle: B) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        match self.world.get_entity_mut(entity) {
            Ok(mut e) => {
                e.insert(bundle);
                true
            }
            Err(_) => false,
        }
    }

    pub fn get<T: EngineComponent>(&self, id: EntityId) -> Option<&T> {
        self.world.get::<T>(self.entity(id)?)
    }

    pub fn get_mut<T: EngineComponent>(&mut self, id: EntityId) -> Option<Mut<'_, T>> {
        let entity = self.entity(id)?;
        self.world.get_mut::<T>(entity)
    }

    pub fn get_component(&self, id: EntityId, kind: ComponentKind) -> Option<ComponentRef<'_>> {
        match kind {
            ComponentKind::Transform => self.get::<Transform>(id).map(ComponentRef::Transform),
            ComponentKind::Sprite => self.get::<Sprite>(id).map(ComponentRef::Sprite),
            ComponentKind::Collider => self.get::<Collider>(id).map(ComponentRef::Collider),
            ComponentKind::Movement => self.get::<Movement>(id).map(ComponentRef::Movement),
            ComponentKind::Health => self.get::<Health>(id).map(ComponentRef::Health),
            ComponentKind::Inventory => self.get::<Inventory>(id).map(ComponentRef::Inventory),
            ComponentKind::Dialogue => self.get::<Dialogue>(id).map(ComponentRef::Dialogue),
        }
    }

    pub fn has_component(&self, id: EntityId, kind: ComponentKind) -> bool {
        self.get_component(id, kind).is_some()
    }

    /// Detach the component of `kind`. Returns false if it was not attached.
    pub fn remove_component(&mut self, id: EntityId, kind: ComponentKind) -> bool {
        if !self.has_component(id, kind) {
            return false;
        }
        let Some(entity) = self.entity(id) else {
            return false;
        };
        let Ok(mut e) = self.world.get_entity_mut(entity) else {
            return false;
        };
        match kind {
            ComponentKind::Transform => e.remove::<Transform>(),
            ComponentKind::Sprite => e.remove::<Sprite>(),
            ComponentKind::Collider => e.remove::<Collider>(),
            ComponentKind::Movement => e.remove::<Movement>(),
            ComponentKind::Health => e.remove::<Health>(),
            ComponentKind::Inventory => e.remove::<Inventory>(),
            ComponentKind::Dialogue => e.remove::<Dialogue>(),
        };
        debug!("Removed {} from {}", kind.name(), id);
        true
    }

    /// Destroy an entity and all its components. The id is never reissued.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.index.remove(&id) else {
            return false;
        };
        self.order.retain(|other| *other != id);
        let despawned = self.world.despawn(entity);
        debug!("Removed entity {} (despawned={})", id, despawned);
        true
    }

    /// Remove every inactive entity. Returns how many were removed.
    pub fn purge_inactive(&mut self) -> usize {
        let inactive: Vec<EntityId> = self
            .order
            .iter()
            .copied()
            .filter(|id| !self.is_active(*id))
            .collect();
        for id in &inactive {
            self.remove(*id);
        }
        inactive.len()
    }

    /// Active entities in insertion order.
    pub fn all_active(&self) -> Vec<EntityId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.is_active(*id))
            .collect()
    }

    /// Active entities holding a component of `kind`, in insertion order.
    pub fn active_with_component(&self, kind: ComponentKind) -> Vec<EntityId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.is_active(*id) && self.has_component(*id, kind))
            .collect()
    }

    /// Every id ever created and not yet removed, active or not.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }
}
