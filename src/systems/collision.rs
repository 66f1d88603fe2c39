//! Entity-versus-entity collision.
//!
//! Bounds are synced from each [`Transform`] first. Pairs are then tested
//! once each, in ascending [`EntityId`] order, so the outcome does not depend
//! on archetype storage order. For every pair whose layers intersect and
//! whose bounds overlap:
//!
//! 1. `a`'s `on_collision` runs, then `b`'s, trigger or not;
//! 2. the pair is recorded in [`FrameContacts`];
//! 3. a [`CollisionEvent`] is triggered for observers.
use bevy_ecs::prelude::*;
use log::trace;

use crate::components::collider::{Collider, CollisionContact};
use crate::components::identity::{EntityId, Inactive};
use crate::components::transform::Transform;
use crate::events::collision::CollisionEvent;
use crate::resources::contacts::{Contact, FrameContacts};

pub fn entity_collision_system(
    mut query: Query<(Entity, &EntityId, &Transform, &mut Collider), Without<Inactive>>,
    mut contacts: ResMut<FrameContacts>,
    mut commands: Commands,
) {
    let mut bodies: Vec<(EntityId, Entity, Collider)> = Vec::new();
    for (entity, id, transform, mut collider) in query.iter_mut() {
        collider.sync(transform.position);
        bodies.push((*id, entity, *collider));
    }
    bodies.sort_unstable_by_key(|(id, _, _)| *id);

    contacts.clear();
    for (i, (a_id, a, ca)) in bodies.iter().enumerate() {
        for (b_id, b, cb) in &bodies[i + 1..] {
            if !ca.check_collision(cb) {
                continue;
            }
            trace!("Contact {} <-> {}", a_id, b_id);
            if let Some(callback) = ca.on_collision {
                let contact = CollisionContact {
                    entity: *a,
                    id: *a_id,
                    other: *b,
                    other_id: *b_id,
                    other_layer: cb.layer,
                    other_is_trigger: cb.is_trigger,
                    other_bounds: cb.bounds,
                };
                callback(&contact, &mut commands);
            }
            if let Some(callback) = cb.on_collision {
                let contact = CollisionContact {
                    entity: *b,
                    id: *b_id,
                    other: *a,
                    other_id: *a_id,
                    other_layer: ca.layer,
                    other_is_trigger: ca.is_trigger,
                    other_bounds: ca.bounds,
                };
                callback(&contact, &mut commands);
            }
            contacts.pairs.push(Contact {
                a: *a,
                a_id: *a_id,
                b: *b,
                b_id: *b_id,
            });
            commands.trigger(CollisionEvent {
                a: *a,
                a_id: *a_id,
                b: *b,
                b_id: *b_id,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::collider::CollisionLayer;
    use bevy_ecs::observer::On;

    #[derive(Resource, Default)]
    struct Seen(Vec<(EntityId, EntityId)>);

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(entity_collision_system);
        schedule.run(world);
    }

    fn body(world: &mut World, id: u64, x: f32, layer: CollisionLayer) -> Entity {
        world
            .spawn((EntityId(id), Transform::new(x, 0.0), Collider::new(10.0, 10.0, layer)))
            .id()
    }

    #[test]
    fn test_layers_gate_contacts() {
        let mut world = World::new();
        world.init_resource::<FrameContacts>();
        body(&mut world, 1, 0.0, CollisionLayer::SOLID | CollisionLayer::PLAYER);
        body(&mut world, 2, 5.0, CollisionLayer::PLAYER);
        body(&mut world, 3, 5.0, CollisionLayer::ITEM);
        run(&mut world);
        let contacts = world.resource::<FrameContacts>();
        assert_eq!(contacts.len(), 1);
        assert_eq!((contacts.pairs[0].a_id, contacts.pairs[0].b_id), (EntityId(1), EntityId(2)));
    }

    #[test]
    fn test_pairs_are_ordered_by_id_and_observed_once() {
        let mut world = World::new();
        world.init_resource::<FrameContacts>();
        world.init_resource::<Seen>();
        world.add_observer(|trigger: On<CollisionEvent>, mut seen: ResMut<Seen>| {
            seen.0.push((trigger.event().a_id, trigger.event().b_id));
        });
        // spawned out of id order
        body(&mut world, 9, 0.0, CollisionLayer::PLAYER);
        body(&mut world, 4, 3.0, CollisionLayer::PLAYER);
        run(&mut world);
        assert_eq!(world.resource::<Seen>().0, vec![(EntityId(4), EntityId(9))]);

        run(&mut world);
        assert_eq!(world.resource::<Seen>().0.len(), 2);
        assert_eq!(world.resource::<FrameContacts>().len(), 1);
    }

    #[test]
    fn test_inactive_bodies_are_skipped() {
        let mut world = World::new();
        world.init_resource::<FrameContacts>();
        body(&mut world, 1, 0.0, CollisionLayer::PLAYER);
        let e = body(&mut world, 2, 0.0, CollisionLayer::PLAYER);
        world.entity_mut(e).insert(Inactive);
        run(&mut world);
        assert!(world.resource::<FrameContacts>().is_empty());
    }

    #[test]
    fn test_bounds_follow_transform() {
        let mut world = World::new();
        world.init_resource::<FrameContacts>();
        let e = body(&mut world, 1, 40.0, CollisionLayer::PLAYER);
        run(&mut world);
        assert_eq!(world.get::<Collider>(e).unwrap().bounds.x, 40.0);
    }
}
