//! Damage and death.
//!
//! Damage comes from two places: [`ContactDamage`] carriers touching a
//! [`Health`] holder this frame (per [`FrameContacts`]) and queued
//! [`DamageRequest`] messages. Hits are ignored while the target is
//! invulnerable. A target reaching zero hit points is marked [`Inactive`]
//! and reported with [`CombatMessage::Died`].
use bevy_ecs::prelude::*;
use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::components::collider::Collider;
use crate::components::health::{ContactDamage, Health};
use crate::components::identity::{EntityId, Inactive};
use crate::events::combat::{CombatMessage, DamageRequest};
use crate::resources::contacts::FrameContacts;
use crate::resources::worldtime::WorldTime;

struct Hit {
    target: Entity,
    amount: i32,
    source: Option<EntityId>,
}

pub fn combat_system(
    time: Res<WorldTime>,
    contacts: Res<FrameContacts>,
    mut requests: MessageReader<DamageRequest>,
    mut outcomes: MessageWriter<CombatMessage>,
    damagers: Query<&ContactDamage, Without<Inactive>>,
    mut targets: Query<(Entity, &EntityId, &mut Health, Option<&Collider>), Without<Inactive>>,
    mut commands: Commands,
) {
    for (_, _, mut health, _) in targets.iter_mut() {
        health.tick(time.delta);
    }

    let mut hits: Vec<Hit> = Vec::new();
    for contact in &contacts.pairs {
        for (source, source_id, target) in [
            (contact.a, contact.a_id, contact.b),
            (contact.b, contact.b_id, contact.a),
        ] {
            let Ok(damage) = damagers.get(source) else {
                continue;
            };
            // carriers never hurt each other
            if damagers.contains(target) {
                continue;
            }
            let Ok((_, _, _, collider)) = targets.get(target) else {
                continue;
            };
            if collider.is_some_and(|c| c.layer.interacts_with(damage.targets)) {
                hits.push(Hit {
                    target,
                    amount: damage.amount,
                    source: Some(source_id),
                });
            }
        }
    }

    let mut requested = requests.read().peekable();
    if requested.peek().is_some() {
        let by_id: FxHashMap<EntityId, Entity> =
            targets.iter().map(|(entity, id, _, _)| (*id, entity)).collect();
        for request in requested {
            match by_id.get(&request.target) {
                Some(&target) => hits.push(Hit {
                    target,
                    amount: request.amount,
                    source: request.source,
                }),
                None => debug!("Damage request for {} has no live target", request.target),
            }
        }
    }

    for hit in hits {
        let Ok((entity, id, mut health, _)) = targets.get_mut(hit.target) else {
            continue;
        };
        let dealt = health.damage(hit.amount);
        if dealt == 0 {
            continue;
        }
        outcomes.write(CombatMessage::Damaged {
            target: *id,
            source: hit.source,
            amount: dealt,
            remaining: health.current,
        });
        if health.is_dead() {
            info!("{} died", id);
            commands.entity(entity).insert(Inactive);
            outcomes.write(CombatMessage::Died { target: *id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::collider::CollisionLayer;
    use crate::resources::contacts::Contact;
    use crate::systems::messages::init_messages;

    fn combat_world() -> World {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            delta: 1.0 / 60.0,
            ..WorldTime::default()
        });
        world.init_resource::<FrameContacts>();
        init_messages(&mut world);
        world
    }

    fn touch(world: &mut World, a: Entity, b: Entity) {
        let a_id = *world.get::<EntityId>(a).unwrap();
        let b_id = *world.get::<EntityId>(b).unwrap();
        world
            .resource_mut::<FrameContacts>()
            .pairs
            .push(Contact { a, a_id, b, b_id });
    }

    fn run(world: &mut World) -> Vec<CombatMessage> {
        let mut schedule = Schedule::default();
        schedule.add_systems(combat_system);
        schedule.run(world);
        world.resource_mut::<Messages<CombatMessage>>().drain().collect()
    }

    fn enemy(world: &mut World, id: u64) -> Entity {
        world
            .spawn((
                EntityId(id),
                Health::new(3),
                Collider::new(16.0, 16.0, CollisionLayer::ENEMY),
                ContactDamage::new(1, CollisionLayer::PLAYER | CollisionLayer::ENEMY),
            ))
            .id()
    }

    #[test]
    fn test_carriers_never_hurt_each_other() {
        let mut world = combat_world();
        let a = enemy(&mut world, 1);
        let b = enemy(&mut world, 2);
        touch(&mut world, a, b);
        assert!(run(&mut world).is_empty());
        assert_eq!(world.get::<Health>(a).unwrap().current, 3);
        assert_eq!(world.get::<Health>(b).unwrap().current, 3);
    }

    #[test]
    fn test_contact_hit_then_invulnerable() {
        let mut world = combat_world();
        let player = world
            .spawn((
                EntityId(1),
                Health::new(3),
                Collider::new(16.0, 16.0, CollisionLayer::PLAYER),
            ))
            .id();
        let foe = enemy(&mut world, 2);
        touch(&mut world, player, foe);

        assert_eq!(
            run(&mut world),
            vec![CombatMessage::Damaged {
                target: EntityId(1),
                source: Some(EntityId(2)),
                amount: 1,
                remaining: 2,
            }]
        );
        // the contact persists but the target is still invulnerable
        assert!(run(&mut world).is_empty());
        assert_eq!(world.get::<Health>(player).unwrap().current, 2);
    }

    #[test]
    fn test_lethal_request_deactivates() {
        let mut world = combat_world();
        let target = world.spawn((EntityId(5), Health::new(2))).id();
        world
            .resource_mut::<Messages<DamageRequest>>()
            .write(DamageRequest {
                target: EntityId(5),
                amount: 9,
                source: Some(EntityId(1)),
            });

        let messages = run(&mut world);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], CombatMessage::Died { target: EntityId(5) });
        assert!(world.get::<Inactive>(target).is_some());
    }
}
