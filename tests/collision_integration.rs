//! Entity and tile collision through a bare schedule.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use glam::Vec2;

use tilerealm::components::collider::{Collider, CollisionContact, CollisionLayer};
use tilerealm::components::identity::EntityId;
use tilerealm::components::movement::Movement;
use tilerealm::components::transform::Transform;
use tilerealm::events::collision::CollisionEvent;
use tilerealm::resources::contacts::FrameContacts;
use tilerealm::resources::tilemap::Tilemap;
use tilerealm::resources::tileshapes::{CollisionShape, TileShapes};
use tilerealm::resources::worldtime::WorldTime;
use tilerealm::systems::collision::entity_collision_system;
use tilerealm::systems::movement::movement_system;
use tilerealm::systems::tilecollision::tile_collision_system;
use tilerealm::systems::time::update_world_time;

/// Last contact reported to an entity's collision callback.
#[derive(Component, Debug, Default)]
struct Touched {
    other: Option<EntityId>,
}

#[derive(Resource, Default)]
struct Observed(Vec<(EntityId, EntityId)>);

fn record_touch(contact: &CollisionContact, commands: &mut Commands) {
    commands.entity(contact.entity).insert(Touched {
        other: Some(contact.other_id),
    });
}

fn make_world() -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.init_resource::<FrameContacts>();
    world.init_resource::<TileShapes>();
    world.init_resource::<Observed>();
    world.add_observer(|trigger: On<CollisionEvent>, mut seen: ResMut<Observed>| {
        seen.0.push((trigger.event().a_id, trigger.event().b_id));
    });
    world
}

fn frame(world: &mut World, dt: f32) {
    update_world_time(world, dt);
    let mut schedule = Schedule::default();
    schedule.add_systems((movement_system, tile_collision_system, entity_collision_system).chain());
    schedule.run(world);
}

fn body(world: &mut World, id: u64, x: f32, y: f32, layer: CollisionLayer) -> Entity {
    world
        .spawn((
            EntityId(id),
            Transform::new(x, y),
            Collider::new(16.0, 16.0, layer).with_callback(record_touch),
        ))
        .id()
}

#[test]
fn both_sides_see_each_contact_once() {
    let mut world = make_world();
    let a = body(&mut world, 1, 0.0, 0.0, CollisionLayer::PLAYER);
    let b = body(&mut world, 2, 8.0, 8.0, CollisionLayer::ENEMY | CollisionLayer::PLAYER);
    frame(&mut world, 1.0 / 60.0);

    assert_eq!(world.get::<Touched>(a).unwrap().other, Some(EntityId(2)));
    assert_eq!(world.get::<Touched>(b).unwrap().other, Some(EntityId(1)));
    assert_eq!(world.resource::<Observed>().0, vec![(EntityId(1), EntityId(2))]);
}

#[test]
fn pair_order_ignores_spawn_order() {
    let mut forward = make_world();
    body(&mut forward, 1, 0.0, 0.0, CollisionLayer::PLAYER);
    body(&mut forward, 2, 4.0, 0.0, CollisionLayer::PLAYER);
    body(&mut forward, 3, 8.0, 0.0, CollisionLayer::PLAYER);
    frame(&mut forward, 0.0);

    let mut reverse = make_world();
    body(&mut reverse, 3, 8.0, 0.0, CollisionLayer::PLAYER);
    body(&mut reverse, 2, 4.0, 0.0, CollisionLayer::PLAYER);
    body(&mut reverse, 1, 0.0, 0.0, CollisionLayer::PLAYER);
    frame(&mut reverse, 0.0);

    let expected = vec![
        (EntityId(1), EntityId(2)),
        (EntityId(1), EntityId(3)),
        (EntityId(2), EntityId(3)),
    ];
    assert_eq!(forward.resource::<Observed>().0, expected);
    assert_eq!(reverse.resource::<Observed>().0, expected);
}

#[test]
fn disjoint_layers_never_touch() {
    let mut world = make_world();
    let a = body(&mut world, 1, 0.0, 0.0, CollisionLayer::ITEM);
    body(&mut world, 2, 0.0, 0.0, CollisionLayer::NPC);
    frame(&mut world, 1.0 / 60.0);
    assert!(world.get::<Touched>(a).is_none());
    assert!(world.resource::<FrameContacts>().is_empty());
}

#[test]
fn moving_body_stops_against_solid_tiles() {
    let mut world = make_world();
    let mut map = Tilemap::with_layers(8, 4, 16, &["terrain"]);
    for y in 0..4 {
        map.set_collision_at(5, y, true);
    }
    world.insert_resource(map);

    let mover = world
        .spawn((
            EntityId(1),
            Transform::new(16.0, 16.0),
            Collider::new(12.0, 12.0, CollisionLayer::PLAYER),
            Movement::new(0.0, 400.0, 1.0).with_velocity(Vec2::new(300.0, 0.0)),
        ))
        .id();
    for _ in 0..60 {
        frame(&mut world, 1.0 / 60.0);
    }

    let position = world.get::<Transform>(mover).unwrap().position;
    assert_eq!(position.x, 80.0 - 12.0);
    assert_eq!(world.get::<Movement>(mover).unwrap().velocity.x, 0.0);
}

#[test]
fn registered_empty_shape_is_passable() {
    let mut world = make_world();
    let mut map = Tilemap::with_layers(8, 4, 16, &["terrain"]);
    for y in 0..4 {
        map.set_tile_at(0, 5, y, 7);
        map.set_collision_at(5, y, true);
    }
    world.insert_resource(map);
    world.resource_mut::<TileShapes>().insert(7, CollisionShape::None);

    let mover = world
        .spawn((
            EntityId(1),
            Transform::new(16.0, 16.0),
            Collider::new(12.0, 12.0, CollisionLayer::PLAYER),
            Movement::new(0.0, 400.0, 1.0).with_velocity(Vec2::new(120.0, 0.0)),
        ))
        .id();
    for _ in 0..60 {
        frame(&mut world, 1.0 / 60.0);
    }
    assert!(world.get::<Transform>(mover).unwrap().position.x > 96.0);
}

#[test]
fn diagonal_mover_slides_along_the_floor() {
    let mut world = make_world();
    let mut map = Tilemap::with_layers(8, 4, 16, &["terrain"]);
    for x in 0..8 {
        map.set_collision_at(x, 3, true);
    }
    world.insert_resource(map);

    let mover = world
        .spawn((
            EntityId(1),
            Transform::new(16.0, 36.0),
            Collider::new(12.0, 12.0, CollisionLayer::PLAYER),
            Movement::new(0.0, 400.0, 1.0).with_velocity(Vec2::new(60.0, 60.0)),
        ))
        .id();
    for _ in 0..30 {
        frame(&mut world, 1.0 / 60.0);
    }

    let position = world.get::<Transform>(mover).unwrap().position;
    assert!((position.x - 46.0).abs() < 1e-2, "x stalled at {}", position.x);
    assert!((position.y - 36.0).abs() < 1e-3, "sank into the floor at {}", position.y);
    assert_eq!(world.get::<Movement>(mover).unwrap().velocity.y, 0.0);
}
