//! Frame-level tests driving [`Game::tick`] over small hand-built levels.

use glam::Vec2;

use tilerealm::components::health::Health;
use tilerealm::components::identity::EntityId;
use tilerealm::components::inventory::Inventory;
use tilerealm::components::movement::Movement;
use tilerealm::components::transform::Transform;
use tilerealm::events::combat::CombatMessage;
use tilerealm::events::dialogue::DialogueMessage;
use tilerealm::events::inventory::InventoryMessage;
use tilerealm::game::Game;
use tilerealm::resources::camera2d::Camera2D;
use tilerealm::resources::gameconfig::GameConfig;
use tilerealm::resources::input::{InputSnapshot, Key};
use tilerealm::resources::level::{EntityRecord, Level};
use tilerealm::resources::tilemap::Tilemap;
use tilerealm::systems::render::{DrawCall, RecordingRenderer};

const DT: f32 = 1.0 / 60.0;
const TILE: f32 = 32.0;

/// 10x6 room of 32px tiles with a solid border and the player at tile (2, 2).
fn room(extra: Vec<EntityRecord>) -> Level {
    let mut map = Tilemap::with_layers(10, 6, 32, &["background", "terrain"]);
    map.fill_layer(0, 1);
    for x in 0..10 {
        map.set_collision_at(x, 0, true);
        map.set_collision_at(x, 5, true);
    }
    for y in 0..6 {
        map.set_collision_at(0, y, true);
        map.set_collision_at(9, y, true);
    }
    let mut level = Level::new("room", map);
    level
        .entities
        .push(EntityRecord::new("player_spawn", 2.0 * TILE, 2.0 * TILE, 1));
    level.entities.extend(extra);
    level
}

fn game_with(extra: Vec<EntityRecord>) -> Game {
    let mut game = Game::new(GameConfig::new());
    game.load_level(room(extra)).unwrap();
    game
}

fn player_position(game: &Game) -> Vec2 {
    let player = game.player().unwrap();
    game.store().get::<Transform>(player).unwrap().position
}

fn run(game: &mut Game, frames: usize, input: &InputSnapshot) {
    for _ in 0..frames {
        assert!(game.tick(DT, input));
    }
}

#[test]
fn tick_is_a_no_op_without_a_level() {
    let mut game = Game::new(GameConfig::new());
    assert!(!game.tick(DT, &InputSnapshot::default()));
    assert!(!game.is_level_loaded());
}

#[test]
fn held_direction_moves_player_until_the_wall() {
    let mut game = game_with(vec![]);
    let start = player_position(&game);
    run(&mut game, 300, &InputSnapshot::with_keys(&[Key::D]));
    let end = player_position(&game);

    // 24px body inset by 4px; the wall column starts at x = 288
    assert!(end.x > start.x + 100.0);
    assert!(end.x <= 288.0 - 28.0 + 1e-3, "player entered the wall at {}", end.x);
    assert!((end.y - start.y).abs() < 1e-3);
}

#[test]
fn velocity_decays_to_rest_without_input() {
    let mut game = game_with(vec![]);
    let player = game.player().unwrap();
    game.store_mut().get_mut::<Movement>(player).unwrap().velocity = Vec2::new(60.0, -40.0);

    run(&mut game, 300, &InputSnapshot::default());
    let speed = game.store().get::<Movement>(player).unwrap().speed();
    assert!(speed < 0.01, "still moving at {}", speed);
}

#[test]
fn contact_damage_respects_invulnerability() {
    let enemy = EntityRecord::new("enemy", 2.0 * TILE, 2.0 * TILE, 2);
    let mut game = game_with(vec![enemy]);
    let player = game.player().unwrap();
    let idle = InputSnapshot::default();

    let mut hits = Vec::new();
    for _ in 0..10 {
        game.tick(DT, &idle);
        hits.extend(game.drain_messages::<CombatMessage>());
    }
    assert_eq!(hits.len(), 1);
    match hits[0] {
        CombatMessage::Damaged {
            target,
            amount,
            remaining,
            source,
        } => {
            assert_eq!(target, player);
            assert_eq!(amount, 1);
            assert_eq!(remaining, 4);
            assert!(source.is_some());
        }
        other => panic!("unexpected {:?}", other),
    }

    for _ in 0..50 {
        game.tick(DT, &idle);
        hits.extend(game.drain_messages::<CombatMessage>());
    }
    assert!(hits.len() >= 2);
    // the enemy never hurts itself
    assert!(hits.iter().all(|m| matches!(m, CombatMessage::Damaged { target, .. } if *target == player)));
}

#[test]
fn lethal_damage_deactivates_the_target() {
    let mut game = game_with(vec![]);
    let player = game.player().unwrap();
    game.request_damage(player, 100);
    game.tick(DT, &InputSnapshot::default());

    let messages = game.drain_messages::<CombatMessage>();
    assert_eq!(
        messages,
        vec![
            CombatMessage::Damaged {
                target: player,
                source: None,
                amount: 5,
                remaining: 0,
            },
            CombatMessage::Died { target: player },
        ]
    );
    assert!(!game.store().is_active(player));
    assert!(game.store().get::<Health>(player).unwrap().is_dead());

    // dead entities are out of the simulation
    run(&mut game, 5, &InputSnapshot::with_keys(&[Key::D]));
    assert_eq!(player_position(&game), Vec2::new(2.0 * TILE, 2.0 * TILE));
}

#[test]
fn damage_request_for_unknown_target_is_dropped() {
    let mut game = game_with(vec![]);
    game.request_damage(EntityId(999), 3);
    game.tick(DT, &InputSnapshot::default());
    assert!(game.drain_messages::<CombatMessage>().is_empty());
}

#[test]
fn touching_an_item_collects_it() {
    let gem = EntityRecord::new("item", 2.0 * TILE, 2.0 * TILE, 2)
        .with_property("item", "gem".into())
        .with_property("quantity", 3.into());
    let mut game = game_with(vec![gem]);
    let player = game.player().unwrap();
    game.tick(DT, &InputSnapshot::default());

    let messages = game.drain_messages::<InventoryMessage>();
    assert_eq!(messages.len(), 1);
    assert!(matches!(
        &messages[0],
        InventoryMessage::Collected { collector, item_id, quantity: 3, .. }
            if *collector == player && item_id == "gem"
    ));
    assert_eq!(game.store().get::<Inventory>(player).unwrap().count("gem"), 3);

    let pickup = game.store().find_by_name("item:gem").unwrap();
    assert!(!game.store().is_active(pickup));

    game.tick(DT, &InputSnapshot::default());
    assert!(game.drain_messages::<InventoryMessage>().is_empty());
}

#[test]
fn full_inventory_leaves_the_item_in_place() {
    let coin = EntityRecord::new("item", 2.0 * TILE, 2.0 * TILE, 2);
    let mut game = game_with(vec![coin]);
    let player = game.player().unwrap();
    game.store_mut().get_mut::<Inventory>(player).unwrap().capacity = 0;
    game.tick(DT, &InputSnapshot::default());

    let messages = game.drain_messages::<InventoryMessage>();
    assert!(matches!(
        &messages[..],
        [InventoryMessage::Full { item_id, .. }] if item_id == "coin"
    ));
    let pickup = game.store().find_by_name("item:coin").unwrap();
    assert!(game.store().is_active(pickup));
}

#[test]
fn interact_walks_through_a_dialogue() {
    let elder = EntityRecord::new("npc", 3.0 * TILE, 2.0 * TILE, 2)
        .with_property("speaker", "Elder".into())
        .with_property("lines", serde_json::json!(["Hello", "Bye"]));
    let mut game = game_with(vec![elder]);
    let npc = game.store().find_by_name("Elder").unwrap();
    let press = InputSnapshot::with_keys(&[Key::E]);
    let idle = InputSnapshot::default();

    game.tick(DT, &press);
    assert_eq!(
        game.drain_messages::<DialogueMessage>(),
        vec![
            DialogueMessage::Started {
                npc,
                speaker: "Elder".into()
            },
            DialogueMessage::Line {
                npc,
                speaker: "Elder".into(),
                text: "Hello".into()
            },
        ]
    );

    // holding the key is not a new press
    game.tick(DT, &press);
    assert!(game.drain_messages::<DialogueMessage>().is_empty());

    game.tick(DT, &idle);
    game.tick(DT, &press);
    assert!(matches!(
        &game.drain_messages::<DialogueMessage>()[..],
        [DialogueMessage::Line { text, .. }] if text == "Bye"
    ));

    game.tick(DT, &idle);
    game.tick(DT, &press);
    assert_eq!(
        game.drain_messages::<DialogueMessage>(),
        vec![DialogueMessage::Ended { npc }]
    );
}

#[test]
fn walking_away_ends_a_dialogue() {
    let elder = EntityRecord::new("npc", 3.0 * TILE, 2.0 * TILE, 2)
        .with_property("speaker", "Elder".into())
        .with_property("lines", serde_json::json!(["Hello", "Bye"]));
    let mut game = game_with(vec![elder]);
    let player = game.player().unwrap();
    let npc = game.store().find_by_name("Elder").unwrap();

    game.tick(DT, &InputSnapshot::with_keys(&[Key::E]));
    game.drain_messages::<DialogueMessage>();

    game.store_mut().get_mut::<Transform>(player).unwrap().position = Vec2::new(7.0 * TILE, 4.0 * TILE);
    game.tick(DT, &InputSnapshot::default());
    assert_eq!(
        game.drain_messages::<DialogueMessage>(),
        vec![DialogueMessage::Ended { npc }]
    );
}

#[test]
fn camera_stays_inside_the_level() {
    let mut game = game_with(vec![]);
    run(&mut game, 120, &InputSnapshot::with_keys(&[Key::D]));
    let camera = *game.world().resource::<Camera2D>();
    // a 640x360 view is larger than the 320x192 room, so it stays centered
    assert_eq!(camera.target, Vec2::new(160.0, 96.0));

    let mut renderer = RecordingRenderer::default();
    game.render(&mut renderer);
    assert_eq!(renderer.calls.first(), Some(&DrawCall::SetCamera(camera.target)));
    assert!(renderer.calls.iter().any(|c| matches!(c, DrawCall::Image { key, .. } if key == "player")));
}

#[test]
fn debug_key_toggles_collider_outlines() {
    let mut game = game_with(vec![]);
    game.tick(DT, &InputSnapshot::with_keys(&[Key::F11]));

    let mut renderer = RecordingRenderer::default();
    game.render(&mut renderer);
    assert!(renderer.calls.iter().any(|c| matches!(c, DrawCall::Stroke(..))));

    game.tick(DT, &InputSnapshot::default());
    game.tick(DT, &InputSnapshot::with_keys(&[Key::F11]));
    let mut renderer = RecordingRenderer::default();
    game.render(&mut renderer);
    assert!(!renderer.calls.iter().any(|c| matches!(c, DrawCall::Stroke(..))));
}
