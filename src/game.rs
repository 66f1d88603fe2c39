//! Frame driver.
//!
//! [`Game`] owns the [`EntityStore`] (and through it the bevy `World`), the
//! per-frame [`Schedule`] and the active level. A frame is:
//!
//! 1. advance [`WorldTime`],
//! 2. sample input,
//! 3. run the schedule: input controller, movement, tile collision, entity
//!    collision, combat, dialogue, inventory, camera, message rotation,
//! 4. optionally [`Game::render`].
//!
//! Ticks are no-ops until a level is loaded.

use bevy_ecs::message::Message;
use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{debug, info, warn};
use serde_json::Value;

use crate::components::collider::{Collider, CollisionLayer};
use crate::components::dialogue::Dialogue;
use crate::components::health::{ContactDamage, Health};
use crate::components::identity::EntityId;
use crate::components::inputcontrolled::{CameraTarget, PlayerControlled};
use crate::components::inventory::{Inventory, ItemPickup};
use crate::components::movement::Movement;
use crate::components::sprite::Sprite;
use crate::components::transform::Transform;
use crate::error::EngineResult;
use crate::events::combat::DamageRequest;
use crate::events::switchdebug::switch_debug_observer;
use crate::geometry::Rect;
use crate::resources::camera2d::{Camera2D, CameraController, CameraMode};
use crate::resources::contacts::FrameContacts;
use crate::resources::entitystore::EntityStore;
use crate::resources::gameconfig::GameConfig;
use crate::resources::input::{InputSource, InputState};
use crate::resources::level::{EntityRecord, Level, LevelSlot};
use crate::resources::tilemap::Tilemap;
use crate::resources::tileshapes::TileShapes;
use crate::resources::worldtime::WorldTime;
use crate::systems::camera::{camera_follow_system, snap_camera};
use crate::systems::collision::entity_collision_system;
use crate::systems::combat::combat_system;
use crate::systems::dialogue::dialogue_system;
use crate::systems::input::update_input_state;
use crate::systems::inputcontroller::input_controller_system;
use crate::systems::inventory::inventory_system;
use crate::systems::messages::{init_messages, update_messages};
use crate::systems::movement::movement_system;
use crate::systems::render::{Renderer, render_frame};
use crate::systems::tilecollision::tile_collision_system;
use crate::systems::time::update_world_time;
use crate::worldgen::atlas::{AtlasImage, AtlasLayout};

pub const PLAYER_NAME: &str = "player";

const DEFAULT_PLAYER_HEALTH: i32 = 5;
const DEFAULT_ENEMY_HEALTH: i32 = 3;
const DEFAULT_INVENTORY_CAPACITY: usize = 16;

pub struct Game {
    store: EntityStore,
    schedule: Schedule,
    level_loaded: bool,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let mut world = World::new();

        let mut camera = Camera2D::new(config.window_width as f32, config.window_height as f32);
        camera.zoom = config.camera_zoom;
        world.insert_resource(camera);
        world.insert_resource(CameraController {
            mode: CameraMode::Follow {
                smoothing: config.camera_smoothing,
            },
            bounds: None,
        });
        world.insert_resource(WorldTime::default());
        world.insert_resource(InputState::default());
        world.insert_resource(FrameContacts::default());
        world.insert_resource(TileShapes::default());
        world.insert_resource(AtlasImage::default());
        world.insert_resource(LevelSlot::default());
        world.insert_resource(config);
        init_messages(&mut world);

        world.spawn(Observer::new(switch_debug_observer));
        world.flush();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                input_controller_system,
                movement_system,
                tile_collision_system,
                entity_collision_system,
                combat_system,
                dialogue_system,
                inventory_system,
                camera_follow_system,
                update_messages,
            )
                .chain(),
        );

        Self {
            store: EntityStore::with_world(world),
            schedule,
            level_loaded: false,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn world(&self) -> &World {
        self.store.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.store.world_mut()
    }

    pub fn is_level_loaded(&self) -> bool {
        self.level_loaded
    }

    pub fn level(&self) -> Option<&Level> {
        self.world().get_resource::<LevelSlot>()?.current()
    }

    /// The entity spawned from the level's player record.
    pub fn player(&self) -> Option<EntityId> {
        self.store.find_by_name(PLAYER_NAME)
    }

    /// Replace the active level: despawn every entity, install the tilemap
    /// and spawn the level's entity records.
    pub fn load_level(&mut self, level: Level) -> EngineResult<()> {
        for id in self.store.ids().to_vec() {
            self.store.remove(id);
        }

        let world_size = level.tilemap.world_size();
        let tile_size = level.tilemap.tile_size();
        {
            let world = self.store.world_mut();
            world.insert_resource(level.tilemap.clone());
            world.insert_resource(AtlasImage::default());
            world.resource_mut::<CameraController>().bounds =
                Some(Rect::new(0.0, 0.0, world_size.x, world_size.y));
        }

        let config = self.world().resource::<GameConfig>().clone();
        let mut spawned = 0;
        for record in &level.entities {
            if spawn_record(&mut self.store, record, tile_size, &config).is_some() {
                spawned += 1;
            }
        }

        snap_camera(self.store.world_mut());
        info!(
            "Level '{}' loaded: {}x{} tiles, {} entities",
            level.name,
            level.tilemap.width(),
            level.tilemap.height(),
            spawned
        );
        self.world_mut().resource_mut::<LevelSlot>().replace(level);
        self.level_loaded = true;
        Ok(())
    }

    /// Parse and load a level. On failure the current level stays active.
    pub fn load_level_json(&mut self, json: &str) -> EngineResult<()> {
        match Level::from_json(json) {
            Ok(level) => self.load_level(level),
            Err(e) => {
                warn!("Level load aborted, keeping previous level: {}", e);
                Err(e)
            }
        }
    }

    /// Tell the renderer the atlas texture for the current tileset is
    /// available under `key`. Returns false when the level has no tileset.
    pub fn set_atlas_ready(&mut self, key: &str) -> bool {
        let layout = self
            .world()
            .get_resource::<Tilemap>()
            .and_then(|m| m.tileset.as_ref())
            .map(AtlasLayout::from_tileset);
        match layout {
            Some(layout) => {
                self.world_mut()
                    .insert_resource(AtlasImage::ready(key, layout));
                true
            }
            None => false,
        }
    }

    /// Advance one frame. Returns false (and does nothing) until a level is
    /// loaded.
    pub fn tick(&mut self, dt: f32, input: &dyn InputSource) -> bool {
        if !self.level_loaded {
            debug!("Tick skipped: no level loaded");
            return false;
        }
        let world = self.store.world_mut();
        update_world_time(world, dt);
        update_input_state(world, input);
        self.schedule.run(world);
        world.clear_trackers();
        true
    }

    pub fn render(&mut self, renderer: &mut dyn Renderer) {
        render_frame(self.store.world_mut(), renderer);
    }

    /// Queue damage for the next combat pass.
    pub fn request_damage(&mut self, target: EntityId, amount: i32) {
        self.world_mut()
            .resource_mut::<Messages<DamageRequest>>()
            .write(DamageRequest {
                target,
                amount,
                source: None,
            });
    }

    /// Take every pending message of type `T`.
    pub fn drain_messages<T: Message>(&mut self) -> Vec<T> {
        match self.world_mut().get_resource_mut::<Messages<T>>() {
            Some(mut messages) => messages.drain().collect(),
            None => Vec::new(),
        }
    }
}

fn string_list(record: &EntityRecord, key: &str) -> Vec<String> {
    record
        .properties
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Spawn the prefab for one level record. Unknown kinds are skipped.
pub fn spawn_record(
    store: &mut EntityStore,
    record: &EntityRecord,
    tile_size: u32,
    config: &GameConfig,
) -> Option<EntityId> {
    let ts = tile_size.max(1) as f32;
    let body = ts * 0.75;
    let inset = Vec2::splat((ts - body) * 0.5);
    let transform = Transform::new(record.x, record.y);

    let id = match record.kind.as_str() {
        "player_spawn" | "player" => {
            let id = store.create(PLAYER_NAME);
            let health = record
                .i64_property("health")
                .map_or(DEFAULT_PLAYER_HEALTH, |h| h as i32);
            store.insert(id, transform);
            store.insert(id, Sprite::new("player", ts, ts).with_z(10));
            store.insert(id, Collider::new(body, body, CollisionLayer::PLAYER).with_offset(inset));
            store.insert(
                id,
                Movement::new(
                    config.player_acceleration,
                    config.player_max_speed,
                    config.player_friction,
                ),
            );
            store.insert(id, Health::new(health));
            let mut inventory = Inventory::new(DEFAULT_INVENTORY_CAPACITY);
            if let Some(max_stack) = record.i64_property("max_stack") {
                inventory = inventory.with_max_stack(max_stack.max(0) as u32);
            }
            store.insert(id, inventory);
            store.insert_bundle(id, (PlayerControlled, CameraTarget));
            id
        }
        "npc" => {
            let speaker = record.str_property("speaker").unwrap_or("Stranger").to_string();
            let mut dialogue = Dialogue::new(speaker.clone(), string_list(record, "lines"));
            if let Some(range) = record.f32_property("range") {
                dialogue = dialogue.with_range(range);
            }
            let id = store.create(speaker);
            store.insert(id, transform);
            store.insert(id, Sprite::new("npc", ts, ts).with_z(5));
            store.insert(
                id,
                Collider::new(body, body, CollisionLayer::NPC | CollisionLayer::SOLID).with_offset(inset),
            );
            store.insert(id, dialogue);
            id
        }
        "item" => {
            let item_id = record.str_property("item").unwrap_or("coin").to_string();
            let quantity = record.i64_property("quantity").map_or(1, |q| q.max(0) as u32);
            let id = store.create(format!("item:{}", item_id));
            store.insert(id, transform);
            store.insert(id, Sprite::new(format!("item_{}", item_id), ts, ts).with_z(1));
            store.insert(
                id,
                Collider::new(body, body, CollisionLayer::ITEM | CollisionLayer::PLAYER)
                    .with_offset(inset)
                    .trigger(),
            );
            store.insert_bundle(id, ItemPickup::new(item_id, quantity));
            id
        }
        "enemy" => {
            let damage = record.i64_property("damage").map_or(1, |d| d as i32);
            let health = record
                .i64_property("health")
                .map_or(DEFAULT_ENEMY_HEALTH, |h| h as i32);
            let id = store.create("enemy");
            store.insert(id, transform);
            store.insert(id, Sprite::new("enemy", ts, ts).with_z(5));
            store.insert(
                id,
                Collider::new(body, body, CollisionLayer::ENEMY | CollisionLayer::PLAYER).with_offset(inset),
            );
            store.insert(id, Movement::default());
            store.insert(id, Health::new(health));
            store.insert_bundle(id, ContactDamage::new(damage, CollisionLayer::PLAYER));
            id
        }
        other => {
            warn!("Skipping entity record #{} of unknown type '{}'", record.id, other);
            return None;
        }
    };
    debug!("Spawned {} '{}' at ({}, {})", id, record.kind, record.x, record.y);
    Some(id)
}
