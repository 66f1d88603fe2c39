//! tilerealm library.
//!
//! Simulation core of a 2D tile engine: an entity store over `bevy_ecs`,
//! per-frame systems, dense and chunked tilemaps with collision, and a
//! seeded procedural level generator.

pub mod components;
pub mod error;
pub mod events;
pub mod game;
pub mod geometry;
pub mod resources;
pub mod systems;
pub mod worldgen;
