//! Engine systems.
//!
//! Per-frame order, as chained by [`crate::game::Game`]:
//!
//! - [`input`] – sample the platform input into [`InputState`](crate::resources::input::InputState)
//! - [`inputcontroller`] – accelerate player-controlled entities
//! - [`movement`] – friction, speed clamp and position integration
//! - [`tilecollision`] – push moving colliders out of solid tiles
//! - [`collision`] – entity pairs, callbacks and contact recording
//! - [`combat`] – contact damage, damage requests and death
//! - [`dialogue`] – start, advance and end NPC conversations
//! - [`inventory`] – item pickup
//! - [`camera`] – camera follow
//! - [`messages`] – rotate message buffers
//!
//! [`render`] and [`time`] are driven by the game loop outside the schedule.

pub mod camera;
pub mod collision;
pub mod combat;
pub mod dialogue;
pub mod input;
pub mod inputcontroller;
pub mod inventory;
pub mod messages;
pub mod movement;
pub mod render;
pub mod tilecollision;
pub mod time;
