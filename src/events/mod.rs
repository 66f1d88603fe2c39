//! Event and message types exchanged between systems.
//!
//! Observer events (`commands.trigger`) react immediately; messages
//! (`MessageWriter`/`MessageReader`) are buffered and read by later systems
//! or by the host after the frame.
//!
//! - [`collision`]: entity pairs that touched this frame
//! - [`combat`]: damage requests and their outcome
//! - [`dialogue`]: conversation progress
//! - [`inventory`]: collected pickups
//! - [`switchdebug`]: toggle the debug overlay
pub mod collision;
pub mod combat;
pub mod dialogue;
pub mod inventory;
pub mod switchdebug;
