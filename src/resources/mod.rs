//! ECS resources and the data structures behind them.
//!
//! - `camera2d` – shared 2D camera and its follow controller
//! - `chunkedtilemap` – sparse chunked tile storage for large or open worlds
//! - `contacts` – entity pairs touching in the current frame
//! - `debugmode` – presence toggles the debug overlay
//! - `entitystore` – entity ids, names, activity and typed component access
//! - `gameconfig` – INI-backed engine configuration
//! - `input` – input capability and per-frame action state
//! - `level` – levels, their JSON form and the active level slot
//! - `tilemap` – dense multi-layer tile grid with a collision grid
//! - `tileshapes` – per-tile collision shapes
//! - `worldtime` – simulation time and delta
pub mod camera2d;
pub mod chunkedtilemap;
pub mod contacts;
pub mod debugmode;
pub mod entitystore;
pub mod gameconfig;
pub mod input;
pub mod level;
pub mod tilemap;
pub mod tileshapes;
pub mod worldtime;
