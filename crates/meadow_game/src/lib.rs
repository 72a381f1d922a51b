//! Side-scrolling platformer simulation for a tile-and-sprite handheld.
//!
//! Everything runs on a single fixed tick. [`modes::StateMachine`] owns the
//! active game mode; gameplay drives the player, one patrolling enemy, the
//! camera and the background column streamer against a [`meadow_core::VideoOutput`].

pub mod camera;
pub mod collision;
pub mod config;
pub mod enemy;
pub mod gameplay;
pub mod hud;
pub mod level;
pub mod modes;
pub mod player;
pub mod pool;
pub mod replay;
pub mod sprite;
pub mod streamer;
pub mod tilemap;
