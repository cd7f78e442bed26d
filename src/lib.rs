//! Simulation core of a first-person maze-chase game.

pub mod asset;
pub mod audio;
pub mod clock;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod formatter;
pub mod game;
pub mod input;
pub mod logging;
pub mod map;
pub mod systems;
