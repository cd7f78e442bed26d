//! The Entity-Component-System (ECS) module.
//!
//! This module contains all the ECS-related logic, including components, systems,
//! and resources.

pub mod audio;
pub mod components;
pub mod item;
pub mod player;
pub mod portal;
pub mod progression;
pub mod pursuer;
pub mod render;
pub mod round;
pub mod watchdog;

pub use self::audio::*;
pub use self::components::*;
pub use self::item::*;
pub use self::player::*;
pub use self::portal::*;
pub use self::progression::*;
pub use self::pursuer::*;
pub use self::render::*;
pub use self::round::*;
pub use self::watchdog::*;
