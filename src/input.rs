//! Normalized input intents.
//!
//! The host's platform layer translates raw keyboard and pointer/touch events into these values
//! and hands them to [`Game::set_input`](crate::game::Game::set_input) before each tick. The core
//! never registers listeners of its own.

use bevy_ecs::resource::Resource;
use bitflags::bitflags;

bitflags! {
    /// Held keyboard intents.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyIntents: u8 {
        const TURN_LEFT = 1 << 0;
        const TURN_RIGHT = 1 << 1;
        const FORWARD = 1 << 2;
        const BACKWARD = 1 << 3;
        const SPRINT = 1 << 4;
    }
}

/// Analog intents from the alternate pointer/touch surface.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct PointerIntent {
    /// While set, the axes below replace the keyboard's turn and forward/back intents.
    pub active: bool,
    /// Forward (+) / backward (-), in `[-1, 1]`.
    pub forward_axis: f32,
    /// Turn axis in `[-1, 1]`; positive turns right.
    pub rotation_axis: f32,
}

impl PointerIntent {
    pub fn new(forward_axis: f32, rotation_axis: f32) -> Self {
        Self {
            active: true,
            forward_axis: forward_axis.clamp(-1.0, 1.0),
            rotation_axis: rotation_axis.clamp(-1.0, 1.0),
        }
    }
}

/// The intents applied on the next tick.
#[derive(Resource, Default, Clone, Copy, Debug, PartialEq)]
pub struct PlayerInput {
    pub keys: KeyIntents,
    pub pointer: PointerIntent,
}

impl PlayerInput {
    pub fn keys(keys: KeyIntents) -> Self {
        Self {
            keys,
            pointer: PointerIntent::default(),
        }
    }

    pub fn pointer(forward_axis: f32, rotation_axis: f32) -> Self {
        Self {
            keys: KeyIntents::empty(),
            pointer: PointerIntent::new(forward_axis, rotation_axis),
        }
    }
}
