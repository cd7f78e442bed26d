use bevy_ecs::prelude::*;
use smallvec::SmallVec;

use crate::audio::{Sound, Track};

/// Things that happened during a tick that the host shell may want to react to.
///
/// Systems write these as ECS events; [`Game::update`](crate::game::Game::update) drains them, in
/// emission order, into its return value.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    ScoreChanged(u32),
    /// The player's facing changed, in radians.
    RotationChanged(f32),
    StageChanged(u32),
    SurvivalPhase {
        active: bool,
        seconds_remaining: f32,
    },
    /// The last token was picked up.
    AllCollected,
    PortalOpened,
    /// The portal was withdrawn because tokens turned out to remain.
    PortalRetracted,
    /// A pursuer reached the player; the round is over until the host resets it.
    Caught,
    /// The player reached the portal with every token collected.
    Completed,
}

/// The outcomes of one tick. Most ticks produce none or one.
pub type TickOutcomes = SmallVec<[TickOutcome; 4]>;

/// Raised once when the round ends in a catch, either by contact or by the forced-catch timer.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerCaught {
    pub forced: bool,
}

/// Requests for the audio coordinator, applied at the end of the tick.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioEvent {
    Play(Sound),
    Music(Track),
    StopMusic,
}
