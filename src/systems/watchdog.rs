//! The impossible-mode forced catch.
//!
//! When armed, the round is guaranteed to end in a catch a few seconds after it starts, no
//! matter where the player is. The timer keeps counting while the game is paused.

use std::time::Duration;

use bevy_ecs::{
    event::EventWriter,
    query::{With, Without},
    resource::Resource,
    system::{Query, Res, ResMut},
};
use rand::Rng;
use tracing::{debug, info};

use crate::{
    constants::pursuer::{FORCED_CATCH_MAX_SECONDS, FORCED_CATCH_MIN_SECONDS},
    events::PlayerCaught,
    systems::components::{FrameTime, Mover, PlayerControlled, Pursuer, RoundState},
};

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForcedCatch {
    deadline: Option<Duration>,
}

impl ForcedCatch {
    /// Arms the timer to fire at a random point inside the forced-catch window.
    pub fn arm(&mut self, now: Duration, rng: &mut impl Rng) {
        let delay = rng.random_range(FORCED_CATCH_MIN_SECONDS..=FORCED_CATCH_MAX_SECONDS);
        let deadline = now + Duration::from_secs_f32(delay);
        debug!(delay, "Forced catch armed");
        self.deadline = Some(deadline);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Fires the forced catch once its deadline passes.
///
/// Every pursuer is moved onto the player and the round ends in a catch, unless it already ended.
/// The timer disarms either way.
pub fn forced_catch_system(
    time: Res<FrameTime>,
    mut timer: ResMut<ForcedCatch>,
    mut round: ResMut<RoundState>,
    players: Query<&Mover, (With<PlayerControlled>, Without<Pursuer>)>,
    mut pursuers: Query<&mut Mover, (With<Pursuer>, Without<PlayerControlled>)>,
    mut caught: EventWriter<PlayerCaught>,
) {
    let Some(deadline) = timer.deadline else {
        return;
    };
    if time.now < deadline {
        return;
    }
    timer.disarm();

    if *round != RoundState::Playing {
        debug!(round = ?*round, "Forced catch skipped, round already over");
        return;
    }
    let Ok(player) = players.single() else {
        return;
    };

    for mut mover in pursuers.iter_mut() {
        mover.position = player.position;
    }
    info!("Forced catch");
    *round = RoundState::Caught;
    caught.write(PlayerCaught { forced: true });
}
