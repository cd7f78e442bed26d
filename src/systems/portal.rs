use bevy_ecs::{
    event::EventWriter,
    query::With,
    system::{Query, Res, ResMut},
};
use rand::seq::IndexedRandom;
use tracing::{info, warn};

use crate::{
    audio::Sound,
    collision::xz,
    constants::ENTITY_HEIGHT,
    events::{AudioEvent, TickOutcome},
    map::builder::{grid_to_world, Maze},
    systems::components::{Mover, Objective, PlayerControlled, Portal, RoundState, SimRng, Token},
};

/// Opens the exit once every token is gone and completes the round when the player reaches it.
///
/// Arrival re-counts the tokens still in the world. If any remain the portal is withdrawn and the
/// all-collected flag cleared, so completion can only ever follow a genuinely empty maze.
#[allow(clippy::too_many_arguments)]
pub fn portal_system(
    maze: Res<Maze>,
    mut rng: ResMut<SimRng>,
    mut objective: ResMut<Objective>,
    mut round: ResMut<RoundState>,
    players: Query<&Mover, With<PlayerControlled>>,
    tokens: Query<(), With<Token>>,
    mut outcomes: EventWriter<TickOutcome>,
    mut audio_events: EventWriter<AudioEvent>,
) {
    if objective.all_collected && objective.portal.is_none() {
        if let Some(cell) = maze.portal_candidates().choose(&mut rng.0) {
            let portal = Portal::new(grid_to_world(cell.x, cell.y, ENTITY_HEIGHT));
            info!(?cell, position = ?portal.position, "Portal opened");
            objective.portal = Some(portal);
            audio_events.write(AudioEvent::Play(Sound::PortalOpen));
            outcomes.write(TickOutcome::PortalOpened);
        }
    }

    let (Some(portal), Ok(player)) = (objective.portal, players.single()) else {
        return;
    };
    if xz(player.position).distance(xz(portal.position)) >= portal.radius {
        return;
    }

    let remaining = tokens.iter().count();
    if remaining > 0 {
        warn!(remaining, "Portal reached with tokens still in the maze, retracting");
        objective.portal = None;
        objective.all_collected = false;
        outcomes.write(TickOutcome::PortalRetracted);
        return;
    }

    if *round == RoundState::Playing {
        info!("Maze completed");
        *round = RoundState::Completed;
        audio_events.write(AudioEvent::StopMusic);
        audio_events.write(AudioEvent::Play(Sound::Win));
        outcomes.write(TickOutcome::Completed);
    }
}
