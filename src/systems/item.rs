use bevy_ecs::{
    entity::Entity,
    event::EventWriter,
    query::With,
    resource::Resource,
    system::{Commands, Query, ResMut},
    world::World,
};
use tracing::{debug, trace};

use crate::{
    audio::Sound,
    collision::xz,
    constants::{scoring, ENTITY_HEIGHT},
    events::{AudioEvent, TickOutcome},
    map::builder::{grid_to_world, Maze},
    systems::{
        components::{Mover, Objective, PlayerControlled, Token},
        progression::Progression,
    },
};

/// Alternates the two pickup cues so consecutive pickups sound different.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectCue {
    flipped: bool,
}

impl CollectCue {
    /// Returns the cue for this pickup and flips to the other one.
    pub fn next(&mut self) -> Sound {
        let sound = if self.flipped { Sound::CollectB } else { Sound::CollectA };
        self.flipped = !self.flipped;
        sound
    }
}

/// Spawns one token entity per authored token cell.
pub fn spawn_tokens(world: &mut World, maze: &Maze) -> usize {
    let tokens: Vec<Token> = maze
        .token_cells()
        .iter()
        .map(|cell| Token {
            cell: *cell,
            position: grid_to_world(cell.x, cell.y, ENTITY_HEIGHT),
        })
        .collect();
    let count = tokens.len();
    world.spawn_batch(tokens);
    debug!(count, "Tokens spawned");
    count
}

/// Picks up every token within reach of the player.
///
/// Each pickup removes the token, plays the next pickup cue and awards points up to the
/// ceiling. Removing the last token raises the all-collected flag exactly once.
#[allow(clippy::too_many_arguments)]
pub fn token_pickup_system(
    mut commands: Commands,
    players: Query<&Mover, With<PlayerControlled>>,
    tokens: Query<(Entity, &Token)>,
    mut progression: ResMut<Progression>,
    mut cue: ResMut<CollectCue>,
    mut objective: ResMut<Objective>,
    mut outcomes: EventWriter<TickOutcome>,
    mut audio_events: EventWriter<AudioEvent>,
) {
    let Ok(player) = players.single() else {
        return;
    };

    let mut remaining = tokens.iter().count();
    for (entity, token) in tokens.iter() {
        if xz(token.position).distance(xz(player.position)) >= scoring::PICKUP_RADIUS {
            continue;
        }

        commands.entity(entity).despawn();
        remaining -= 1;
        audio_events.write(AudioEvent::Play(cue.next()));

        if progression.add_points(scoring::POINTS_PER_TOKEN) > 0 {
            outcomes.write(TickOutcome::ScoreChanged(progression.score()));
        }
        trace!(cell = ?token.cell, remaining, score = progression.score(), "Token collected");
    }

    if remaining == 0 && !objective.all_collected {
        debug!("All tokens collected");
        objective.all_collected = true;
        outcomes.write(TickOutcome::AllCollected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_cue_alternates() {
        let mut cue = CollectCue::default();
        assert_eq!(cue.next(), Sound::CollectA);
        assert_eq!(cue.next(), Sound::CollectB);
        assert_eq!(cue.next(), Sound::CollectA);
    }
}
