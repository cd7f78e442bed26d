use bevy_ecs::{
    entity::Entity,
    event::{EventReader, EventWriter},
    query::With,
    system::{Commands, Query, Res, ResMut},
};
use tracing::info;

use crate::{
    audio::Sound,
    events::{AudioEvent, PlayerCaught, TickOutcome},
    systems::{
        components::{PauseState, Reinforcement, RoundState},
        progression::Progression,
    },
};

/// Run condition for everything that moves the round forward.
pub fn simulation_active(pause: Res<PauseState>, round: Res<RoundState>) -> bool {
    !pause.paused && *round == RoundState::Playing
}

/// Settles a catch: the score resets, any survival phase is abandoned, and the simulation halts
/// until the host resets the round.
pub fn caught_system(
    mut commands: Commands,
    mut caught: EventReader<PlayerCaught>,
    mut progression: ResMut<Progression>,
    mut pause: ResMut<PauseState>,
    reinforcements: Query<Entity, With<Reinforcement>>,
    mut outcomes: EventWriter<TickOutcome>,
    mut audio_events: EventWriter<AudioEvent>,
) {
    for event in caught.read() {
        info!(forced = event.forced, score = progression.score(), "Round lost");

        let had_score = progression.score() > 0;
        let had_stage = progression.stage() > 1;
        if progression.reset_score() {
            for entity in reinforcements.iter() {
                commands.entity(entity).despawn();
            }
            outcomes.write(TickOutcome::SurvivalPhase {
                active: false,
                seconds_remaining: 0.0,
            });
        }
        if had_score {
            outcomes.write(TickOutcome::ScoreChanged(0));
        }
        if had_stage {
            outcomes.write(TickOutcome::StageChanged(1));
        }

        pause.paused = true;
        audio_events.write(AudioEvent::StopMusic);
        audio_events.write(AudioEvent::Play(Sound::Caught));
        outcomes.write(TickOutcome::Caught);
    }
}
