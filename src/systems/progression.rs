//! Score, stage and the timed survival phase.
//!
//! The stage is derived from the score and only ever moves with it. Reaching the survival stage
//! starts a single survival phase per game: reinforcement pursuers join the chase, sprint is
//! unlocked and the survival track plays. The phase ends when its timer runs out or its track
//! finishes, whichever comes first, and the ending is guarded so the bonus is paid once.

use std::time::Duration;

use bevy_ecs::{
    entity::Entity,
    event::EventWriter,
    query::With,
    resource::Resource,
    system::{Commands, NonSendMut, Query, Res, ResMut},
};
use tracing::{debug, info};

use crate::{
    audio::{Sound, Track},
    constants::{scoring, ENTITY_HEIGHT},
    events::{AudioEvent, TickOutcome},
    map::builder::{grid_to_world, Maze},
    systems::{
        audio::AudioResource,
        components::{
            FrameTime, PlayerControlled, PursuerBundle, PursuerKind, PursuitRules, Reinforcement, Sprint,
        },
    },
};

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Progression {
    score: u32,
    /// The last stage reported to the host.
    announced_stage: u32,
    /// When the running survival phase began.
    survival_started: Option<Duration>,
    /// Last whole-second countdown value reported to the host.
    announced_seconds: Option<u32>,
    /// Held for a short while after a phase ends so no second exit can slip through.
    exit_latch: Option<Duration>,
    survival_triggered: bool,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            score: 0,
            announced_stage: 1,
            survival_started: None,
            announced_seconds: None,
            exit_latch: None,
            survival_triggered: false,
        }
    }
}

impl Progression {
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn stage(&self) -> u32 {
        self.score / scoring::STAGE_INTERVAL + 1
    }

    /// Adds points, never exceeding the ceiling. Returns how many were actually added.
    pub fn add_points(&mut self, points: u32) -> u32 {
        let added = points.min(scoring::MAX_SCORE - self.score);
        self.score += added;
        added
    }

    /// Zeroes score and stage and drops any survival phase without paying its bonus.
    ///
    /// Returns `true` if a phase was running.
    pub fn reset_score(&mut self) -> bool {
        let aborted = self.survival_started.is_some();
        *self = Self::default();
        if aborted {
            debug!("Survival phase aborted");
        }
        aborted
    }

    pub fn survival_active(&self) -> bool {
        self.survival_started.is_some()
    }

    pub fn survival_triggered(&self) -> bool {
        self.survival_triggered
    }

    pub fn exit_latched(&self) -> bool {
        self.exit_latch.is_some()
    }

    /// Time left in the running survival phase.
    pub fn survival_remaining(&self, now: Duration) -> Option<Duration> {
        self.survival_started
            .map(|started| scoring::SURVIVAL_DURATION.saturating_sub(now.saturating_sub(started)))
    }

    /// Starts the survival phase if this game has not had one yet.
    pub fn begin_survival(&mut self, now: Duration) -> bool {
        if self.survival_triggered || self.survival_started.is_some() || self.exit_latch.is_some() {
            return false;
        }
        self.survival_triggered = true;
        self.survival_started = Some(now);
        self.announced_seconds = Some(scoring::SURVIVAL_DURATION.as_secs() as u32);
        true
    }

    /// Ends the running phase and pays the bonus. Only the first call per phase succeeds.
    pub fn end_survival(&mut self, now: Duration) -> bool {
        if self.survival_started.is_none() || self.exit_latch.is_some() {
            return false;
        }
        self.survival_started = None;
        self.announced_seconds = None;
        self.exit_latch = Some(now + scoring::SURVIVAL_EXIT_LATCH);
        self.add_points(scoring::SURVIVAL_BONUS);
        true
    }

    pub fn release_latch(&mut self, now: Duration) {
        if self.exit_latch.is_some_and(|release| now >= release) {
            self.exit_latch = None;
        }
    }

    /// Returns the new stage if it differs from the last one reported.
    pub fn take_stage_change(&mut self) -> Option<u32> {
        let stage = self.stage();
        (stage != self.announced_stage).then(|| {
            self.announced_stage = stage;
            stage
        })
    }

    /// Returns `true` when the whole-second countdown moved since it was last reported.
    fn take_countdown_change(&mut self, remaining: Duration) -> bool {
        let seconds = remaining.as_secs_f32().ceil() as u32;
        if self.announced_seconds == Some(seconds) {
            return false;
        }
        self.announced_seconds = Some(seconds);
        true
    }
}

/// Drives stage announcements and the survival phase lifecycle.
#[allow(clippy::too_many_arguments)]
pub fn survival_phase_system(
    mut commands: Commands,
    time: Res<FrameTime>,
    maze: Res<Maze>,
    rules: Res<PursuitRules>,
    mut progression: ResMut<Progression>,
    mut audio: NonSendMut<AudioResource>,
    mut players: Query<&mut Sprint, With<PlayerControlled>>,
    reinforcements: Query<Entity, With<Reinforcement>>,
    mut outcomes: EventWriter<TickOutcome>,
    mut audio_events: EventWriter<AudioEvent>,
) {
    progression.release_latch(time.now);

    if let Some(remaining) = progression.survival_remaining(time.now) {
        let track_ended = audio.0.finished_track() == Some(Track::Survival);
        if track_ended {
            audio.0.take_finished();
        }

        if remaining.is_zero() || track_ended {
            if progression.end_survival(time.now) {
                info!(track_ended, score = progression.score(), "Survival phase survived");
                for entity in reinforcements.iter() {
                    commands.entity(entity).despawn();
                }
                audio_events.write(AudioEvent::Music(Track::Base));
                audio_events.write(AudioEvent::Play(Sound::PhaseVictory));
                outcomes.write(TickOutcome::SurvivalPhase {
                    active: false,
                    seconds_remaining: 0.0,
                });
                outcomes.write(TickOutcome::ScoreChanged(progression.score()));
            }
        } else if progression.take_countdown_change(remaining) {
            outcomes.write(TickOutcome::SurvivalPhase {
                active: true,
                seconds_remaining: remaining.as_secs_f32(),
            });
        }
    }

    if let Some(stage) = progression.take_stage_change() {
        debug!(stage, "Stage changed");
        outcomes.write(TickOutcome::StageChanged(stage));
    }

    if progression.stage() >= scoring::SURVIVAL_STAGE && progression.begin_survival(time.now) {
        info!(stage = progression.stage(), "Survival phase started");
        for (index, cell) in maze.reinforcement_cells().iter().enumerate() {
            let kind = if index % 2 == 0 {
                PursuerKind::Strict
            } else {
                PursuerKind::Erratic
            };
            let position = grid_to_world(cell.x, cell.y, ENTITY_HEIGHT);
            commands.spawn((
                PursuerBundle::new(kind, position, rules.speed_multiplier, rules.wall_phasing),
                Reinforcement,
            ));
        }
        for mut sprint in players.iter_mut() {
            sprint.unlocked = true;
        }
        audio_events.write(AudioEvent::Music(Track::Survival));
        audio_events.write(AudioEvent::Play(Sound::PhaseStart));
        outcomes.write(TickOutcome::SurvivalPhase {
            active: true,
            seconds_remaining: scoring::SURVIVAL_DURATION.as_secs_f32(),
        });
    }
}
