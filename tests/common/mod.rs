#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bevy_ecs::{
    entity::Entity,
    event::{EventRegistry, Events},
    query::With,
    world::World,
};
use glam::Vec3;
use mazechase::{
    audio::{Audio, AudioBackend, NullBackend, Sound, Track},
    clock::ManualClock,
    config::{Config, Difficulty},
    constants::{player, ENTITY_HEIGHT},
    error::AudioError,
    events::{AudioEvent, PlayerCaught, TickOutcome},
    game::Game,
    input::PlayerInput,
    map::builder::{grid_to_world, Maze},
    systems::{
        AudioResource, CollectCue, ForcedCatch, FrameTime, Mover, Objective, PauseState, PlayerBundle, PlayerControlled,
        Progression, PursuerBundle, PursuerKind, PursuitRules, RoundState, SimRng, Sprint, Token,
    },
};
use parking_lot::Mutex;

/// Everything a [`RecordingBackend`] was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Played {
    Effect(Sound),
    Music(Track),
    StopMusic,
}

/// An audio backend that records calls. The music channel keeps "playing" until stopped or
/// until the test ends it through [`AudioLog::end_music`].
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: Arc<Mutex<Vec<Played>>>,
    playing: Arc<Mutex<bool>>,
}

impl AudioBackend for RecordingBackend {
    fn play_effect(&mut self, sound: Sound) -> Result<(), AudioError> {
        self.log.lock().push(Played::Effect(sound));
        Ok(())
    }

    fn play_music(&mut self, track: Track, _looping: bool) -> Result<(), AudioError> {
        self.log.lock().push(Played::Music(track));
        *self.playing.lock() = true;
        Ok(())
    }

    fn stop_music(&mut self) {
        self.log.lock().push(Played::StopMusic);
        *self.playing.lock() = false;
    }

    fn is_music_playing(&self) -> bool {
        *self.playing.lock()
    }

    fn set_volume(&mut self, _volume: f32) {}
}

/// The test's view of a [`RecordingBackend`].
#[derive(Debug, Clone)]
pub struct AudioLog {
    log: Arc<Mutex<Vec<Played>>>,
    playing: Arc<Mutex<bool>>,
}

impl AudioLog {
    pub fn entries(&self) -> Vec<Played> {
        self.log.lock().clone()
    }

    pub fn count(&self, sound: Sound) -> usize {
        self.log.lock().iter().filter(|p| **p == Played::Effect(sound)).count()
    }

    pub fn music_starts(&self, track: Track) -> usize {
        self.log.lock().iter().filter(|p| **p == Played::Music(track)).count()
    }

    /// Simulates the current music track running out.
    pub fn end_music(&self) {
        *self.playing.lock() = false;
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

pub fn recording_backend() -> (RecordingBackend, AudioLog) {
    let backend = RecordingBackend::default();
    let log = AudioLog {
        log: backend.log.clone(),
        playing: backend.playing.clone(),
    };
    (backend, log)
}

/// World-space center of a cell at entity height.
pub fn cell(col: u32, row: u32) -> Vec3 {
    grid_to_world(col, row, ENTITY_HEIGHT)
}

/// A world with every resource the systems read, no entities, and the round in play.
pub fn create_test_world() -> World {
    let mut world = World::default();

    EventRegistry::register_event::<TickOutcome>(&mut world);
    EventRegistry::register_event::<AudioEvent>(&mut world);
    EventRegistry::register_event::<PlayerCaught>(&mut world);

    world.insert_resource(Maze::standard().expect("standard maze should build"));
    world.insert_resource(FrameTime::new(Duration::ZERO, 0.1));
    world.insert_resource(PlayerInput::default());
    world.insert_resource(RoundState::Playing);
    world.insert_resource(PauseState::default());
    world.insert_resource(PursuitRules::default());
    world.insert_resource(SimRng::seeded(7));
    world.insert_resource(Objective::default());
    world.insert_resource(Progression::default());
    world.insert_resource(CollectCue::default());
    world.insert_resource(ForcedCatch::default());
    world.insert_non_send_resource(AudioResource(Audio::new(Box::new(NullBackend::default()))));

    world
}

/// Replaces the test world's audio coordinator with an unlocked recording one.
pub fn install_recording_audio(world: &mut World) -> AudioLog {
    let (backend, log) = recording_backend();
    let mut audio = Audio::new(Box::new(backend));
    audio.unlock();
    world.insert_non_send_resource(AudioResource(audio));
    log
}

pub fn set_frame(world: &mut World, now: Duration, delta: f32) {
    world.insert_resource(FrameTime::new(now, delta));
}

pub fn spawn_test_player(world: &mut World, position: Vec3, rotation: f32) -> Entity {
    let mut mover = Mover::new(position, player::BASE_SPEED, player::RADIUS);
    mover.rotation = rotation;
    world
        .spawn(PlayerBundle {
            player: PlayerControlled,
            mover,
            sprint: Sprint::default(),
        })
        .id()
}

pub fn spawn_test_pursuer(world: &mut World, kind: PursuerKind, position: Vec3) -> Entity {
    world.spawn(PursuerBundle::new(kind, position, 1.0, false)).id()
}

pub fn spawn_test_token(world: &mut World, col: u32, row: u32) -> Entity {
    world
        .spawn(Token {
            cell: glam::UVec2::new(col, row),
            position: cell(col, row),
        })
        .id()
}

pub fn mover(world: &World, entity: Entity) -> Mover {
    *world.get::<Mover>(entity).expect("entity should have a mover")
}

pub fn drain_outcomes(world: &mut World) -> Vec<TickOutcome> {
    world.resource_mut::<Events<TickOutcome>>().drain().collect()
}

pub fn drain_audio_events(world: &mut World) -> Vec<AudioEvent> {
    world.resource_mut::<Events<AudioEvent>>().drain().collect()
}

pub fn drain_caught(world: &mut World) -> Vec<PlayerCaught> {
    world.resource_mut::<Events<PlayerCaught>>().drain().collect()
}

/// A started game on a manual clock with unlocked, recorded audio.
pub fn test_game(difficulty: Difficulty) -> (Game, ManualClock, AudioLog) {
    let config = Config {
        difficulty,
        seed: Some(42),
        ..Config::default()
    };
    let clock = ManualClock::new();
    let (backend, log) = recording_backend();
    let mut game = Game::new(&config, Box::new(clock.clone()), Box::new(backend)).expect("game should build");
    game.unlock_audio();
    game.start();
    (game, clock, log)
}

/// Advances the clock by one frame and runs a tick, returning its outcomes.
pub fn step(game: &mut Game, clock: &ManualClock, seconds: f32) -> Vec<TickOutcome> {
    clock.advance_secs(seconds);
    game.update().into_iter().collect()
}

/// Runs `ticks` frames of `seconds` each, collecting every outcome.
pub fn run_for(game: &mut Game, clock: &ManualClock, ticks: usize, seconds: f32) -> Vec<TickOutcome> {
    (0..ticks).flat_map(|_| step(game, clock, seconds)).collect()
}

pub fn player_entity(game: &mut Game) -> Entity {
    game.world
        .query_filtered::<Entity, With<PlayerControlled>>()
        .single(&game.world)
        .expect("exactly one player")
}

pub fn place_player(game: &mut Game, position: Vec3, rotation: f32) {
    let entity = player_entity(game);
    let mut mover = game.world.get_mut::<Mover>(entity).expect("player mover");
    mover.position = position;
    mover.rotation = rotation;
}

pub fn despawn_all_tokens(game: &mut Game) {
    let tokens: Vec<Entity> = game
        .world
        .query_filtered::<Entity, With<Token>>()
        .iter(&game.world)
        .collect();
    for token in tokens {
        game.world.despawn(token);
    }
}
