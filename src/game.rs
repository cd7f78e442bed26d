//! This module contains the main game logic and state.

use std::time::Duration;

use bevy_ecs::{
    entity::Entity,
    event::{EventRegistry, Events},
    query::With,
    schedule::{IntoScheduleConfigs, Schedule, SystemSet},
    world::{Mut, World},
};
use glam::Vec3;
use tracing::{debug, error, info, warn};

use crate::{
    asset::{Asset, AssetRegistry},
    audio::{Audio, AudioBackend, Track},
    clock::Clock,
    config::{Config, Difficulty},
    constants::{player, ENTITY_HEIGHT, MAX_DELTA_SECONDS},
    error::{AssetError, GameResult},
    events::{AudioEvent, PlayerCaught, TickOutcome, TickOutcomes},
    formatter,
    input::PlayerInput,
    map::builder::{grid_to_world, Maze},
    systems::{
        audio_system, build_scene, caught_system, forced_catch_system, player_movement_system, portal_system,
        pursuer_system, simulation_active, spawn_tokens, survival_phase_system, token_pickup_system, AudioResource,
        CollectCue, ForcedCatch, FrameTime, Mover, Objective, PauseState, PlayerBundle, PlayerControlled, Portal,
        Progression, Pursuer, PursuerBundle, PursuerKind, PursuitRules, Reinforcement, RoundState, Scene, SimRng,
        Sprint, Token,
    },
};

/// Ordering of the work done in one tick.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum TickSet {
    /// The forced-catch timer, which ignores pause.
    Watchdog,
    /// Movement, pursuit, pickups, progression and the portal.
    Simulation,
    /// Consequences of a catch.
    Settle,
    Audio,
}

/// The simulation core: an ECS world plus the schedule that advances it one tick at a time.
///
/// The host drives it by calling [`update`](Game::update) once per frame and reacting to the
/// returned outcomes. Time comes from the injected [`Clock`], so a test can step it exactly.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
    clock: Box<dyn Clock>,
    last_tick: Option<Duration>,
    difficulty: Difficulty,
    player: Entity,
}

impl Game {
    /// Builds the maze, spawns every entity and wires the tick schedule. The round does not begin
    /// until [`start`](Game::start).
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the authored maze fails to parse or validate.
    pub fn new(config: &Config, clock: Box<dyn Clock>, backend: Box<dyn AudioBackend>) -> GameResult<Game> {
        info!(difficulty = %config.difficulty, seed = ?config.seed, "Initializing game");

        let maze = Maze::standard()?;
        let settings = config.difficulty.settings();
        let rules = PursuitRules {
            speed_multiplier: settings.speed_multiplier,
            wall_phasing: settings.wall_phasing,
        };
        let seed = config.seed.unwrap_or_else(rand::random);
        debug!(seed, "Simulation seed");

        let mut world = World::default();
        Self::setup_ecs(&mut world);

        let mut audio = Audio::new(backend);
        audio.set_mute(config.muted);
        world.insert_non_send_resource(AudioResource(audio));

        world.insert_resource(FrameTime::default());
        world.insert_resource(PlayerInput::default());
        world.insert_resource(RoundState::Ready);
        world.insert_resource(PauseState::default());
        world.insert_resource(rules);
        world.insert_resource(SimRng::seeded(seed));
        world.insert_resource(Objective::default());
        world.insert_resource(Progression::default());
        world.insert_resource(CollectCue::default());
        world.insert_resource(ForcedCatch::default());
        world.insert_resource(AssetRegistry::default());

        let player = Self::spawn_player(&mut world, &maze);
        Self::spawn_pursuers(&mut world, &maze, rules);
        spawn_tokens(&mut world, &maze);
        world.insert_resource(maze);

        let mut schedule = Schedule::default();
        Self::setup_schedule(&mut schedule);

        Ok(Game {
            world,
            schedule,
            clock,
            last_tick: None,
            difficulty: config.difficulty,
            player,
        })
    }

    fn setup_ecs(world: &mut World) {
        EventRegistry::register_event::<TickOutcome>(world);
        EventRegistry::register_event::<AudioEvent>(world);
        EventRegistry::register_event::<PlayerCaught>(world);
    }

    fn setup_schedule(schedule: &mut Schedule) {
        schedule
            .add_systems((
                forced_catch_system.in_set(TickSet::Watchdog),
                (
                    player_movement_system,
                    pursuer_system,
                    token_pickup_system,
                    survival_phase_system,
                    portal_system,
                )
                    .chain()
                    .in_set(TickSet::Simulation),
                caught_system.in_set(TickSet::Settle),
                audio_system.in_set(TickSet::Audio),
            ))
            .configure_sets(
                (
                    TickSet::Watchdog,
                    TickSet::Simulation.run_if(simulation_active),
                    TickSet::Settle,
                    TickSet::Audio,
                )
                    .chain(),
            );
    }

    fn spawn_player(world: &mut World, maze: &Maze) -> Entity {
        let mut mover = Mover::new(maze.starting_position(), player::BASE_SPEED, player::RADIUS);
        mover.rotation = player::START_ROTATION;
        world
            .spawn(PlayerBundle {
                player: PlayerControlled,
                mover,
                sprint: Sprint::default(),
            })
            .id()
    }

    fn spawn_pursuers(world: &mut World, maze: &Maze, rules: PursuitRules) {
        for (kind, cell) in maze.pursuer_spawns() {
            let position = grid_to_world(cell.x, cell.y, ENTITY_HEIGHT);
            world.spawn(PursuerBundle::new(
                PursuerKind::from(*kind),
                position,
                rules.speed_multiplier,
                rules.wall_phasing,
            ));
        }
    }

    /// Begins the round: starts the base track and, on impossible, arms the forced catch.
    pub fn start(&mut self) {
        if self.round_state() != RoundState::Ready {
            warn!(round = ?self.round_state(), "Start ignored, round already begun");
            return;
        }
        info!("Round started");
        self.last_tick = Some(self.clock.now());
        *self.world.resource_mut::<RoundState>() = RoundState::Playing;
        self.audio_mut().0.play_music(Track::Base);
        self.rearm_forced_catch();
    }

    /// Advances the simulation by one tick and returns what happened, in order.
    ///
    /// The frame delta is measured from the clock and clamped. Once disposed, nothing runs.
    pub fn update(&mut self) -> TickOutcomes {
        if self.round_state() == RoundState::Disposed {
            return TickOutcomes::new();
        }

        formatter::increment_tick();
        let now = self.clock.now();
        let delta = self
            .last_tick
            .map_or(0.0, |last| now.saturating_sub(last).as_secs_f32())
            .min(MAX_DELTA_SECONDS);
        self.last_tick = Some(now);
        self.world.insert_resource(FrameTime::new(now, delta));

        self.schedule.run(&mut self.world);

        self.world.resource_mut::<Events<AudioEvent>>().update();
        self.world.resource_mut::<Events<PlayerCaught>>().update();
        self.world.resource_mut::<Events<TickOutcome>>().drain().collect()
    }

    /// Replaces the movement intents used from the next tick on.
    pub fn set_input(&mut self, input: PlayerInput) {
        self.world.insert_resource(input);
    }

    pub fn pause_game(&mut self) {
        self.set_paused(true);
    }

    pub fn resume_game(&mut self) {
        self.set_paused(false);
    }

    pub fn toggle_pause(&mut self) {
        let paused = self.is_paused();
        self.set_paused(!paused);
    }

    fn set_paused(&mut self, paused: bool) {
        let mut state = self.world.resource_mut::<PauseState>();
        if state.paused != paused {
            debug!(paused, "Pause state changed");
            state.paused = paused;
        }
    }

    /// Returns the round to a playable state.
    ///
    /// A partial reset only puts the player and pursuers back on their spawns. A full reset also
    /// rebuilds the maze and its tokens, drops reinforcements, zeroes the score, abandons any
    /// survival phase without its bonus and closes the portal. The resulting score, stage and
    /// survival-phase changes are returned by the next [`update`](Game::update).
    pub fn reset_game(&mut self, full: bool) {
        if self.round_state() == RoundState::Disposed {
            warn!("Reset ignored, game disposed");
            return;
        }
        info!(full, "Resetting round");

        if full {
            self.rebuild_maze();
        }

        let start = self.world.resource::<Maze>().starting_position();
        if let Some(mut mover) = self.world.get_mut::<Mover>(self.player) {
            mover.position = start;
            mover.rotation = player::START_ROTATION;
        }
        if full {
            if let Some(mut sprint) = self.world.get_mut::<Sprint>(self.player) {
                *sprint = Sprint::default();
            }
        }

        let mut pursuers = self.world.query::<(&mut Pursuer, &mut Mover)>();
        for (mut pursuer, mut mover) in pursuers.iter_mut(&mut self.world) {
            mover.position = pursuer.home;
            mover.rotation = 0.0;
            pursuer.last_alert = None;
        }

        self.world.resource_mut::<Events<PlayerCaught>>().clear();
        self.world.resource_mut::<PauseState>().paused = false;
        {
            let mut round = self.world.resource_mut::<RoundState>();
            if *round != RoundState::Ready {
                *round = RoundState::Playing;
            }
        }

        self.rearm_forced_catch();
        if self.round_state() == RoundState::Playing && !self.world.resource::<Progression>().survival_active() {
            self.audio_mut().0.play_music(Track::Base);
        }
    }

    fn rebuild_maze(&mut self) {
        let maze = match Maze::standard() {
            Ok(maze) => maze,
            Err(e) => {
                error!("Could not rebuild maze, keeping the current one: {e}");
                self.world.resource::<Maze>().clone()
            }
        };

        let mut stale: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<Token>>()
            .iter(&self.world)
            .collect();
        stale.extend(
            self.world
                .query_filtered::<Entity, With<Reinforcement>>()
                .iter(&self.world),
        );
        for entity in stale {
            self.world.despawn(entity);
        }

        spawn_tokens(&mut self.world, &maze);
        self.world.insert_resource(maze);
        self.world.insert_resource(Objective::default());
        self.world.insert_resource(CollectCue::default());

        // Reported on the next tick, in the same order a catch reports them.
        let (had_score, had_stage, aborted) = {
            let mut progression = self.world.resource_mut::<Progression>();
            let had_score = progression.score() > 0;
            let had_stage = progression.stage() > 1;
            (had_score, had_stage, progression.reset_score())
        };
        let mut outcomes = self.world.resource_mut::<Events<TickOutcome>>();
        if aborted {
            outcomes.send(TickOutcome::SurvivalPhase {
                active: false,
                seconds_remaining: 0.0,
            });
        }
        if had_score {
            outcomes.send(TickOutcome::ScoreChanged(0));
        }
        if had_stage {
            outcomes.send(TickOutcome::StageChanged(1));
        }
    }

    /// Disarms the forced catch, then arms it again if the difficulty calls for it and the round
    /// is in play.
    fn rearm_forced_catch(&mut self) {
        let armed = self.difficulty.settings().forced_catch && self.round_state() == RoundState::Playing;
        let now = self.clock.now();
        self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            let mut timer = world.resource_mut::<ForcedCatch>();
            timer.disarm();
            if armed {
                timer.arm(now, &mut rng.0);
            }
        });
    }

    /// Tears the game down. Every entity is despawned, timers are cleared and music stops; later
    /// ticks do nothing.
    pub fn dispose(&mut self) {
        if self.round_state() == RoundState::Disposed {
            return;
        }
        info!("Disposing game");
        self.world.resource_mut::<ForcedCatch>().disarm();
        self.audio_mut().0.stop_music();
        self.world.clear_entities();
        self.world.insert_resource(Objective::default());
        *self.world.resource_mut::<RoundState>() = RoundState::Disposed;
    }

    /// Enables audio playback. Call on the first user gesture.
    pub fn unlock_audio(&mut self) {
        self.audio_mut().0.unlock();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio_mut().0.set_mute(muted);
    }

    /// Applies a difficulty to every pursuer, including ones already chasing.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        info!(%difficulty, "Difficulty changed");
        self.difficulty = difficulty;
        let settings = difficulty.settings();
        self.world.insert_resource(PursuitRules {
            speed_multiplier: settings.speed_multiplier,
            wall_phasing: settings.wall_phasing,
        });

        self.world.resource_scope(|world, maze: Mut<Maze>| {
            let mut pursuers = world.query::<(&PursuerKind, &mut Pursuer, &mut Mover)>();
            for (kind, mut pursuer, mut mover) in pursuers.iter_mut(world) {
                mover.speed = kind.base_speed() * settings.speed_multiplier;
                let stranded = pursuer.wall_phasing
                    && !settings.wall_phasing
                    && maze.collides_wall(mover.position, mover.radius);
                if stranded {
                    debug!(?kind, position = ?mover.position, "Pursuer inside a wall, sending it home");
                    mover.position = pursuer.home;
                }
                pursuer.wall_phasing = settings.wall_phasing;
            }
        });

        let armed = self.world.resource::<ForcedCatch>().is_armed();
        if settings.forced_catch != armed {
            self.rearm_forced_catch();
        }
    }

    pub fn mark_asset_ready(&mut self, asset: Asset) {
        self.world.resource_mut::<AssetRegistry>().mark_ready(asset);
    }

    pub fn mark_asset_failed(&mut self, asset: Asset, error: AssetError) {
        self.world.resource_mut::<AssetRegistry>().mark_failed(asset, error);
    }

    /// A snapshot of everything drawable.
    pub fn scene(&mut self) -> Scene {
        build_scene(&mut self.world)
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<Progression>().score()
    }

    pub fn stage(&self) -> u32 {
        self.world.resource::<Progression>().stage()
    }

    pub fn sprint(&self) -> Option<Sprint> {
        self.world.get::<Sprint>(self.player).copied()
    }

    /// Seconds left in the running survival phase, if one is running.
    pub fn survival_phase(&self) -> Option<f32> {
        let now = self.world.resource::<FrameTime>().now;
        self.world
            .resource::<Progression>()
            .survival_remaining(now)
            .map(|remaining| remaining.as_secs_f32())
    }

    /// Tokens collected so far and the total the maze started with.
    ///
    /// A disposed game reports nothing collected.
    pub fn token_progress(&self) -> (usize, usize) {
        let total = self.world.resource::<Maze>().token_cells().len();
        if self.round_state() == RoundState::Disposed {
            return (0, total);
        }
        let remaining = self
            .world
            .try_query::<&Token>()
            .map_or(0, |mut query| query.iter(&self.world).count());
        (total.saturating_sub(remaining), total)
    }

    pub fn portal(&self) -> Option<Portal> {
        self.world.resource::<Objective>().portal
    }

    pub fn round_state(&self) -> RoundState {
        *self.world.resource::<RoundState>()
    }

    pub fn is_paused(&self) -> bool {
        self.world.resource::<PauseState>().paused
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn player_position(&self) -> Option<Vec3> {
        self.world.get::<Mover>(self.player).map(|mover| mover.position)
    }

    pub fn player_rotation(&self) -> Option<f32> {
        self.world.get::<Mover>(self.player).map(|mover| mover.rotation)
    }

    pub fn pursuer_count(&self) -> usize {
        self.world
            .try_query::<&Pursuer>()
            .map_or(0, |mut query| query.iter(&self.world).count())
    }

    pub fn forced_catch_deadline(&self) -> Option<Duration> {
        self.world.resource::<ForcedCatch>().deadline()
    }

    fn audio_mut(&mut self) -> Mut<'_, AudioResource> {
        self.world.non_send_resource_mut::<AudioResource>()
    }
}
