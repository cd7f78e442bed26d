use std::f32::consts::PI;
use std::time::Duration;

use mazechase::{
    audio::{Sound, Track},
    config::Difficulty,
    constants::{player, pursuer, scoring, MAX_DELTA_SECONDS},
    events::TickOutcome,
    input::{KeyIntents, PlayerInput},
    systems::{PursuerKind, RoundState, Token},
};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

const FRAME: f32 = 1.0 / 60.0;

#[test]
fn test_start_begins_round_with_base_music() {
    let (game, _clock, log) = common::test_game(Difficulty::Normal);

    assert_eq!(game.round_state(), RoundState::Playing);
    assert_that(&log.music_starts(Track::Base)).is_equal_to(1);
    assert_that(&game.pursuer_count()).is_equal_to(3);
    assert_eq!(game.token_progress(), (0, scoring::TOKEN_COUNT));
    assert_eq!(game.player_position(), Some(common::cell(1, 1)));
    assert_eq!(game.player_rotation(), Some(player::START_ROTATION));
}

#[test]
fn test_nothing_moves_before_start() {
    let config = mazechase::config::Config {
        seed: Some(1),
        ..Default::default()
    };
    let clock = mazechase::clock::ManualClock::new();
    let mut game = mazechase::game::Game::new(
        &config,
        Box::new(clock.clone()),
        Box::new(mazechase::audio::NullBackend::default()),
    )
    .unwrap();
    game.set_input(PlayerInput::keys(KeyIntents::FORWARD));

    let outcomes = common::run_for(&mut game, &clock, 30, FRAME);

    assert_that(&outcomes).is_empty();
    assert_eq!(game.player_position(), Some(common::cell(1, 1)));
}

#[test]
fn test_walking_into_wall_bounces_back() {
    let (mut game, clock, _log) = common::test_game(Difficulty::Normal);
    let start = common::cell(1, 1);
    common::place_player(&mut game, start, PI);
    game.set_input(PlayerInput::keys(KeyIntents::FORWARD));

    common::run_for(&mut game, &clock, 120, FRAME);

    let position = game.player_position().unwrap();
    assert_that(&position.x).is_close_to(start.x, 1e-3);
    assert_that(&(position.z < -18.0 - player::RADIUS)).is_true();
    assert_that(&(position.z > start.z)).is_true();
}

#[test]
fn test_walking_down_corridor_collects_token() {
    let (mut game, clock, log) = common::test_game(Difficulty::Normal);
    game.set_input(PlayerInput::keys(KeyIntents::FORWARD));

    let outcomes = common::run_for(&mut game, &clock, 90, FRAME);

    assert_that(&outcomes).contains(TickOutcome::ScoreChanged(10));
    assert_that(&game.score()).is_equal_to(10);
    assert_eq!(game.token_progress(), (1, scoring::TOKEN_COUNT));
    assert_that(&log.count(Sound::CollectA)).is_equal_to(1);
}

#[test]
fn test_large_frame_gap_is_clamped() {
    let (mut game, clock, _log) = common::test_game(Difficulty::Normal);
    game.set_input(PlayerInput::keys(KeyIntents::FORWARD));
    let start = game.player_position().unwrap();

    common::step(&mut game, &clock, 5.0);

    let moved = game.player_position().unwrap().distance(start);
    assert_that(&moved).is_close_to(player::BASE_SPEED * MAX_DELTA_SECONDS, 1e-3);
}

#[test]
fn test_paused_game_does_not_move() {
    let (mut game, clock, _log) = common::test_game(Difficulty::Normal);
    game.set_input(PlayerInput::keys(KeyIntents::FORWARD | KeyIntents::TURN_LEFT));
    game.pause_game();

    let outcomes = common::run_for(&mut game, &clock, 60, FRAME);

    assert_that(&outcomes).is_empty();
    assert_eq!(game.player_position(), Some(common::cell(1, 1)));

    game.toggle_pause();
    assert_that(&game.is_paused()).is_false();
    common::run_for(&mut game, &clock, 10, FRAME);
    assert_that(&(game.player_position() != Some(common::cell(1, 1)))).is_true();
}

#[test]
fn test_impossible_forces_catch_even_while_paused() {
    let (mut game, clock, log) = common::test_game(Difficulty::Impossible);
    let deadline = game.forced_catch_deadline().expect("forced catch should be armed");
    assert_that(&(deadline >= Duration::from_secs_f32(pursuer::FORCED_CATCH_MIN_SECONDS))).is_true();
    assert_that(&(deadline <= Duration::from_secs_f32(pursuer::FORCED_CATCH_MAX_SECONDS))).is_true();
    game.pause_game();

    let outcomes = common::run_for(&mut game, &clock, 60 * 9, FRAME);

    let catches = outcomes.iter().filter(|o| **o == TickOutcome::Caught).count();
    assert_that(&catches).is_equal_to(1);
    assert_eq!(game.round_state(), RoundState::Caught);
    assert_that(&game.forced_catch_deadline()).is_none();
    assert_that(&log.count(Sound::Caught)).is_equal_to(1);
}

#[test]
fn test_completion_fires_exactly_once() {
    let (mut game, clock, log) = common::test_game(Difficulty::Normal);
    common::despawn_all_tokens(&mut game);

    let outcomes = common::step(&mut game, &clock, FRAME);
    assert_eq!(outcomes, vec![TickOutcome::AllCollected, TickOutcome::PortalOpened]);

    let portal = game.portal().expect("portal should be open");
    common::place_player(&mut game, portal.position, 0.0);
    let outcomes = common::run_for(&mut game, &clock, 30, FRAME);

    assert_eq!(outcomes, vec![TickOutcome::Completed]);
    assert_eq!(game.round_state(), RoundState::Completed);
    assert_that(&log.count(Sound::Win)).is_equal_to(1);
}

#[test]
fn test_stray_token_retracts_portal() {
    let (mut game, clock, _log) = common::test_game(Difficulty::Normal);
    common::despawn_all_tokens(&mut game);
    common::step(&mut game, &clock, FRAME);
    let portal = game.portal().expect("portal should be open");

    game.world.spawn(Token {
        cell: glam::UVec2::new(9, 1),
        position: common::cell(9, 1),
    });
    common::place_player(&mut game, portal.position, 0.0);
    let outcomes = common::step(&mut game, &clock, FRAME);

    assert_that(&outcomes).contains(TickOutcome::PortalRetracted);
    assert_that(&game.portal()).is_none();
    assert_eq!(game.round_state(), RoundState::Playing);
}

#[test]
fn test_full_reset_restores_initial_state() {
    let (mut game, clock, _log) = common::test_game(Difficulty::Normal);
    game.set_input(PlayerInput::keys(KeyIntents::FORWARD));
    common::run_for(&mut game, &clock, 90, FRAME);
    assert_that(&game.score()).is_equal_to(10);

    game.reset_game(true);

    assert_that(&game.score()).is_equal_to(0);
    assert_that(&game.stage()).is_equal_to(1);
    assert_eq!(game.token_progress(), (0, scoring::TOKEN_COUNT));
    assert_eq!(game.player_position(), Some(common::cell(1, 1)));
    assert_eq!(game.player_rotation(), Some(player::START_ROTATION));
    assert_that(&game.portal()).is_none();
    assert_that(&game.survival_phase()).is_none();
    assert_that(&game.pursuer_count()).is_equal_to(3);
    assert_eq!(game.round_state(), RoundState::Playing);
}

#[test]
fn test_partial_reset_keeps_score() {
    let (mut game, clock, _log) = common::test_game(Difficulty::Normal);
    game.set_input(PlayerInput::keys(KeyIntents::FORWARD));
    common::run_for(&mut game, &clock, 90, FRAME);

    game.reset_game(false);

    assert_that(&game.score()).is_equal_to(10);
    assert_eq!(game.token_progress(), (1, scoring::TOKEN_COUNT));
    assert_eq!(game.player_position(), Some(common::cell(1, 1)));
}

#[test]
fn test_reset_after_catch_resumes_play() {
    let (mut game, clock, _log) = common::test_game(Difficulty::Impossible);
    common::run_for(&mut game, &clock, 60 * 9, FRAME);
    assert_eq!(game.round_state(), RoundState::Caught);

    game.reset_game(true);

    assert_eq!(game.round_state(), RoundState::Playing);
    assert_that(&game.is_paused()).is_false();
    assert_that(&game.forced_catch_deadline()).is_some();
}

#[test]
fn test_dispose_stops_everything() {
    let (mut game, clock, log) = common::test_game(Difficulty::Impossible);
    game.dispose();

    let outcomes = common::run_for(&mut game, &clock, 60 * 9, FRAME);

    assert_that(&outcomes).is_empty();
    assert_eq!(game.round_state(), RoundState::Disposed);
    assert_that(&game.pursuer_count()).is_equal_to(0);
    assert_eq!(game.token_progress(), (0, scoring::TOKEN_COUNT));
    assert_that(&game.player_position()).is_none();
    assert_that(&game.forced_catch_deadline()).is_none();
    assert_eq!(log.entries().last(), Some(&common::Played::StopMusic));
}

#[test]
fn test_difficulty_change_reaches_existing_pursuers() {
    let (mut game, _clock, _log) = common::test_game(Difficulty::Normal);

    game.set_difficulty(Difficulty::Hard);

    let mut query = game
        .world
        .query::<(&PursuerKind, &mazechase::systems::Mover)>();
    for (kind, mover) in query.iter(&game.world) {
        assert_that(&mover.speed).is_close_to(kind.base_speed() * 1.3, 1e-5);
    }
    assert_that(&game.forced_catch_deadline()).is_none();

    game.set_difficulty(Difficulty::Impossible);
    assert_that(&game.forced_catch_deadline()).is_some();
}

#[test]
fn test_scene_places_camera_at_eye_height() {
    let (mut game, _clock, _log) = common::test_game(Difficulty::Normal);

    let scene = game.scene();

    let camera = scene.camera.expect("camera");
    assert_that(&camera.position.y).is_equal_to(mazechase::constants::EYE_HEIGHT);
    assert_that(&camera.forward.x).is_close_to(1.0, 1e-5);
    assert_that(&scene.nodes.len()).is_equal_to(1 + 3 + scoring::TOKEN_COUNT);
    assert_that(&scene.walls.is_empty()).is_false();
}

#[test]
fn test_random_walk_never_enters_a_wall() {
    use mazechase::{collision::circle_overlaps_box, map::builder::Maze, systems::Mover};
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    let (mut game, clock, _log) = common::test_game(Difficulty::Normal);
    let walls = game.world.resource::<Maze>().walls().to_vec();
    let mut rng = SmallRng::seed_from_u64(11);
    let choices = [
        KeyIntents::FORWARD,
        KeyIntents::FORWARD | KeyIntents::TURN_LEFT,
        KeyIntents::FORWARD | KeyIntents::TURN_RIGHT,
        KeyIntents::BACKWARD | KeyIntents::TURN_LEFT,
        KeyIntents::FORWARD | KeyIntents::SPRINT,
    ];

    for _ in 0..600 {
        let keys = choices[rng.random_range(0..choices.len())];
        game.set_input(PlayerInput::keys(keys));
        let outcomes = common::run_for(&mut game, &clock, 5, FRAME);
        if outcomes.contains(&TickOutcome::Caught) {
            game.reset_game(true);
        }

        let mut movers = game.world.query::<(&Mover, Option<&PursuerKind>)>();
        for (mover, kind) in movers.iter(&game.world) {
            if kind == Some(&PursuerKind::Erratic) {
                continue;
            }
            let clipped = walls
                .iter()
                .any(|wall| circle_overlaps_box(mover.position, mover.radius, wall));
            assert_that(&clipped).is_false();
        }
    }
}

#[test]
fn test_full_reset_during_survival_reports_and_prunes() {
    use mazechase::systems::Progression;

    let (mut game, clock, _log) = common::test_game(Difficulty::Normal);
    game.world
        .resource_mut::<Progression>()
        .add_points(scoring::STAGE_INTERVAL);
    let outcomes = common::step(&mut game, &clock, FRAME);
    assert_that(&outcomes).contains(TickOutcome::StageChanged(2));
    assert_that(&game.survival_phase()).is_some();
    assert_that(&game.pursuer_count()).is_equal_to(5);

    game.reset_game(true);
    let outcomes = common::step(&mut game, &clock, FRAME);

    assert_eq!(
        outcomes,
        vec![
            TickOutcome::SurvivalPhase {
                active: false,
                seconds_remaining: 0.0,
            },
            TickOutcome::ScoreChanged(0),
            TickOutcome::StageChanged(1),
        ]
    );
    assert_that(&game.pursuer_count()).is_equal_to(3);
    assert_that(&game.survival_phase()).is_none();
    assert_that(&game.score()).is_equal_to(0);
    assert_that(&game.sprint().map(|sprint| sprint.unlocked)).is_equal_to(Some(false));
}

#[test]
fn test_lowering_difficulty_frees_pursuer_stuck_in_wall() {
    use bevy_ecs::entity::Entity;
    use mazechase::{map::builder::Maze, systems::{Mover, Pursuer}};

    let (mut game, clock, _log) = common::test_game(Difficulty::Impossible);
    let (strict, home) = game
        .world
        .query::<(Entity, &PursuerKind, &Pursuer)>()
        .iter(&game.world)
        .find(|(_, kind, _)| **kind == PursuerKind::Strict)
        .map(|(entity, _, pursuer)| (entity, pursuer.home))
        .expect("a strict pursuer");
    // Row 2, column 1 is a wall cell.
    game.world.get_mut::<Mover>(strict).unwrap().position = common::cell(1, 2);

    game.set_difficulty(Difficulty::Normal);

    let position = game.world.get::<Mover>(strict).unwrap().position;
    assert_eq!(position, home);
    assert_that(&game.world.resource::<Maze>().collides_wall(position, pursuer::RADIUS)).is_false();

    common::run_for(&mut game, &clock, 10, FRAME);
    assert_that(&(game.world.get::<Mover>(strict).unwrap().position != home)).is_true();
}
