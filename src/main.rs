use std::time::Duration;

use anyhow::{Context, Result};
use mazechase::{
    audio::NullBackend,
    clock::ManualClock,
    config::load_config,
    events::TickOutcome,
    game::Game,
    input::{KeyIntents, PlayerInput},
    logging::setup_logging,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::{debug, info};

/// Drives the player with held-forward wandering: it turns a random way for a random stretch,
/// then walks straight for a while.
struct Autopilot {
    rng: SmallRng,
    turn: KeyIntents,
    ticks_left: u32,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            turn: KeyIntents::empty(),
            ticks_left: 0,
        }
    }

    fn next_input(&mut self) -> PlayerInput {
        if self.ticks_left == 0 {
            self.turn = match self.rng.random_range(0..3) {
                0 => KeyIntents::TURN_LEFT,
                1 => KeyIntents::TURN_RIGHT,
                _ => KeyIntents::empty(),
            };
            self.ticks_left = self.rng.random_range(10..90);
        }
        self.ticks_left -= 1;
        PlayerInput::keys(KeyIntents::FORWARD | KeyIntents::SPRINT | self.turn)
    }
}

fn main() -> Result<()> {
    setup_logging();

    let config = load_config().context("Failed to load configuration")?;
    info!(?config, "Starting headless run");

    let clock = ManualClock::new();
    let mut game = Game::new(&config, Box::new(clock.clone()), Box::new(NullBackend::default()))
        .context("Failed to build game")?;
    game.unlock_audio();
    game.start();

    let step = Duration::from_secs_f64(1.0 / f64::from(config.tick_rate));
    let ticks = (config.run_seconds * config.tick_rate as f32).ceil() as u64;
    let mut pilot = Autopilot::new(config.seed.unwrap_or_default());
    let mut catches = 0u32;
    let mut completed = false;

    'run: for _ in 0..ticks {
        clock.advance(step);
        game.set_input(pilot.next_input());

        for outcome in game.update() {
            match outcome {
                TickOutcome::RotationChanged(_) => {}
                TickOutcome::Caught => {
                    catches += 1;
                    info!(catches, "Caught, resetting");
                    game.reset_game(true);
                }
                TickOutcome::Completed => {
                    completed = true;
                    info!("Maze completed");
                    break 'run;
                }
                other => debug!(outcome = ?other, "Tick outcome"),
            }
        }
    }

    let (collected, total) = game.token_progress();
    info!(
        score = game.score(),
        stage = game.stage(),
        collected,
        total,
        catches,
        completed,
        "Run finished"
    );

    game.dispose();
    Ok(())
}
