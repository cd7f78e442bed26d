use figment::{providers::Env, Figment};
use serde::Deserialize;
use strum_macros::{Display, EnumIter};

use crate::error::{GameError, GameResult};

/// Difficulty selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Impossible,
}

/// The knobs a difficulty turns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultySettings {
    /// Applied to every pursuer's base speed.
    pub speed_multiplier: f32,
    /// Pursuers ignore walls entirely.
    pub wall_phasing: bool,
    /// Arms the randomized forced-catch timer at the start of each round.
    pub forced_catch: bool,
}

impl Difficulty {
    pub fn settings(self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings {
                speed_multiplier: 0.75,
                wall_phasing: false,
                forced_catch: false,
            },
            Difficulty::Normal => DifficultySettings {
                speed_multiplier: 1.0,
                wall_phasing: false,
                forced_catch: false,
            },
            Difficulty::Hard => DifficultySettings {
                speed_multiplier: 1.3,
                wall_phasing: false,
                forced_catch: false,
            },
            Difficulty::Impossible => DifficultySettings {
                speed_multiplier: 1.3,
                wall_phasing: true,
                forced_catch: true,
            },
        }
    }
}

/// Game configuration.
///
/// Every field can be set from a `MAZE_`-prefixed environment variable
/// (`MAZE_DIFFICULTY=hard`, `MAZE_SEED=7`, ...); anything unset takes its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Seed for every random decision in the simulation; random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub muted: bool,
    /// Ticks per second for the headless runner.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Simulated seconds for the headless runner.
    #[serde(default = "default_run_seconds")]
    pub run_seconds: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            seed: None,
            muted: false,
            tick_rate: default_tick_rate(),
            run_seconds: default_run_seconds(),
        }
    }
}

impl Config {
    /// Extracts a configuration from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> GameResult<Config> {
        let config: Config = figment.extract().map_err(|e| GameError::Config(e.to_string()))?;
        if config.tick_rate == 0 {
            return Err(GameError::Config("tick_rate must be positive".to_string()));
        }
        Ok(config)
    }
}

/// Loads the configuration from the environment.
pub fn load_config() -> GameResult<Config> {
    Config::from_figment(Figment::new().merge(Env::prefixed("MAZE_")))
}

fn default_tick_rate() -> u32 {
    60
}

fn default_run_seconds() -> f32 {
    30.0
}
