//! This module contains all the constants used in the game.

use glam::UVec2;

/// Upper bound on a single tick's delta, in seconds.
///
/// A stalled frame (tab in background, debugger break) would otherwise move an entity
/// far enough in one step to skip over a wall cell entirely.
pub const MAX_DELTA_SECONDS: f32 = 0.1;

/// The size of the maze, in cells.
pub const MAZE_CELL_COUNT: UVec2 = UVec2::new(21, 21);
/// The width and depth of one cell, in world units.
pub const CELL_SIZE: f32 = 2.0;
/// Half the extent of the maze along X (and Z), in world units.
pub const MAZE_HALF_EXTENT: f32 = MAZE_CELL_COUNT.x as f32 * CELL_SIZE / 2.0;
/// Height of every wall box.
pub const WALL_HEIGHT: f32 = 3.0;
/// The height band every mover occupies.
pub const ENTITY_HEIGHT: f32 = 1.0;
/// Camera height above the floor for the first-person view.
pub const EYE_HEIGHT: f32 = 1.6;

pub mod player {
    /// Forward speed in world units per second.
    pub const BASE_SPEED: f32 = 5.0;
    /// Turn rate in radians per second.
    pub const ROTATION_SPEED: f32 = 2.5;
    pub const SPRINT_MULTIPLIER: f32 = 2.0;
    pub const RADIUS: f32 = 0.4;
    /// Facing at spawn; points down the corridor towards +X.
    pub const START_ROTATION: f32 = -std::f32::consts::FRAC_PI_2;

    pub const SPRINT_MAX: f32 = 100.0;
    /// Energy drained per second while sprinting.
    pub const SPRINT_DEPLETION_RATE: f32 = 20.0;
    /// Energy regained per second while not sprinting.
    pub const SPRINT_RECHARGE_RATE: f32 = 10.0;
    /// Pointer axes below this magnitude are ignored.
    pub const POINTER_DEADZONE: f32 = 0.1;
}

pub mod pursuer {
    use std::time::Duration;

    pub const RADIUS: f32 = 0.5;

    pub const STRICT_SPEED: f32 = 3.0;
    pub const STRICT_ALERT_RADIUS: f32 = 5.0;
    pub const STRICT_ALERT_COOLDOWN: Duration = Duration::from_secs(3);

    pub const ERRATIC_SPEED: f32 = 4.0;
    pub const ERRATIC_ALERT_RADIUS: f32 = 8.0;
    pub const ERRATIC_ALERT_COOLDOWN: Duration = Duration::from_secs(2);
    /// Probability that an erratic pursuer's move respects the walls.
    pub const ERRATIC_COLLISION_CHANCE: f64 = 0.2;

    /// Bounds of the impossible-mode forced catch window, in seconds.
    pub const FORCED_CATCH_MIN_SECONDS: f32 = 3.0;
    pub const FORCED_CATCH_MAX_SECONDS: f32 = 8.0;
}

pub mod scoring {
    use std::time::Duration;

    pub const TOKEN_COUNT: usize = 42;
    pub const POINTS_PER_TOKEN: u32 = 10;
    /// The score ceiling: every token collected.
    pub const MAX_SCORE: u32 = TOKEN_COUNT as u32 * POINTS_PER_TOKEN;
    /// Points per stage; stage = score / interval + 1.
    pub const STAGE_INTERVAL: u32 = 50;
    /// The stage whose arrival starts the survival phase.
    pub const SURVIVAL_STAGE: u32 = 2;
    pub const SURVIVAL_DURATION: Duration = Duration::from_secs(84);
    pub const SURVIVAL_BONUS: u32 = 50;
    /// How long the exit latch stays held after a survival phase ends.
    pub const SURVIVAL_EXIT_LATCH: Duration = Duration::from_secs(1);

    pub const PICKUP_RADIUS: f32 = 1.2;
    pub const PORTAL_RADIUS: f32 = 1.5;
}

/// An enum representing the different types of tiles in the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MazeTile {
    /// An open floor cell.
    Open,
    /// A solid wall cell.
    Wall,
}

/// The authored maze layout.
///
/// `#` wall, ` ` open floor, `o` token, `S` player spawn, `G` strict pursuer, `E` erratic pursuer,
/// `R` survival-phase reinforcement spawn, `P` exit portal candidate.
pub const RAW_MAZE: [&str; MAZE_CELL_COUNT.y as usize] = [
    "#####################",
    "#S  o  # o o   #  oP#",
    "##### ## ##### ## # #",
    "#o   o #   G o #  o #",
    "# ### ##### ##### # #",
    "#  o#  o   o   o  # #",
    "### # ### ### ### # #",
    "#o  #o  #  R  #o  o #",
    "# ##### # ### # ### #",
    "#o o    # #E# #  o  #",
    "#### ## # # # # ## ##",
    "#o   #  o     o  #o #",
    "# ## # ######### # ##",
    "#  # # o o   o o # o#",
    "## # ##### # ##### ##",
    "#o #o  G   #  o    o#",
    "# ### ## ##### ## # #",
    "#o  oo #   o   #  o #",
    "# ## ### # # # ### ##",
    "#P o   o #o#R#o  o P#",
    "#####################",
];
