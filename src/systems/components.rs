use std::time::Duration;

use bevy_ecs::{bundle::Bundle, component::Component, resource::Resource};
use glam::{UVec2, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::audio::Sound;
use crate::constants::{player, pursuer, scoring};
use crate::map::parser::SpawnKind;

/// A tag component for the entity the input drives.
#[derive(Default, Component, Debug, Clone, Copy)]
pub struct PlayerControlled;

/// Anything with a position that walls can stop.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Mover {
    /// World position; only X and Z take part in collision.
    pub position: Vec3,
    /// Facing around +Y, in radians. Zero faces -Z.
    pub rotation: f32,
    /// Forward speed in world units per second.
    pub speed: f32,
    pub radius: f32,
}

impl Mover {
    pub fn new(position: Vec3, speed: f32, radius: f32) -> Self {
        Self {
            position,
            rotation: 0.0,
            speed,
            radius,
        }
    }
}

/// The player's sprint meter.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Sprint {
    /// Sprint is locked until the first survival phase begins.
    pub unlocked: bool,
    /// Remaining energy, in `[0, 100]`.
    pub energy: f32,
    pub sprinting: bool,
}

impl Default for Sprint {
    fn default() -> Self {
        Self {
            unlocked: false,
            energy: player::SPRINT_MAX,
            sprinting: false,
        }
    }
}

/// How a pursuer treats the walls between it and the player.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PursuerKind {
    /// Respects every wall, sliding along it on impact.
    Strict,
    /// Honors walls only on a small fraction of moves.
    Erratic,
}

impl PursuerKind {
    pub fn base_speed(self) -> f32 {
        match self {
            PursuerKind::Strict => pursuer::STRICT_SPEED,
            PursuerKind::Erratic => pursuer::ERRATIC_SPEED,
        }
    }

    pub fn alert_radius(self) -> f32 {
        match self {
            PursuerKind::Strict => pursuer::STRICT_ALERT_RADIUS,
            PursuerKind::Erratic => pursuer::ERRATIC_ALERT_RADIUS,
        }
    }

    /// Minimum time between two proximity alerts from one pursuer.
    pub fn alert_cooldown(self) -> Duration {
        match self {
            PursuerKind::Strict => pursuer::STRICT_ALERT_COOLDOWN,
            PursuerKind::Erratic => pursuer::ERRATIC_ALERT_COOLDOWN,
        }
    }

    pub fn alert_sound(self) -> Sound {
        match self {
            PursuerKind::Strict => Sound::StrictAlert,
            PursuerKind::Erratic => Sound::ErraticAlert,
        }
    }
}

impl From<SpawnKind> for PursuerKind {
    fn from(kind: SpawnKind) -> Self {
        match kind {
            SpawnKind::Strict => PursuerKind::Strict,
            SpawnKind::Erratic => PursuerKind::Erratic,
        }
    }
}

/// Per-pursuer chase state.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Pursuer {
    /// When the last proximity alert played.
    pub last_alert: Option<Duration>,
    /// Ignore walls altogether (impossible mode).
    pub wall_phasing: bool,
    /// Where the pursuer returns on a reset.
    pub home: Vec3,
}

/// Marks pursuers added by a survival phase; they are removed when it ends.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Reinforcement;

/// A collectible token. The entity is despawned when picked up.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub cell: UVec2,
    pub position: Vec3,
}

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: PlayerControlled,
    pub mover: Mover,
    pub sprint: Sprint,
}

#[derive(Bundle)]
pub struct PursuerBundle {
    pub kind: PursuerKind,
    pub pursuer: Pursuer,
    pub mover: Mover,
}

impl PursuerBundle {
    pub fn new(kind: PursuerKind, position: Vec3, speed_multiplier: f32, wall_phasing: bool) -> Self {
        Self {
            kind,
            pursuer: Pursuer {
                last_alert: None,
                wall_phasing,
                home: position,
            },
            mover: Mover::new(position, kind.base_speed() * speed_multiplier, pursuer::RADIUS),
        }
    }
}

/// Wall-clock time for the current tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Clock reading sampled at the start of the tick.
    pub now: Duration,
    /// Seconds since the previous tick, clamped.
    pub delta: f32,
}

impl FrameTime {
    pub fn new(now: Duration, delta: f32) -> Self {
        Self { now, delta }
    }
}

/// Where the current round stands.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundState {
    /// Built but not started.
    #[default]
    Ready,
    Playing,
    /// Caught by a pursuer; waiting for the host to acknowledge and reset.
    Caught,
    /// Won; nothing further happens until a reset.
    Completed,
    /// Torn down; ticks are ignored.
    Disposed,
}

/// Host-requested pause. The watchdog keeps running while this is set.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PauseState {
    pub paused: bool,
}

/// Difficulty knobs applied to pursuers.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PursuitRules {
    pub speed_multiplier: f32,
    pub wall_phasing: bool,
}

impl Default for PursuitRules {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            wall_phasing: false,
        }
    }
}

/// The simulation's random source, seeded for reproducibility.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}

/// Progress towards the exit.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct Objective {
    /// Set once the last token is picked up; cleared if that turns out to be wrong.
    pub all_collected: bool,
    pub portal: Option<Portal>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    pub position: Vec3,
    pub radius: f32,
}

impl Portal {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            radius: scoring::PORTAL_RADIUS,
        }
    }
}
