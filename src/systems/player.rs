use std::f32::consts::{PI, TAU};

use bevy_ecs::{
    event::EventWriter,
    query::With,
    system::{Query, Res},
};
use glam::{Quat, Vec3};
use tracing::trace;

use crate::{
    constants::player,
    events::TickOutcome,
    input::{KeyIntents, PlayerInput},
    map::builder::Maze,
    systems::components::{FrameTime, Mover, PlayerControlled, Sprint},
};

impl Sprint {
    /// Advances the meter by one tick and reports whether the player sprints this tick.
    ///
    /// Energy only drains while sprinting and only recharges once sprint is unlocked.
    pub fn tick(&mut self, held: bool, dt: f32) -> bool {
        if self.unlocked && held && self.energy > 0.0 {
            self.sprinting = true;
            self.energy = (self.energy - player::SPRINT_DEPLETION_RATE * dt).max(0.0);
        } else {
            self.sprinting = false;
            if self.unlocked {
                self.energy = (self.energy + player::SPRINT_RECHARGE_RATE * dt).min(player::SPRINT_MAX);
            }
        }
        self.sprinting
    }
}

/// Wraps an angle into `[-PI, PI)`.
pub fn normalize_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Turn delta for this tick, in radians. Pointer input past the deadzone overrides the keyboard.
pub fn rotation_delta(input: &PlayerInput, dt: f32) -> f32 {
    let pointer = input.pointer;
    if pointer.active && pointer.rotation_axis.abs() > player::POINTER_DEADZONE {
        return -pointer.rotation_axis * player::ROTATION_SPEED * dt;
    }

    let mut delta = 0.0;
    if input.keys.contains(KeyIntents::TURN_LEFT) {
        delta += player::ROTATION_SPEED * dt;
    }
    if input.keys.contains(KeyIntents::TURN_RIGHT) {
        delta -= player::ROTATION_SPEED * dt;
    }
    delta
}

/// Forward intent in `[-1, 1]`. An active pointer replaces the keyboard outright.
pub fn forward_intent(input: &PlayerInput) -> f32 {
    let pointer = input.pointer;
    if pointer.active {
        return if pointer.forward_axis.abs() > player::POINTER_DEADZONE {
            pointer.forward_axis
        } else {
            0.0
        };
    }

    let mut forward = 0.0;
    if input.keys.contains(KeyIntents::FORWARD) {
        forward += 1.0;
    }
    if input.keys.contains(KeyIntents::BACKWARD) {
        forward -= 1.0;
    }
    forward
}

/// Rotates a local-space velocity into world space by a facing angle.
pub fn local_to_world(local: Vec3, rotation: f32) -> Vec3 {
    Quat::from_rotation_y(rotation) * local
}

/// Integrates the player's intents into rotation, sprint and position.
///
/// A move that would overlap a wall is cancelled entirely; the player does not slide.
pub fn player_movement_system(
    time: Res<FrameTime>,
    input: Res<PlayerInput>,
    maze: Res<Maze>,
    mut players: Query<(&mut Mover, &mut Sprint), With<PlayerControlled>>,
    mut outcomes: EventWriter<TickOutcome>,
) {
    let dt = time.delta;

    for (mut mover, mut sprint) in players.iter_mut() {
        let turn = rotation_delta(&input, dt);
        if turn != 0.0 {
            mover.rotation = normalize_angle(mover.rotation + turn);
            outcomes.write(TickOutcome::RotationChanged(mover.rotation));
        }

        let sprinting = sprint.tick(input.keys.contains(KeyIntents::SPRINT), dt);
        let speed = if sprinting {
            mover.speed * player::SPRINT_MULTIPLIER
        } else {
            mover.speed
        };

        let forward = forward_intent(&input);
        if forward == 0.0 {
            continue;
        }

        let velocity = local_to_world(Vec3::new(0.0, 0.0, -forward * speed), mover.rotation);
        let candidate = mover.position + velocity * dt;
        if maze.collides_wall(candidate, mover.radius) {
            trace!(from = ?mover.position, to = ?candidate, "Player move blocked by wall");
        } else {
            mover.position = candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn test_zero_rotation_faces_negative_z() {
        let world = local_to_world(Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!((world - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_quarter_turn_left_faces_negative_x() {
        let world = local_to_world(Vec3::new(0.0, 0.0, -1.0), PI / 2.0);
        assert!((world - Vec3::NEG_X).length() < 1e-5);
    }
}
