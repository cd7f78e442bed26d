use bevy_ecs::{
    event::EventWriter,
    query::{With, Without},
    system::{Query, Res, ResMut},
};
use glam::Vec3;
use rand::Rng;
use tracing::{debug, trace};

use crate::{
    collision::{circles_overlap, xz},
    constants::pursuer::ERRATIC_COLLISION_CHANCE,
    events::{AudioEvent, PlayerCaught},
    map::builder::Maze,
    systems::components::{FrameTime, Mover, PlayerControlled, Pursuer, PursuerKind, RoundState, SimRng},
};

/// Unit vector on the X/Z plane from `from` towards `to`, or zero if they coincide.
pub fn heading_towards(from: Vec3, to: Vec3) -> Vec3 {
    let dir = (xz(to) - xz(from)).normalize_or_zero();
    Vec3::new(dir.x, 0.0, dir.y)
}

/// Facing angle that points a model's +Z axis along `direction`.
pub fn facing_for(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z)
}

/// Resolves one strict-pursuer step against the walls.
///
/// Tries the full step, then the X component alone, then the Z component alone. If all three
/// are blocked the pursuer stays where it is.
pub fn slide_step(maze: &Maze, position: Vec3, step: Vec3, radius: f32) -> Vec3 {
    let candidates = [
        position + step,
        position + Vec3::new(step.x, 0.0, 0.0),
        position + Vec3::new(0.0, 0.0, step.z),
    ];
    candidates
        .into_iter()
        .find(|candidate| !maze.collides_wall(*candidate, radius))
        .unwrap_or(position)
}

/// Chases the player with every pursuer.
///
/// Each pursuer turns to face the player, plays its proximity alert when close enough and off
/// cooldown, then steps straight at the player. Strict pursuers slide along walls; erratic ones
/// only respect walls on a fraction of their moves, and phasing pursuers ignore them entirely.
/// The first pursuer to touch the player ends the round.
#[allow(clippy::too_many_arguments)]
pub fn pursuer_system(
    time: Res<FrameTime>,
    maze: Res<Maze>,
    mut rng: ResMut<SimRng>,
    mut round: ResMut<RoundState>,
    players: Query<&Mover, (With<PlayerControlled>, Without<Pursuer>)>,
    mut pursuers: Query<(&PursuerKind, &mut Pursuer, &mut Mover), Without<PlayerControlled>>,
    mut audio_events: EventWriter<AudioEvent>,
    mut caught: EventWriter<PlayerCaught>,
) {
    let Ok(player) = players.single() else {
        return;
    };
    let dt = time.delta;

    for (kind, mut pursuer, mut mover) in pursuers.iter_mut() {
        let direction = heading_towards(mover.position, player.position);
        if direction != Vec3::ZERO {
            mover.rotation = facing_for(direction);
        }

        let distance = xz(mover.position).distance(xz(player.position));
        let off_cooldown = pursuer
            .last_alert
            .is_none_or(|last| time.now.saturating_sub(last) >= kind.alert_cooldown());
        if distance < kind.alert_radius() && off_cooldown {
            trace!(?kind, distance, "Pursuer alert");
            audio_events.write(AudioEvent::Play(kind.alert_sound()));
            pursuer.last_alert = Some(time.now);
        }

        let step = direction * mover.speed * dt;
        let honors_walls = !pursuer.wall_phasing
            && match kind {
                PursuerKind::Strict => true,
                PursuerKind::Erratic => rng.0.random_bool(ERRATIC_COLLISION_CHANCE),
            };

        mover.position = match (honors_walls, kind) {
            (false, _) => mover.position + step,
            (true, PursuerKind::Strict) => slide_step(&maze, mover.position, step, mover.radius),
            (true, PursuerKind::Erratic) => {
                let candidate = mover.position + step;
                if maze.collides_wall(candidate, mover.radius) {
                    mover.position
                } else {
                    candidate
                }
            }
        };

        if *round == RoundState::Playing
            && circles_overlap(mover.position, mover.radius, player.position, player.radius)
        {
            debug!(?kind, position = ?mover.position, "Player caught");
            *round = RoundState::Caught;
            caught.write(PlayerCaught { forced: false });
        }
    }
}
