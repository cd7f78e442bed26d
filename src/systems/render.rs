//! Read-only snapshot of the world for the host renderer.
//!
//! Nothing here feeds back into the simulation. Token spin in particular is derived from the
//! clock at snapshot time and never stored.

use bevy_ecs::{query::With, world::World};
use glam::Vec3;

use crate::{
    asset::{AssetRegistry, EntityKind, Visual},
    collision::Aabb,
    constants::EYE_HEIGHT,
    map::builder::Maze,
    systems::{
        components::{FrameTime, Mover, Objective, PlayerControlled, PursuerKind, Token},
        player::local_to_world,
    },
};

/// Radians per second a token turns around its vertical axis.
const TOKEN_SPIN_RATE: f32 = 2.0;

/// The first-person camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: f32,
    /// Unit view direction on the X/Z plane.
    pub forward: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneNode {
    pub kind: EntityKind,
    pub position: Vec3,
    pub rotation: f32,
    pub visual: Visual,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub camera: Option<CameraPose>,
    pub walls: Vec<Aabb>,
    pub nodes: Vec<SceneNode>,
}

/// Collects everything drawable.
pub fn build_scene(world: &mut World) -> Scene {
    let now = world.get_resource::<FrameTime>().map(|t| t.now).unwrap_or_default();
    let spin = now.as_secs_f32() * TOKEN_SPIN_RATE;

    let walls = world
        .get_resource::<Maze>()
        .map(|maze| maze.walls().to_vec())
        .unwrap_or_default();

    let mut nodes = Vec::new();
    let mut camera = None;

    let mut players = world.query_filtered::<&Mover, With<PlayerControlled>>();
    let player_movers: Vec<Mover> = players.iter(world).copied().collect();

    let mut pursuers = world.query::<(&PursuerKind, &Mover)>();
    let pursuer_nodes: Vec<(EntityKind, Mover)> = pursuers
        .iter(world)
        .map(|(kind, mover)| {
            let kind = match kind {
                PursuerKind::Strict => EntityKind::StrictPursuer,
                PursuerKind::Erratic => EntityKind::ErraticPursuer,
            };
            (kind, *mover)
        })
        .collect();

    let mut tokens = world.query::<&Token>();
    let token_list: Vec<Token> = tokens.iter(world).copied().collect();

    let portal = world.get_resource::<Objective>().and_then(|objective| objective.portal);
    let Some(registry) = world.get_resource::<AssetRegistry>() else {
        return Scene {
            camera,
            walls,
            nodes,
        };
    };

    for mover in &player_movers {
        camera = Some(CameraPose {
            position: Vec3::new(mover.position.x, EYE_HEIGHT, mover.position.z),
            rotation: mover.rotation,
            forward: local_to_world(Vec3::NEG_Z, mover.rotation),
        });
        nodes.push(SceneNode {
            kind: EntityKind::Player,
            position: mover.position,
            rotation: mover.rotation,
            visual: registry.visual_for(EntityKind::Player),
        });
    }

    for (kind, mover) in pursuer_nodes {
        nodes.push(SceneNode {
            kind,
            position: mover.position,
            rotation: mover.rotation,
            visual: registry.visual_for(kind),
        });
    }

    for token in token_list {
        // Offset by cell so neighbouring tokens do not turn in lockstep.
        let phase = (token.cell.x + token.cell.y) as f32 * 0.5;
        nodes.push(SceneNode {
            kind: EntityKind::Token,
            position: token.position,
            rotation: spin + phase,
            visual: registry.visual_for(EntityKind::Token),
        });
    }

    if let Some(portal) = portal {
        nodes.push(SceneNode {
            kind: EntityKind::Portal,
            position: portal.position,
            rotation: 0.0,
            visual: registry.visual_for(EntityKind::Portal),
        });
    }

    Scene { camera, walls, nodes }
}
