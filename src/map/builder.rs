//! The static maze: wall volumes, grid/world mapping and authored spawn points.

use bevy_ecs::resource::Resource;
use glam::{UVec2, Vec3};
use tracing::debug;

use crate::collision::Aabb;
use crate::constants::{self, MazeTile, CELL_SIZE, MAZE_HALF_EXTENT, WALL_HEIGHT};
use crate::error::{GameResult, MapError};
use crate::map::parser::{MazeParser, SpawnKind};

/// The fixed maze and its static collision source.
///
/// Built once per game (and again on a full reset); nothing in here changes while a round runs.
#[derive(Resource, Debug, Clone)]
pub struct Maze {
    size: UVec2,
    tiles: Vec<Vec<MazeTile>>,
    walls: Vec<Aabb>,
    player_start: UVec2,
    tokens: Vec<UVec2>,
    pursuers: Vec<(SpawnKind, UVec2)>,
    reinforcements: Vec<UVec2>,
    portal_candidates: Vec<UVec2>,
}

impl Maze {
    /// Builds a maze from a raw layout.
    ///
    /// # Errors
    ///
    /// Fails if the layout does not parse or carries no exit portal candidates.
    pub fn new(raw: &[&str]) -> GameResult<Maze> {
        let parsed = MazeParser::parse(raw)?;

        if parsed.portal_candidates.is_empty() {
            return Err(MapError::NoPortalCandidates.into());
        }

        let mut walls = Vec::new();
        for (row, tiles) in parsed.tiles.iter().enumerate() {
            for (col, tile) in tiles.iter().enumerate() {
                if *tile == MazeTile::Wall {
                    let center = grid_to_world(col as u32, row as u32, WALL_HEIGHT / 2.0);
                    walls.push(Aabb::from_center(center, Vec3::new(CELL_SIZE, WALL_HEIGHT, CELL_SIZE) / 2.0));
                }
            }
        }

        debug!(
            walls = walls.len(),
            tokens = parsed.tokens.len(),
            pursuers = parsed.pursuers.len(),
            "Maze built"
        );

        Ok(Maze {
            size: parsed.size,
            tiles: parsed.tiles,
            walls,
            player_start: parsed.player_start,
            tokens: parsed.tokens,
            pursuers: parsed.pursuers,
            reinforcements: parsed.reinforcements,
            portal_candidates: parsed.portal_candidates,
        })
    }

    /// Builds the authored layout and checks it carries the full token set.
    pub fn standard() -> GameResult<Maze> {
        let maze = Self::new(&constants::RAW_MAZE)?;
        if maze.tokens.len() != constants::scoring::TOKEN_COUNT {
            return Err(MapError::TokenCount {
                expected: constants::scoring::TOKEN_COUNT,
                found: maze.tokens.len(),
            }
            .into());
        }
        Ok(maze)
    }

    /// Returns `true` if a circle of `radius` at `position` overlaps any wall on the X/Z plane.
    ///
    /// Each wall box is inflated by the radius and tested for containment of the center point.
    /// Height is ignored entirely.
    pub fn collides_wall(&self, position: Vec3, radius: f32) -> bool {
        self.walls.iter().any(|wall| wall.inflated_xz(radius).contains_xz(position))
    }

    /// World-space center of the player's spawn cell.
    pub fn starting_position(&self) -> Vec3 {
        grid_to_world(self.player_start.x, self.player_start.y, constants::ENTITY_HEIGHT)
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn walls(&self) -> &[Aabb] {
        &self.walls
    }

    /// Tile at a grid cell, `None` outside the grid.
    pub fn tile(&self, cell: UVec2) -> Option<MazeTile> {
        self.tiles
            .get(cell.y as usize)
            .and_then(|row| row.get(cell.x as usize))
            .copied()
    }

    pub fn token_cells(&self) -> &[UVec2] {
        &self.tokens
    }

    pub fn pursuer_spawns(&self) -> &[(SpawnKind, UVec2)] {
        &self.pursuers
    }

    pub fn reinforcement_cells(&self) -> &[UVec2] {
        &self.reinforcements
    }

    pub fn portal_candidates(&self) -> &[UVec2] {
        &self.portal_candidates
    }
}

/// Maps a grid cell to the world-space center of that cell at the given height.
///
/// Columns run along +X and rows along +Z; the maze is centered on the origin.
pub fn grid_to_world(col: u32, row: u32, height: f32) -> Vec3 {
    Vec3::new(
        col as f32 * CELL_SIZE - MAZE_HALF_EXTENT,
        height,
        row as f32 * CELL_SIZE - MAZE_HALF_EXTENT,
    )
}
