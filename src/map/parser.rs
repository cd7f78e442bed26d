//! Map parsing functionality for converting raw maze layouts into structured data.

use glam::UVec2;

use crate::constants::MazeTile;
use crate::error::ParseError;

/// The kinds of pursuers a layout can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnKind {
    Strict,
    Erratic,
}

/// Represents the parsed data from a raw maze layout.
#[derive(Debug, Clone)]
pub struct ParsedMaze {
    /// Grid dimensions, in cells.
    pub size: UVec2,
    /// The tile layout, indexed `[row][col]`.
    pub tiles: Vec<Vec<MazeTile>>,
    /// The player's spawn cell.
    pub player_start: UVec2,
    /// Token cells in reading order.
    pub tokens: Vec<UVec2>,
    /// Pursuers present from the start of a round.
    pub pursuers: Vec<(SpawnKind, UVec2)>,
    /// Cells where survival-phase reinforcements appear.
    pub reinforcements: Vec<UVec2>,
    /// Cells the exit portal may materialize on.
    pub portal_candidates: Vec<UVec2>,
}

/// Parser for converting raw maze layouts into structured map data.
pub struct MazeParser;

impl MazeParser {
    /// Parses a single character into a maze tile.
    pub fn parse_character(c: char) -> Result<MazeTile, ParseError> {
        match c {
            '#' => Ok(MazeTile::Wall),
            ' ' | 'o' | 'S' | 'G' | 'E' | 'R' | 'P' => Ok(MazeTile::Open),
            _ => Err(ParseError::UnknownCharacter(c)),
        }
    }

    /// Parses a raw layout into structured maze data.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout contains unknown characters, rows of differing width,
    /// or anything other than exactly one player spawn.
    pub fn parse(raw: &[&str]) -> Result<ParsedMaze, ParseError> {
        let width = raw.first().map(|row| row.chars().count()).unwrap_or(0);
        let mut tiles = Vec::with_capacity(raw.len());
        let mut spawns = Vec::new();
        let mut tokens = Vec::new();
        let mut pursuers = Vec::new();
        let mut reinforcements = Vec::new();
        let mut portal_candidates = Vec::new();

        for (row, line) in raw.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(ParseError::RaggedRow {
                    row,
                    found,
                    expected: width,
                });
            }

            let mut tile_row = Vec::with_capacity(width);
            for (col, character) in line.chars().enumerate() {
                tile_row.push(Self::parse_character(character)?);

                let cell = UVec2::new(col as u32, row as u32);
                match character {
                    'S' => spawns.push(cell),
                    'o' => tokens.push(cell),
                    'G' => pursuers.push((SpawnKind::Strict, cell)),
                    'E' => pursuers.push((SpawnKind::Erratic, cell)),
                    'R' => reinforcements.push(cell),
                    'P' => portal_candidates.push(cell),
                    _ => {}
                }
            }
            tiles.push(tile_row);
        }

        let player_start = match spawns.as_slice() {
            [start] => *start,
            other => return Err(ParseError::InvalidSpawnCount(other.len())),
        };

        Ok(ParsedMaze {
            size: UVec2::new(width as u32, raw.len() as u32),
            tiles,
            player_start,
            tokens,
            pursuers,
            reinforcements,
            portal_candidates,
        })
    }
}
