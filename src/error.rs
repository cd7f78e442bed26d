//! Centralized error types for the maze-chase game.
//!
//! Only construction and configuration can fail. Once a [`Game`](crate::game::Game) exists,
//! every per-tick path recovers locally and logs instead of returning an error.

/// Main error type for the game.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Map parsing error: {0}")]
    MapParse(#[from] ParseError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error type for maze layout parsing.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown character in maze: {0:?}")]
    UnknownCharacter(char),
    #[error("Maze row {row} has width {found}, expected {expected}")]
    RaggedRow { row: usize, found: usize, expected: usize },
    #[error("Maze must have exactly one player spawn, found {0}")]
    InvalidSpawnCount(usize),
}

/// Errors related to a parsed maze that cannot be played.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MapError {
    #[error("Expected {expected} tokens in maze, found {found}")]
    TokenCount { expected: usize, found: usize },

    #[error("Maze has no exit portal candidates")]
    NoPortalCandidates,
}

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("Asset failed to load: {0}")]
    LoadFailed(String),

    #[error("Asset timed out: {0}")]
    TimedOut(String),
}

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("Audio backend rejected playback: {0}")]
    Playback(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
