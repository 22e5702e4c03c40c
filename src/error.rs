//! Error kinds raised by generation, linking and pathfinding

use crate::grid::Position;

/// Everything that can go wrong inside the engine
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DungeonError {
    /// Cell coordinate outside the grid. Callers are expected to prevent this.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Level has no dead end left for a stair, goal or spawn
    #[error("level {level} has no valid placement candidate for the {feature}")]
    NoPlacementCandidate { level: usize, feature: &'static str },

    /// Pathfinder reached neither the goal nor any stair
    #[error("no route to the goal or a stair from {position}")]
    StuckNoPath { position: Position },

    /// A search visited more states than the grid holds
    #[error("search exceeded its iteration cap of {cap} states")]
    IterationCapExceeded { cap: usize },

    /// Bounded retries ran out while generating a level
    #[error("gave up generating level {level} after {attempts} attempts")]
    GenerationExhausted { level: usize, attempts: usize },

    /// Generation parameters cannot produce a dungeon
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// ASCII level description could not be read
    #[error("cannot parse level: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, DungeonError>;
