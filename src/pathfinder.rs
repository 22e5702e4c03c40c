//! Shortest routes through the composite (level, x, y) graph

use std::collections::{HashMap, VecDeque};

use tracing::trace;

use crate::dungeon::Dungeon;
use crate::error::{DungeonError, Result};
use crate::grid::{Position, Tile};

/// What a [Path] leads to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PathTarget {
    /// Ends on the goal cell
    Goal,
    /// Goal unreachable; ends on the nearest stair of the start level
    Stair,
    /// Neither goal nor stair reachable
    #[default]
    Nowhere,
}

/// Sequence of positions from start to target, start included.
///
/// Consecutive positions are either in-level neighbours or the two ends of
/// a stair pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    positions: Vec<Position>,
    target: PathTarget,
}

impl Path {
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn target(&self) -> PathTarget {
        self.target
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn first(&self) -> Option<&Position> {
        self.positions.first()
    }

    pub fn last(&self) -> Option<&Position> {
        self.positions.last()
    }

    /// Number of moves, stair transitions included
    pub fn steps(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }

    /// Number of moves that change level
    pub fn level_transitions(&self) -> usize {
        self.positions
            .windows(2)
            .filter(|w| w[0].level != w[1].level)
            .count()
    }
}

/// Breadth-first search from `start` to the goal over every level.
///
/// In-level moves go to any non-wall axis neighbour; a stair cell also
/// leads to the other end of its [crate::StairPair]. All edges cost one step,
/// so the first goal dequeued is the closest. If the goal cannot be reached
/// the path leads to the nearest stair on the start level instead, and when
/// there is no such stair the path is empty.
///
/// The search stops with [DungeonError::IterationCapExceeded] if it dequeues
/// more states than the dungeon has cells.
pub fn find_path(dungeon: &Dungeon, start: Position) -> Result<Path> {
    find_path_capped(dungeon, start, dungeon.cell_count())
}

/// [find_path] that gives up after dequeuing `cap` states
pub(crate) fn find_path_capped(dungeon: &Dungeon, start: Position, cap: usize) -> Result<Path> {
    let mut parents: HashMap<Position, Position> = HashMap::new();
    let mut queue = VecDeque::new();
    let mut nearest_stair = None;
    let mut iterations = 0;

    dungeon.terrain(&start)?;
    parents.insert(start, start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        iterations += 1;
        if iterations > cap {
            return Err(DungeonError::IterationCapExceeded { cap });
        }

        let terrain = dungeon.terrain(&current)?;
        if terrain == Tile::Goal {
            trace!(iterations, "goal found");
            return Ok(reconstruct(&parents, start, current, PathTarget::Goal));
        }

        let stair_exit = dungeon
            .stair_exit(&current)
            .filter(|exit| dungeon.terrain(exit).is_ok_and(Tile::is_open));
        if nearest_stair.is_none()
            && current != start
            && current.level == start.level
            && (terrain.is_stair() || stair_exit.is_some())
        {
            nearest_stair = Some(current);
        }

        let Some(level) = dungeon.level(current.level) else {
            continue;
        };
        let moves = level
            .neighbors(current.x, current.y)
            .map(|(x, y)| Position::new(current.level, x, y))
            .filter(|next| dungeon.terrain(next).is_ok_and(Tile::is_open))
            .chain(stair_exit);

        for next in moves {
            if !parents.contains_key(&next) {
                parents.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    trace!(iterations, ?nearest_stair, "goal unreachable");
    Ok(match nearest_stair {
        Some(stair) => reconstruct(&parents, start, stair, PathTarget::Stair),
        None => Path::default(),
    })
}

/// Walk parent links back from `end` and reverse
fn reconstruct(
    parents: &HashMap<Position, Position>,
    start: Position,
    end: Position,
    target: PathTarget,
) -> Path {
    let mut positions = vec![end];
    let mut current = end;
    while current != start {
        match parents.get(&current) {
            Some(&parent) => {
                positions.push(parent);
                current = parent;
            }
            None => break,
        }
    }
    positions.reverse();
    Path { positions, target }
}
