//! Single-level reachability by breadth-first flood fill

use std::collections::VecDeque;

use crate::error::{DungeonError, Result};
use crate::grid::Level;

/// Cells reached by a flood fill, as a grid-sized visited mask
#[derive(Clone, Debug)]
pub struct Reachable {
    width: usize,
    visited: Vec<bool>,
    count: usize,
}

impl Reachable {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && self.visited.get(y * self.width + x).copied().unwrap_or(false)
    }

    /// Number of reached cells, start included
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Flood fill over non-wall cells starting from `start`.
///
/// The start cell counts as reached even if it is a wall. Every cell is
/// enqueued at most once, so the search is bounded by the grid size; going
/// past that bound means the visited bookkeeping is broken.
pub fn flood_fill(level: &Level, start: (usize, usize)) -> Result<Reachable> {
    flood_fill_capped(level, start, level.width() * level.height())
}

/// [flood_fill] that gives up after reaching `cap` cells
pub(crate) fn flood_fill_capped(
    level: &Level,
    start: (usize, usize),
    cap: usize,
) -> Result<Reachable> {
    let width = level.width();
    level.get(start.0, start.1)?;

    let mut visited = vec![false; width * level.height()];
    let mut queue = VecDeque::new();
    visited[start.1 * width + start.0] = true;
    queue.push_back(start);

    let mut count = 0;
    while let Some((x, y)) = queue.pop_front() {
        count += 1;
        if count > cap {
            return Err(DungeonError::IterationCapExceeded { cap });
        }

        for (nx, ny) in level.neighbors(x, y) {
            let idx = ny * width + nx;
            if !visited[idx] && level.tile_or_wall(nx, ny).is_open() {
                visited[idx] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    Ok(Reachable {
        width,
        visited,
        count,
    })
}

/// Is `to` reachable from `from` without crossing walls
pub fn is_reachable(level: &Level, from: (usize, usize), to: (usize, usize)) -> Result<bool> {
    level.get(to.0, to.1)?;
    Ok(flood_fill(level, from)?.contains(to.0, to.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> Level {
        Level::parse(
            "
#######
#@..#.#
###.#.#
#G..#>#
#######",
        )
        .unwrap()
    }

    #[test]
    fn reaches_connected_cells_only() {
        let level = level();
        let reached = flood_fill(&level, (1, 1)).unwrap();
        assert_eq!(reached.len(), 7);
        assert!(reached.contains(1, 3));
        assert!(!reached.contains(5, 3));
        assert!(!reached.contains(0, 0));
    }

    #[test]
    fn reachability_between_cells() {
        let level = level();
        assert!(is_reachable(&level, (1, 1), (1, 3)).unwrap());
        assert!(!is_reachable(&level, (1, 1), (5, 3)).unwrap());
        assert!(is_reachable(&level, (5, 1), (5, 3)).unwrap());
    }

    #[test]
    fn fill_past_cap_fails() {
        let level = level();
        assert_eq!(
            flood_fill_capped(&level, (1, 1), 2).unwrap_err(),
            DungeonError::IterationCapExceeded { cap: 2 }
        );
        assert_eq!(flood_fill_capped(&level, (1, 1), 7).unwrap().len(), 7);
    }

    #[test]
    fn out_of_bounds_start_fails() {
        let level = level();
        assert!(matches!(
            flood_fill(&level, (7, 0)),
            Err(DungeonError::OutOfBounds { .. })
        ));
        assert!(is_reachable(&level, (1, 1), (0, 9)).is_err());
    }
}
