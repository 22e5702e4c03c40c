//! Dead-end scanning

use crate::grid::{Level, Tile};

/// Floor cells with exactly one open neighbour, in row-major order.
///
/// Cells already holding a stair, goal or the player are not candidates.
pub fn find_dead_ends(level: &Level) -> Vec<(usize, usize)> {
    level
        .cells()
        .filter(|&((x, y), tile)| tile == Tile::Floor && level.open_neighbors(x, y) == 1)
        .map(|(cell, _)| cell)
        .collect()
}

pub fn is_dead_end(level: &Level, x: usize, y: usize) -> bool {
    level.get(x, y) == Ok(Tile::Floor) && level.open_neighbors(x, y) == 1
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::maze_generator::MazeGenerator;

    #[test]
    fn finds_corridor_ends() {
        let level = Level::parse(
            "
#######
#...#.#
#.#.#.#
#.#...#
#######",
        )
        .unwrap();
        assert_eq!(find_dead_ends(&level), vec![(5, 1), (1, 3)]);
        assert!(is_dead_end(&level, 1, 3));
        assert!(!is_dead_end(&level, 1, 2));
        assert!(!is_dead_end(&level, 0, 0));
    }

    #[test]
    fn occupied_cells_are_skipped() {
        let level = Level::parse(
            "
#####
#@.>#
#####",
        )
        .unwrap();
        assert!(find_dead_ends(&level).is_empty());
    }

    #[test]
    fn isolated_cell_is_not_a_dead_end() {
        let level = Level::parse(
            "
###
#.#
###",
        )
        .unwrap();
        assert!(find_dead_ends(&level).is_empty());
    }

    #[test]
    fn carved_maze_has_dead_ends() {
        let mut random = StdRng::seed_from_u64(11);
        let level = MazeGenerator::new(15, 11).generate_maze(&mut random).unwrap();
        let dead_ends = find_dead_ends(&level);
        assert!(dead_ends.len() >= 2);
        for (x, y) in dead_ends {
            assert_eq!(level.open_neighbors(x, y), 1);
        }
    }
}
