//! Maze carving

use rand::{seq::SliceRandom, Rng};

use crate::error::Result;
use crate::grid::{Level, Tile};

/// Randomized depth-first ("recursive backtracker") carver.
///
/// Carving happens on the odd-coordinate lattice of the grid: every move is
/// two cells long and opens the cell in between, so corridors are exactly one
/// cell wide and the outer border stays wall.
#[derive(Clone, Copy, Debug)]
pub struct MazeGenerator {
    width: usize,
    height: usize,
}

impl MazeGenerator {
    const DIRECTIONS: [(isize, isize); 4] = [(0, 2), (2, 0), (0, -2), (-2, 0)];

    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Lattice extent along one axis: odd coordinates `1, 3, ..` not touching the border
    fn lattice_len(size: usize) -> usize {
        size.saturating_sub(1) / 2
    }

    /// Generate a perfect maze (connected, no loops)
    ///
    /// Same random stream gives the same maze.
    pub fn generate_maze<R: Rng + ?Sized>(&self, random: &mut R) -> Result<Level> {
        let mut level = Level::new(self.width, self.height);
        let cols = Self::lattice_len(self.width);
        let rows = Self::lattice_len(self.height);
        if cols == 0 || rows == 0 {
            return Ok(level);
        }

        // Random starting position in an odd cell
        let start_x = 1 + random.gen_range(0..cols) * 2;
        let start_y = 1 + random.gen_range(0..rows) * 2;
        self.build_maze(&mut level, (start_x, start_y), random)?;

        Ok(level)
    }

    /// Carve with an explicit stack; pop when a cell has no uncarved neighbour left
    fn build_maze<R: Rng + ?Sized>(
        &self,
        level: &mut Level,
        (start_x, start_y): (usize, usize),
        random: &mut R,
    ) -> Result<()> {
        let mut stack = vec![(start_x, start_y)];
        level.set(start_x, start_y, Tile::Floor)?;

        while let Some(&(x, y)) = stack.last() {
            let neighbors: Vec<(usize, usize)> = Self::DIRECTIONS
                .iter()
                .filter_map(|&(dx, dy)| {
                    let nx = x.checked_add_signed(dx)?;
                    let ny = y.checked_add_signed(dy)?;
                    (nx >= 1
                        && ny >= 1
                        && nx + 1 < self.width
                        && ny + 1 < self.height
                        && level.tile_or_wall(nx, ny) == Tile::Wall)
                        .then_some((nx, ny))
                })
                .collect();

            match neighbors.choose(random) {
                Some(&(nx, ny)) => {
                    // Remove wall between current cell and neighbor
                    level.set((x + nx) / 2, (y + ny) / 2, Tile::Floor)?;
                    level.set(nx, ny, Tile::Floor)?;
                    stack.push((nx, ny));
                }
                None => {
                    stack.pop();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    use super::*;
    use crate::reachability::flood_fill;

    /// Open adjacencies between Floor cells, each counted once
    fn floor_edges(level: &Level) -> usize {
        level
            .cells()
            .filter(|(_, t)| *t == Tile::Floor)
            .map(|((x, y), _)| {
                [(x + 1, y), (x, y + 1)]
                    .into_iter()
                    .filter(|&(nx, ny)| level.get(nx, ny) == Ok(Tile::Floor))
                    .count()
            })
            .sum()
    }

    #[rstest]
    #[case(5, 5, 0)]
    #[case(10, 10, 1)]
    #[case(42, 24, 2)]
    #[case(15, 19, 3)]
    #[case(31, 7, 4)]
    fn generates_perfect_maze(#[case] width: usize, #[case] height: usize, #[case] seed: u64) {
        let mut random = StdRng::seed_from_u64(seed);
        let level = MazeGenerator::new(width, height).generate_maze(&mut random).unwrap();

        let floor = level.count(Tile::Floor);
        assert!(floor > 1);

        let start = level.find(Tile::Floor).unwrap();
        let reached = flood_fill(&level, start).unwrap();
        assert_eq!(reached.len(), floor, "every Floor cell is connected");
        assert_eq!(floor_edges(&level), floor - 1, "corridors form a tree");
    }

    #[test]
    fn border_stays_wall() {
        let mut random = StdRng::seed_from_u64(7);
        let level = MazeGenerator::new(12, 9).generate_maze(&mut random).unwrap();
        for ((x, y), tile) in level.cells() {
            if x == 0 || y == 0 || x == 11 || y == 8 {
                assert_eq!(tile, Tile::Wall, "border cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let generator = MazeGenerator::new(21, 13);
        let a = generator.generate_maze(&mut StdRng::seed_from_u64(42)).unwrap();
        let b = generator.generate_maze(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn tiny_grid_has_single_cell() {
        let mut random = StdRng::seed_from_u64(0);
        let level = MazeGenerator::new(3, 3).generate_maze(&mut random).unwrap();
        assert_eq!(level.count(Tile::Floor), 1);
        assert_eq!(level.get(1, 1).unwrap(), Tile::Floor);
    }
}
