//! Tiles, coordinates and the per-level grid

use std::fmt;

use itertools::Itertools;

use crate::error::{DungeonError, Result};

/// State of a single grid cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    Wall,
    Floor,
    Player,
    Goal,
    StairUp,
    StairDown,
    /// Trail left behind the player, walkable like Floor
    Visited,
}

impl Tile {
    const S_WALL: char = '#';
    const S_FLOOR: char = '.';
    const S_PLAYER: char = '@';
    const S_GOAL: char = 'G';
    const S_STAIR_UP: char = '<';
    const S_STAIR_DOWN: char = '>';
    const S_VISITED: char = ',';

    /// Character used in ASCII renders
    pub fn symbol(self) -> char {
        match self {
            Tile::Wall => Self::S_WALL,
            Tile::Floor => Self::S_FLOOR,
            Tile::Player => Self::S_PLAYER,
            Tile::Goal => Self::S_GOAL,
            Tile::StairUp => Self::S_STAIR_UP,
            Tile::StairDown => Self::S_STAIR_DOWN,
            Tile::Visited => Self::S_VISITED,
        }
    }

    /// Inverse of [Self::symbol]
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            Self::S_WALL => Some(Tile::Wall),
            Self::S_FLOOR => Some(Tile::Floor),
            Self::S_PLAYER => Some(Tile::Player),
            Self::S_GOAL => Some(Tile::Goal),
            Self::S_STAIR_UP => Some(Tile::StairUp),
            Self::S_STAIR_DOWN => Some(Tile::StairDown),
            Self::S_VISITED => Some(Tile::Visited),
            _ => None,
        }
    }

    /// Anything but a wall can be stood on
    pub fn is_open(self) -> bool {
        self != Tile::Wall
    }

    pub fn is_stair(self) -> bool {
        matches!(self, Tile::StairUp | Tile::StairDown)
    }
}

/// Location in the level stack
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub level: usize,
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(level: usize, x: usize, y: usize) -> Self {
        Self { level, x, y }
    }

    /// Manhattan distance within a level, ignoring the level index
    pub fn manhattan(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(level {}, x {}, y {})", self.level, self.x, self.y)
    }
}

/// One of the four axis moves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// (dx, dy) of a single step; y grows southwards
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Direction of a single in-level step from `from` to `to`
    pub fn between(from: &Position, to: &Position) -> Option<Direction> {
        if from.level != to.level {
            return None;
        }
        Self::ALL.into_iter().find(|dir| {
            let (dx, dy) = dir.delta();
            from.x.checked_add_signed(dx) == Some(to.x)
                && from.y.checked_add_signed(dy) == Some(to.y)
        })
    }
}

/// Fixed-size rectangular grid of tiles for one level
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    width: usize,
    height: usize,
    /// Row-major tiles
    tiles: Vec<Tile>,
}

impl Level {
    /// New level with every cell set to [Tile::Wall]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Wall; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: usize, y: usize) -> Result<usize> {
        if self.contains(x, y) {
            Ok(y * self.width + x)
        } else {
            Err(DungeonError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Result<Tile> {
        Ok(self.tiles[self.index(x, y)?])
    }

    pub fn set(&mut self, x: usize, y: usize, tile: Tile) -> Result<()> {
        let idx = self.index(x, y)?;
        self.tiles[idx] = tile;
        Ok(())
    }

    /// Tile at a cell known to be inside the grid, walls outside
    pub(crate) fn tile_or_wall(&self, x: usize, y: usize) -> Tile {
        self.get(x, y).unwrap_or(Tile::Wall)
    }

    /// In-bounds axis neighbours of a cell
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        Direction::ALL.into_iter().filter_map(move |dir| {
            let (dx, dy) = dir.delta();
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            self.contains(nx, ny).then_some((nx, ny))
        })
    }

    /// Number of non-wall axis neighbours
    pub fn open_neighbors(&self, x: usize, y: usize) -> usize {
        self.neighbors(x, y)
            .filter(|&(nx, ny)| self.tile_or_wall(nx, ny).is_open())
            .count()
    }

    /// All cells with their tiles, row by row
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| ((i % self.width, i / self.width), *tile))
    }

    /// First cell holding `tile`, in row-major order
    pub fn find(&self, tile: Tile) -> Option<(usize, usize)> {
        self.cells().find(|(_, t)| *t == tile).map(|(cell, _)| cell)
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    /// Read-only copy of the tile matrix, indexed `[y][x]`
    pub fn snapshot(&self) -> Vec<Vec<Tile>> {
        self.tiles
            .chunks(self.width.max(1))
            .map(|row| row.to_vec())
            .collect()
    }

    /// ASCII representation, one line per row
    pub fn render(&self) -> String {
        self.tiles
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|t| t.symbol()).join(""))
            .join("\n")
    }

    /// Parse ASCII representation produced by [Self::render]
    ///
    /// Returns error, if rows have unequal lengths or contain unknown
    /// characters.
    ///
    /// # Examples
    /// ```
    /// use dungeon_crawler::{Level, Tile};
    /// let level = Level::parse("#####\n#@.G#\n#####").unwrap();
    /// assert_eq!(level.get(3, 1).unwrap(), Tile::Goal);
    /// ```
    pub fn parse(ascii: &str) -> Result<Self> {
        let rows: Vec<Vec<char>> = ascii
            .trim()
            .lines()
            .map(|row| row.trim().chars().collect())
            .collect();

        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(DungeonError::Parse("level is empty".into()));
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(DungeonError::Parse(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    width
                )));
            }
            for (x, c) in row.iter().enumerate() {
                let tile = Tile::from_symbol(*c).ok_or_else(|| {
                    DungeonError::Parse(format!("unexpected character `{}` at x={}, y={}", c, x, y))
                })?;
                tiles.push(tile);
            }
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }
}
