//! Multi-level stack of grids, stair relation and player overlay

use itertools::Itertools;

use crate::error::{DungeonError, Result};
use crate::grid::{Level, Position, Tile};

/// A `StairDown` on level k linked to a `StairUp` on level k+1.
///
/// The two ends need not share (x, y); the link is an edge of the
/// composite graph, usable in both directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StairPair {
    pub down: Position,
    pub up: Position,
}

impl StairPair {
    /// Opposite end of the pair, if `pos` is one of its ends
    pub fn other_end(&self, pos: &Position) -> Option<Position> {
        if *pos == self.down {
            Some(self.up)
        } else if *pos == self.up {
            Some(self.down)
        } else {
            None
        }
    }
}

/// Generated world: levels of equal size, their stair links, spawn, goal
/// and where the player currently stands.
///
/// The player is drawn into the grid as [Tile::Player]; the tile it covers
/// is kept aside so stairs and the goal survive being stepped on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dungeon {
    levels: Vec<Level>,
    stairs: Vec<StairPair>,
    spawn: Position,
    goal: Position,
    player: Position,
    under_player: Tile,
}

impl Dungeon {
    /// Assemble a dungeon and draw the player at `spawn`
    ///
    /// `levels` must already hold the goal and stair tiles.
    pub(crate) fn assemble(
        levels: Vec<Level>,
        stairs: Vec<StairPair>,
        spawn: Position,
        goal: Position,
    ) -> Result<Self> {
        let mut dungeon = Self {
            levels,
            stairs,
            spawn,
            goal,
            player: spawn,
            under_player: Tile::Floor,
        };
        dungeon.under_player = dungeon.tile(&spawn)?;
        dungeon.set_tile(&spawn, Tile::Player)?;
        Ok(dungeon)
    }

    /// Parse a dungeon from ASCII levels, top of the stack first.
    ///
    /// Exactly one `@` (player, also taken as spawn) and one `G` must be
    /// present. Each level holds at most one `>` and one `<`; the `>` on
    /// level k is linked with the `<` on level k+1. The top level cannot
    /// hold a `<` and the bottom level cannot hold a `>`.
    ///
    /// # Examples
    /// ```
    /// use dungeon_crawler::Dungeon;
    /// let dungeon = Dungeon::parse(&["#####\n#@.>#\n#####", "#####\n#<.G#\n#####"]).unwrap();
    /// assert_eq!(dungeon.stairs().len(), 1);
    /// ```
    pub fn parse(ascii_levels: &[&str]) -> Result<Self> {
        let levels = ascii_levels
            .iter()
            .map(|ascii| Level::parse(ascii))
            .collect::<Result<Vec<_>>>()?;

        let first = levels
            .first()
            .ok_or_else(|| DungeonError::Parse("no levels given".into()))?;
        let (width, height) = (first.width(), first.height());
        if let Some(k) = levels
            .iter()
            .position(|l| l.width() != width || l.height() != height)
        {
            return Err(DungeonError::Parse(format!(
                "level {} is not {}x{}",
                k, width, height
            )));
        }

        let unique = |tile: Tile, name: &str| -> Result<Position> {
            let found: Vec<Position> = levels
                .iter()
                .enumerate()
                .flat_map(|(k, level)| {
                    level
                        .cells()
                        .filter(move |(_, t)| *t == tile)
                        .map(move |((x, y), _)| Position::new(k, x, y))
                })
                .collect();
            match found.as_slice() {
                [pos] => Ok(*pos),
                [] => Err(DungeonError::Parse(format!("{} not found", name))),
                _ => Err(DungeonError::Parse(format!("more than one {}", name))),
            }
        };
        let player = unique(Tile::Player, "player")?;
        let goal = unique(Tile::Goal, "goal")?;

        let single = |k: usize, tile: Tile| -> Result<Option<Position>> {
            let level = &levels[k];
            if level.count(tile) > 1 {
                return Err(DungeonError::Parse(format!(
                    "level {} has more than one `{}`",
                    k,
                    tile.symbol()
                )));
            }
            Ok(level.find(tile).map(|(x, y)| Position::new(k, x, y)))
        };
        let last = levels.len() - 1;
        let mut downs = Vec::with_capacity(levels.len());
        let mut ups = Vec::with_capacity(levels.len());
        for k in 0..levels.len() {
            let down = single(k, Tile::StairDown)?;
            let up = single(k, Tile::StairUp)?;
            if let Some(pos) = up.filter(|_| k == 0) {
                return Err(DungeonError::Parse(format!("`<` on the top level at {}", pos)));
            }
            if let Some(pos) = down.filter(|_| k == last) {
                return Err(DungeonError::Parse(format!("`>` on the bottom level at {}", pos)));
            }
            downs.push(down);
            ups.push(up);
        }
        let stairs: Vec<StairPair> = downs
            .into_iter()
            .zip(ups.into_iter().skip(1))
            .filter_map(|(down, up)| Some(StairPair { down: down?, up: up? }))
            .collect();

        Ok(Self {
            levels,
            stairs,
            spawn: player,
            goal,
            player,
            under_player: Tile::Floor,
        })
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, k: usize) -> Option<&Level> {
        self.levels.get(k)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Number of cells over all levels
    pub fn cell_count(&self) -> usize {
        self.levels
            .iter()
            .map(|level| level.width() * level.height())
            .sum()
    }

    pub fn stairs(&self) -> &[StairPair] {
        &self.stairs
    }

    pub fn spawn(&self) -> Position {
        self.spawn
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn player(&self) -> Position {
        self.player
    }

    /// Tile hidden beneath the player
    pub fn under_player(&self) -> Tile {
        self.under_player
    }

    fn missing_level(&self, pos: &Position) -> DungeonError {
        DungeonError::OutOfBounds {
            x: pos.x,
            y: pos.y,
            width: self.levels.first().map(Level::width).unwrap_or(0),
            height: self.levels.first().map(Level::height).unwrap_or(0),
        }
    }

    fn level_mut(&mut self, pos: &Position) -> Result<&mut Level> {
        let err = self.missing_level(pos);
        self.levels.get_mut(pos.level).ok_or(err)
    }

    /// Tile as drawn, player included
    pub fn tile(&self, pos: &Position) -> Result<Tile> {
        self.levels
            .get(pos.level)
            .ok_or_else(|| self.missing_level(pos))?
            .get(pos.x, pos.y)
    }

    /// Tile with the player lifted off the grid
    pub fn terrain(&self, pos: &Position) -> Result<Tile> {
        if *pos == self.player {
            Ok(self.under_player)
        } else {
            self.tile(pos)
        }
    }

    /// Overwrite a tile. Writing over the player replaces the tile beneath it.
    pub fn set_tile(&mut self, pos: &Position, tile: Tile) -> Result<()> {
        if *pos == self.player && tile != Tile::Player && self.tile(pos)? == Tile::Player {
            self.under_player = tile;
            return Ok(());
        }
        self.level_mut(pos)?.set(pos.x, pos.y, tile)
    }

    /// Other end of the stair at `pos`, if any
    pub fn stair_exit(&self, pos: &Position) -> Option<Position> {
        self.stairs.iter().find_map(|pair| pair.other_end(pos))
    }

    /// Move the player marker. `trail` is what the vacated cell turns into
    /// when it was plain floor.
    pub(crate) fn relocate_player(&mut self, to: Position, trail: Tile) -> Result<()> {
        let target = self.tile(&to)?;
        let from = self.player;
        let left_behind = match self.under_player {
            Tile::Floor | Tile::Visited => trail,
            other => other,
        };
        self.level_mut(&from)?.set(from.x, from.y, left_behind)?;
        self.level_mut(&to)?.set(to.x, to.y, Tile::Player)?;

        self.player = to;
        self.under_player = target;
        Ok(())
    }

    /// ASCII render of one level with a `Level N` header
    pub fn render_level(&self, k: usize) -> Option<String> {
        self.level(k)
            .map(|level| format!("Level {}\n{}", k + 1, level.render()))
    }

    /// All levels, top first, separated by blank lines
    pub fn render(&self) -> String {
        (0..self.levels.len())
            .filter_map(|k| self.render_level(k))
            .join("\n\n")
    }
}
