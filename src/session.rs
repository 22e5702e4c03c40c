//! Game session: the generated dungeon plus everything that changes while playing

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use crate::builder::build_dungeon;
use crate::config::GenerationConfig;
use crate::dungeon::Dungeon;
use crate::error::{DungeonError, Result};
use crate::grid::{Direction, Level, Position, Tile};
use crate::pathfinder::{find_path, Path};

/// Whether the game is still running
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won,
}

/// Result of a player intent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Player stepped to a new cell
    Moved(Position),
    /// Player stepped onto the goal
    ReachedGoal(Position),
    /// Player took a stair and now stands on its other end
    ChangedLevel(Position),
    /// Wall or grid edge in the way
    Blocked,
    /// Stair activation requested off a stair
    NotOnStair,
    /// Game is already won
    AlreadyWon,
}

/// Engine state owned by one game.
///
/// The presentation layer reads snapshots and forwards intents; it never
/// touches the grids directly.
#[derive(Debug)]
pub struct Session {
    config: GenerationConfig,
    random: StdRng,
    dungeon: Dungeon,
    status: GameStatus,
    /// Route cache, valid while the player stays put
    last_path: Option<Path>,
}

impl Session {
    /// Generate a new session from `config`
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let mut random = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let dungeon = build_dungeon(&config, &mut random)?;
        Ok(Self {
            config,
            random,
            dungeon,
            status: GameStatus::Playing,
            last_path: None,
        })
    }

    /// `level_count` levels of `width`x`height`, spawn on level 0, goal on the last
    ///
    /// # Examples
    /// ```
    /// use dungeon_crawler::Session;
    /// let session = Session::generate_all(3, 15, 11, 42).unwrap();
    /// assert_eq!(session.player().level, 0);
    /// assert_eq!(session.dungeon().goal().level, 2);
    /// ```
    pub fn generate_all(
        level_count: usize,
        width: usize,
        height: usize,
        seed: u64,
    ) -> Result<Self> {
        Self::new(GenerationConfig::new(level_count, width, height, Some(seed)))
    }

    /// Session over a prepared dungeon, e.g. from [Dungeon::parse]
    pub fn from_dungeon(dungeon: Dungeon) -> Self {
        let config = GenerationConfig {
            level_count: dungeon.level_count(),
            width: dungeon.level(0).map(Level::width).unwrap_or(0),
            height: dungeon.level(0).map(Level::height).unwrap_or(0),
            seed: None,
            start_level: dungeon.spawn().level,
            goal_level: Some(dungeon.goal().level),
        };
        Self {
            config,
            random: StdRng::from_entropy(),
            dungeon,
            status: GameStatus::Playing,
            last_path: None,
        }
    }

    /// Throw the dungeon away and build a new one with the same settings.
    ///
    /// The random stream continues, so a seeded session regenerates
    /// deterministically.
    pub fn regenerate(&mut self) -> Result<()> {
        self.dungeon = build_dungeon(&self.config, &mut self.random)?;
        self.status = GameStatus::Playing;
        self.last_path = None;
        info!("dungeon regenerated");
        Ok(())
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn player(&self) -> Position {
        self.dungeon.player()
    }

    pub fn current_level(&self) -> usize {
        self.dungeon.player().level
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Most recently computed route, if still cached
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_ref()
    }

    /// Tile matrix of level `k`, indexed `[y][x]`
    pub fn snapshot(&self, k: usize) -> Option<Vec<Vec<Tile>>> {
        self.dungeon.level(k).map(Level::snapshot)
    }

    /// ASCII render of the level the player is on
    pub fn render_current(&self) -> String {
        self.dungeon
            .render_level(self.current_level())
            .unwrap_or_default()
    }

    /// Route from the player to the goal (or the nearest stair).
    ///
    /// Reuses the cached route while the player has not moved. An empty
    /// route is reported as [DungeonError::StuckNoPath].
    pub fn route(&mut self) -> Result<&Path> {
        let player = self.player();
        let stale = self
            .last_path
            .as_ref()
            .map_or(true, |path| path.first() != Some(&player));
        if stale {
            self.last_path = Some(find_path(&self.dungeon, player)?);
        }
        match &self.last_path {
            Some(path) if !path.is_empty() => Ok(path),
            _ => Err(DungeonError::StuckNoPath { position: player }),
        }
    }

    /// Single step in `direction`: only an adjacency and wall check
    pub fn move_player(&mut self, direction: Direction) -> Result<MoveOutcome> {
        if self.status == GameStatus::Won {
            return Ok(MoveOutcome::AlreadyWon);
        }

        let from = self.player();
        let (dx, dy) = direction.delta();
        let target = from
            .x
            .checked_add_signed(dx)
            .zip(from.y.checked_add_signed(dy))
            .map(|(x, y)| Position::new(from.level, x, y));
        let Some(to) = target else {
            return Ok(MoveOutcome::Blocked);
        };
        let destination = match self.dungeon.tile(&to) {
            Ok(tile) => tile,
            Err(DungeonError::OutOfBounds { .. }) => return Ok(MoveOutcome::Blocked),
            Err(e) => return Err(e),
        };
        if !destination.is_open() {
            return Ok(MoveOutcome::Blocked);
        }

        self.dungeon.relocate_player(to, Tile::Visited)?;
        self.last_path = None;
        debug!(position = %to, "player moved");

        if destination == Tile::Goal {
            self.status = GameStatus::Won;
            info!(position = %to, "goal reached");
            Ok(MoveOutcome::ReachedGoal(to))
        } else {
            Ok(MoveOutcome::Moved(to))
        }
    }

    /// Take the stair the player stands on
    pub fn activate_stair(&mut self) -> Result<MoveOutcome> {
        if self.status == GameStatus::Won {
            return Ok(MoveOutcome::AlreadyWon);
        }

        let from = self.player();
        if !self.dungeon.under_player().is_stair() {
            return Ok(MoveOutcome::NotOnStair);
        }
        let Some(to) = self.dungeon.stair_exit(&from) else {
            return Ok(MoveOutcome::NotOnStair);
        };
        if !self.dungeon.tile(&to)?.is_stair() {
            return Ok(MoveOutcome::Blocked);
        }

        self.dungeon.relocate_player(to, Tile::Visited)?;
        self.last_path = None;
        info!(from = from.level, to = to.level, "changed level");
        Ok(MoveOutcome::ChangedLevel(to))
    }
}
