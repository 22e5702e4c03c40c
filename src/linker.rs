//! Stair, spawn and goal placement
//!
//! Every feature is placed on a dead end that is reachable from the level's
//! reference point: the spawn cell on the spawn level, otherwise the stair
//! the player arrives on. The arrival stair itself is checked against the
//! first open cell of the level.

use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::dead_ends::find_dead_ends;
use crate::dungeon::StairPair;
use crate::error::{DungeonError, Result};
use crate::grid::{Level, Position, Tile};
use crate::reachability::{flood_fill, Reachable};

/// Cells committed on one level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelAnchors {
    pub spawn: Option<(usize, usize)>,
    pub goal: Option<(usize, usize)>,
    pub up: Option<(usize, usize)>,
    pub down: Option<(usize, usize)>,
}

impl LevelAnchors {
    fn taken(&self) -> impl Iterator<Item = (usize, usize)> {
        [self.spawn, self.goal, self.up, self.down].into_iter().flatten()
    }
}

/// Places stairs so that consecutive levels are linked, plus the spawn and
/// the goal on their designated levels.
#[derive(Clone, Copy, Debug)]
pub struct StairLinker {
    level_count: usize,
    spawn_level: usize,
    goal_level: usize,
}

impl StairLinker {
    /// Minimum Manhattan distance between spawn and goal on a shared level
    pub const MIN_GOAL_DISTANCE: usize = 3;

    pub fn new(level_count: usize, spawn_level: usize, goal_level: usize) -> Self {
        Self {
            level_count,
            spawn_level,
            goal_level,
        }
    }

    /// Reference point of level `k` given what has been committed on it
    pub fn reference_point(&self, k: usize, anchors: &LevelAnchors) -> Option<(usize, usize)> {
        if k == self.spawn_level {
            anchors.spawn
        } else if k > self.spawn_level {
            anchors.up
        } else {
            anchors.down
        }
    }

    /// Commit spawn, stairs and goal on level `k`.
    ///
    /// Fails with [DungeonError::NoPlacementCandidate] when the level runs out
    /// of reachable dead ends; the caller is expected to carve a new level.
    pub fn place<R: Rng + ?Sized>(
        &self,
        k: usize,
        level: &mut Level,
        random: &mut R,
    ) -> Result<LevelAnchors> {
        let mut anchors = LevelAnchors::default();

        // Reference point first
        if k == self.spawn_level {
            let floor: Vec<(usize, usize)> = level
                .cells()
                .filter(|(_, t)| *t == Tile::Floor)
                .map(|(cell, _)| cell)
                .collect();
            let spawn = *floor.choose(random).ok_or(DungeonError::NoPlacementCandidate {
                level: k,
                feature: "spawn",
            })?;
            anchors.spawn = Some(spawn);
        } else {
            let origin = level
                .cells()
                .find(|(_, t)| t.is_open())
                .map(|(cell, _)| cell)
                .ok_or(DungeonError::NoPlacementCandidate {
                    level: k,
                    feature: "arrival stair",
                })?;
            let reachable = flood_fill(level, origin)?;
            if k > self.spawn_level {
                let up = self.pick(k, level, &reachable, &anchors, "up-stair", random, |_| true)?;
                level.set(up.0, up.1, Tile::StairUp)?;
                anchors.up = Some(up);
            } else {
                let down =
                    self.pick(k, level, &reachable, &anchors, "down-stair", random, |_| true)?;
                level.set(down.0, down.1, Tile::StairDown)?;
                anchors.down = Some(down);
            }
        }

        let reference = self
            .reference_point(k, &anchors)
            .ok_or(DungeonError::NoPlacementCandidate {
                level: k,
                feature: "reference point",
            })?;
        let reachable = flood_fill(level, reference)?;

        if k + 1 < self.level_count && anchors.down.is_none() {
            let down = self.pick(k, level, &reachable, &anchors, "down-stair", random, |_| true)?;
            level.set(down.0, down.1, Tile::StairDown)?;
            anchors.down = Some(down);
        }
        if k > 0 && anchors.up.is_none() {
            let up = self.pick(k, level, &reachable, &anchors, "up-stair", random, |_| true)?;
            level.set(up.0, up.1, Tile::StairUp)?;
            anchors.up = Some(up);
        }
        if k == self.goal_level {
            let spawn = anchors.spawn;
            let goal = self.pick(k, level, &reachable, &anchors, "goal", random, |(x, y)| {
                spawn.map_or(true, |(sx, sy)| {
                    x.abs_diff(sx) + y.abs_diff(sy) >= Self::MIN_GOAL_DISTANCE
                })
            })?;
            level.set(goal.0, goal.1, Tile::Goal)?;
            anchors.goal = Some(goal);
        }

        debug!(level = k, ?anchors, "placed level features");
        Ok(anchors)
    }

    /// Random reachable, unoccupied dead end accepted by `accept`
    #[allow(clippy::too_many_arguments)]
    fn pick<R, F>(
        &self,
        k: usize,
        level: &Level,
        reachable: &Reachable,
        anchors: &LevelAnchors,
        feature: &'static str,
        random: &mut R,
        accept: F,
    ) -> Result<(usize, usize)>
    where
        R: Rng + ?Sized,
        F: Fn((usize, usize)) -> bool,
    {
        let mut candidates = find_dead_ends(level);
        candidates.shuffle(random);
        candidates
            .into_iter()
            .filter(|cell| !anchors.taken().any(|t| t == *cell))
            .find(|&(x, y)| reachable.contains(x, y) && accept((x, y)))
            .ok_or(DungeonError::NoPlacementCandidate { level: k, feature })
    }

    /// Pair the down-stair of each level with the up-stair of the next
    pub fn link(&self, anchors: &[LevelAnchors]) -> Vec<StairPair> {
        anchors
            .windows(2)
            .enumerate()
            .filter_map(|(k, pair)| {
                let (dx, dy) = pair[0].down?;
                let (ux, uy) = pair[1].up?;
                Some(StairPair {
                    down: Position::new(k, dx, dy),
                    up: Position::new(k + 1, ux, uy),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    use super::*;
    use crate::maze_generator::MazeGenerator;
    use crate::reachability::is_reachable;

    fn carve(seed: u64) -> Level {
        MazeGenerator::new(21, 15)
            .generate_maze(&mut StdRng::seed_from_u64(seed))
            .unwrap()
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn middle_level_gets_both_stairs(#[case] k: usize) {
        let linker = StairLinker::new(3, 0, 2);
        let mut level = carve(k as u64 + 10);
        let anchors = linker.place(1, &mut level, &mut StdRng::seed_from_u64(k as u64)).unwrap();

        let up = anchors.up.unwrap();
        let down = anchors.down.unwrap();
        assert_ne!(up, down);
        assert_eq!(level.get(up.0, up.1).unwrap(), Tile::StairUp);
        assert_eq!(level.get(down.0, down.1).unwrap(), Tile::StairDown);
        assert_eq!(level.open_neighbors(up.0, up.1), 1);
        assert_eq!(level.open_neighbors(down.0, down.1), 1);

        let reference = linker.reference_point(1, &anchors).unwrap();
        assert_eq!(reference, up);
        assert!(is_reachable(&level, reference, down).unwrap());
        assert!(anchors.goal.is_none());
        assert!(anchors.spawn.is_none());
    }

    #[test]
    fn spawn_level_with_goal() {
        let linker = StairLinker::new(1, 0, 0);
        let mut level = carve(3);
        let anchors = linker.place(0, &mut level, &mut StdRng::seed_from_u64(3)).unwrap();

        let spawn = anchors.spawn.unwrap();
        let goal = anchors.goal.unwrap();
        assert!(anchors.up.is_none() && anchors.down.is_none());
        let distance = spawn.0.abs_diff(goal.0) + spawn.1.abs_diff(goal.1);
        assert!(distance >= StairLinker::MIN_GOAL_DISTANCE);
        assert_eq!(level.get(goal.0, goal.1).unwrap(), Tile::Goal);
        assert!(is_reachable(&level, spawn, goal).unwrap());
    }

    #[test]
    fn level_above_spawn_arrives_by_down_stair() {
        let linker = StairLinker::new(3, 2, 0);
        let mut level = carve(5);
        let anchors = linker.place(0, &mut level, &mut StdRng::seed_from_u64(5)).unwrap();
        assert!(anchors.up.is_none());
        assert_eq!(linker.reference_point(0, &anchors), anchors.down);
        assert!(anchors.goal.is_some());
    }

    #[test]
    fn no_dead_end_means_no_candidate() {
        let linker = StairLinker::new(2, 0, 1);
        let mut level = Level::parse(
            "
#####
#...#
#.#.#
#...#
#####",
        )
        .unwrap();
        let result = linker.place(1, &mut level, &mut StdRng::seed_from_u64(0));
        assert!(matches!(
            result,
            Err(DungeonError::NoPlacementCandidate { level: 1, .. })
        ));
    }

    #[test]
    fn links_consecutive_levels() {
        let linker = StairLinker::new(3, 0, 2);
        let anchors = [
            LevelAnchors {
                spawn: Some((1, 1)),
                down: Some((3, 1)),
                ..Default::default()
            },
            LevelAnchors {
                up: Some((5, 5)),
                down: Some((1, 7)),
                ..Default::default()
            },
            LevelAnchors {
                up: Some((9, 1)),
                goal: Some((1, 9)),
                ..Default::default()
            },
        ];
        assert_eq!(
            linker.link(&anchors),
            vec![
                StairPair {
                    down: Position::new(0, 3, 1),
                    up: Position::new(1, 5, 5)
                },
                StairPair {
                    down: Position::new(1, 1, 7),
                    up: Position::new(2, 9, 1)
                },
            ]
        );
    }
}
