//! Whole-stack generation: carve, place, link, verify

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::dungeon::Dungeon;
use crate::error::{DungeonError, Result};
use crate::grid::{Level, Position};
use crate::linker::{LevelAnchors, StairLinker};
use crate::maze_generator::MazeGenerator;
use crate::pathfinder::{find_path, PathTarget};

/// Carve attempts per level before giving up
pub const MAX_LEVEL_ATTEMPTS: usize = 32;
/// Whole-stack attempts when the end-to-end check fails
pub const MAX_DUNGEON_ATTEMPTS: usize = 8;

/// Build a complete, linked dungeon.
///
/// Levels whose features cannot be placed are recarved. The finished stack
/// must have a route from spawn to goal; otherwise it is rebuilt.
pub fn build_dungeon<R: Rng + ?Sized>(
    config: &GenerationConfig,
    random: &mut R,
) -> Result<Dungeon> {
    config.validate()?;
    let generator = MazeGenerator::new(config.width, config.height);
    let linker = StairLinker::new(config.level_count, config.start_level, config.goal_level());

    for attempt in 1..=MAX_DUNGEON_ATTEMPTS {
        let mut levels = Vec::with_capacity(config.level_count);
        let mut anchors = Vec::with_capacity(config.level_count);
        for k in 0..config.level_count {
            let built = build_level(k, &generator, &linker, random)?;
            if built.attempts > 1 {
                debug!(level = k, attempts = built.attempts, "level recarved");
            }
            levels.push(built.level);
            anchors.push(built.anchors);
        }

        let stairs = linker.link(&anchors);
        let spawn = locate(&anchors, config.start_level, |a| a.spawn)?;
        let goal = locate(&anchors, config.goal_level(), |a| a.goal)?;
        let dungeon = Dungeon::assemble(levels, stairs, spawn, goal)?;

        let path = find_path(&dungeon, spawn)?;
        if path.target() == PathTarget::Goal && path.last() == Some(&goal) {
            info!(
                levels = config.level_count,
                width = config.width,
                height = config.height,
                attempt,
                shortest = path.steps(),
                "dungeon generated"
            );
            return Ok(dungeon);
        }
        warn!(attempt, "goal unreachable from spawn, rebuilding dungeon");
    }

    Err(DungeonError::GenerationExhausted {
        level: config.goal_level(),
        attempts: MAX_DUNGEON_ATTEMPTS,
    })
}

/// Level carved and furnished by [build_level]
#[derive(Debug)]
struct BuiltLevel {
    level: Level,
    anchors: LevelAnchors,
    /// Carves used, the successful one included
    attempts: usize,
}

/// Carve level `k` and place its features, recarving on placement failure
fn build_level<R: Rng + ?Sized>(
    k: usize,
    generator: &MazeGenerator,
    linker: &StairLinker,
    random: &mut R,
) -> Result<BuiltLevel> {
    for attempt in 1..=MAX_LEVEL_ATTEMPTS {
        let mut level = generator.generate_maze(random)?;
        match linker.place(k, &mut level, random) {
            Ok(anchors) => {
                return Ok(BuiltLevel {
                    level,
                    anchors,
                    attempts: attempt,
                });
            }
            Err(DungeonError::NoPlacementCandidate { feature, .. }) => {
                debug!(level = k, attempt, feature, "no placement candidate, recarving");
            }
            Err(e) => return Err(e),
        }
    }
    Err(DungeonError::GenerationExhausted {
        level: k,
        attempts: MAX_LEVEL_ATTEMPTS,
    })
}

fn locate(
    anchors: &[LevelAnchors],
    k: usize,
    cell: impl Fn(&LevelAnchors) -> Option<(usize, usize)>,
) -> Result<Position> {
    anchors
        .get(k)
        .and_then(cell)
        .map(|(x, y)| Position::new(k, x, y))
        .ok_or(DungeonError::GenerationExhausted {
            level: k,
            attempts: 0,
        })
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    use super::*;
    use crate::grid::Tile;
    use crate::reachability::is_reachable;

    #[rstest]
    #[case(GenerationConfig::new(1, 10, 10, None), 0)]
    #[case(GenerationConfig::new(3, 15, 11, None), 1)]
    #[case(GenerationConfig::default(), 2)]
    #[case(
        GenerationConfig {
            start_level: 1,
            goal_level: Some(0),
            ..GenerationConfig::new(4, 9, 9, None)
        },
        3
    )]
    fn builds_linked_stack(#[case] config: GenerationConfig, #[case] seed: u64) {
        let dungeon = build_dungeon(&config, &mut StdRng::seed_from_u64(seed)).unwrap();
        let n = config.level_count;

        assert_eq!(dungeon.level_count(), n);
        assert_eq!(dungeon.stairs().len(), n - 1);
        assert_eq!(dungeon.spawn().level, config.start_level);
        assert_eq!(dungeon.goal().level, config.goal_level());
        assert_ne!(dungeon.spawn(), dungeon.goal());

        let players: usize = dungeon.levels().iter().map(|l| l.count(Tile::Player)).sum();
        assert_eq!(players, 1);
        let goals: usize = dungeon.levels().iter().map(|l| l.count(Tile::Goal)).sum();
        assert_eq!(goals, 1);

        for (k, level) in dungeon.levels().iter().enumerate() {
            assert_eq!(level.count(Tile::StairUp), usize::from(k > 0));
            assert_eq!(level.count(Tile::StairDown), usize::from(k + 1 < n));
        }
    }

    #[test]
    fn stairs_reachable_from_reference_points() {
        let config = GenerationConfig::new(4, 13, 13, None);
        let dungeon = build_dungeon(&config, &mut StdRng::seed_from_u64(99)).unwrap();

        for pair in dungeon.stairs() {
            let down_level = dungeon.level(pair.down.level).unwrap();
            let reference = if pair.down.level == dungeon.spawn().level {
                dungeon.spawn()
            } else {
                dungeon
                    .stairs()
                    .iter()
                    .find(|p| p.up.level == pair.down.level)
                    .unwrap()
                    .up
            };
            assert!(is_reachable(
                down_level,
                (reference.x, reference.y),
                (pair.down.x, pair.down.y)
            )
            .unwrap());

            // Up-stair is the reference point of its own level
            let up_level = dungeon.level(pair.up.level).unwrap();
            let first_open = up_level.cells().find(|(_, t)| t.is_open()).unwrap().0;
            assert!(is_reachable(up_level, first_open, (pair.up.x, pair.up.y)).unwrap());
        }
    }

    #[test]
    fn same_seed_same_dungeon() {
        let config = GenerationConfig::new(3, 11, 11, None);
        let a = build_dungeon(&config, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = build_dungeon(&config, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn recarves_until_features_fit() {
        // A 5x5 maze is a single corridor with two dead ends; a spawn drawn
        // on one of them leaves no goal far enough away
        let generator = MazeGenerator::new(5, 5);
        let linker = StairLinker::new(1, 0, 0);
        let attempts: Vec<usize> = (0..200)
            .map(|seed| {
                let built =
                    build_level(0, &generator, &linker, &mut StdRng::seed_from_u64(seed)).unwrap();
                assert_eq!(built.level.count(Tile::Goal), 1);
                assert!(built.anchors.spawn.is_some());
                built.attempts
            })
            .collect();
        assert!(attempts.iter().any(|&a| a > 1));
        assert!(attempts.iter().all(|&a| a <= MAX_LEVEL_ATTEMPTS));
    }

    #[test]
    fn crowded_level_exhausts_attempts() {
        // Spawn, both stairs and the goal need more dead ends than 5x5 has
        let config = GenerationConfig {
            start_level: 1,
            goal_level: Some(1),
            ..GenerationConfig::new(3, 5, 5, None)
        };
        assert!(matches!(
            build_dungeon(&config, &mut StdRng::seed_from_u64(0)),
            Err(DungeonError::GenerationExhausted {
                level: 1,
                attempts: MAX_LEVEL_ATTEMPTS
            })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GenerationConfig::new(2, 3, 3, None);
        assert!(matches!(
            build_dungeon(&config, &mut StdRng::seed_from_u64(0)),
            Err(DungeonError::InvalidConfig(_))
        ));
    }
}
