//! Generate a stack of maze levels linked by stairs, and find the way
//! from the player's spawn to the goal.
//!
//! Every level is a perfect maze (exactly one simple path between any two
//! floor cells). Consecutive levels are linked by a stair pair placed on
//! dead ends; the pathfinder searches all levels at once, treating a stair
//! pair as a single step.
//!
//! # Examples
//! ## Generate and solve
//! ```
//! use dungeon_crawler::{Session, TraversalController, TraversalState};
//!
//! let mut session = Session::generate_all(3, 21, 15, 7).unwrap();
//! let route = session.route().unwrap().clone();
//! assert_eq!(route.level_transitions(), 2);
//! assert_eq!(route.last(), Some(&session.dungeon().goal()));
//!
//! let mut controller = TraversalController::new();
//! let end = controller.run(&mut session, 10_000).unwrap();
//! assert_eq!(end, TraversalState::GoalReached);
//! ```
//!
//! ## Hand-written levels
//! ```
//! use dungeon_crawler::{find_path, Dungeon};
//!
//! // All levels of a stack share one size
//! let dungeon = Dungeon::parse(&[
//!     "#######\n#@...>#\n#######\n#######\n#######",
//!     "#######\n#<.#..#\n#.....#\n###G###\n#######",
//! ])
//! .unwrap();
//! let path = find_path(&dungeon, dungeon.player()).unwrap();
//! assert_eq!(path.steps(), 9);
//! ```

pub mod builder;
pub mod config;
pub mod dead_ends;
pub mod dungeon;
pub mod error;
pub mod grid;
pub mod linker;
pub mod maze_generator;
pub mod pathfinder;
pub mod reachability;
pub mod session;
pub mod traversal;

pub use builder::build_dungeon;
pub use config::GenerationConfig;
pub use dungeon::{Dungeon, StairPair};
pub use error::{DungeonError, Result};
pub use grid::{Direction, Level, Position, Tile};
pub use linker::StairLinker;
pub use maze_generator::MazeGenerator;
pub use pathfinder::{find_path, Path, PathTarget};
pub use session::{GameStatus, MoveOutcome, Session};
pub use traversal::{TraversalController, TraversalState};
