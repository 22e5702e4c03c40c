//! Automated traversal: follow computed routes one tick at a time

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::error::{DungeonError, Result};
use crate::grid::{Direction, Position};
use crate::session::{GameStatus, MoveOutcome, Session};

/// Controller state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraversalState {
    /// Nothing computed yet
    #[default]
    Idle,
    /// Fresh route held, no step taken on it yet
    PathComputed,
    /// Following the held route
    Stepping,
    /// Just changed level; the held route was dropped
    LevelTransition,
    /// Player stands on the goal (terminal)
    GoalReached,
    /// Route ran out without reaching the goal (terminal)
    PathExhausted,
}

impl TraversalState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TraversalState::GoalReached | TraversalState::PathExhausted)
    }
}

/// Consumes routes from the pathfinder, one position per tick.
///
/// Each [Self::tick] does exactly one thing: compute a route, take one
/// in-level step or take one stair. The tick source lives outside.
#[derive(Clone, Debug, Default)]
pub struct TraversalController {
    state: TraversalState,
    /// Remaining positions of the held route, current position excluded
    pending: VecDeque<Position>,
    transitions: usize,
}

impl TraversalController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TraversalState {
        self.state
    }

    /// Positions still to be visited on the held route
    pub fn pending(&self) -> impl Iterator<Item = &Position> {
        self.pending.iter()
    }

    /// Level changes performed so far
    pub fn transitions(&self) -> usize {
        self.transitions
    }

    /// Advance by one tick
    pub fn tick(&mut self, session: &mut Session) -> Result<TraversalState> {
        self.state = match self.state {
            TraversalState::GoalReached | TraversalState::PathExhausted => self.state,
            TraversalState::Idle | TraversalState::LevelTransition => self.compute(session)?,
            TraversalState::PathComputed | TraversalState::Stepping => self.step(session)?,
        };
        Ok(self.state)
    }

    /// Tick until a terminal state, at most `max_ticks` times
    pub fn run(&mut self, session: &mut Session, max_ticks: usize) -> Result<TraversalState> {
        for _ in 0..max_ticks {
            if self.tick(session)?.is_terminal() {
                break;
            }
        }
        Ok(self.state)
    }

    fn compute(&mut self, session: &mut Session) -> Result<TraversalState> {
        if session.status() == GameStatus::Won {
            return Ok(TraversalState::GoalReached);
        }
        match session.route() {
            Ok(path) => {
                self.pending = path.positions().iter().skip(1).copied().collect();
                debug!(steps = self.pending.len(), target = ?path.target(), "route computed");
                Ok(TraversalState::PathComputed)
            }
            Err(DungeonError::StuckNoPath { position }) => {
                warn!(%position, "no route from current position");
                self.pending.clear();
                Ok(TraversalState::PathExhausted)
            }
            Err(e) => Err(e),
        }
    }

    fn step(&mut self, session: &mut Session) -> Result<TraversalState> {
        let Some(next) = self.pending.pop_front() else {
            return Ok(TraversalState::PathExhausted);
        };
        let current = session.player();

        if next.level != current.level {
            return match session.activate_stair()? {
                MoveOutcome::ChangedLevel(landed) if landed == next => {
                    self.transitions += 1;
                    // Route computed on the old level is stale now
                    self.pending.clear();
                    Ok(TraversalState::LevelTransition)
                }
                outcome => {
                    warn!(?outcome, %next, "stair on route could not be taken");
                    self.abandon()
                }
            };
        }

        let Some(direction) = Direction::between(&current, &next) else {
            warn!(%current, %next, "route is not contiguous");
            return self.abandon();
        };
        match session.move_player(direction)? {
            MoveOutcome::ReachedGoal(_) => {
                self.pending.clear();
                Ok(TraversalState::GoalReached)
            }
            MoveOutcome::Moved(_) => Ok(TraversalState::Stepping),
            outcome => {
                warn!(?outcome, %next, "step on route was rejected");
                self.abandon()
            }
        }
    }

    fn abandon(&mut self) -> Result<TraversalState> {
        self.pending.clear();
        Ok(TraversalState::PathExhausted)
    }
}
