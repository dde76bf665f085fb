//! Solve orchestration.
//!
//! One pass of the loop runs: propagate local rules to a fixed point, drop
//! stale path caches, re-screen reachability, extract forced cells from path
//! overlaps, and finally deepen the bounded path search by one unit. Any
//! step that reclassifies a cell (or changes a required-absorption set)
//! restarts the sequence and resets the search depth to one, since stale
//! path sets could otherwise miss newly legal completions. The loop ends
//! when the board is solved or a full pass at the maximum depth makes no
//! progress.

pub(crate) mod paths;
pub(crate) mod reach;
pub(crate) mod rules;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::Error;
use crate::GroupId;
use paths::PathSet;

/// Configuration for the solver.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Maximum path-search depth. Defaults to the board area, the upper
    /// bound on any useful path length; lower it to cap search effort.
    pub max_depth: Option<usize>,
}

/// Terminal state of a solve run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// The partition is a complete, valid solution.
    Solved,
    /// No further deduction was possible at the configured search depth.
    /// This is a normal terminal state, not an error.
    Stalled,
}

/// Counters reported alongside the terminal status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolveStats {
    pub forced_islands: usize,
    pub forced_seas: usize,
    pub path_rounds: usize,
    pub deepest_search: usize,
    pub restarts: usize,
}

/// Deduction solver driving a [`Board`] to a fixed point.
pub struct Solver {
    config: SolverConfig,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create a solver with default configuration.
    pub fn new() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Create a solver with custom configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Run deduction until the board is solved or no step makes progress.
    pub fn solve(&self, board: &mut Board) -> Result<SolveStatus, Error> {
        self.solve_with_stats(board).map(|(status, _)| status)
    }

    /// Like [`solve`](Self::solve), additionally reporting counters.
    pub fn solve_with_stats(&self, board: &mut Board) -> Result<(SolveStatus, SolveStats), Error> {
        let mut stats = SolveStats::default();
        let max_depth = self
            .config
            .max_depth
            .unwrap_or_else(|| (board.width() * board.height()).max(1));
        let mut path_sets: BTreeMap<GroupId, PathSet> = BTreeMap::new();
        let mut depth = 1usize;
        let mut quick_reach_pending = true;
        stats.deepest_search = 1;

        rules::propagate(board, &mut stats)?;
        loop {
            if board.is_solved() {
                log::debug!(
                    "solved after {} forced cells",
                    stats.forced_islands + stats.forced_seas
                );
                return Ok((SolveStatus::Solved, stats));
            }

            paths::invalidate_stale(board, &mut path_sets);

            if quick_reach_pending {
                quick_reach_pending = false;
                if reach::quick_pass(board)? {
                    rules::propagate(board, &mut stats)?;
                    reset(&mut depth, &mut quick_reach_pending, &mut stats);
                    continue;
                }
            }

            if paths::islands_fully_terminated(board, &path_sets)
                && reach::exact_pass(board, &mut path_sets)?
            {
                rules::propagate(board, &mut stats)?;
                reset(&mut depth, &mut quick_reach_pending, &mut stats);
                continue;
            }

            if paths::derive_overlaps(board, &mut path_sets)? {
                rules::propagate(board, &mut stats)?;
                reset(&mut depth, &mut quick_reach_pending, &mut stats);
                continue;
            }

            if paths::grow_all(board, &mut path_sets, depth, &mut stats)? {
                continue;
            }
            if depth >= max_depth {
                log::debug!("search exhausted at depth {}", depth);
                return Ok((SolveStatus::Stalled, stats));
            }
            depth += 1;
            stats.deepest_search = stats.deepest_search.max(depth);
            log::trace!("extending path search to depth {}", depth);
        }
    }
}

/// A structural change restarts deepening from one.
fn reset(depth: &mut usize, quick_reach_pending: &mut bool, stats: &mut SolveStats) {
    *depth = 1;
    *quick_reach_pending = true;
    stats.restarts += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CellRole, Position};

    fn solve(rows: &[&str]) -> (Board, SolveStatus) {
        let mut board = Board::from_rows(rows).unwrap();
        let status = Solver::new().solve(&mut board).unwrap();
        (board, status)
    }

    #[test]
    fn test_two_threes_on_a_square() {
        let (board, status) = solve(&["3-3", "---", "---"]);
        assert_eq!(status, SolveStatus::Solved);
        assert_eq!(board.to_string(), "3X3\nOXO\nOXO");
        assert!(board.is_solved());
    }

    #[test]
    fn test_lone_one() {
        let (board, status) = solve(&["1-", "--"]);
        assert_eq!(status, SolveStatus::Solved);
        assert_eq!(board.to_string(), "1X\nXX");
    }

    #[test]
    fn test_pool_forcing_and_orphan_absorption() {
        // distance screening fills the right end with sea, the tripped 2x2
        // block forces an island cell there, and the orphan it creates pulls
        // the clue island across to absorb it
        let (board, status) = solve(&["3---", "----"]);
        assert_eq!(status, SolveStatus::Solved);
        assert_eq!(board.to_string(), "3OOX\nXXXX");
    }

    #[test]
    fn test_grid_of_ones() {
        let (board, status) = solve(&["1-1-1", "-----", "1-1-1", "-----", "1-1-1"]);
        assert_eq!(status, SolveStatus::Solved);
        assert_eq!(
            board.to_string(),
            "1X1X1\nXXXXX\n1X1X1\nXXXXX\n1X1X1"
        );
    }

    #[test]
    fn test_ambiguous_puzzle_stalls() {
        // the 2 can grow right or down; neither cell is forced
        let (board, status) = solve(&["2-", "--"]);
        assert_eq!(status, SolveStatus::Stalled);
        assert_eq!(board.role(Position::new(1, 0)), CellRole::Unassigned);
        assert_eq!(board.role(Position::new(0, 1)), CellRole::Unassigned);
        // but the far corner is still deduced
        assert_eq!(board.role(Position::new(1, 1)), CellRole::Sea);
        assert!(!board.is_solved());
    }

    #[test]
    fn test_sea_path_intersection_deduces_bridge() {
        // both border fragments must route through the center cell to merge
        let (board, status) = solve(&["-2-", "---"]);
        assert_eq!(status, SolveStatus::Stalled);
        assert_eq!(board.role(Position::new(1, 1)), CellRole::Sea);
        assert_eq!(board.role(Position::new(0, 1)), CellRole::Sea);
        assert_eq!(board.role(Position::new(2, 1)), CellRole::Sea);
        assert_eq!(board.role(Position::new(0, 0)), CellRole::Unassigned);
        assert_eq!(board.role(Position::new(2, 0)), CellRole::Unassigned);
    }

    #[test]
    fn test_contradictory_strip_errors() {
        let mut board = Board::from_rows(&["2--2"]).unwrap();
        let err = Solver::new().solve(&mut board).unwrap_err();
        assert!(matches!(err, Error::IslandOverflow { .. }));
    }

    #[test]
    fn test_depth_cap_still_terminates() {
        let mut board = Board::from_rows(&["2-", "--"]).unwrap();
        let solver = Solver::with_config(SolverConfig { max_depth: Some(1) });
        let status = solver.solve(&mut board).unwrap();
        assert_eq!(status, SolveStatus::Stalled);
    }

    #[test]
    fn test_solve_is_stable_when_rerun() {
        let (mut board, status) = solve(&["2-", "--"]);
        assert_eq!(status, SolveStatus::Stalled);
        let rendered = board.to_string();
        let again = Solver::new().solve(&mut board).unwrap();
        assert_eq!(again, SolveStatus::Stalled);
        assert_eq!(board.to_string(), rendered);
    }

    #[test]
    fn test_status_serializes() {
        let json = serde_json::to_string(&SolveStatus::Stalled).unwrap();
        let back: SolveStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SolveStatus::Stalled);
    }
}
