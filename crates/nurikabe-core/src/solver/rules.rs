//! Local deduction rules, run to a fixed point after every cell change.
//!
//! The drain order matters: forced-island cells are applied before
//! forced-sea cells, so a pool-tripped cell becomes island before the sea
//! that surrounded it can close in.

use crate::board::Board;
use crate::error::Error;
use crate::solver::SolveStats;
use crate::{CellId, GroupId};

/// Drain the worklists and re-run changed groups until nothing moves.
/// Returns true if any cell was reclassified.
pub(crate) fn propagate(board: &mut Board, stats: &mut SolveStats) -> Result<bool, Error> {
    let mut progress = false;
    loop {
        if let Some(cid) = board.island_queue.pop_front() {
            if board.become_island(cid)? {
                stats.forced_islands += 1;
                progress = true;
            }
            continue;
        }
        if let Some(cid) = board.sea_queue.pop_front() {
            if board.become_sea(cid)? {
                stats.forced_seas += 1;
                progress = true;
            }
            continue;
        }
        let mut ran = false;
        for gid in board.islands.clone() {
            if board.group_alive(gid) && board.group(gid).changed {
                update_island(board, gid);
                ran = true;
            }
        }
        for gid in board.orphans.clone() {
            if board.group_alive(gid) && board.group(gid).changed {
                update_orphan(board, gid);
                ran = true;
            }
        }
        for gid in board.seas.clone() {
            if board.group_alive(gid) && board.group(gid).changed {
                update_sea(board, gid);
                ran = true;
            }
        }
        if !ran && board.island_queue.is_empty() && board.sea_queue.is_empty() {
            break;
        }
    }
    Ok(progress)
}

fn update_island(board: &mut Board, gid: GroupId) {
    board.clear_changed(gid);
    let (clue, size, complete) = {
        let group = board.group(gid);
        let data = group.island().expect("island group");
        (data.clue, group.members.len(), data.complete)
    };
    if complete {
        return;
    }
    if size == clue {
        board.seal_island(gid);
        return;
    }

    let libs = board.group_liberties(gid);
    if libs.len() == 1 {
        log::trace!("island group {} has a single liberty", gid);
        board.force_island(libs[0]);
    }
    if libs.len() == 2 && clue - size == 1 {
        // taking either liberty completes the island, so a cell touching
        // both can never be part of it
        for n in common_neighbors(board, libs[0], libs[1]) {
            if board.is_unassigned(n) {
                log::trace!("island group {} forks around cell {}", gid, n);
                board.force_sea(n);
            }
        }
    }
    // two islands may never touch
    for &l in &libs {
        if !board.is_unassigned(l) {
            continue;
        }
        let foreign = board
            .neighbor_ids(l)
            .into_iter()
            .any(|n| board.is_clue_island_cell(n) && board.cells[n].group != gid);
        if foreign {
            log::trace!("cell {} sits between two islands", l);
            board.force_sea(l);
        }
    }
}

fn update_orphan(board: &mut Board, gid: GroupId) {
    board.clear_changed(gid);
    let libs = board.group_liberties(gid);
    if libs.len() == 1 {
        log::trace!("orphan group {} has a single liberty", gid);
        board.force_island(libs[0]);
    }
}

fn update_sea(board: &mut Board, gid: GroupId) {
    board.clear_changed(gid);
    if board.seas.len() <= 1 {
        return; // a lone fragment has no merge obligation yet
    }
    let libs = board.group_liberties(gid);
    if libs.len() == 1 {
        log::trace!("sea fragment {} has a single liberty", gid);
        board.force_sea(libs[0]);
    }
}

fn common_neighbors(board: &Board, a: CellId, b: CellId) -> Vec<CellId> {
    let b_neighbors = board.neighbor_ids(b);
    board
        .neighbor_ids(a)
        .into_iter()
        .filter(|n| b_neighbors.contains(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CellRole, Position};

    fn run(board: &mut Board) -> bool {
        propagate(board, &mut SolveStats::default()).unwrap()
    }

    #[test]
    fn test_one_clue_seals_on_first_pass() {
        let mut board = Board::from_rows(&["---", "-1-", "---"]).unwrap();
        assert!(run(&mut board));
        for pos in [
            Position::new(1, 0),
            Position::new(0, 1),
            Position::new(2, 1),
            Position::new(1, 2),
        ] {
            assert_eq!(board.role(pos), CellRole::Sea);
        }
        assert_eq!(board.incomplete_island_count(), 0);
    }

    #[test]
    fn test_adjacency_exclusion_then_chain() {
        // the shared liberty goes to sea, then both islands grow down their
        // only remaining liberty until complete
        let mut board = Board::from_rows(&["3-3", "---", "---"]).unwrap();
        assert!(run(&mut board));
        assert!(board.is_solved());
        assert_eq!(board.to_string(), "3X3\nOXO\nOXO");
    }

    #[test]
    fn test_fork_rule() {
        let mut board = Board::from_rows(&["2-", "--"]).unwrap();
        run(&mut board);
        // either liberty completes the clue, so their common neighbor can
        // never join the island
        assert_eq!(board.role(Position::new(1, 1)), CellRole::Sea);
        assert_eq!(board.role(Position::new(1, 0)), CellRole::Unassigned);
        assert_eq!(board.role(Position::new(0, 1)), CellRole::Unassigned);
    }

    #[test]
    fn test_propagation_is_idempotent() {
        let mut board = Board::from_rows(&["3-3", "---", "---"]).unwrap();
        assert!(run(&mut board));
        let settled = board.to_string();
        assert!(!run(&mut board));
        assert_eq!(board.to_string(), settled);
    }

    #[test]
    fn test_sea_single_liberty_needs_two_fragments() {
        let mut board = Board::from_rows(&["1-", "--"]).unwrap();
        run(&mut board);
        // sealing the 1 leaves two fragments whose single liberties force
        // the remaining cell, merging everything into one sea
        assert!(board.is_solved());
        assert_eq!(board.to_string(), "1X\nXX");
    }
}
