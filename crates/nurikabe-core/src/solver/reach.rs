//! Reachability screens.
//!
//! The quick pass is a pure Manhattan-distance bound from each clue cell and
//! runs before any path search (and again after every solver restart). The
//! exact pass runs once every island's path set is fully terminated: a cell
//! in no terminated completion is sea, and an orphan fragment absorbed by
//! exactly one island's completions becomes a required absorption.

use std::collections::BTreeMap;

use crate::board::{Board, Position};
use crate::cellset::CellSet;
use crate::error::Error;
use crate::solver::paths::PathSet;
use crate::GroupId;

/// Force sea for every undetermined cell no island can reach under the
/// distance bound. Returns true if anything was queued.
pub(crate) fn quick_pass(board: &mut Board) -> Result<bool, Error> {
    let islands: Vec<(Position, usize)> = board
        .islands
        .iter()
        .map(|&gid| {
            let data = board.group(gid).island().expect("island group");
            (board.cells[data.origin].pos, data.clue)
        })
        .collect();

    let mut queued = false;
    for cid in 0..board.cell_count() {
        if !board.is_unassigned(cid) {
            continue;
        }
        let pos = board.cells[cid].pos;
        let reachable = islands
            .iter()
            .any(|&(origin, clue)| origin.manhattan(pos) + 1 <= clue);
        if !reachable {
            log::trace!("({}, {}) is out of reach of every clue", pos.x, pos.y);
            board.force_sea(cid);
            queued = true;
        }
    }

    // an orphan must be absorbed whole, so its full size counts against
    // the distance budget
    for gid in board.orphans.clone() {
        let members = board.group(gid).members.clone();
        let size = members.len();
        let reachable = islands.iter().any(|&(origin, clue)| {
            let nearest = members
                .iter()
                .map(|&m| origin.manhattan(board.cells[m].pos))
                .min()
                .expect("orphan has members");
            nearest + size <= clue
        });
        if !reachable {
            return Err(Error::StrandedOrphan {
                pos: board.cells[members[0]].pos,
            });
        }
    }
    Ok(queued)
}

/// Exact classification from terminated path sets. Only sound once every
/// incomplete island's paths are all terminated, which the caller checks.
pub(crate) fn exact_pass(
    board: &mut Board,
    paths: &mut BTreeMap<GroupId, PathSet>,
) -> Result<bool, Error> {
    let mut covered = CellSet::with_capacity(board.cell_count());
    for &gid in &board.islands {
        if let Some(set) = paths.get(&gid) {
            for path in &set.paths {
                covered.union_with(&path.members);
            }
        }
    }

    let mut progress = false;
    for cid in 0..board.cell_count() {
        if board.is_unassigned(cid) && !covered.contains(cid) {
            let pos = board.cells[cid].pos;
            log::trace!("({}, {}) appears in no completion", pos.x, pos.y);
            board.force_sea(cid);
            progress = true;
        }
    }

    for gid in board.orphans.clone() {
        let mut reachers = Vec::new();
        for &island in &board.islands {
            let absorbs = paths
                .get(&island)
                .is_some_and(|set| set.paths.iter().any(|p| p.absorbed.contains(&gid)));
            if absorbs {
                reachers.push(island);
            }
        }
        match reachers.len() {
            0 => {
                return Err(Error::StrandedOrphan {
                    pos: board.cells[board.group(gid).members[0]].pos,
                });
            }
            1 => {
                let island = reachers[0];
                let known = board
                    .group(island)
                    .island()
                    .expect("island group")
                    .required_orphans
                    .contains(&gid);
                if !known {
                    log::debug!("island group {} must absorb orphan {}", island, gid);
                    board
                        .group_mut(island)
                        .island_mut()
                        .expect("island group")
                        .required_orphans
                        .push(gid);
                    if let Some(set) = paths.get_mut(&island) {
                        set.paths.retain(|p| p.absorbed.contains(&gid));
                    }
                    progress = true;
                }
            }
            _ => {}
        }
    }
    Ok(progress)
}
