//! Bounded path enumeration and forced-cell extraction.
//!
//! A path is a set of undetermined cells that would complete its group if
//! all were classified into the group's role. Island paths grow breadth
//! first up to the island's outstanding size; sea paths grow until they
//! touch a different fragment. Paths are grown one round at a time under a
//! board-wide iterative-deepening counter, and a whole group's path set is
//! discarded the moment any cell it references is reclassified.

use std::collections::BTreeMap;

use crate::board::Board;
use crate::cellset::CellSet;
use crate::error::Error;
use crate::solver::SolveStats;
use crate::{CellId, GroupId};

/// One candidate partial completion of a group.
#[derive(Debug, Clone)]
pub(crate) struct Path {
    /// Undetermined cells this path would classify into the group's role.
    pub members: CellSet,
    pub member_count: usize,
    /// Orphan fragments an island path would absorb.
    pub absorbed: Vec<GroupId>,
    pub absorbed_size: usize,
    /// Reached exact size (island) or touched another fragment (sea).
    pub terminated: bool,
    /// Undetermined frontier around the group plus this path.
    pub liberties: CellSet,
    /// Cells whose reclassification invalidates this path.
    pub deps: CellSet,
}

/// The live, non-duplicate paths of one group.
#[derive(Debug)]
pub(crate) struct PathSet {
    pub paths: Vec<Path>,
    /// Growth rounds applied so far.
    pub rounds: usize,
    /// Group size when the set was seeded; a mismatch means stale.
    pub base_size: usize,
}

/// Undetermined cells adjacent to the group, its path members, and any
/// absorbed orphan fragments, excluding the path members themselves.
fn closure_liberties(
    board: &Board,
    gid: GroupId,
    members: &CellSet,
    absorbed: &[GroupId],
) -> CellSet {
    let mut libs = CellSet::with_capacity(board.cell_count());
    let collect = |cells: &[CellId], libs: &mut CellSet| {
        for &m in cells {
            for &l in &board.cells[m].liberties {
                if board.is_unassigned(l) && !members.contains(l) {
                    libs.insert(l);
                }
            }
        }
    };
    collect(&board.group(gid).members, &mut libs);
    for &orphan in absorbed {
        collect(&board.group(orphan).members, &mut libs);
    }
    for m in members.iter() {
        for n in board.neighbor_ids(m) {
            if board.is_unassigned(n) && !members.contains(n) {
                libs.insert(n);
            }
        }
    }
    libs
}

fn seed(board: &Board, gid: GroupId) -> PathSet {
    let members = CellSet::with_capacity(board.cell_count());
    let liberties = closure_liberties(board, gid, &members, &[]);
    let deps = liberties.clone();
    PathSet {
        paths: vec![Path {
            members,
            member_count: 0,
            absorbed: Vec::new(),
            absorbed_size: 0,
            terminated: false,
            liberties,
            deps,
        }],
        rounds: 0,
        base_size: board.group(gid).members.len(),
    }
}

fn push_unique(list: &mut Vec<Path>, path: Path) {
    if !list.iter().any(|p| p.members == path.members) {
        list.push(path);
    }
}

/// Drop every path set that references a reclassified cell, belongs to a
/// dead or resized group, or belongs to a sealed island. Invalidation is
/// wholesale per group: a stale set is rebuilt from scratch so that forced
/// extraction never runs against a partial enumeration.
pub(crate) fn invalidate_stale(board: &mut Board, paths: &mut BTreeMap<GroupId, PathSet>) {
    let mut dirty = CellSet::with_capacity(board.cell_count());
    for cid in board.dirty.drain(..) {
        dirty.insert(cid);
    }
    paths.retain(|&gid, set| {
        if !board.group_alive(gid) {
            return false;
        }
        let group = board.group(gid);
        if group.members.len() != set.base_size {
            return false;
        }
        if group.island().is_some_and(|data| data.complete) {
            return false;
        }
        !set.paths.iter().any(|p| p.deps.intersects(&dirty))
    });
}

/// Seed missing sets and grow every set up to `depth` rounds. Returns true
/// if any round of growth actually ran.
pub(crate) fn grow_all(
    board: &Board,
    paths: &mut BTreeMap<GroupId, PathSet>,
    depth: usize,
    stats: &mut SolveStats,
) -> Result<bool, Error> {
    let mut wanted: Vec<GroupId> = board.islands.clone();
    if board.seas.len() >= 2 {
        wanted.extend(board.seas.iter().copied());
    }
    for gid in wanted {
        paths.entry(gid).or_insert_with(|| seed(board, gid));
    }

    let mut grew = false;
    for (&gid, set) in paths.iter_mut() {
        while set.rounds < depth {
            let extended = grow_round(board, gid, set);
            stats.path_rounds += 1;
            if !extended {
                set.rounds = depth; // nothing left to extend at any depth
                break;
            }
            grew = true;
        }
        if set.paths.is_empty() {
            let anchor = board.group(gid).members[0];
            return Err(Error::NoCompletion {
                pos: board.cells[anchor].pos,
            });
        }
    }
    Ok(grew)
}

/// Extend every unterminated path of the set by one cell.
fn grow_round(board: &Board, gid: GroupId, set: &mut PathSet) -> bool {
    let is_island = board.group(gid).is_clue_island();
    let (outstanding, required) = if is_island {
        let group = board.group(gid);
        let data = group.island().expect("island group");
        (
            data.clue - group.members.len(),
            data.required_orphans.clone(),
        )
    } else {
        (0, Vec::new())
    };

    let mut next: Vec<Path> = Vec::new();
    let mut extended = false;
    for path in std::mem::take(&mut set.paths) {
        if path.terminated {
            push_unique(&mut next, path);
            continue;
        }
        extended = true;
        if is_island {
            extend_island(board, gid, &path, outstanding, &required, &mut next);
        } else {
            extend_sea(board, gid, &path, &mut next);
        }
    }
    set.paths = next;
    set.rounds += 1;
    extended
}

fn extend_island(
    board: &Board,
    gid: GroupId,
    path: &Path,
    outstanding: usize,
    required: &[GroupId],
    out: &mut Vec<Path>,
) {
    for l in path.liberties.iter() {
        // growing against a different clue island is impossible
        let foreign = board
            .neighbor_ids(l)
            .into_iter()
            .any(|n| board.is_clue_island_cell(n) && board.cells[n].group != gid);
        if foreign {
            continue;
        }

        let mut absorbed = path.absorbed.clone();
        let mut absorbed_size = path.absorbed_size;
        for n in board.neighbor_ids(l) {
            let ng = board.cells[n].group;
            if board.group(ng).is_orphan() && !absorbed.contains(&ng) {
                absorbed.push(ng);
                absorbed_size += board.group(ng).members.len();
            }
        }
        let size = path.member_count + 1 + absorbed_size;
        if size > outstanding {
            continue;
        }
        // reserve a connector cell for each required fragment not yet touched
        let reserve: usize = required
            .iter()
            .filter(|&&r| !absorbed.contains(&r))
            .map(|&r| board.group(r).members.len() + 1)
            .sum();
        if size + reserve > outstanding {
            continue;
        }

        let mut members = path.members.clone();
        members.insert(l);
        let liberties = closure_liberties(board, gid, &members, &absorbed);
        let mut deps = members.clone();
        deps.union_with(&liberties);
        let mut candidate = Path {
            members,
            member_count: path.member_count + 1,
            absorbed,
            absorbed_size,
            terminated: false,
            liberties,
            deps,
        };
        if size == outstanding {
            // sealing this completion floods its boundary; it must not pool
            let mut island_cells = candidate.members.clone();
            for &m in &board.group(gid).members {
                island_cells.insert(m);
            }
            for &orphan in &candidate.absorbed {
                for &m in &board.group(orphan).members {
                    island_cells.insert(m);
                }
            }
            if board.completes_pool(&island_cells, &candidate.liberties) {
                continue;
            }
            candidate.terminated = true;
        }
        push_unique(out, candidate);
    }
}

fn extend_sea(board: &Board, gid: GroupId, path: &Path, out: &mut Vec<Path>) {
    for l in path.liberties.iter() {
        let mut members = path.members.clone();
        members.insert(l);
        // never grow into a finished 2x2 pool
        if board.completes_pool(&CellSet::default(), &members) {
            continue;
        }
        let terminated = board
            .neighbor_ids(l)
            .into_iter()
            .any(|n| board.is_sea(n) && board.cells[n].group != gid);
        let liberties = closure_liberties(board, gid, &members, &[]);
        let mut deps = members.clone();
        deps.union_with(&liberties);
        push_unique(
            out,
            Path {
                members,
                member_count: path.member_count + 1,
                absorbed: Vec::new(),
                absorbed_size: 0,
                terminated,
                liberties,
                deps,
            },
        );
    }
}

/// Every incomplete island has a non-empty, fully terminated path set.
pub(crate) fn islands_fully_terminated(
    board: &Board,
    paths: &BTreeMap<GroupId, PathSet>,
) -> bool {
    board.islands.iter().all(|gid| {
        paths.get(gid).is_some_and(|set| {
            set.rounds > 0 && !set.paths.is_empty() && set.paths.iter().all(|p| p.terminated)
        })
    })
}

/// Cross-group exclusion plus forced-cell extraction.
///
/// A path of group B is discarded when every remaining path of some other
/// group fits inside the cells that B-path would block. Afterwards, the
/// intersection of all member sets of a group is forced into its role, and
/// for an island whose paths are all terminated, the intersection of the
/// liberty sets is forced to sea (every completion stops at that boundary).
pub(crate) fn derive_overlaps(
    board: &mut Board,
    paths: &mut BTreeMap<GroupId, PathSet>,
) -> Result<bool, Error> {
    loop {
        let mut discard: Option<(GroupId, usize)> = None;
        'sweep: for (&b, bset) in paths.iter() {
            if bset.rounds == 0 {
                continue;
            }
            for (i, p) in bset.paths.iter().enumerate() {
                let blocked = p.members.clone();
                // a terminated island path also floods its boundary with
                // sea, which walls off other islands but not sea fragments
                let mut walled = blocked.clone();
                if p.terminated && board.group(b).is_clue_island() {
                    walled.union_with(&p.liberties);
                }
                for (&a, aset) in paths.iter() {
                    if a == b || aset.rounds == 0 || aset.paths.is_empty() {
                        continue;
                    }
                    let a_island = board.group(a).is_clue_island();
                    let b_island = board.group(b).is_clue_island();
                    if !a_island && !b_island {
                        // two sea fragments claiming the same cells merge
                        // rather than block each other
                        continue;
                    }
                    let blocking = if a_island && b_island { &walled } else { &blocked };
                    if aset.paths.iter().all(|q| q.members.is_subset(blocking)) {
                        discard = Some((b, i));
                        break 'sweep;
                    }
                }
            }
        }
        match discard {
            Some((gid, index)) => {
                log::trace!("excluding a path of group {}", gid);
                let set = paths.get_mut(&gid).expect("path set");
                set.paths.remove(index);
                if set.paths.is_empty() {
                    let anchor = board.group(gid).members[0];
                    return Err(Error::NoCompletion {
                        pos: board.cells[anchor].pos,
                    });
                }
            }
            None => break,
        }
    }

    let mut progress = false;
    for (&gid, set) in paths.iter() {
        if set.rounds == 0 || set.paths.is_empty() {
            continue;
        }
        let is_island = board.group(gid).is_clue_island();

        let mut member_inter = set.paths[0].members.clone();
        for p in &set.paths[1..] {
            member_inter.intersect_with(&p.members);
        }
        for cid in member_inter.iter() {
            if board.is_unassigned(cid) {
                if is_island {
                    board.force_island(cid);
                } else {
                    board.force_sea(cid);
                }
                progress = true;
            }
        }

        // sea termination marks the first merge, not the sea's final
        // extent, so the boundary argument only holds for islands
        if is_island && set.paths.iter().all(|p| p.terminated) {
            let mut lib_inter = set.paths[0].liberties.clone();
            for p in &set.paths[1..] {
                lib_inter.intersect_with(&p.liberties);
            }
            for cid in lib_inter.iter() {
                if board.is_unassigned(cid) {
                    board.force_sea(cid);
                    progress = true;
                }
            }
        }
    }
    Ok(progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;

    fn grow(board: &mut Board, paths: &mut BTreeMap<GroupId, PathSet>, depth: usize) {
        grow_all(board, paths, depth, &mut SolveStats::default()).unwrap();
    }

    #[test]
    fn test_island_paths_enumerate_and_terminate() {
        // clue 2 with the far corner already sea: both one-cell completions
        let mut board = Board::from_rows(&["2-", "--"]).unwrap();
        board.become_sea(3).unwrap();
        board.dirty.clear();

        let mut paths = BTreeMap::new();
        grow(&mut board, &mut paths, 1);
        let set = paths.get(&0).unwrap();
        assert_eq!(set.paths.len(), 2);
        assert!(set.paths.iter().all(|p| p.terminated));
        let mut members: Vec<Vec<usize>> = set
            .paths
            .iter()
            .map(|p| p.members.iter().collect())
            .collect();
        members.sort();
        assert_eq!(members, vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_single_completion_forces_members() {
        // a 1x4 strip: the 3-island can only grow rightward
        let mut board = Board::from_rows(&["3---"]).unwrap();
        let mut paths = BTreeMap::new();
        grow(&mut board, &mut paths, 2);
        let set = paths.get(&0).unwrap();
        assert_eq!(set.paths.len(), 1);
        assert!(set.paths[0].terminated);

        assert!(derive_overlaps(&mut board, &mut paths).unwrap());
        let forced: Vec<_> = board.island_queue.iter().copied().collect();
        assert_eq!(forced, vec![1, 2]);
    }

    #[test]
    fn test_cross_exclusion_detects_contradiction() {
        // two 2-clues on a 1x4 strip block each other completely
        let mut board = Board::from_rows(&["2--2"]).unwrap();
        let mut paths = BTreeMap::new();
        grow(&mut board, &mut paths, 1);
        let err = derive_overlaps(&mut board, &mut paths).unwrap_err();
        assert_eq!(
            err,
            Error::NoCompletion {
                pos: Position::new(0, 0)
            }
        );
    }

    #[test]
    fn test_termination_rejects_pool() {
        // with the right column already sea, completing the island downward
        // would seal a boundary that fills the right 2x2 block entirely
        let mut board = Board::from_rows(&["2--", "---"]).unwrap();
        board.become_sea(2).unwrap();
        board.become_sea(5).unwrap();
        board.dirty.clear();

        let mut paths = BTreeMap::new();
        grow(&mut board, &mut paths, 1);
        let set = paths.get(&0).unwrap();
        let members: Vec<Vec<usize>> = set
            .paths
            .iter()
            .map(|p| p.members.iter().collect())
            .collect();
        assert_eq!(members, vec![vec![1]], "the downward completion must be rejected");
    }

    #[test]
    fn test_invalidation_drops_referencing_sets() {
        let mut board = Board::from_rows(&["2--"]).unwrap();
        let mut paths = BTreeMap::new();
        grow(&mut board, &mut paths, 1);
        assert!(paths.contains_key(&0));

        board.become_sea(2).unwrap();
        invalidate_stale(&mut board, &mut paths);
        assert!(paths.is_empty());
    }
}
