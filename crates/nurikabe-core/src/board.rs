//! Board state and the cell reclassification protocol.
//!
//! The board owns the cell grid, the group arena, the two forced-cell
//! worklists, and the pool tracker. `become_island` and `become_sea` are the
//! only mutators of a cell's classification; everything the solver derives
//! funnels through them, one cell at a time.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cellset::CellSet;
use crate::error::Error;
use crate::group::{Group, GroupKind, IslandData};
use crate::pools::PoolTracker;
use crate::{CellId, GroupId};

/// A grid coordinate. `x` runs left to right, `y` top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub(crate) fn manhattan(self, other: Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Current classification of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellRole {
    Island,
    Sea,
    Unassigned,
}

#[derive(Debug)]
pub(crate) struct Cell {
    pub pos: Position,
    /// Clue value for the originating clue cell, `None` otherwise.
    pub clue: Option<usize>,
    pub group: GroupId,
    /// Adjacent cells not in the same group and not severed as conflicting.
    pub liberties: Vec<CellId>,
    /// Adjacent cells confirmed same-group.
    pub connections: Vec<CellId>,
}

/// The full solve state: grid, group partition, worklists, pool candidates.
#[derive(Debug)]
pub struct Board {
    width: usize,
    height: usize,
    pub(crate) cells: Vec<Cell>,
    groups: Vec<Option<Group>>,
    /// Clue islands still short of their clue.
    pub(crate) islands: Vec<GroupId>,
    pub(crate) complete_islands: Vec<GroupId>,
    pub(crate) orphans: Vec<GroupId>,
    pub(crate) seas: Vec<GroupId>,
    pub(crate) island_queue: VecDeque<CellId>,
    pub(crate) sea_queue: VecDeque<CellId>,
    /// Cells reclassified since the solver last swept its path caches.
    pub(crate) dirty: Vec<CellId>,
    pools: PoolTracker,
    unassigned_cells: usize,
}

fn parse_symbol(symbol: char) -> Option<Option<usize>> {
    match symbol {
        '-' => Some(None),
        '0'..='9' => Some(Some(symbol as usize - '0' as usize)),
        'a'..='z' => Some(Some(symbol as usize - 'a' as usize + 10)),
        _ => None,
    }
}

fn clue_symbol(value: usize) -> char {
    if value < 10 {
        (b'0' + value as u8) as char
    } else {
        (b'a' + (value - 10) as u8) as char
    }
}

impl Board {
    /// Build the initial partition from equal-length text rows.
    ///
    /// Digits `0`-`9` and letters `a`-`z` are clues (values 0-9 and 10-35),
    /// `-` marks an undetermined cell. Ragged rows, unknown symbols, zero
    /// clues, and orthogonally adjacent clue cells are all rejected here,
    /// before any solving starts.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, Error> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        let mut cells = Vec::with_capacity(width * height);
        let mut groups: Vec<Option<Group>> = Vec::with_capacity(width * height);
        let mut islands = Vec::new();
        let mut clue_cells = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(Error::RaggedInput { row: y });
            }
            for (x, symbol) in row.chars().enumerate() {
                let pos = Position::new(x, y);
                let clue = parse_symbol(symbol).ok_or(Error::UnknownSymbol { symbol, pos })?;
                if clue == Some(0) {
                    return Err(Error::ZeroClue { pos });
                }
                let cid = cells.len();
                cells.push(Cell {
                    pos,
                    clue,
                    group: cid,
                    liberties: Vec::new(),
                    connections: Vec::new(),
                });
                let kind = match clue {
                    Some(value) => {
                        islands.push(cid);
                        clue_cells.push(cid);
                        GroupKind::Island(IslandData {
                            clue: value,
                            origin: cid,
                            required_orphans: Vec::new(),
                            complete: false,
                        })
                    }
                    None => GroupKind::Unassigned,
                };
                groups.push(Some(Group::new(kind, cid)));
            }
        }

        let unassigned_cells = cells.len() - clue_cells.len();
        let pools = PoolTracker::new(width, height, &clue_cells);
        let mut board = Self {
            width,
            height,
            cells,
            groups,
            islands,
            complete_islands: Vec::new(),
            orphans: Vec::new(),
            seas: Vec::new(),
            island_queue: VecDeque::new(),
            sea_queue: VecDeque::new(),
            dirty: Vec::new(),
            pools,
            unassigned_cells,
        };
        for cid in 0..board.cells.len() {
            let neighbors = board.neighbor_ids(cid);
            board.cells[cid].liberties = neighbors;
        }
        for &cid in &clue_cells {
            for n in board.neighbor_ids(cid) {
                if board.cells[n].clue.is_some() {
                    return Err(Error::IslandCollision {
                        a: board.cells[cid].pos,
                        b: board.cells[n].pos,
                    });
                }
            }
        }
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Classification of the cell at `pos`.
    pub fn role(&self, pos: Position) -> CellRole {
        self.group(self.cells[self.cell_id(pos)].group).role()
    }

    /// Clue value if `pos` is a clue origin cell.
    pub fn clue_at(&self, pos: Position) -> Option<usize> {
        self.cells[self.cell_id(pos)].clue
    }

    /// Solved means: at most one sea fragment, no incomplete island, no
    /// orphan fragment, and no undetermined cell.
    pub fn is_solved(&self) -> bool {
        self.seas.len() <= 1
            && self.islands.is_empty()
            && self.orphans.is_empty()
            && self.unassigned_cells == 0
    }

    pub fn sea_fragment_count(&self) -> usize {
        self.seas.len()
    }

    pub fn incomplete_island_count(&self) -> usize {
        self.islands.len()
    }

    pub fn orphan_island_count(&self) -> usize {
        self.orphans.len()
    }

    pub fn unassigned_count(&self) -> usize {
        self.unassigned_cells
    }

    // ==================== Internal topology ====================

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn cell_id(&self, pos: Position) -> CellId {
        pos.y * self.width + pos.x
    }

    /// In-bounds orthogonal neighbors of a cell.
    pub(crate) fn neighbor_ids(&self, cid: CellId) -> Vec<CellId> {
        let Position { x, y } = self.cells[cid].pos;
        let mut out = Vec::with_capacity(4);
        if x > 0 {
            out.push(cid - 1);
        }
        if x + 1 < self.width {
            out.push(cid + 1);
        }
        if y > 0 {
            out.push(cid - self.width);
        }
        if y + 1 < self.height {
            out.push(cid + self.width);
        }
        out
    }

    pub(crate) fn group(&self, gid: GroupId) -> &Group {
        self.groups[gid].as_ref().expect("group is dead")
    }

    pub(crate) fn group_mut(&mut self, gid: GroupId) -> &mut Group {
        self.groups[gid].as_mut().expect("group is dead")
    }

    pub(crate) fn group_alive(&self, gid: GroupId) -> bool {
        self.groups.get(gid).is_some_and(|g| g.is_some())
    }

    pub(crate) fn is_unassigned(&self, cid: CellId) -> bool {
        self.group(self.cells[cid].group).is_unassigned()
    }

    pub(crate) fn is_sea(&self, cid: CellId) -> bool {
        self.group(self.cells[cid].group).is_nurikabe()
    }

    pub(crate) fn is_clue_island_cell(&self, cid: CellId) -> bool {
        self.group(self.cells[cid].group).is_clue_island()
    }

    /// Deduplicated liberties over all member cells of a group.
    pub(crate) fn group_liberties(&self, gid: GroupId) -> Vec<CellId> {
        let mut seen = CellSet::with_capacity(self.cells.len());
        let mut out = Vec::new();
        for &m in &self.group(gid).members {
            for &l in &self.cells[m].liberties {
                if seen.insert(l) {
                    out.push(l);
                }
            }
        }
        out
    }

    pub(crate) fn mark_changed(&mut self, gid: GroupId) {
        if let Some(group) = self.groups[gid].as_mut() {
            group.changed = true;
        }
    }

    pub(crate) fn clear_changed(&mut self, gid: GroupId) {
        if let Some(group) = self.groups[gid].as_mut() {
            group.changed = false;
        }
    }

    // ==================== Worklists ====================

    /// Queue a cell to become island on the next propagation drain.
    pub(crate) fn force_island(&mut self, cid: CellId) {
        self.island_queue.push_back(cid);
    }

    /// Queue a cell to become sea on the next propagation drain.
    pub(crate) fn force_sea(&mut self, cid: CellId) {
        self.sea_queue.push_back(cid);
    }

    // ==================== Adjacency bookkeeping ====================

    fn remove_liberty(&mut self, cell: CellId, liberty: CellId) -> Result<(), Error> {
        match self.cells[cell].liberties.iter().position(|&l| l == liberty) {
            Some(i) => {
                self.cells[cell].liberties.swap_remove(i);
                Ok(())
            }
            None => Err(Error::LibertyDesync {
                cell: self.cells[cell].pos,
                liberty: self.cells[liberty].pos,
            }),
        }
    }

    fn mutually_connect(&mut self, a: CellId, b: CellId) -> Result<(), Error> {
        self.remove_liberty(a, b)?;
        self.remove_liberty(b, a)?;
        self.cells[a].connections.push(b);
        self.cells[b].connections.push(a);
        let (ga, gb) = (self.cells[a].group, self.cells[b].group);
        self.mark_changed(ga);
        self.mark_changed(gb);
        Ok(())
    }

    fn mutually_disconnect(&mut self, a: CellId, b: CellId) -> Result<(), Error> {
        self.remove_liberty(a, b)?;
        self.remove_liberty(b, a)?;
        let (ga, gb) = (self.cells[a].group, self.cells[b].group);
        self.mark_changed(ga);
        self.mark_changed(gb);
        Ok(())
    }

    // ==================== Group merges ====================

    /// Move one cell into `dst`, destroying its old group if emptied.
    fn move_cell(&mut self, cid: CellId, dst: GroupId) {
        let src = self.cells[cid].group;
        if src == dst {
            return;
        }
        let was_unassigned = self.group(src).is_unassigned();
        {
            let group = self.group_mut(src);
            if let Some(i) = group.members.iter().position(|&m| m == cid) {
                group.members.swap_remove(i);
            }
        }
        self.cells[cid].group = dst;
        let emptied = self.group(src).members.is_empty();
        let dst_group = self.group_mut(dst);
        dst_group.members.push(cid);
        dst_group.changed = true;
        if was_unassigned {
            self.unassigned_cells -= 1;
        }
        if emptied {
            self.destroy_group(src);
        }
    }

    fn destroy_group(&mut self, gid: GroupId) {
        self.groups[gid] = None;
        for list in [
            &mut self.islands,
            &mut self.complete_islands,
            &mut self.orphans,
            &mut self.seas,
        ] {
            if let Some(i) = list.iter().position(|&g| g == gid) {
                list.swap_remove(i);
            }
        }
    }

    /// Reassign every member of `src` to `dst`, converting any remaining
    /// cross-liberties between the two into connections, then drop `src`.
    fn merge_groups(&mut self, src: GroupId, dst: GroupId) -> Result<(), Error> {
        let members = self.group(src).members.clone();
        for &m in &members {
            self.cells[m].group = dst;
            let libs = self.cells[m].liberties.clone();
            for l in libs {
                if self.cells[l].group == dst {
                    self.mutually_connect(m, l)?;
                }
            }
        }
        let dst_group = self.group_mut(dst);
        dst_group.members.extend(members);
        dst_group.changed = true;
        self.destroy_group(src);
        Ok(())
    }

    /// Merge two island-role groups, honoring the exclusivity rule: a clue
    /// island may absorb an orphan but never another clue island.
    fn merge_island_role(&mut self, a: GroupId, b: GroupId) -> Result<GroupId, Error> {
        let a_clue = self.group(a).is_clue_island();
        let b_clue = self.group(b).is_clue_island();
        match (a_clue, b_clue) {
            (true, true) => {
                let origin = |board: &Board, gid: GroupId| {
                    let data = board.group(gid).island().expect("clue island");
                    board.cells[data.origin].pos
                };
                Err(Error::IslandCollision {
                    a: origin(self, a),
                    b: origin(self, b),
                })
            }
            (true, false) => {
                self.absorb_orphan(b, a)?;
                Ok(a)
            }
            (false, true) => {
                self.absorb_orphan(a, b)?;
                Ok(b)
            }
            (false, false) => {
                self.merge_groups(a, b)?;
                self.substitute_required(a, b);
                Ok(b)
            }
        }
    }

    fn absorb_orphan(&mut self, orphan: GroupId, island: GroupId) -> Result<(), Error> {
        log::trace!("island group {} absorbs orphan group {}", island, orphan);
        self.merge_groups(orphan, island)?;
        self.drop_required(orphan);
        self.check_island_size(island)
    }

    /// An orphan-into-orphan merge renames the fragment for every island
    /// that listed it as a required absorption.
    fn substitute_required(&mut self, old: GroupId, new: GroupId) {
        let clue_islands: Vec<GroupId> = self
            .islands
            .iter()
            .chain(self.complete_islands.iter())
            .copied()
            .collect();
        for gid in clue_islands {
            if let Some(data) = self.group_mut(gid).island_mut() {
                if let Some(i) = data.required_orphans.iter().position(|&o| o == old) {
                    if data.required_orphans.contains(&new) {
                        data.required_orphans.swap_remove(i);
                    } else {
                        data.required_orphans[i] = new;
                    }
                }
            }
        }
    }

    fn drop_required(&mut self, orphan: GroupId) {
        let clue_islands: Vec<GroupId> = self
            .islands
            .iter()
            .chain(self.complete_islands.iter())
            .copied()
            .collect();
        for gid in clue_islands {
            if let Some(data) = self.group_mut(gid).island_mut() {
                data.required_orphans.retain(|&o| o != orphan);
            }
        }
    }

    fn check_island_size(&self, gid: GroupId) -> Result<(), Error> {
        let group = self.group(gid);
        if let Some(data) = group.island() {
            if group.members.len() > data.clue {
                return Err(Error::IslandOverflow {
                    origin: self.cells[data.origin].pos,
                    clue: data.clue,
                    size: group.members.len(),
                });
            }
        }
        Ok(())
    }

    // ==================== Reclassification ====================

    /// Turn an undetermined cell into sea. Returns false if it already was.
    pub(crate) fn become_sea(&mut self, cid: CellId) -> Result<bool, Error> {
        match self.group(self.cells[cid].group).kind {
            GroupKind::Nurikabe => return Ok(false),
            GroupKind::Island(_) | GroupKind::Orphan => {
                return Err(Error::RoleConflict {
                    pos: self.cells[cid].pos,
                })
            }
            GroupKind::Unassigned => {}
        }
        log::trace!(
            "({}, {}) becomes sea",
            self.cells[cid].pos.x,
            self.cells[cid].pos.y
        );
        self.dirty.push(cid);
        let libs = self.cells[cid].liberties.clone();

        // join and merge neighboring fragments first
        for &l in &libs {
            if !self.cells[cid].liberties.contains(&l) {
                continue; // already connected during an earlier merge
            }
            if self.group(self.cells[l].group).is_nurikabe() {
                self.mutually_connect(cid, l)?;
                let mine = self.cells[cid].group;
                let theirs = self.cells[l].group;
                if self.group(mine).is_unassigned() {
                    self.move_cell(cid, theirs);
                } else if mine != theirs {
                    self.merge_groups(mine, theirs)?;
                }
            }
        }
        // then sever island-role adjacencies
        for &l in &libs {
            if !self.cells[cid].liberties.contains(&l) {
                continue;
            }
            if self.group(self.cells[l].group).is_island_role() {
                self.mutually_disconnect(cid, l)?;
            }
        }
        // no sea neighbor: open a fresh fragment in place
        let gid = self.cells[cid].group;
        if self.group(gid).is_unassigned() {
            self.group_mut(gid).kind = GroupKind::Nurikabe;
            self.group_mut(gid).changed = true;
            self.seas.push(gid);
            self.unassigned_cells -= 1;
        }

        // pool accounting happens after the merge settles
        let update = self.pools.on_cell_sea(cid);
        if let Some(cells) = update.violated {
            return Err(Error::PoolViolation {
                corner: self.cells[cells[0]].pos,
            });
        }
        for cells in update.tripped {
            for c in cells {
                if self.is_unassigned(c) {
                    log::trace!(
                        "pool at ({}, {}) forces ({}, {}) to island",
                        self.cells[cells[0]].pos.x,
                        self.cells[cells[0]].pos.y,
                        self.cells[c].pos.x,
                        self.cells[c].pos.y
                    );
                    self.force_island(c);
                }
            }
        }
        Ok(true)
    }

    /// Turn an undetermined cell into island. Returns false if it already
    /// held an island role.
    pub(crate) fn become_island(&mut self, cid: CellId) -> Result<bool, Error> {
        match self.group(self.cells[cid].group).kind {
            GroupKind::Island(_) | GroupKind::Orphan => return Ok(false),
            GroupKind::Nurikabe => {
                return Err(Error::RoleConflict {
                    pos: self.cells[cid].pos,
                })
            }
            GroupKind::Unassigned => {}
        }
        log::trace!(
            "({}, {}) becomes island",
            self.cells[cid].pos.x,
            self.cells[cid].pos.y
        );
        self.dirty.push(cid);
        self.pools.purge_cell(cid);
        let libs = self.cells[cid].liberties.clone();

        // same-role merges first so absorption bookkeeping stays consistent
        for &l in &libs {
            if !self.cells[cid].liberties.contains(&l) {
                continue;
            }
            if self.group(self.cells[l].group).is_island_role() {
                self.mutually_connect(cid, l)?;
                let mine = self.cells[cid].group;
                let theirs = self.cells[l].group;
                if self.group(mine).is_unassigned() {
                    self.move_cell(cid, theirs);
                    self.check_island_size(theirs)?;
                } else if mine != theirs {
                    self.merge_island_role(mine, theirs)?;
                }
            }
        }
        // then sever sea adjacencies
        for &l in &libs {
            if !self.cells[cid].liberties.contains(&l) {
                continue;
            }
            if self.group(self.cells[l].group).is_nurikabe() {
                self.mutually_disconnect(cid, l)?;
            }
        }
        let gid = self.cells[cid].group;
        if self.group(gid).is_unassigned() {
            self.group_mut(gid).kind = GroupKind::Orphan;
            self.group_mut(gid).changed = true;
            self.orphans.push(gid);
            self.unassigned_cells -= 1;
            log::trace!("new orphan fragment at group {}", gid);
        }
        Ok(true)
    }

    /// Seal a clue island that reached its exact size: all its liberties are
    /// forced sea and it moves to the complete collection.
    pub(crate) fn seal_island(&mut self, gid: GroupId) {
        let liberties = self.group_liberties(gid);
        let data = self
            .group_mut(gid)
            .island_mut()
            .expect("sealing a non-island");
        data.complete = true;
        log::debug!("island group {} complete", gid);
        if let Some(i) = self.islands.iter().position(|&g| g == gid) {
            self.islands.swap_remove(i);
        }
        self.complete_islands.push(gid);
        for l in liberties {
            self.force_sea(l);
        }
    }

    /// Would forcing `sea_cells` to sea (with `island_cells` turning island)
    /// complete any live 2x2 pool?
    pub(crate) fn completes_pool(&self, island_cells: &CellSet, sea_cells: &CellSet) -> bool {
        self.pools.alive_cells().any(|cells| {
            cells
                .iter()
                .all(|&c| !island_cells.contains(c) && (self.is_sea(c) || sea_cells.contains(c)))
        })
    }

    fn cell_symbol(&self, cid: CellId) -> char {
        match self.group(self.cells[cid].group).role() {
            CellRole::Unassigned => '-',
            CellRole::Sea => 'X',
            CellRole::Island => match self.cells[cid].clue {
                Some(value) => clue_symbol(value),
                None => 'O',
            },
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..self.width {
                write!(f, "{}", self.cell_symbol(y * self.width + x))?;
            }
        }
        Ok(())
    }
}
