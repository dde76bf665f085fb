//! Group arena entries.
//!
//! Every cell belongs to exactly one group at all times. Groups are slots in
//! an arena owned by the board; a merge drains one slot into another and
//! leaves the source dead, so group ids stay stable for the survivors.

use crate::board::CellRole;
use crate::{CellId, GroupId};

/// Role-specific payload carried by an island that originates from a clue.
#[derive(Debug)]
pub(crate) struct IslandData {
    /// Exact number of cells this island must reach.
    pub clue: usize,
    /// The clue cell the island grew from.
    pub origin: CellId,
    /// Orphan fragments this island is the only one able to absorb.
    pub required_orphans: Vec<GroupId>,
    /// Set once the island reaches its clue and is sealed.
    pub complete: bool,
}

/// The closed set of roles a group can hold.
#[derive(Debug)]
pub(crate) enum GroupKind {
    /// A single undetermined cell.
    Unassigned,
    /// Cells attached to exactly one clue.
    Island(IslandData),
    /// A connected island-type fragment not yet linked to a clue.
    Orphan,
    /// A connected sea fragment.
    Nurikabe,
}

#[derive(Debug)]
pub(crate) struct Group {
    pub kind: GroupKind,
    pub members: Vec<CellId>,
    /// Re-evaluate this group's local rules on the next pass.
    pub changed: bool,
}

impl Group {
    pub fn new(kind: GroupKind, member: CellId) -> Self {
        Self {
            kind,
            members: vec![member],
            changed: true,
        }
    }

    /// True for a clue-bearing island.
    pub fn is_clue_island(&self) -> bool {
        matches!(self.kind, GroupKind::Island(_))
    }

    /// True for either island-type role.
    pub fn is_island_role(&self) -> bool {
        matches!(self.kind, GroupKind::Island(_) | GroupKind::Orphan)
    }

    pub fn is_orphan(&self) -> bool {
        matches!(self.kind, GroupKind::Orphan)
    }

    pub fn is_nurikabe(&self) -> bool {
        matches!(self.kind, GroupKind::Nurikabe)
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self.kind, GroupKind::Unassigned)
    }

    pub fn island(&self) -> Option<&IslandData> {
        match &self.kind {
            GroupKind::Island(data) => Some(data),
            _ => None,
        }
    }

    pub fn island_mut(&mut self) -> Option<&mut IslandData> {
        match &mut self.kind {
            GroupKind::Island(data) => Some(data),
            _ => None,
        }
    }

    /// The classification this group gives its member cells.
    pub fn role(&self) -> CellRole {
        match self.kind {
            GroupKind::Unassigned => CellRole::Unassigned,
            GroupKind::Island(_) | GroupKind::Orphan => CellRole::Island,
            GroupKind::Nurikabe => CellRole::Sea,
        }
    }
}
