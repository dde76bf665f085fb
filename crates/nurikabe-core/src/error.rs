//! Error taxonomy for the engine.
//!
//! Precondition violations cover malformed input and are reported before any
//! solving starts. The remaining variants are invariant violations: they mean
//! the current partition cannot be extended to any solution, either because
//! the puzzle is contradictory or because a deduction collided with an
//! earlier one. Running out of deductions is not an error; the solver reports
//! that as [`SolveStatus::Stalled`](crate::SolveStatus::Stalled).

use std::fmt;

use crate::board::Position;

/// Fatal conditions surfaced by board construction or solving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input rows have differing lengths.
    RaggedInput { row: usize },
    /// A character that is not a clue digit/letter or the `-` placeholder.
    UnknownSymbol { symbol: char, pos: Position },
    /// A clue of zero; the clue cell itself already occupies one island cell.
    ZeroClue { pos: Position },
    /// Two distinct clue-bearing islands were forced to merge.
    IslandCollision { a: Position, b: Position },
    /// A cell was forced into both roles.
    RoleConflict { pos: Position },
    /// An island grew past its clue.
    IslandOverflow {
        origin: Position,
        clue: usize,
        size: usize,
    },
    /// A 2x2 block ended up entirely sea.
    PoolViolation { corner: Position },
    /// An island-type fragment no island can absorb.
    StrandedOrphan { pos: Position },
    /// A group with no feasible completion left.
    NoCompletion { pos: Position },
    /// An adjacency was severed twice; indicates a defect in the engine.
    LibertyDesync { cell: Position, liberty: Position },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RaggedInput { row } => {
                write!(f, "row {} has a different length from the first row", row)
            }
            Error::UnknownSymbol { symbol, pos } => {
                write!(f, "unrecognized symbol '{}' at ({}, {})", symbol, pos.x, pos.y)
            }
            Error::ZeroClue { pos } => {
                write!(f, "clue at ({}, {}) must be at least 1", pos.x, pos.y)
            }
            Error::IslandCollision { a, b } => write!(
                f,
                "islands with clues at ({}, {}) and ({}, {}) cannot touch",
                a.x, a.y, b.x, b.y
            ),
            Error::RoleConflict { pos } => write!(
                f,
                "cell ({}, {}) was forced to be both island and sea",
                pos.x, pos.y
            ),
            Error::IslandOverflow { origin, clue, size } => write!(
                f,
                "island with clue {} at ({}, {}) grew to {} cells",
                clue, origin.x, origin.y, size
            ),
            Error::PoolViolation { corner } => write!(
                f,
                "2x2 sea pool with top-left corner at ({}, {})",
                corner.x, corner.y
            ),
            Error::StrandedOrphan { pos } => write!(
                f,
                "island fragment at ({}, {}) is out of reach of every clue",
                pos.x, pos.y
            ),
            Error::NoCompletion { pos } => write!(
                f,
                "group at ({}, {}) has no feasible completion",
                pos.x, pos.y
            ),
            Error::LibertyDesync { cell, liberty } => write!(
                f,
                "cell ({}, {}) does not hold a liberty at ({}, {})",
                cell.x, cell.y, liberty.x, liberty.y
            ),
        }
    }
}

impl std::error::Error for Error {}
