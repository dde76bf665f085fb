//! Core Nurikabe deduction engine.
//!
//! A board is partitioned into island, sea, and undetermined cells. The
//! solver drives that partition toward a full solution by propagating local
//! rules to a fixed point and, when those stall, enumerating bounded
//! completion paths per group to discover cells forced in every feasible
//! completion. Parsing text rows in and rendering the partition back out are
//! the only external surfaces; there is no I/O in this crate.

pub mod board;
pub mod cellset;
pub mod error;
mod group;
mod pools;
pub mod solver;

pub use board::{Board, CellRole, Position};
pub use cellset::CellSet;
pub use error::Error;
pub use solver::{SolveStats, SolveStatus, Solver, SolverConfig};

/// Linear cell index into the board grid.
pub(crate) type CellId = usize;

/// Stable index into the group arena.
pub(crate) type GroupId = usize;
