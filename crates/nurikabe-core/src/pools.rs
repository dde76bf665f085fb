//! Candidate 2x2 sea pools.
//!
//! Every 2x2 block of the grid starts as a candidate pool. A pool dies the
//! moment any of its four cells becomes island; while alive it counts its sea
//! cells so that three-of-four immediately forces the last cell to island.

use crate::CellId;

#[derive(Debug)]
struct Pool {
    cells: [CellId; 4],
    sea: u8,
    alive: bool,
}

#[derive(Debug)]
pub(crate) struct PoolTracker {
    pools: Vec<Pool>,
    /// Pool indices each cell participates in (at most four).
    cell_pools: Vec<Vec<usize>>,
}

/// Result of registering one cell turning sea.
pub(crate) struct SeaUpdate {
    /// Pools that now hold exactly three sea cells.
    pub tripped: Vec<[CellId; 4]>,
    /// A pool that became entirely sea, if any.
    pub violated: Option<[CellId; 4]>,
}

impl PoolTracker {
    pub fn new(width: usize, height: usize, island_cells: &[CellId]) -> Self {
        let cell_count = width * height;
        let mut pools = Vec::new();
        let mut cell_pools = vec![Vec::new(); cell_count];
        if width >= 2 && height >= 2 {
            for y in 0..height - 1 {
                for x in 0..width - 1 {
                    let corner = y * width + x;
                    let cells = [corner, corner + 1, corner + width, corner + width + 1];
                    let index = pools.len();
                    pools.push(Pool {
                        cells,
                        sea: 0,
                        alive: true,
                    });
                    for cell in cells {
                        cell_pools[cell].push(index);
                    }
                }
            }
        }
        let mut tracker = Self { pools, cell_pools };
        for &cell in island_cells {
            tracker.purge_cell(cell);
        }
        tracker
    }

    /// Delete every pool containing a cell that just became island.
    pub fn purge_cell(&mut self, cell: CellId) {
        for &index in &self.cell_pools[cell] {
            self.pools[index].alive = false;
        }
    }

    /// Register a cell turning sea and report pools that reached three or
    /// four sea cells.
    pub fn on_cell_sea(&mut self, cell: CellId) -> SeaUpdate {
        let mut update = SeaUpdate {
            tripped: Vec::new(),
            violated: None,
        };
        for &index in &self.cell_pools[cell] {
            let pool = &mut self.pools[index];
            if !pool.alive {
                continue;
            }
            pool.sea += 1;
            if pool.sea == 3 {
                update.tripped.push(pool.cells);
            } else if pool.sea >= 4 {
                update.violated = Some(pool.cells);
            }
        }
        update
    }

    /// Cell quadruples of all surviving pools.
    pub fn alive_cells(&self) -> impl Iterator<Item = &[CellId; 4]> {
        self.pools.iter().filter(|p| p.alive).map(|p| &p.cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_pools_skip_islands() {
        // 3x2 grid with an island at cell 1 kills both pools containing it.
        let tracker = PoolTracker::new(3, 2, &[1]);
        assert_eq!(tracker.alive_cells().count(), 0);

        let tracker = PoolTracker::new(3, 2, &[]);
        assert_eq!(tracker.alive_cells().count(), 2);
    }

    #[test]
    fn test_three_sea_trips() {
        let mut tracker = PoolTracker::new(2, 2, &[]);
        assert!(tracker.on_cell_sea(0).tripped.is_empty());
        assert!(tracker.on_cell_sea(1).tripped.is_empty());
        let update = tracker.on_cell_sea(2);
        assert_eq!(update.tripped, vec![[0, 1, 2, 3]]);
        assert!(update.violated.is_none());

        let update = tracker.on_cell_sea(3);
        assert_eq!(update.violated, Some([0, 1, 2, 3]));
    }

    #[test]
    fn test_purged_pool_never_trips() {
        let mut tracker = PoolTracker::new(2, 2, &[]);
        tracker.on_cell_sea(0);
        tracker.on_cell_sea(1);
        tracker.purge_cell(3);
        let update = tracker.on_cell_sea(2);
        assert!(update.tripped.is_empty());
        assert_eq!(tracker.alive_cells().count(), 0);
    }
}
