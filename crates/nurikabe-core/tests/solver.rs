//! End-to-end solver properties checked through the public API only.

use nurikabe_core::{Board, CellRole, Position, SolveStatus, Solver};

fn solve(rows: &[&str]) -> (Board, SolveStatus) {
    let mut board = Board::from_rows(rows).unwrap();
    let status = Solver::new().solve(&mut board).unwrap();
    (board, status)
}

fn all_positions(board: &Board) -> Vec<Position> {
    (0..board.height())
        .flat_map(|y| (0..board.width()).map(move |x| Position::new(x, y)))
        .collect()
}

fn neighbors(board: &Board, pos: Position) -> Vec<Position> {
    let mut out = Vec::new();
    if pos.x > 0 {
        out.push(Position::new(pos.x - 1, pos.y));
    }
    if pos.x + 1 < board.width() {
        out.push(Position::new(pos.x + 1, pos.y));
    }
    if pos.y > 0 {
        out.push(Position::new(pos.x, pos.y - 1));
    }
    if pos.y + 1 < board.height() {
        out.push(Position::new(pos.x, pos.y + 1));
    }
    out
}

/// Connected components of cells holding `role`.
fn regions(board: &Board, role: CellRole) -> Vec<Vec<Position>> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for start in all_positions(board) {
        if board.role(start) != role || seen.contains(&start) {
            continue;
        }
        let mut region = Vec::new();
        let mut stack = vec![start];
        seen.insert(start);
        while let Some(pos) = stack.pop() {
            region.push(pos);
            for n in neighbors(board, pos) {
                if board.role(n) == role && seen.insert(n) {
                    stack.push(n);
                }
            }
        }
        out.push(region);
    }
    out
}

/// Check every solution property: no undetermined cells, one connected sea,
/// clue-sized islands each holding exactly one clue, and no 2x2 sea pool.
fn assert_valid_solution(board: &Board) {
    for pos in all_positions(board) {
        assert_ne!(board.role(pos), CellRole::Unassigned, "cell {:?}", pos);
    }

    let seas = regions(board, CellRole::Sea);
    assert!(seas.len() <= 1, "sea split into {} regions", seas.len());

    for island in regions(board, CellRole::Island) {
        let clues: Vec<usize> = island.iter().filter_map(|&p| board.clue_at(p)).collect();
        assert_eq!(clues.len(), 1, "island {:?} holds {} clues", island, clues.len());
        assert_eq!(
            clues[0],
            island.len(),
            "island {:?} has the wrong size",
            island
        );
    }

    for y in 0..board.height().saturating_sub(1) {
        for x in 0..board.width().saturating_sub(1) {
            let block = [
                Position::new(x, y),
                Position::new(x + 1, y),
                Position::new(x, y + 1),
                Position::new(x + 1, y + 1),
            ];
            assert!(
                !block.iter().all(|&p| board.role(p) == CellRole::Sea),
                "2x2 sea pool at ({}, {})",
                x,
                y
            );
        }
    }
}

#[test]
fn test_solved_boards_are_valid() {
    let puzzles: &[&[&str]] = &[
        &["3-3", "---", "---"],
        &["1-", "--"],
        &["3---", "----"],
        &["1-1-1", "-----", "1-1-1", "-----", "1-1-1"],
        &["---", "-1-", "---"],
    ];
    for rows in puzzles {
        let (board, status) = solve(rows);
        assert_eq!(status, SolveStatus::Solved, "puzzle {:?}", rows);
        assert_valid_solution(&board);
    }
}

#[test]
fn test_clue_cells_never_reassigned() {
    let rows = &["3-3", "---", "---"];
    let (board, _) = solve(rows);
    assert_eq!(board.role(Position::new(0, 0)), CellRole::Island);
    assert_eq!(board.role(Position::new(2, 0)), CellRole::Island);
    assert_eq!(board.clue_at(Position::new(0, 0)), Some(3));
    assert_eq!(board.clue_at(Position::new(2, 0)), Some(3));
    assert_eq!(board.clue_at(Position::new(1, 1)), None);
}

#[test]
fn test_stalled_board_keeps_partial_deductions() {
    let (board, status) = solve(&["2-", "--"]);
    assert_eq!(status, SolveStatus::Stalled);
    assert_eq!(board.unassigned_count(), 2);
    assert_eq!(board.incomplete_island_count(), 1);
    assert_eq!(board.role(Position::new(1, 1)), CellRole::Sea);
}

#[test]
fn test_counters_on_solved_board() {
    let (board, _) = solve(&["1-", "--"]);
    assert_eq!(board.sea_fragment_count(), 1);
    assert_eq!(board.incomplete_island_count(), 0);
    assert_eq!(board.orphan_island_count(), 0);
    assert_eq!(board.unassigned_count(), 0);
}

#[test]
fn test_malformed_input_rejected_before_solving() {
    assert!(Board::from_rows(&["3-3", "--"]).is_err());
    assert!(Board::from_rows(&["3*3", "---", "---"]).is_err());
}
