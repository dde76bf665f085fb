//! Basic example of using the Nurikabe engine.

use nurikabe_core::{Board, SolveStatus, Solver};

fn main() {
    let rows = ["3-3", "---", "---"];
    let mut board = Board::from_rows(&rows).expect("well-formed puzzle");
    println!("Puzzle:");
    println!("{}\n", board);

    let solver = Solver::new();
    match solver.solve_with_stats(&mut board) {
        Ok((SolveStatus::Solved, stats)) => {
            println!("Solution:");
            println!("{}", board);
            println!(
                "\nForced {} island and {} sea cells",
                stats.forced_islands, stats.forced_seas
            );
        }
        Ok((SolveStatus::Stalled, _)) => {
            println!("Deduction stalled at:");
            println!("{}", board);
        }
        Err(e) => println!("Puzzle is contradictory: {}", e),
    }
}
