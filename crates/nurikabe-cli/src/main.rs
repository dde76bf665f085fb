//! Command-line front end: read a puzzle, run the deduction engine, print
//! the resulting partition and a one-line status.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nurikabe_core::{Board, SolveStatus, Solver, SolverConfig};

/// Solve a Nurikabe puzzle given as text rows.
///
/// Each row uses digits 0-9 or letters a-z for clues and '-' for
/// undetermined cells. The solution prints clue cells as their clue
/// character, other island cells as 'O', and sea cells as 'X'.
#[derive(Parser)]
#[command(name = "nurikabe")]
struct Cli {
    /// Puzzle file; reads stdin when omitted.
    file: Option<PathBuf>,

    /// Cap the path-search depth (defaults to the board area).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Print solve statistics.
    #[arg(long)]
    stats: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let text = match &cli.file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut board = Board::from_rows(&rows)?;
    let solver = Solver::with_config(SolverConfig {
        max_depth: cli.max_depth,
    });
    let (status, stats) = solver.solve_with_stats(&mut board)?;

    println!("{}", board);
    match status {
        SolveStatus::Solved => println!("solved"),
        SolveStatus::Stalled => println!("not solved"),
    }
    if cli.stats {
        println!(
            "forced {} island / {} sea cells, {} path rounds, depth {}, {} restarts",
            stats.forced_islands,
            stats.forced_seas,
            stats.path_rounds,
            stats.deepest_search,
            stats.restarts
        );
    }
    Ok(ExitCode::SUCCESS)
}
