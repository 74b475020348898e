use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use minehunt::game::{generate, random_seed, solve_board, GenerationStats, GeneratorConfig};
use minehunt::model::{digest_of, Board, Difficulty};

#[derive(Parser)]
#[command(
    name = "minehunt",
    version,
    about = "Generate and solve logic-only minesweeper puzzles"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a puzzle with exactly one solution at the given difficulty
    Generate {
        #[arg(long, default_value_t = 20)]
        rows: usize,
        #[arg(long, default_value_t = 20)]
        cols: usize,
        /// Target fraction of cells that are mines
        #[arg(long, default_value_t = 0.25)]
        density: f64,
        /// Accepted relative deviation from the density target
        #[arg(long, default_value_t = 0.05)]
        tolerance: f64,
        /// easy/medium/hard or 0/1/2
        #[arg(long, default_value_t = Difficulty::Hard)]
        difficulty: Difficulty,
        #[arg(long)]
        seed: Option<u64>,
        /// Include the mine layout itself; it is otherwise published only as
        /// a digest
        #[arg(long)]
        reveal: bool,
    },
    /// Solve a grid given as a flat row-major digit string (9 = hidden)
    Solve {
        #[arg(long)]
        rows: usize,
        #[arg(long)]
        cols: usize,
        /// easy/medium/hard or 0/1/2
        #[arg(long, default_value_t = Difficulty::Hard)]
        difficulty: Difficulty,
        grid: String,
    },
    /// Check a submitted mine layout against a published digest
    Verify {
        #[arg(long)]
        digest: String,
        layout: String,
    },
}

/// What `generate` prints. The layout never appears unless asked for; the
/// digest alone lets a playing surface check submissions.
#[derive(Serialize)]
struct PuzzleDocument {
    rows: usize,
    cols: usize,
    seed: u64,
    requested_difficulty: Difficulty,
    achieved_difficulty: Difficulty,
    puzzle: String,
    solution_digest: String,
    generated_at: DateTime<Utc>,
    stats: GenerationStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            rows,
            cols,
            density,
            tolerance,
            difficulty,
            seed,
            reveal,
        } => {
            let config = GeneratorConfig {
                rows,
                cols,
                mine_density: density,
                density_tolerance: tolerance,
                difficulty,
                seed: seed.unwrap_or_else(random_seed),
            };
            let puzzle = generate(&config);
            let document = PuzzleDocument {
                rows,
                cols,
                seed: puzzle.seed,
                requested_difficulty: puzzle.requested,
                achieved_difficulty: puzzle.achieved,
                puzzle: puzzle.board.to_digits(),
                solution_digest: puzzle.layout.digest(),
                generated_at: Utc::now(),
                stats: puzzle.stats,
                layout: reveal.then(|| puzzle.layout.to_digits()),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&document).expect("document serializes")
            );
        }

        Command::Solve {
            rows,
            cols,
            difficulty,
            grid,
        } => {
            let board = match Board::from_digits(&grid, rows, cols) {
                Ok(board) => board,
                Err(err) => {
                    eprintln!("invalid grid: {}", err);
                    std::process::exit(1);
                }
            };
            match solve_board(&board, difficulty) {
                Ok(layout) => {
                    println!("{}", layout.to_digits());
                    for (row, col) in layout.mine_coords() {
                        println!("flag {} {}", row, col);
                    }
                }
                Err(err) => {
                    eprintln!("nothing to submit: {}", err);
                    std::process::exit(2);
                }
            }
        }

        Command::Verify { digest, layout } => {
            if digest_of(layout.trim()) == digest.to_ascii_lowercase() {
                println!("ok");
            } else {
                eprintln!("digest mismatch");
                std::process::exit(3);
            }
        }
    }
}
