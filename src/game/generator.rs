use std::time::{Duration, Instant};

use log::{info, trace, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::classifier::classify;
use super::constraint_graph::ConstraintGraph;
use super::search::{search, SearchContext};
use crate::model::{Board, Difficulty, MineLayout};

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub rows: usize,
    pub cols: usize,
    /// Fraction of cells that should be mines.
    pub mine_density: f64,
    /// Relative deviation from the density target a sampled layout may have.
    pub density_tolerance: f64,
    /// The hardest technique the finished puzzle may require.
    pub difficulty: Difficulty,
    pub seed: u64,
}

impl GeneratorConfig {
    pub fn new(rows: usize, cols: usize, difficulty: Difficulty, seed: u64) -> Self {
        Self {
            rows,
            cols,
            mine_density: 0.25,
            density_tolerance: 0.05,
            difficulty,
            seed,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Layouts sampled before one landed inside the density window.
    pub layout_attempts: usize,
    pub mine_count: usize,
    pub realized_density: f64,
    /// Revealed cells visited by the hide loop (each exactly once).
    pub cells_tried: usize,
    pub cells_hidden: usize,
    /// Hides skipped because some unknown would lose its last number.
    pub skipped_unplayable: usize,
    /// Hides reverted because the grid stopped having exactly one solution.
    pub rejected_not_unique: usize,
    /// Terminal branches of the final certification solve.
    pub terminal_branches: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct GeneratedPuzzle {
    pub board: Board,
    pub layout: MineLayout,
    pub requested: Difficulty,
    /// Lowest tier that actually finishes the puzzle; at most `requested`.
    pub achieved: Difficulty,
    pub seed: u64,
    pub stats: GenerationStats,
}

/// Generate a puzzle with exactly one solution at (no more than) the
/// requested difficulty.
///
/// Starts from the "nothing hidden" grid of a sampled layout, then visits
/// every revealed cell once in seeded-random order, hiding it when the
/// puzzle keeps a unique solution and stays playable. The grid only ever
/// gets harder; the visit order is the only randomness after sampling.
pub fn generate(config: &GeneratorConfig) -> GeneratedPuzzle {
    assert!(config.rows > 0 && config.cols > 0, "board must be non-empty");
    assert!(
        config.mine_density > 0.0 && config.mine_density < 1.0,
        "mine density must be strictly between 0 and 1"
    );

    let start = Instant::now();
    let mut stats = GenerationStats::default();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let layout = sample_layout(config, &mut rng, &mut stats);
    let mut board = layout.reveal_counts();
    let (mut graph, mut state) = ConstraintGraph::build(&board);

    let mut visit_order = board.revealed_cells();
    visit_order.shuffle(&mut rng);

    info!(
        target: "generator",
        "{}x{} layout with {} mines sampled after {} attempts; trying {} cells",
        config.rows,
        config.cols,
        stats.mine_count,
        stats.layout_attempts,
        visit_order.len()
    );

    for cell in visit_order {
        stats.cells_tried += 1;

        // a hidden cell with no revealed number left beside it could never
        // be deduced; neither the new unknown nor its hidden neighbors may
        // end up in that state
        let strands_neighbor = state.unknowns[cell]
            .iter()
            .any(|&unknown| graph.constrainers(unknown).len() < 2);
        let strands_itself = board
            .neighbors(cell)
            .iter()
            .all(|&neighbor| board.is_hidden(neighbor));
        if strands_neighbor || strands_itself {
            stats.skipped_unplayable += 1;
            trace!(target: "generator", "skipping {} (would strand an unknown)", cell);
            continue;
        }

        let patch = graph.apply_hide(&mut board, &mut state, cell);
        let mut ctx = SearchContext::counting();
        search(&graph, state.clone(), config.difficulty, &mut ctx);

        if ctx.solution_count == 1 {
            stats.cells_hidden += 1;
            trace!(target: "generator", "hid {} ({} hidden so far)", cell, stats.cells_hidden);
        } else {
            stats.rejected_not_unique += 1;
            trace!(
                target: "generator",
                "reverting {} ({} solutions at {})",
                cell,
                ctx.solution_count,
                config.difficulty
            );
            graph.revert_hide(&mut board, &mut state, &patch);
        }
    }

    let mut ctx = SearchContext::counting();
    search(&graph, state.clone(), config.difficulty, &mut ctx);
    stats.terminal_branches = ctx.terminal_branches;

    let achieved = classify(&graph, &state)
        .expect("a generated grid always completes at its own difficulty");
    if achieved < config.difficulty {
        warn!(
            target: "generator",
            "target difficulty {} not reached, puzzle solves at {}",
            config.difficulty,
            achieved
        );
    }

    stats.elapsed = start.elapsed();
    info!(
        target: "generator",
        "done: hid {}/{} cells, difficulty {} (requested {}), {:?}",
        stats.cells_hidden,
        stats.cells_tried,
        achieved,
        config.difficulty,
        stats.elapsed
    );

    GeneratedPuzzle {
        board,
        layout,
        requested: config.difficulty,
        achieved,
        seed: config.seed,
        stats,
    }
}

/// Sample mine layouts until one lands inside the density acceptance band
/// and every mine touches at least one non-mine cell. A mine surrounded by
/// mines would start unconstrained, which the hide loop guards against for
/// every cell it conceals.
fn sample_layout(
    config: &GeneratorConfig,
    rng: &mut StdRng,
    stats: &mut GenerationStats,
) -> MineLayout {
    let n = config.rows * config.cols;
    let target = n as f64 * config.mine_density;

    loop {
        stats.layout_attempts += 1;
        let mines: Vec<bool> = (0..n).map(|_| rng.random_bool(config.mine_density)).collect();
        let count = mines.iter().filter(|&&mine| mine).count();
        if (count as f64 - target).abs() / target > config.density_tolerance {
            continue;
        }

        let layout = MineLayout::new(config.rows, config.cols, mines);
        let board = layout.reveal_counts();
        let unconstrained = board
            .hidden_cells()
            .into_iter()
            .any(|id| board.neighbors(id).iter().all(|&nb| board.is_hidden(nb)));
        if unconstrained {
            trace!(target: "generator", "resampling: layout has an unconstrained mine");
            continue;
        }

        stats.mine_count = count;
        stats.realized_density = layout.density();
        return layout;
    }
}

/// Convenience seeding for callers without an explicit seed.
pub fn random_seed() -> u64 {
    rand::rng().random()
}
