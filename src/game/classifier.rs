use log::info;

use super::constraint_graph::{ConstraintGraph, SolveState};
use super::propagation::propagate;
use super::search::{search, SearchContext};
use crate::model::Difficulty;

/// Whether a solve restricted to `difficulty` finishes the grid from this
/// starting state. Below the guessing tier that means propagation alone
/// empties `remaining`; at the guessing tier it means the search reaches at
/// least one full solution.
pub fn completes_at(
    graph: &ConstraintGraph,
    base: &SolveState,
    difficulty: Difficulty,
) -> bool {
    let mut state = base.clone();
    if difficulty.allows_guessing() {
        let mut ctx = SearchContext::counting();
        search(graph, state, difficulty, &mut ctx);
        ctx.solution_count > 0
    } else {
        propagate(graph, &mut state, difficulty).is_ok() && state.is_solved()
    }
}

/// Certify the lowest difficulty that finishes a grid already known to have
/// at least one solution. Replays the engine from independent copies of the
/// same starting state, one tier at a time; never consulted while the
/// generator is still making random decisions.
pub fn classify(graph: &ConstraintGraph, base: &SolveState) -> Option<Difficulty> {
    for difficulty in Difficulty::all() {
        if completes_at(graph, base, difficulty) {
            info!(target: "classifier", "grid completes at {}", difficulty);
            return Some(difficulty);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constraint_graph::ConstraintGraph;
    use crate::model::Board;

    fn classify_board(board: &Board) -> Option<Difficulty> {
        let (graph, state) = ConstraintGraph::build(board);
        classify(&graph, &state)
    }

    #[test]
    fn test_saturated_grid_is_easy() {
        let board = Board::parse(
            "\
            3.
            ..",
        );
        assert_eq!(classify_board(&board), Some(Difficulty::Easy));
    }

    #[test]
    fn test_pair_grid_is_medium() {
        let board = Board::parse(
            "\
            1211
            ....",
        );
        assert_eq!(classify_board(&board), Some(Difficulty::Medium));
    }

    #[test]
    fn test_grid_needing_guesses_is_hard() {
        // a lone "1" over three unknowns: neither single-number nor pair
        // reasoning finishes, only the search does. The classifier asks
        // whether each tier can finish, nothing more.
        let board = Board::parse(
            "\
            1.
            ..",
        );
        assert_eq!(classify_board(&board), Some(Difficulty::Hard));
    }

    #[test]
    fn test_unresolvable_grid_has_no_tier() {
        let board = Board::parse(
            "\
            02
            ..",
        );
        assert_eq!(classify_board(&board), None);
    }
}
