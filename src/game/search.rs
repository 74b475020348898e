use itertools::Itertools;
use log::trace;

use super::constraint_graph::{remove_id, ConstraintGraph, Contradiction, SolveState};
use super::propagation::propagate;
use crate::model::{Board, CellId, Difficulty, MineLayout, SolveError};

/// C(n, r) for the 8-neighborhood: exact branching factors for cell choice.
const BINOMIAL: [[u32; 9]; 9] = [
    [1, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 0, 0, 0, 0, 0, 0, 0],
    [1, 2, 1, 0, 0, 0, 0, 0, 0],
    [1, 3, 3, 1, 0, 0, 0, 0, 0],
    [1, 4, 6, 4, 1, 0, 0, 0, 0],
    [1, 5, 10, 10, 5, 1, 0, 0, 0],
    [1, 6, 15, 20, 15, 6, 1, 0, 0],
    [1, 7, 21, 35, 35, 21, 7, 1, 0],
    [1, 8, 28, 56, 70, 56, 28, 8, 1],
];

/// Counters for one search invocation, passed by reference through the whole
/// recursion. The limit is the early exit: counting mode needs no more than
/// "two or more", solving mode no more than the first hit.
#[derive(Debug)]
pub struct SearchContext {
    solution_limit: usize,
    pub solution_count: usize,
    /// Branches that ended in a contradiction or a full solution.
    pub terminal_branches: usize,
    /// Mine bitmap of the first full solution found.
    pub solution: Option<Vec<bool>>,
}

impl SearchContext {
    /// Distinguish "exactly one" from "more than one" and stop there.
    pub fn counting() -> Self {
        Self::with_limit(2)
    }

    /// Stop at the first full solution.
    pub fn first_solution() -> Self {
        Self::with_limit(1)
    }

    /// Count every solution. Exponential in the worst case.
    pub fn exhaustive() -> Self {
        Self::with_limit(usize::MAX)
    }

    fn with_limit(solution_limit: usize) -> Self {
        Self {
            solution_limit,
            solution_count: 0,
            terminal_branches: 0,
            solution: None,
        }
    }
}

/// Exhaust a fork: propagate, then branch on the cheapest unresolved number
/// if the difficulty allows guessing.
///
/// Every branch owns its clone of the dynamic state; the graph is shared
/// read-only. Terminal outcomes per branch: contradiction, full solution, or
/// a difficulty-limited stop (propagation stalled and guessing is off).
pub fn search(
    graph: &ConstraintGraph,
    mut state: SolveState,
    difficulty: Difficulty,
    ctx: &mut SearchContext,
) {
    if propagate(graph, &mut state, difficulty).is_err() {
        ctx.terminal_branches += 1;
        return;
    }

    if state.is_solved() {
        ctx.solution_count += 1;
        ctx.terminal_branches += 1;
        if ctx.solution.is_none() {
            ctx.solution = Some(state.mines.clone());
        }
        return;
    }

    if !difficulty.allows_guessing() {
        return;
    }

    // branch where the candidate placements are fewest; ties fall to scan order
    let (position, current) = state
        .remaining
        .iter()
        .copied()
        .enumerate()
        .min_by_key(|&(_, number)| {
            BINOMIAL[state.unknowns[number].len()][state.flags_needed[number] as usize]
        })
        .expect("remaining is non-empty");
    state.remaining.remove(position);

    let unknowns = state.unknowns[current].clone();
    let flags = state.flags_needed[current] as usize;
    trace!(
        target: "solver",
        "branching on {} ({} placements of {} mines in {} cells)",
        current,
        BINOMIAL[unknowns.len()][flags],
        flags,
        unknowns.len()
    );

    for placement in unknowns.iter().copied().combinations(flags) {
        if ctx.solution_count >= ctx.solution_limit {
            break;
        }

        let mut fork = state.clone();
        // every unknown around the chosen number resolves now: the placement
        // becomes mines, the rest are safe
        for &unknown in &unknowns {
            for &number in graph.constrainers(unknown) {
                remove_id(&mut fork.unknowns[number], unknown);
            }
        }
        if apply_placement(&mut fork, graph, &placement).is_err() {
            ctx.terminal_branches += 1;
            continue;
        }
        if violates_neighbor_counts(&fork, graph, &unknowns) {
            ctx.terminal_branches += 1;
            continue;
        }
        search(graph, fork, difficulty, ctx);
    }
}

fn apply_placement(
    fork: &mut SolveState,
    graph: &ConstraintGraph,
    placement: &[CellId],
) -> Result<(), Contradiction> {
    for &mine in placement {
        fork.mines[mine] = true;
        for &number in graph.constrainers(mine) {
            if fork.flags_needed[number] == 0 {
                return Err(Contradiction);
            }
            fork.flags_needed[number] -= 1;
        }
    }
    Ok(())
}

/// After a placement, any number touching the resolved cells may be left
/// with fewer live unknowns than flags to place.
fn violates_neighbor_counts(
    fork: &SolveState,
    graph: &ConstraintGraph,
    resolved: &[CellId],
) -> bool {
    resolved.iter().any(|&unknown| {
        graph
            .constrainers(unknown)
            .iter()
            .any(|&number| fork.unknowns[number].len() < fork.flags_needed[number] as usize)
    })
}

/// Solve an ingested grid, certifying uniqueness on the way: the unique mine
/// layout if propagation and search find exactly one solution at the given
/// difficulty, an error otherwise.
pub fn solve_board(board: &Board, difficulty: Difficulty) -> Result<MineLayout, SolveError> {
    let (graph, mut state) = ConstraintGraph::build(board);

    if propagate(&graph, &mut state, difficulty).is_err() {
        return Err(SolveError::Unsatisfiable);
    }
    if state.is_solved() {
        return Ok(MineLayout::new(board.rows(), board.cols(), state.mines));
    }
    if !difficulty.allows_guessing() {
        return Err(SolveError::Stalled {
            unresolved: state.remaining.len(),
        });
    }

    let mut ctx = SearchContext::counting();
    search(&graph, state, difficulty, &mut ctx);
    trace!(
        target: "solver",
        "search finished: {} solutions, {} terminal branches",
        ctx.solution_count,
        ctx.terminal_branches
    );
    match ctx.solution_count {
        0 => Err(SolveError::Unsatisfiable),
        1 => {
            let mines = ctx.solution.expect("a counted solution is captured");
            Ok(MineLayout::new(board.rows(), board.cols(), mines))
        }
        _ => Err(SolveError::Ambiguous),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constraint_graph::ConstraintGraph;
    use crate::game::tests::UsingLogger;
    use crate::model::{Board, Difficulty};
    use test_context::test_context;

    #[test]
    fn test_binomial_table_matches_pascal() {
        for n in 1..9 {
            for r in 1..9 {
                assert_eq!(
                    BINOMIAL[n][r],
                    BINOMIAL[n - 1][r - 1] + BINOMIAL[n - 1][r]
                );
            }
        }
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_lone_number_enumerates_every_placement(_: &mut UsingLogger) {
        // a lone "1" over three unknowns has no pair to lean on; only the
        // search can finish, and it must try all three placements
        let board = Board::parse(
            "\
            1.
            ..",
        );
        let (graph, state) = ConstraintGraph::build(&board);

        let mut ctx = SearchContext::exhaustive();
        search(&graph, state, Difficulty::Hard, &mut ctx);
        assert_eq!(ctx.solution_count, 3);
        assert_eq!(ctx.terminal_branches, 3);
    }

    #[test]
    fn test_counting_stops_after_two() {
        let board = Board::parse(
            "\
            1.
            ..",
        );
        let (graph, state) = ConstraintGraph::build(&board);

        let mut ctx = SearchContext::counting();
        search(&graph, state, Difficulty::Hard, &mut ctx);
        assert_eq!(ctx.solution_count, 2);
    }

    #[test]
    fn test_first_solution_stops_at_one() {
        let board = Board::parse(
            "\
            1.
            ..",
        );
        let (graph, state) = ConstraintGraph::build(&board);

        let mut ctx = SearchContext::first_solution();
        search(&graph, state, Difficulty::Hard, &mut ctx);
        assert_eq!(ctx.solution_count, 1);
        assert!(ctx.solution.is_some());
    }

    #[test]
    fn test_tier_limited_stop_does_not_branch() {
        let board = Board::parse(
            "\
            1.
            ..",
        );
        let (graph, state) = ConstraintGraph::build(&board);

        let mut ctx = SearchContext::exhaustive();
        search(&graph, state, Difficulty::Medium, &mut ctx);
        assert_eq!(ctx.solution_count, 0);
        assert_eq!(ctx.terminal_branches, 0);
    }

    #[test]
    fn test_solve_board_unique() {
        let board = Board::parse(
            "\
            1211
            ....",
        );
        let layout = solve_board(&board, Difficulty::Hard).unwrap();
        assert_eq!(layout.to_digits(), "00001010");
        // the same grid resolves without any guessing at medium
        let layout = solve_board(&board, Difficulty::Medium).unwrap();
        assert_eq!(layout.to_digits(), "00001010");
    }

    #[test]
    fn test_solve_board_stalls_below_its_tier() {
        let board = Board::parse(
            "\
            1211
            ....",
        );
        assert_eq!(
            solve_board(&board, Difficulty::Easy),
            Err(SolveError::Stalled { unresolved: 4 })
        );
    }

    #[test]
    fn test_solve_board_ambiguous() {
        let board = Board::parse(
            "\
            11
            ..",
        );
        assert_eq!(
            solve_board(&board, Difficulty::Hard),
            Err(SolveError::Ambiguous)
        );
    }

    #[test]
    fn test_solve_board_unsatisfiable() {
        let board = Board::parse(
            "\
            02
            ..",
        );
        assert_eq!(
            solve_board(&board, Difficulty::Hard),
            Err(SolveError::Unsatisfiable)
        );
    }

    #[test]
    fn test_no_partial_state_escapes_a_contradiction() {
        // both solutions of the ambiguous grid leave exactly one mine; the
        // captured bitmap must come from a single consistent branch
        let board = Board::parse(
            "\
            11
            ..",
        );
        let (graph, state) = ConstraintGraph::build(&board);
        let mut ctx = SearchContext::exhaustive();
        search(&graph, state, Difficulty::Hard, &mut ctx);
        assert_eq!(ctx.solution_count, 2);
        let mines = ctx.solution.unwrap();
        assert_eq!(mines.iter().filter(|&&m| m).count(), 1);
    }
}
