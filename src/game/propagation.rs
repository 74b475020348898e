use log::trace;

use super::constraint_graph::{
    difference, intersection, remove_id, ConstraintGraph, Contradiction, SolveState,
};
use crate::model::{CellId, Difficulty};

/// Run deterministic deduction to a fixed point on one fork.
///
/// A full pass visits `remaining` back to front; a pass that changes nothing
/// ends the loop. Two single-number rules always apply; the two-number rule
/// joins in when the difficulty permits it. Returns `Err` on the first
/// inconsistency, leaving the fork in an undefined state (callers discard
/// it). `Ok` does not mean solved - `remaining` may still be non-empty.
pub fn propagate(
    graph: &ConstraintGraph,
    state: &mut SolveState,
    difficulty: Difficulty,
) -> Result<(), Contradiction> {
    let mut changed = true;
    while changed {
        changed = false;

        let mut i = state.remaining.len();
        while i > 0 {
            i -= 1;
            let current = state.remaining[i];
            let flags = state.flags_needed[current];

            if flags == 0 {
                // exhausted: every remaining unknown around this number is safe
                changed = true;
                state.remaining.remove(i);
                let safe = state.unknowns[current].clone();
                for unknown in safe {
                    state.clear_unknown(unknown, graph)?;
                }
            } else if flags as usize == state.unknowns[current].len() {
                // saturated: every remaining unknown around this number is a mine
                changed = true;
                state.remaining.remove(i);
                let mined = state.unknowns[current].clone();
                for unknown in mined {
                    state.place_mine(unknown, graph)?;
                }
            } else if difficulty.allows_pair_deduction() && state.unknowns[current].len() > 1 {
                changed |= deduce_pairs(graph, state, current)?;
            }
        }
    }
    Ok(())
}

/// The two-number rule. When one number's flags must all fall inside the
/// overlap with a partner, the partner's surplus is forced: its exclusive
/// unknowns take the leftover flags and the first number's exclusive
/// unknowns are safe.
///
/// Adjacency is static, so a pair whose overlap has shrunk below 2 can never
/// become useful again and is dropped for good; a pair that fires is dropped
/// too, since its information is now in the counts.
fn deduce_pairs(
    graph: &ConstraintGraph,
    state: &mut SolveState,
    current: CellId,
) -> Result<bool, Contradiction> {
    let mut changed = false;
    let partners = state.pairs[current].clone();

    for partner in partners {
        let shared = intersection(&state.unknowns[current], &state.unknowns[partner]);
        if shared.len() < 2 {
            remove_id(&mut state.pairs[current], partner);
            continue;
        }
        let only_current = difference(&state.unknowns[current], &shared);
        let only_partner = difference(&state.unknowns[partner], &shared);
        if only_current.is_empty() && only_partner.is_empty() {
            remove_id(&mut state.pairs[current], partner);
            continue;
        }

        let current_flags = state.flags_needed[current] as usize;
        let partner_flags = state.flags_needed[partner] as usize;
        let max_shared_flags = current_flags.min(partner_flags).min(shared.len());

        let mut fired = false;
        if current_flags == max_shared_flags
            && partner_flags == only_partner.len() + max_shared_flags
        {
            trace!(
                target: "solver",
                "pair ({}, {}): {} mines forced outside the overlap, {} cells safe",
                current,
                partner,
                only_partner.len(),
                only_current.len()
            );
            for &unknown in &only_partner {
                fired = true;
                state.place_mine(unknown, graph)?;
            }
            for &unknown in &only_current {
                fired = true;
                state.clear_unknown(unknown, graph)?;
            }
        } else if partner_flags == max_shared_flags
            && current_flags == only_current.len() + max_shared_flags
        {
            trace!(
                target: "solver",
                "pair ({}, {}): {} mines forced outside the overlap, {} cells safe",
                partner,
                current,
                only_current.len(),
                only_partner.len()
            );
            for &unknown in &only_current {
                fired = true;
                state.place_mine(unknown, graph)?;
            }
            for &unknown in &only_partner {
                fired = true;
                state.clear_unknown(unknown, graph)?;
            }
        }

        if fired {
            remove_id(&mut state.pairs[current], partner);
            changed = true;
        }
    }
    Ok(changed)
}
