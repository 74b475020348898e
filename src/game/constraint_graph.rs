use crate::model::{Board, CellId};

/// Internal prune signal: a fork's constraints are jointly unsatisfiable.
/// Never surfaced past the search; the fork that produced it is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contradiction;

/// Static adjacency for one candidate grid: which revealed numbers constrain
/// each hidden cell. Built once per grid and shared read-only by every
/// solve fork; only the generator patches it, when it hides or restores a
/// cell of the base grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintGraph {
    constrainers: Vec<Vec<CellId>>,
}

/// The mutable half of a solve: per-number live state plus the mine bitmap
/// accumulated so far. Each backtracking branch owns an independent clone;
/// branches never observe each other's mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveState {
    /// Unresolved numbers, ascending by id.
    pub remaining: Vec<CellId>,
    /// Mines still to be located among each number's live unknowns.
    pub flags_needed: Vec<u8>,
    /// Per number: adjacent hidden cells not yet resolved, sorted.
    pub unknowns: Vec<Vec<CellId>>,
    /// Per number: pair partners still worth a two-number look, sorted.
    /// Each unordered pair is held by its lower-id member only.
    pub pairs: Vec<Vec<CellId>>,
    /// Mines placed so far in this fork.
    pub mines: Vec<bool>,
}

/// Everything needed to undo one tentative hide.
#[derive(Debug, Clone)]
pub struct HidePatch {
    pub cell: CellId,
    pub count: u8,
    constrainers_of_cell: Vec<CellId>,
    hidden_neighbors: Vec<CellId>,
    pair_owners: Vec<CellId>,
}

impl ConstraintGraph {
    /// Build the graph and the base dynamic state for a grid.
    pub fn build(board: &Board) -> (ConstraintGraph, SolveState) {
        let n = board.len();
        let mut constrainers = vec![Vec::new(); n];
        let mut remaining = Vec::new();
        let mut flags_needed = vec![0u8; n];
        let mut unknowns = vec![Vec::new(); n];
        let mut pairs = vec![Vec::new(); n];

        for id in 0..n {
            if board.is_hidden(id) {
                constrainers[id] = board
                    .neighbors(id)
                    .into_iter()
                    .filter(|&nb| !board.is_hidden(nb))
                    .collect();
                continue;
            }
            remaining.push(id);
            flags_needed[id] = board.get(id);
            unknowns[id] = board
                .neighbors(id)
                .into_iter()
                .filter(|&nb| board.is_hidden(nb))
                .collect();
            pairs[id] = pair_partners_after(board, id);
        }

        (
            ConstraintGraph { constrainers },
            SolveState {
                remaining,
                flags_needed,
                unknowns,
                pairs,
                mines: vec![false; n],
            },
        )
    }

    /// The revealed numbers adjacent to a hidden cell.
    pub fn constrainers(&self, unknown: CellId) -> &[CellId] {
        &self.constrainers[unknown]
    }

    /// Hide a revealed cell of the base grid, patching the adjacency and the
    /// base dynamic state for the cell and its neighbors only. The returned
    /// patch undoes the whole operation.
    pub fn apply_hide(
        &mut self,
        board: &mut Board,
        state: &mut SolveState,
        cell: CellId,
    ) -> HidePatch {
        let count = board.hide(cell);
        let neighbors = board.neighbors(cell);
        let constrainers_of_cell: Vec<CellId> = neighbors
            .iter()
            .copied()
            .filter(|&nb| !board.is_hidden(nb))
            .collect();
        let hidden_neighbors: Vec<CellId> = neighbors
            .iter()
            .copied()
            .filter(|&nb| board.is_hidden(nb))
            .collect();

        self.constrainers[cell] = constrainers_of_cell.clone();
        for &unknown in &hidden_neighbors {
            remove_id(&mut self.constrainers[unknown], cell);
        }

        remove_id(&mut state.remaining, cell);
        for &number in &constrainers_of_cell {
            insert_id(&mut state.unknowns[number], cell);
        }
        // The cell's own flags_needed/unknowns/pairs entries go stale here;
        // nothing reads them once the cell has left `remaining`.
        let pair_owners = pair_partners_before(board, cell);
        for &owner in &pair_owners {
            remove_id(&mut state.pairs[owner], cell);
        }

        HidePatch {
            cell,
            count,
            constrainers_of_cell,
            hidden_neighbors,
            pair_owners,
        }
    }

    /// Undo `apply_hide`.
    pub fn revert_hide(&mut self, board: &mut Board, state: &mut SolveState, patch: &HidePatch) {
        board.reveal(patch.cell, patch.count);
        self.constrainers[patch.cell].clear();
        for &unknown in &patch.hidden_neighbors {
            insert_id(&mut self.constrainers[unknown], patch.cell);
        }
        insert_id(&mut state.remaining, patch.cell);
        for &number in &patch.constrainers_of_cell {
            remove_id(&mut state.unknowns[number], patch.cell);
        }
        for &owner in &patch.pair_owners {
            insert_id(&mut state.pairs[owner], patch.cell);
        }
    }
}

impl SolveState {
    pub fn is_solved(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Resolve a hidden cell as a mine: record it and consume one flag from
    /// every number constraining it. A constrainer with no flags left to
    /// give is over-saturated.
    pub fn place_mine(
        &mut self,
        unknown: CellId,
        graph: &ConstraintGraph,
    ) -> Result<(), Contradiction> {
        self.mines[unknown] = true;
        for &number in graph.constrainers(unknown) {
            if self.flags_needed[number] == 0 {
                return Err(Contradiction);
            }
            self.flags_needed[number] -= 1;
            remove_id(&mut self.unknowns[number], unknown);
        }
        Ok(())
    }

    /// Resolve a hidden cell as safe: drop it from every constrainer's live
    /// set. A constrainer left with fewer live unknowns than flags to place
    /// can no longer be satisfied.
    pub fn clear_unknown(
        &mut self,
        unknown: CellId,
        graph: &ConstraintGraph,
    ) -> Result<(), Contradiction> {
        for &number in graph.constrainers(unknown) {
            remove_id(&mut self.unknowns[number], unknown);
            if self.unknowns[number].len() < self.flags_needed[number] as usize {
                return Err(Contradiction);
            }
        }
        Ok(())
    }
}

/// Revealed cells after `id` in scan order that sit inside its 5x5 box,
/// minus the 4 corners. A corner-to-corner pair shares at most one cell, so
/// it can never feed the two-number deduction.
fn pair_partners_after(board: &Board, id: CellId) -> Vec<CellId> {
    let (row, col) = board.coords(id);
    let mut partners = Vec::new();
    for r in row..=(row + 2).min(board.rows() - 1) {
        for c in col.saturating_sub(2)..=(col + 2).min(board.cols() - 1) {
            let other = board.cell_id(r, c);
            if other <= id || board.is_hidden(other) {
                continue;
            }
            if r == row + 2 && (c + 2 == col || c == col + 2) {
                continue;
            }
            partners.push(other);
        }
    }
    partners
}

/// The mirror scan: revealed cells before `id` whose pair list holds it.
fn pair_partners_before(board: &Board, id: CellId) -> Vec<CellId> {
    let (row, col) = board.coords(id);
    let mut owners = Vec::new();
    for r in row.saturating_sub(2)..=row {
        for c in col.saturating_sub(2)..=(col + 2).min(board.cols() - 1) {
            let other = board.cell_id(r, c);
            if other >= id || board.is_hidden(other) {
                continue;
            }
            if row == r + 2 && (c + 2 == col || c == col + 2) {
                continue;
            }
            owners.push(other);
        }
    }
    owners
}

// Live sets are small sorted vecs; 8-neighborhoods cap them at 8 entries,
// pair lists at 10.

pub(crate) fn remove_id(set: &mut Vec<CellId>, id: CellId) {
    if let Ok(pos) = set.binary_search(&id) {
        set.remove(pos);
    }
}

pub(crate) fn insert_id(set: &mut Vec<CellId>, id: CellId) {
    if let Err(pos) = set.binary_search(&id) {
        set.insert(pos, id);
    }
}

pub(crate) fn intersection(a: &[CellId], b: &[CellId]) -> Vec<CellId> {
    a.iter()
        .copied()
        .filter(|id| b.binary_search(id).is_ok())
        .collect()
}

pub(crate) fn difference(a: &[CellId], b: &[CellId]) -> Vec<CellId> {
    a.iter()
        .copied()
        .filter(|id| b.binary_search(id).is_err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Board;

    #[test]
    fn test_build_small_grid() {
        let board = Board::parse(
            "\
            12.
            .21",
        );
        let (graph, state) = ConstraintGraph::build(&board);

        assert_eq!(state.remaining, vec![0, 1, 4, 5]);
        assert_eq!(state.flags_needed, vec![1, 2, 0, 0, 2, 1]);

        // back references of the two hidden cells
        assert_eq!(graph.constrainers(2), &[1, 4, 5]);
        assert_eq!(graph.constrainers(3), &[0, 1, 4]);

        // live unknown sets of the numbers
        assert_eq!(state.unknowns[0], vec![3]);
        assert_eq!(state.unknowns[1], vec![2, 3]);
        assert_eq!(state.unknowns[4], vec![2, 3]);
        assert_eq!(state.unknowns[5], vec![2]);

        // pair relation: forward-only, each pair once
        assert_eq!(state.pairs[0], vec![1, 4, 5]);
        assert_eq!(state.pairs[1], vec![4, 5]);
        assert_eq!(state.pairs[4], vec![5]);
        assert!(state.pairs[5].is_empty());
    }

    #[test]
    fn test_pair_box_excludes_corners() {
        let board = Board::parse(
            "\
            00000
            00000
            00000
            00000
            00000",
        );
        let (_, state) = ConstraintGraph::build(&board);

        // from the top-left corner: 5x5 box clipped to 3x3, minus (2,2)
        assert_eq!(state.pairs[0], vec![1, 2, 5, 6, 7, 10, 11]);
        // from the center: everything forward except the two bottom corners
        assert_eq!(
            state.pairs[12],
            vec![13, 14, 15, 16, 17, 18, 19, 21, 22, 23]
        );
    }

    #[test]
    fn test_apply_hide_patches_neighborhood() {
        let mut board = Board::parse(
            "\
            12.
            .21",
        );
        let (mut graph, mut state) = ConstraintGraph::build(&board);

        graph.apply_hide(&mut board, &mut state, 0);

        assert!(board.is_hidden(0));
        assert_eq!(graph.constrainers(0), &[1, 4]);
        assert_eq!(graph.constrainers(3), &[1, 4]);
        assert_eq!(state.remaining, vec![1, 4, 5]);
        assert_eq!(state.unknowns[1], vec![0, 2, 3]);
        assert_eq!(state.unknowns[4], vec![0, 2, 3]);
    }

    #[test]
    fn test_revert_hide_restores_everything() {
        let mut board = Board::parse(
            "\
            12.
            .21",
        );
        let (mut graph, mut state) = ConstraintGraph::build(&board);
        let original_board = board.clone();
        let original_graph = graph.clone();
        let original_state = state.clone();

        for cell in board.revealed_cells() {
            let patch = graph.apply_hide(&mut board, &mut state, cell);
            graph.revert_hide(&mut board, &mut state, &patch);
            assert_eq!(board, original_board);
            assert_eq!(graph, original_graph);
            assert_eq!(state, original_state);
        }
    }

    #[test]
    fn test_hide_drops_pair_entries() {
        let mut board = Board::parse(
            "\
            000
            000
            000",
        );
        let (mut graph, mut state) = ConstraintGraph::build(&board);
        assert!(state.pairs[0].contains(&4));

        let patch = graph.apply_hide(&mut board, &mut state, 4);
        assert!(!state.pairs[0].contains(&4));
        assert!(state.pairs[1].iter().all(|&p| p != 4));

        graph.revert_hide(&mut board, &mut state, &patch);
        assert!(state.pairs[0].contains(&4));
    }

    #[test]
    fn test_sorted_set_ops() {
        let mut set = vec![2, 5, 9];
        insert_id(&mut set, 4);
        assert_eq!(set, vec![2, 4, 5, 9]);
        insert_id(&mut set, 4);
        assert_eq!(set, vec![2, 4, 5, 9]);
        remove_id(&mut set, 5);
        assert_eq!(set, vec![2, 4, 9]);
        assert_eq!(intersection(&set, &[4, 9, 11]), vec![4, 9]);
        assert_eq!(difference(&set, &[4, 9, 11]), vec![2]);
    }
}
