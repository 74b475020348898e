use serde::{Deserialize, Serialize};

use super::BoardError;

/// Dense row-major index of a board position. All per-cell structures in the
/// engine are `Vec`s indexed by this.
pub type CellId = usize;

/// Sentinel digit for a hidden cell in the wire encoding.
pub const HIDDEN: u8 = 9;

/// A puzzle grid: every cell is either a revealed adjacent-mine count (0-8)
/// or hidden. Hidden cells are the cells the player reasons about - the
/// mines plus any counts the generator chose to conceal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = String::new();
        output.push('\n');
        for row in 0..self.rows {
            for col in 0..self.cols {
                let value = self.cells[row * self.cols + col];
                if value == HIDDEN {
                    output.push('.');
                } else {
                    output.push((b'0' + value) as char);
                }
            }
            output.push('\n');
        }
        write!(f, "{}", output)
    }
}

impl Board {
    /// Decode the flat row-major wire format: digits `0`-`8` for revealed
    /// counts, `9` for hidden cells.
    pub fn from_digits(input: &str, rows: usize, cols: usize) -> Result<Self, BoardError> {
        let trimmed = input.trim();
        if trimmed.chars().count() != rows * cols {
            return Err(BoardError::DimensionMismatch {
                rows,
                cols,
                len: trimmed.chars().count(),
            });
        }
        let mut cells = Vec::with_capacity(rows * cols);
        for (index, symbol) in trimmed.chars().enumerate() {
            match symbol.to_digit(10) {
                Some(digit) => cells.push(digit as u8),
                None => return Err(BoardError::InvalidSymbol { index, symbol }),
            }
        }
        Ok(Self { rows, cols, cells })
    }

    /// Parse a multi-line fixture, one row per line, `.` (or `9`) for hidden
    /// cells. Panics on malformed input; fixtures are authored by hand.
    pub fn parse(input: &str) -> Self {
        let lines: Vec<&str> = input
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();
        let rows = lines.len();
        assert!(rows > 0, "empty board fixture");
        let cols = lines[0].chars().count();
        let mut cells = Vec::with_capacity(rows * cols);
        for line in &lines {
            assert_eq!(line.chars().count(), cols, "ragged board fixture: {}", line);
            for symbol in line.chars() {
                match symbol {
                    '.' => cells.push(HIDDEN),
                    '0'..='9' => cells.push(symbol as u8 - b'0'),
                    _ => panic!("bad symbol {:?} in board fixture", symbol),
                }
            }
        }
        Self { rows, cols, cells }
    }

    /// Encode to the flat row-major wire format.
    pub fn to_digits(&self) -> String {
        self.cells.iter().map(|&v| (b'0' + v) as char).collect()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_id(&self, row: usize, col: usize) -> CellId {
        row * self.cols + col
    }

    pub fn coords(&self, id: CellId) -> (usize, usize) {
        (id / self.cols, id % self.cols)
    }

    pub fn get(&self, id: CellId) -> u8 {
        self.cells[id]
    }

    pub fn is_hidden(&self, id: CellId) -> bool {
        self.cells[id] == HIDDEN
    }

    /// Hide a revealed cell, returning the count it showed.
    pub fn hide(&mut self, id: CellId) -> u8 {
        let count = self.cells[id];
        debug_assert_ne!(count, HIDDEN, "cell {} already hidden", id);
        self.cells[id] = HIDDEN;
        count
    }

    /// Restore a previously hidden cell to its revealed count.
    pub fn reveal(&mut self, id: CellId, count: u8) {
        self.cells[id] = count;
    }

    /// The 8-neighborhood of a cell, clipped to the board, in row-major
    /// order (so the result is sorted by id).
    pub fn neighbors(&self, id: CellId) -> Vec<CellId> {
        let (row, col) = self.coords(id);
        let mut out = Vec::with_capacity(8);
        for r in row.saturating_sub(1)..=(row + 1).min(self.rows - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(self.cols - 1) {
                if r == row && c == col {
                    continue;
                }
                out.push(self.cell_id(r, c));
            }
        }
        out
    }

    /// Ids of all revealed cells, in row-major order.
    pub fn revealed_cells(&self) -> Vec<CellId> {
        (0..self.cells.len())
            .filter(|&id| !self.is_hidden(id))
            .collect()
    }

    /// Ids of all hidden cells, in row-major order.
    pub fn hidden_cells(&self) -> Vec<CellId> {
        (0..self.cells.len())
            .filter(|&id| self.is_hidden(id))
            .collect()
    }
}
