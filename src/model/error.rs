use std::fmt;

/// An ingested grid that cannot be solved against: wrong length for the
/// declared dimensions, or a symbol outside the digit encoding. Detected at
/// parse time, before any solving begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    DimensionMismatch {
        rows: usize,
        cols: usize,
        len: usize,
    },
    InvalidSymbol {
        index: usize,
        symbol: char,
    },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::DimensionMismatch { rows, cols, len } => write!(
                f,
                "declared {}x{} board ({} cells) but got {} symbols",
                rows,
                cols,
                rows * cols,
                len
            ),
            BoardError::InvalidSymbol { index, symbol } => {
                write!(f, "invalid symbol {:?} at offset {}", symbol, index)
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// A solve that finished without a unique actionable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// Propagation reached its fixed point with numbers still unresolved and
    /// the tier forbids the guessing that would be needed.
    Stalled { unresolved: usize },
    /// More than one mine assignment satisfies the grid.
    Ambiguous,
    /// No mine assignment satisfies the grid.
    Unsatisfiable,
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Stalled { unresolved } => write!(
                f,
                "{} numbers left unresolved at this difficulty",
                unresolved
            ),
            SolveError::Ambiguous => write!(f, "grid has more than one solution"),
            SolveError::Unsatisfiable => write!(f, "grid has no solution"),
        }
    }
}

impl std::error::Error for SolveError {}
