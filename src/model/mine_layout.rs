use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::board::HIDDEN;
use super::{Board, BoardError, CellId};

/// The ground-truth mine positions for a puzzle. Serialized as a flat
/// row-major `0`/`1` string; published only through its SHA-256 digest so a
/// playing surface can verify a submission without holding the layout.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineLayout {
    rows: usize,
    cols: usize,
    mines: Vec<bool>,
}

impl std::fmt::Debug for MineLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = String::new();
        output.push('\n');
        for row in 0..self.rows {
            for col in 0..self.cols {
                output.push(if self.mines[row * self.cols + col] {
                    '*'
                } else {
                    '-'
                });
            }
            output.push('\n');
        }
        write!(f, "{}", output)
    }
}

impl MineLayout {
    pub fn new(rows: usize, cols: usize, mines: Vec<bool>) -> Self {
        assert_eq!(mines.len(), rows * cols);
        Self { rows, cols, mines }
    }

    /// Decode the flat `0`/`1` wire format.
    pub fn from_digits(input: &str, rows: usize, cols: usize) -> Result<Self, BoardError> {
        let trimmed = input.trim();
        if trimmed.chars().count() != rows * cols {
            return Err(BoardError::DimensionMismatch {
                rows,
                cols,
                len: trimmed.chars().count(),
            });
        }
        let mut mines = Vec::with_capacity(rows * cols);
        for (index, symbol) in trimmed.chars().enumerate() {
            match symbol {
                '0' => mines.push(false),
                '1' => mines.push(true),
                _ => return Err(BoardError::InvalidSymbol { index, symbol }),
            }
        }
        Ok(Self { rows, cols, mines })
    }

    pub fn to_digits(&self) -> String {
        self.mines.iter().map(|&m| if m { '1' } else { '0' }).collect()
    }

    /// Hex SHA-256 of the wire encoding.
    pub fn digest(&self) -> String {
        digest_of(&self.to_digits())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.mines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mines.is_empty()
    }

    pub fn is_mine(&self, id: CellId) -> bool {
        self.mines[id]
    }

    pub fn mine_count(&self) -> usize {
        self.mines.iter().filter(|&&m| m).count()
    }

    pub fn density(&self) -> f64 {
        self.mine_count() as f64 / self.mines.len() as f64
    }

    /// (row, col) of every mine, row-major.
    pub fn mine_coords(&self) -> Vec<(usize, usize)> {
        (0..self.mines.len())
            .filter(|&id| self.mines[id])
            .map(|id| (id / self.cols, id % self.cols))
            .collect()
    }

    /// The "nothing hidden" grid for this layout: every non-mine cell shows
    /// its adjacent-mine count, every mine is hidden.
    pub fn reveal_counts(&self) -> Board {
        let mut digits = String::with_capacity(self.mines.len());
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.mines[row * self.cols + col] {
                    digits.push((b'0' + HIDDEN) as char);
                    continue;
                }
                let mut count = 0u8;
                for r in row.saturating_sub(1)..=(row + 1).min(self.rows - 1) {
                    for c in col.saturating_sub(1)..=(col + 1).min(self.cols - 1) {
                        if (r != row || c != col) && self.mines[r * self.cols + c] {
                            count += 1;
                        }
                    }
                }
                digits.push((b'0' + count) as char);
            }
        }
        Board::from_digits(&digits, self.rows, self.cols)
            .expect("count grid is always well-formed")
    }
}

/// Hex SHA-256 of an arbitrary serialized layout; also used to check a
/// submitted solution against a published digest.
pub fn digest_of(serialized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross_layout() -> MineLayout {
        // mines at (0,1) and (1,0)
        MineLayout::from_digits("010100000", 3, 3).unwrap()
    }

    #[test]
    fn test_reveal_counts() {
        let board = cross_layout().reveal_counts();
        assert_eq!(board.to_digits(), "291921110");
    }

    #[test]
    fn test_digit_round_trip() {
        let layout = cross_layout();
        assert_eq!(
            MineLayout::from_digits(&layout.to_digits(), 3, 3).unwrap(),
            layout
        );
        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.mine_coords(), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_digest_is_stable_and_hex() {
        let layout = cross_layout();
        let digest = layout.digest();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, digest_of(&layout.to_digits()));
        // any flip changes the digest
        let other = MineLayout::from_digits("010100001", 3, 3).unwrap();
        assert_ne!(digest, other.digest());
    }

    #[test]
    fn test_rejects_bad_digits() {
        assert!(MineLayout::from_digits("012", 1, 3).is_err());
        assert!(MineLayout::from_digits("01", 1, 3).is_err());
    }
}
