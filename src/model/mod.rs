mod board;
mod difficulty;
mod error;
mod mine_layout;

pub use board::{Board, CellId, HIDDEN};
pub use difficulty::Difficulty;
pub use error::{BoardError, SolveError};
pub use mine_layout::{digest_of, MineLayout};
