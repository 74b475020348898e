pub mod classifier;
pub mod constraint_graph;
pub mod generator;
pub mod propagation;
pub mod search;

pub use classifier::{classify, completes_at};
pub use constraint_graph::{ConstraintGraph, SolveState};
pub use generator::{generate, random_seed, GeneratedPuzzle, GenerationStats, GeneratorConfig};
pub use propagation::propagate;
pub use search::{solve_board, SearchContext};
