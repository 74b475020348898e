use serde::{Deserialize, Serialize};

/// The deduction techniques a solve is allowed to use.
///
/// Tiers are cumulative: each one permits everything below it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    /// One number at a time: exhausted / saturated counts only.
    Easy,
    /// Also reason about overlapping pairs of numbers.
    Medium,
    /// Also guess and backtrack.
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl Difficulty {
    pub fn all() -> Vec<Difficulty> {
        vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    pub fn index(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    pub fn from_index(index: usize) -> Difficulty {
        match index {
            0 => Difficulty::Easy,
            1 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }

    pub fn allows_pair_deduction(&self) -> bool {
        *self >= Difficulty::Medium
    }

    pub fn allows_guessing(&self) -> bool {
        *self >= Difficulty::Hard
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "0" | "easy" => Ok(Difficulty::Easy),
            "1" | "medium" => Ok(Difficulty::Medium),
            "2" | "hard" => Ok(Difficulty::Hard),
            other => Err(format!(
                "unknown difficulty {:?} (expected easy/medium/hard or 0/1/2)",
                other
            )),
        }
    }
}
