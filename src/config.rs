use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, MIN_SIDE};
use crate::generator::LOOP_TRIES;
use crate::location::Coord;

/// How many times the generator may retry before giving up.
///
/// Most boards are accepted within a few dozen border draws. Narrow tall boards are the exception: a 5x12 board can take
/// most of a million, and a board 4 cells wide and 12 or more tall is practically never accepted, so it only returns
/// [`GenerationExhausted`](GenerationError::GenerationExhausted) once every draw allowed here is spent, tens of seconds at the default.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryBudget {
    /// Loop insertions attempted on one pair of borders before drawing new borders.
    pub loop_tries: usize,
    /// Pairs of borders drawn per board.
    pub max_passes: usize,
    /// Single border draws per board, rejected ones included.
    pub max_border_draws: usize,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self { loop_tries: LOOP_TRIES, max_passes: 10_000, max_border_draws: 2_000_000 }
    }
}

/// What to generate.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Board width in cells, at least [`MIN_SIDE`].
    pub width: Coord,
    /// Board height in cells, at least [`MIN_SIDE`].
    pub height: Coord,
    /// Number of boards.
    pub count: usize,
    /// Fewest numbers (terminus pairs) a board may have; derived from the board area if absent.
    pub min_numbers: Option<usize>,
    /// Most numbers a board may have; derived from the board area if absent.
    pub max_numbers: Option<usize>,
    /// Retries allowed per board.
    pub budget: RetryBudget,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { width: 10, height: 10, count: 1, min_numbers: None, max_numbers: None, budget: RetryBudget::default() }
    }
}

impl GeneratorConfig {
    /// `count` boards of `width` by `height`, everything else left at its default.
    pub fn new(width: Coord, height: Coord, count: usize) -> Self {
        Self { width, height, count, ..Self::default() }
    }

    /// `(min, max)` numbers a board may have.
    ///
    /// With `n` the square root of the area rounded to the nearest integer, the defaults are `2n / 3` and `3n / 2`.
    pub fn number_bounds(&self) -> (usize, usize) {
        let n = ((self.width * self.height) as f64).sqrt().round() as usize;
        (self.min_numbers.unwrap_or(n * 2 / 3), self.max_numbers.unwrap_or(n * 3 / 2))
    }

    /// Cost budget of the search index suited to this board size.
    pub fn search_budget(&self) -> u32 {
        self.height.clamp(6, 20) as u32
    }

    /// Refuse boards below [`MIN_SIDE`] and inverted number bounds.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.width < MIN_SIDE || self.height < MIN_SIDE {
            return Err(GenerationError::InvalidDimensions { width: self.width, height: self.height });
        }

        let (min, max) = self.number_bounds();
        if min > max {
            return Err(GenerationError::InvalidNumberBounds { min, max });
        }

        Ok(())
    }
}
